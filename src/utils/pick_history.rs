use chrono::{DateTime, Local};
use std::collections::VecDeque;

use crate::app::PickMode;

#[derive(Debug, Clone)]
pub struct PickRecord {
    pub name: String,
    pub question: Option<String>,
    pub mode: PickMode,
    pub at: DateTime<Local>,
}

/// Most-recent-first log of picks, bounded in size.
pub struct PickHistory {
    records: VecDeque<PickRecord>,
    max_size: usize,
}

impl PickHistory {
    pub fn new(max_size: usize) -> Self {
        Self {
            records: VecDeque::new(),
            max_size,
        }
    }

    pub fn add(&mut self, name: String, question: Option<String>, mode: PickMode) {
        if name.is_empty() {
            return;
        }

        self.records.push_front(PickRecord {
            name,
            question,
            mode,
            at: Local::now(),
        });

        while self.records.len() > self.max_size {
            self.records.pop_back();
        }
    }

    pub fn set_max_size(&mut self, max_size: usize) {
        self.max_size = max_size;
        self.records.truncate(max_size);
    }

    pub fn latest(&self) -> Option<&PickRecord> {
        self.records.front()
    }

    pub fn get_all(&self) -> &VecDeque<PickRecord> {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
