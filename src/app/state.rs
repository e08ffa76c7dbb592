use anyhow::Result;
use crossterm::event::{Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::future::{self, BoxFuture};
use futures::FutureExt;
use parking_lot::RwLock;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::preferences::{Preferences, PreferencesStore};
use super::reveal::Reveal;
use super::{Config, PickMode};
use crate::integrations::QuestionSet;
use crate::ui::theme::ThemeChoice;
use crate::utils::{parse_names, remove_name, PickHistory};
use crate::wheel::{DisplayList, Spin, Wheel};

pub const NO_NAMES_NOTICE: &str = "Please enter at least one name.";
pub const NO_QUESTIONS_NOTICE: &str = "Load a TXT or DOCX file with questions first.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelId {
    Names,
    Questions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelEvent {
    Started(WheelId),
    Tick(WheelId, usize),
    Ended(WheelId, usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    EditNames,
    OpenFile(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickResult {
    pub name: String,
    pub question: Option<String>,
}

enum PendingPick {
    Wheels {
        names: Vec<String>,
        outcome: BoxFuture<'static, (Option<usize>, Option<usize>)>,
    },
    Question(Spin),
    Reveal {
        names: Vec<String>,
        reveal: Reveal,
    },
}

enum Finished {
    Wheels(Option<usize>, Option<usize>),
    Question(Option<usize>),
    Reveal,
}

pub struct AppState {
    pub config: Arc<RwLock<Config>>,
    pub mode: PickMode,
    pub theme: ThemeChoice,
    pub input: InputMode,

    pub names_text: String,
    pub questions: Option<QuestionSet>,
    pub question_error: Option<String>,

    pub names_wheel: Wheel<DisplayList>,
    pub question_wheel: Wheel<DisplayList>,

    pub result: Option<PickResult>,
    pub notice: Option<String>,
    pub history: PickHistory,

    preferences: PreferencesStore,
    pending: Option<PendingPick>,
    events: UnboundedReceiver<WheelEvent>,
    flash_until: Option<Instant>,
    rng: StdRng,
}

impl AppState {
    pub fn new(config: Arc<RwLock<Config>>, preferences: PreferencesStore, mut rng: StdRng) -> Self {
        let (size, params, history_size) = {
            let config = config.read();
            (
                config.wheel.size,
                config.wheel.spin_params(),
                config.ui.history_max_entries,
            )
        };

        let (tx, events) = mpsc::unbounded_channel();
        let mut names_wheel = Wheel::with_rng(
            DisplayList::new(size),
            params.clone(),
            StdRng::from_rng(&mut rng),
        );
        let mut question_wheel =
            Wheel::with_rng(DisplayList::new(size), params, StdRng::from_rng(&mut rng));
        attach_hooks(&mut names_wheel, WheelId::Names, &tx);
        attach_hooks(&mut question_wheel, WheelId::Questions, &tx);

        let prefs = preferences.load_or_default();
        let mode = PickMode::from_key(&prefs.mode).unwrap_or(PickMode::Wheel);
        let theme = ThemeChoice::from_key(&prefs.theme).unwrap_or(ThemeChoice::System);
        names_wheel.set_items(parse_names(&prefs.names));
        log::info!(
            "Preferences loaded from {:?} (mode {}, theme {})",
            preferences.path(),
            mode.key(),
            theme.key()
        );

        Self {
            config,
            mode,
            theme,
            input: InputMode::Normal,

            names_text: prefs.names,
            questions: None,
            question_error: None,

            names_wheel,
            question_wheel,

            result: None,
            notice: None,
            history: PickHistory::new(history_size),

            preferences,
            pending: None,
            events,
            flash_until: None,
            rng,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Dice roll or chest opening currently on screen.
    pub fn reveal(&self) -> Option<&Reveal> {
        match &self.pending {
            Some(PendingPick::Reveal { reveal, .. }) => Some(reveal),
            _ => None,
        }
    }

    pub fn is_flashing(&self, now: Instant) -> bool {
        self.flash_until.is_some_and(|until| now < until)
    }

    pub fn can_remove_chosen(&self) -> bool {
        self.result
            .as_ref()
            .is_some_and(|r| parse_names(&self.names_text).contains(&r.name))
    }

    pub fn handle_event(&mut self, event: CrosstermEvent) -> Result<bool> {
        match event {
            CrosstermEvent::Key(key_event) if key_event.kind == KeyEventKind::Press => {
                self.handle_key_event(key_event, Instant::now())
            }
            CrosstermEvent::Paste(text) if self.input == InputMode::EditNames => {
                self.names_text.push_str(&text);
                self.names_changed();
                Ok(true)
            }
            _ => Ok(true),
        }
    }

    pub fn handle_key_event(&mut self, key: KeyEvent, now: Instant) -> Result<bool> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Ok(false);
        }

        match self.input.clone() {
            InputMode::EditNames => {
                match key.code {
                    KeyCode::Esc => self.input = InputMode::Normal,
                    KeyCode::Enter => {
                        self.names_text.push('\n');
                        self.names_changed();
                    }
                    KeyCode::Backspace => {
                        self.names_text.pop();
                        self.names_changed();
                    }
                    KeyCode::Char(c) => {
                        self.names_text.push(c);
                        self.names_changed();
                    }
                    _ => {}
                }
                return Ok(true);
            }
            InputMode::OpenFile(mut path) => {
                match key.code {
                    KeyCode::Esc => self.input = InputMode::Normal,
                    KeyCode::Enter => {
                        self.input = InputMode::Normal;
                        let path = path.trim().to_string();
                        if path.is_empty() {
                            self.clear_questions();
                        } else {
                            self.load_questions(Path::new(&path));
                        }
                    }
                    KeyCode::Backspace => {
                        path.pop();
                        self.input = InputMode::OpenFile(path);
                    }
                    KeyCode::Char(c) => {
                        path.push(c);
                        self.input = InputMode::OpenFile(path);
                    }
                    _ => {}
                }
                return Ok(true);
            }
            InputMode::Normal => {}
        }

        match key.code {
            KeyCode::Esc => return Ok(false),
            KeyCode::Char('t') => self.cycle_theme(),
            KeyCode::Char('x') => {
                self.names_wheel.clear_highlight();
                self.question_wheel.clear_highlight();
            }
            _ if self.is_busy() => {}
            KeyCode::Char(' ') | KeyCode::Enter => self.pick(now),
            KeyCode::Char('q') => self.spin_questions(now),
            KeyCode::Tab | KeyCode::Char('m') => self.set_mode(self.mode.next()),
            KeyCode::BackTab => self.set_mode(self.mode.previous()),
            KeyCode::Char('e') => {
                self.notice = None;
                self.input = InputMode::EditNames;
            }
            KeyCode::Char('o') => {
                let current = self
                    .questions
                    .as_ref()
                    .map(|q| q.source.display().to_string())
                    .unwrap_or_default();
                self.input = InputMode::OpenFile(current);
            }
            KeyCode::Char('c') => self.clear_names(),
            KeyCode::Char('d') | KeyCode::Delete => self.remove_chosen(),
            _ => {}
        }

        Ok(true)
    }

    /// Pick a name with the current mode.
    pub fn pick(&mut self, now: Instant) {
        if self.is_busy() {
            return;
        }
        let names = parse_names(&self.names_text);
        if names.is_empty() {
            self.notice = Some(NO_NAMES_NOTICE.to_string());
            return;
        }
        self.notice = None;
        self.refresh_settings();

        match self.mode {
            PickMode::Wheel => {
                self.names_wheel.set_items(names.clone());
                self.question_wheel.set_items(self.question_labels());

                let names_spin = self.names_wheel.spin(now);
                let question_spin = self.question_wheel.spin(now);
                self.pending = Some(PendingPick::Wheels {
                    names,
                    outcome: future::join(names_spin, question_spin).boxed(),
                });
            }
            PickMode::Dice | PickMode::Chest => {
                let index = self.rng.random_range(0..names.len());
                let duration = self.reveal_duration(self.mode);
                self.pending = Some(PendingPick::Reveal {
                    names,
                    reveal: Reveal::new(self.mode, index, duration, now),
                });
            }
        }
    }

    /// Spin only the questions wheel.
    pub fn spin_questions(&mut self, now: Instant) {
        if self.is_busy() {
            return;
        }
        let labels = self.question_labels();
        if labels.is_empty() {
            self.notice = Some(NO_QUESTIONS_NOTICE.to_string());
            return;
        }
        self.notice = None;
        self.refresh_settings();

        self.question_wheel.set_items(labels);
        let spin = self.question_wheel.spin(now);
        self.pending = Some(PendingPick::Question(spin));
    }

    /// Advance animations to `now` and settle finished picks.
    pub fn tick(&mut self, now: Instant) {
        if self.names_wheel.needs_frame() {
            self.names_wheel.update(now);
        }
        if self.question_wheel.needs_frame() {
            self.question_wheel.update(now);
        }
        if let Some(PendingPick::Reveal { reveal, .. }) = self.pending.as_mut() {
            if reveal.mode == PickMode::Dice && !reveal.is_done(now) {
                reveal.face = self.rng.random_range(1..=6);
            }
        }

        self.drain_wheel_events();
        self.settle(now);
    }

    fn settle(&mut self, now: Instant) {
        let finished = match self.pending.as_mut() {
            Some(PendingPick::Wheels { outcome, .. }) => outcome
                .as_mut()
                .now_or_never()
                .map(|(name, question)| Finished::Wheels(name, question)),
            Some(PendingPick::Question(spin)) => spin.try_result().map(Finished::Question),
            Some(PendingPick::Reveal { reveal, .. }) => {
                reveal.is_done(now).then_some(Finished::Reveal)
            }
            None => None,
        };
        let Some(finished) = finished else {
            return;
        };
        let Some(pending) = self.pending.take() else {
            return;
        };

        match (pending, finished) {
            (PendingPick::Wheels { names, .. }, Finished::Wheels(name, question)) => {
                let Some(name) = name.and_then(|i| names.get(i).cloned()) else {
                    return;
                };
                let question = match question {
                    Some(index) => self.question_at(index),
                    None => self.random_question(),
                };
                self.set_result(name, question, now);
            }
            (PendingPick::Question(_), Finished::Question(Some(index))) => {
                let question = self.question_at(index);
                match self.result.as_mut() {
                    Some(result) => result.question = question,
                    None => {
                        self.result = Some(PickResult {
                            name: String::new(),
                            question,
                        })
                    }
                }
            }
            (PendingPick::Reveal { names, reveal }, Finished::Reveal) => {
                if let Some(name) = names.get(reveal.index).cloned() {
                    let question = self.random_question();
                    self.set_result(name, question, now);
                }
            }
            _ => {}
        }
    }

    fn set_result(&mut self, name: String, question: Option<String>, now: Instant) {
        log::info!("Picked {} ({})", name, self.mode.key());
        self.history.add(name.clone(), question.clone(), self.mode);
        self.result = Some(PickResult { name, question });

        let flash_ms = self.config.read().ui.flash_ms;
        self.flash_until = Some(now + Duration::from_millis(flash_ms));
    }

    fn question_at(&self, index: usize) -> Option<String> {
        self.questions
            .as_ref()
            .and_then(|q| q.get(index))
            .map(str::to_string)
    }

    fn random_question(&mut self) -> Option<String> {
        self.questions
            .as_ref()
            .and_then(|q| q.random(&mut self.rng))
            .map(str::to_string)
    }

    fn question_labels(&self) -> Vec<String> {
        self.questions
            .as_ref()
            .map(QuestionSet::labels)
            .unwrap_or_default()
    }

    fn drain_wheel_events(&mut self) {
        let sound = self.config.read().ui.sound_cues;
        while let Ok(event) = self.events.try_recv() {
            match event {
                WheelEvent::Started(wheel) => log::debug!("{:?} wheel started", wheel),
                WheelEvent::Tick(wheel, index) => {
                    log::trace!("{:?} wheel passed slice {}", wheel, index);
                    if sound && wheel == WheelId::Names {
                        ring_bell();
                    }
                }
                WheelEvent::Ended(wheel, index) => {
                    log::debug!("{:?} wheel stopped on {}", wheel, index);
                    if sound {
                        ring_bell();
                    }
                }
            }
        }
    }

    fn refresh_settings(&mut self) {
        let config = self.config.read();
        let params = config.wheel.spin_params();
        self.names_wheel.set_params(params.clone());
        self.question_wheel.set_params(params);
        self.history.set_max_size(config.ui.history_max_entries);
    }

    fn reveal_duration(&mut self, mode: PickMode) -> Duration {
        let config = self.config.read();
        match mode {
            PickMode::Dice => {
                let min = config.dice.min_roll_ms;
                let max = config.dice.max_roll_ms.max(min);
                Duration::from_millis(self.rng.random_range(min..=max))
            }
            _ => Duration::from_millis(config.chest.open_ms),
        }
    }

    pub fn load_questions(&mut self, path: &Path) {
        let preview_chars = self.config.read().questions.preview_chars;
        match QuestionSet::load(path, preview_chars) {
            Ok(set) => {
                self.question_wheel.set_items(set.labels());
                self.questions = Some(set);
                self.question_error = None;
            }
            Err(e) => {
                log::warn!("Could not load questions: {}", e);
                self.clear_questions();
                self.question_error = Some(e.to_string());
            }
        }
    }

    fn clear_questions(&mut self) {
        self.questions = None;
        self.question_error = None;
        self.question_wheel.set_items(Vec::<String>::new());
    }

    pub fn set_mode(&mut self, mode: PickMode) {
        self.mode = mode;
        self.save_preferences();
        if mode == PickMode::Wheel {
            self.names_wheel.set_items(parse_names(&self.names_text));
            self.question_wheel.set_items(self.question_labels());
        }
    }

    pub fn cycle_theme(&mut self) {
        self.theme = self.theme.next();
        self.save_preferences();
    }

    pub fn clear_names(&mut self) {
        self.names_text.clear();
        self.save_preferences();
        self.result = None;
        self.names_wheel.set_items(Vec::<String>::new());
        self.question_wheel.set_items(Vec::<String>::new());
    }

    pub fn remove_chosen(&mut self) {
        let Some(result) = self.result.as_ref() else {
            return;
        };
        let Some(remaining) = remove_name(&self.names_text, &result.name) else {
            return;
        };

        self.names_text = remaining;
        self.save_preferences();
        self.names_wheel.set_items(parse_names(&self.names_text));
        self.question_wheel.set_items(Vec::<String>::new());
        self.result = None;
    }

    fn names_changed(&mut self) {
        self.save_preferences();
        self.names_wheel.set_items(parse_names(&self.names_text));
    }

    fn save_preferences(&self) {
        self.preferences.save_quietly(&Preferences {
            names: self.names_text.clone(),
            mode: self.mode.key().to_string(),
            theme: self.theme.key().to_string(),
        });
    }
}

fn attach_hooks(wheel: &mut Wheel<DisplayList>, id: WheelId, tx: &UnboundedSender<WheelEvent>) {
    let start_tx = tx.clone();
    wheel.on_start(move || {
        let _ = start_tx.send(WheelEvent::Started(id));
    });
    let tick_tx = tx.clone();
    wheel.on_tick(move |index| {
        let _ = tick_tx.send(WheelEvent::Tick(id, index));
    });
    let end_tx = tx.clone();
    wheel.on_end(move |index| {
        let _ = end_tx.send(WheelEvent::Ended(id, index));
    });
}

fn ring_bell() {
    let mut stdout = std::io::stdout();
    if let Err(e) = stdout.write_all(b"\x07").and_then(|_| stdout.flush()) {
        log::debug!("Failed to ring bell: {}", e);
    }
}
