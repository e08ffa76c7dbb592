use quick_xml::events::Event;
use quick_xml::Reader;
use rand::Rng;
use std::fs;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

const DOCX_BODY: &str = "word/document.xml";

#[derive(Debug, thiserror::Error)]
pub enum QuestionError {
    #[error("Could not read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported question file type: {0} (use .txt or .docx)")]
    Unsupported(String),

    #[error("Could not read DOCX file: {0}")]
    Docx(String),

    #[error("No questions found in {0:?}")]
    Empty(PathBuf),
}

/// Question lines extracted from a text file.
#[derive(Debug, Clone)]
pub struct QuestionSet {
    pub source: PathBuf,
    pub lines: Vec<String>,
    pub preview: String,
}

impl QuestionSet {
    pub fn load(path: &Path, preview_chars: usize) -> Result<Self, QuestionError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        if ext != "txt" && ext != "docx" {
            let shown = if ext.is_empty() { "(none)".to_string() } else { ext };
            return Err(QuestionError::Unsupported(shown));
        }

        let bytes = fs::read(path).map_err(|source| QuestionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let text = if ext == "docx" {
            docx_text(&bytes)?
        } else {
            decode_text(&bytes)
        };
        let set = Self::from_text(path.to_path_buf(), &text, preview_chars);
        if set.lines.is_empty() {
            return Err(QuestionError::Empty(path.to_path_buf()));
        }

        log::info!("Loaded {} questions from {:?}", set.lines.len(), path);
        Ok(set)
    }

    pub fn from_text(source: PathBuf, text: &str, preview_chars: usize) -> Self {
        Self {
            source,
            lines: split_lines(text),
            preview: text.chars().take(preview_chars).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Wheel labels: question numbers starting at 1.
    pub fn labels(&self) -> Vec<String> {
        (1..=self.lines.len()).map(|n| n.to_string()).collect()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        if self.lines.is_empty() {
            return None;
        }
        self.lines
            .get(index % self.lines.len())
            .map(String::as_str)
    }

    pub fn random<R: Rng>(&self, rng: &mut R) -> Option<&str> {
        if self.lines.is_empty() {
            return None;
        }
        self.get(rng.random_range(0..self.lines.len()))
    }
}

/// Non-empty trimmed lines.
pub fn split_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Decode file bytes: BOM-tagged UTF-8/UTF-16 first, then plain UTF-8, then
/// Windows-1252 as the legacy fallback.
pub fn decode_text(bytes: &[u8]) -> String {
    if let Some((encoding, bom_len)) = encoding_rs::Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return text.into_owned();
    }

    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            let (text, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            text.into_owned()
        }
    }
}

/// Raw text of a Word document, one line per paragraph.
pub fn docx_text(bytes: &[u8]) -> Result<String, QuestionError> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| QuestionError::Docx(e.to_string()))?;
    let mut xml = String::new();
    archive
        .by_name(DOCX_BODY)
        .map_err(|e| QuestionError::Docx(format!("{}: {}", DOCX_BODY, e)))?
        .read_to_string(&mut xml)
        .map_err(|e| QuestionError::Docx(e.to_string()))?;

    let mut reader = Reader::from_str(&xml);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"w:t" => in_text = true,
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => paragraphs.push(std::mem::take(&mut current)),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"w:tab" => current.push('\t'),
                b"w:br" | b"w:cr" => paragraphs.push(std::mem::take(&mut current)),
                _ => {}
            },
            Ok(Event::Text(t)) if in_text => {
                let text = t
                    .unescape()
                    .map_err(|e| QuestionError::Docx(e.to_string()))?;
                current.push_str(&text);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(QuestionError::Docx(e.to_string())),
            _ => {}
        }
    }
    if !current.is_empty() {
        paragraphs.push(current);
    }

    Ok(paragraphs.join("\n"))
}
