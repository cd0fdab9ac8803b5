//! Fixtures and stub services shared by the unit tests.

use crate::error::{DreamError, Result};
use crate::model::{Analysis, DreamRecord};
use crate::services::{DreamAnalyzer, ImageGenerator, Services};
use crate::store::memory::InMemoryStore;
use chrono::{DateTime, Local};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

pub fn record_at(id: u64, content: &str, at: DateTime<Local>) -> DreamRecord {
    DreamRecord::new(id, content.to_string(), at)
}

/// Analysis with the given `(emotion, intensity)` pairs and themes.
pub fn analysis_of(emotions: &[(&str, f64)], themes: &[&str]) -> Analysis {
    Analysis {
        emotions: emotions
            .iter()
            .map(|(name, value)| (name.to_string(), *value))
            .collect(),
        themes: themes.iter().map(|t| t.to_string()).collect(),
        ..Analysis::default()
    }
}

/// Analyzer returning a canned answer, or failing.
pub struct StubAnalyzer {
    answer: Option<Analysis>,
    pub calls: RefCell<Vec<String>>,
}

impl StubAnalyzer {
    pub fn returning(analysis: Analysis) -> Self {
        Self {
            answer: Some(analysis),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            answer: None,
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl DreamAnalyzer for StubAnalyzer {
    fn name(&self) -> &str {
        "stub"
    }

    fn analyze(&self, text: &str) -> Result<Analysis> {
        self.calls.borrow_mut().push(text.to_string());
        self.answer
            .clone()
            .ok_or_else(|| DreamError::Analysis("stub analyzer is offline".to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StubImageMode {
    /// Writes a small file and reports success.
    Writes,
    /// Reports success without writing anything.
    ClaimsWithoutFile,
    /// Reports `false`.
    Declines,
    /// Returns an error.
    Errors,
}

/// `(prompt, style, size preset, output path)` for every call
pub type ImageRequests = Rc<RefCell<Vec<(String, String, String, PathBuf)>>>;

pub struct StubImageGenerator {
    mode: StubImageMode,
    requests: ImageRequests,
}

impl StubImageGenerator {
    pub fn new(mode: StubImageMode) -> Self {
        Self {
            mode,
            requests: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Shared handle on the recorded calls, usable after the stub is boxed.
    pub fn requests(&self) -> ImageRequests {
        Rc::clone(&self.requests)
    }
}

impl ImageGenerator for StubImageGenerator {
    fn name(&self) -> &str {
        "stub"
    }

    fn generate(
        &self,
        prompt: &str,
        style: &str,
        size_preset: &str,
        output_path: &Path,
    ) -> Result<bool> {
        self.requests.borrow_mut().push((
            prompt.to_string(),
            style.to_string(),
            size_preset.to_string(),
            output_path.to_path_buf(),
        ));
        match self.mode {
            StubImageMode::Writes => {
                if let Some(parent) = output_path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(output_path, b"\x89PNG\r\n")?;
                Ok(true)
            }
            StubImageMode::ClaimsWithoutFile => Ok(true),
            StubImageMode::Declines => Ok(false),
            StubImageMode::Errors => Err(DreamError::ImageGeneration(
                "stub generator is offline".to_string(),
            )),
        }
    }
}

pub fn stub_services(analyzer: StubAnalyzer, mode: StubImageMode) -> Services {
    Services::new(Box::new(analyzer), Box::new(StubImageGenerator::new(mode)))
}

/// Builds an [`InMemoryStore`] pre-populated the way a journal file would be.
#[derive(Default)]
pub struct JournalFixture {
    dreams: Vec<DreamRecord>,
}

impl JournalFixture {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> u64 {
        self.dreams.len() as u64 + 1
    }

    pub fn with_dream(mut self, content: &str, at: DateTime<Local>) -> Self {
        let record = record_at(self.next_id(), content, at);
        self.dreams.push(record);
        self
    }

    pub fn with_styled_dream(mut self, content: &str, style: &str, at: DateTime<Local>) -> Self {
        let mut record = record_at(self.next_id(), content, at);
        record.style = Some(style.to_string());
        self.dreams.push(record);
        self
    }

    pub fn with_analyzed_dream(
        mut self,
        content: &str,
        analysis: Analysis,
        at: DateTime<Local>,
    ) -> Self {
        let mut record = record_at(self.next_id(), content, at);
        record.analysis = Some(analysis);
        self.dreams.push(record);
        self
    }

    pub fn with_record(mut self, record: DreamRecord) -> Self {
        self.dreams.push(record);
        self
    }

    pub fn dreams(&self) -> &[DreamRecord] {
        &self.dreams
    }

    pub fn into_store(self) -> InMemoryStore {
        InMemoryStore::with_dreams(self.dreams)
    }
}
