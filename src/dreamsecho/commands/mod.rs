use crate::config::DreamsConfig;
use crate::model::DreamRecord;
use std::path::PathBuf;

pub mod add;
pub mod config;
pub mod init;
pub mod list;
pub mod stats;
pub mod view;

pub use crate::config::DreamsPaths;
use stats::DreamStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    /// Records written by the command
    pub affected_dreams: Vec<DreamRecord>,
    /// Records the command asks the client to display
    pub listed_dreams: Vec<DreamRecord>,
    pub stats: Option<DreamStats>,
    pub config: Option<DreamsConfig>,
    pub paths: Vec<PathBuf>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_affected_dreams(mut self, dreams: Vec<DreamRecord>) -> Self {
        self.affected_dreams = dreams;
        self
    }

    pub fn with_listed_dreams(mut self, dreams: Vec<DreamRecord>) -> Self {
        self.listed_dreams = dreams;
        self
    }

    pub fn with_stats(mut self, stats: DreamStats) -> Self {
        self.stats = Some(stats);
        self
    }

    pub fn with_config(mut self, config: DreamsConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.paths = paths;
        self
    }

    /// Whether any message is at `level`.
    pub fn has_level(&self, level: MessageLevel) -> bool {
        self.messages.iter().any(|m| m.level == level)
    }
}
