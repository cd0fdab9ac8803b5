use super::DreamStore;
use crate::error::{DreamError, Result};
use crate::model::DreamRecord;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const DREAMS_FILENAME: &str = "dreams.json";

pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store backed by `<data_dir>/dreams.json`.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self::at(data_dir.as_ref().join(DREAMS_FILENAME))
    }

    /// Store backed by an explicit file path.
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `dreams.json` plus `suffix`, in the same directory.
    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| DREAMS_FILENAME.into());
        name.push(suffix);
        self.path.with_file_name(name)
    }

    fn temp_path(&self) -> PathBuf {
        self.sibling(".tmp")
    }

    fn write_temp(&self, tmp: &Path, dreams: &[DreamRecord]) -> Result<()> {
        let file = File::create(tmp).map_err(DreamError::Io)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, dreams).map_err(DreamError::Serialization)?;
        writer.write_all(b"\n").map_err(DreamError::Io)?;
        let file = writer
            .into_inner()
            .map_err(|e| DreamError::Io(e.into_error()))?;
        file.sync_all().map_err(DreamError::Io)?;
        Ok(())
    }
}

impl DreamStore for JsonFileStore {
    fn load_all(&self) -> Result<Vec<DreamRecord>> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no journal file yet");
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path).map_err(DreamError::Io)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        let dreams: Vec<DreamRecord> =
            serde_json::from_str(&content).map_err(DreamError::Serialization)?;
        tracing::debug!(count = dreams.len(), path = %self.path.display(), "journal loaded");
        Ok(dreams)
    }

    fn save_all(&mut self, dreams: &[DreamRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(DreamError::Io)?;
            }
        }

        let tmp = self.temp_path();
        if let Err(e) = self.write_temp(&tmp, dreams) {
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }
        fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            DreamError::Io(e)
        })?;

        tracing::debug!(count = dreams.len(), path = %self.path.display(), "journal written");
        Ok(())
    }

    fn set_aside(&mut self, tag: &str) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let backup = self.sibling(&format!(".{}", tag));
        fs::rename(&self.path, &backup).map_err(DreamError::Io)?;
        tracing::warn!(from = %self.path.display(), to = %backup.display(), "journal set aside");
        Ok(Some(backup.display().to_string()))
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
