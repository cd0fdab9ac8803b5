use super::DreamStore;
use crate::error::{DreamError, Result};
use crate::model::DreamRecord;

/// In-memory storage for testing and development.
/// Does NOT persist data.
#[derive(Default)]
pub struct InMemoryStore {
    dreams: Vec<DreamRecord>,
    fail_writes: bool,
    corrupt: bool,
    writes: usize,
    set_aside: Vec<String>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populates the store, as if a journal file already existed.
    pub fn with_dreams(dreams: Vec<DreamRecord>) -> Self {
        Self {
            dreams,
            ..Self::default()
        }
    }

    /// Every `save_all` fails with an IO error.
    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    /// Every `load_all` fails as if the file could not be parsed.
    pub fn corrupt(mut self) -> Self {
        self.corrupt = true;
        self
    }

    /// Snapshot of what a reader would currently find in the store.
    pub fn stored(&self) -> &[DreamRecord] {
        &self.dreams
    }

    pub fn write_count(&self) -> usize {
        self.writes
    }

    /// Tags passed to `set_aside` that actually moved something.
    pub fn set_aside_tags(&self) -> &[String] {
        &self.set_aside
    }
}

impl DreamStore for InMemoryStore {
    fn load_all(&self) -> Result<Vec<DreamRecord>> {
        if self.corrupt {
            return Err(DreamError::Store("journal file is not valid JSON".to_string()));
        }
        Ok(self.dreams.clone())
    }

    fn save_all(&mut self, dreams: &[DreamRecord]) -> Result<()> {
        if self.fail_writes {
            return Err(DreamError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only store",
            )));
        }
        self.dreams = dreams.to_vec();
        self.writes += 1;
        Ok(())
    }

    fn set_aside(&mut self, tag: &str) -> Result<Option<String>> {
        if !self.corrupt && self.dreams.is_empty() {
            return Ok(None);
        }
        self.corrupt = false;
        self.dreams.clear();
        self.set_aside.push(tag.to_string());
        Ok(Some(format!("<memory>.{}", tag)))
    }

    fn location(&self) -> String {
        "<memory>".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;

    #[test]
    fn test_save_then_load() {
        let mut store = InMemoryStore::new();
        let dream = DreamRecord::new(1, "Falling".to_string(), Local::now());
        store.save_all(std::slice::from_ref(&dream)).unwrap();

        assert_eq!(store.load_all().unwrap(), vec![dream]);
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn test_failing_writes_keep_previous_contents() {
        let dream = DreamRecord::new(1, "Falling".to_string(), Local::now());
        let mut store = InMemoryStore::with_dreams(vec![dream]).failing_writes();

        assert!(store.save_all(&[]).is_err());
        assert_eq!(store.stored().len(), 1);
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn test_corrupt_store_fails_to_load() {
        let store = InMemoryStore::new().corrupt();
        assert!(matches!(store.load_all(), Err(DreamError::Store(_))));
    }

    #[test]
    fn test_set_aside_clears_a_corrupt_store() {
        let mut store = InMemoryStore::new().corrupt();
        assert_eq!(
            store.set_aside("corrupt-1").unwrap().as_deref(),
            Some("<memory>.corrupt-1")
        );
        assert!(store.load_all().unwrap().is_empty());
        assert_eq!(store.set_aside_tags(), ["corrupt-1".to_string()]);
    }
}
