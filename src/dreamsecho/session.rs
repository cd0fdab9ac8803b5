//! # Session
//!
//! A [`DreamSession`] is the runtime context for one user: it owns the
//! in-memory dream collection and the store that backs it. It is created once
//! per process and handed to whatever needs it; there is no global state.
//!
//! The collection is loaded lazily and wholesale: [`DreamSession::load`] only
//! reads the store while the collection is empty. Every [`DreamSession::save`]
//! appends one record and rewrites the whole store.
//!
//! Two sessions pointed at the same file do not coordinate. Each rewrites the
//! file from its own copy and the last writer wins.

use crate::error::Result;
use crate::model::DreamRecord;
use crate::store::DreamStore;

pub struct DreamSession<S: DreamStore> {
    store: S,
    dreams: Vec<DreamRecord>,
}

impl<S: DreamStore> DreamSession<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            dreams: Vec::new(),
        }
    }

    /// Fills the collection from the store if it is currently empty.
    ///
    /// A store that cannot be read leaves the collection empty and the error
    /// is returned to the caller.
    pub fn load(&mut self) -> Result<usize> {
        if !self.dreams.is_empty() {
            return Ok(self.dreams.len());
        }
        match self.store.load_all() {
            Ok(dreams) => {
                self.dreams = dreams;
                tracing::debug!(store = %self.store.location(), count = self.dreams.len(), "journal loaded");
                Ok(self.dreams.len())
            }
            Err(e) => {
                tracing::warn!(store = %self.store.location(), error = %e, "journal could not be read");
                self.dreams.clear();
                Err(e)
            }
        }
    }

    /// Moves an unreadable store aside so saving can start over. The
    /// collection is left empty.
    pub fn set_aside(&mut self, tag: &str) -> Result<Option<String>> {
        self.dreams.clear();
        self.store.set_aside(tag)
    }

    pub fn dreams(&self) -> &[DreamRecord] {
        &self.dreams
    }

    pub fn get(&self, id: u64) -> Option<&DreamRecord> {
        self.dreams.iter().find(|d| d.id == id)
    }

    /// The id the next saved record will receive.
    ///
    /// Normally `count + 1`. If a hand-edited file already holds an id at or
    /// above that, the next id moves past the highest one instead.
    pub fn next_id(&self) -> u64 {
        let by_count = self.dreams.len() as u64 + 1;
        let by_max = self.dreams.iter().map(|d| d.id).max().unwrap_or(0) + 1;
        by_count.max(by_max)
    }

    /// Appends `record` under the next id and rewrites the store.
    ///
    /// If the write fails the record is dropped from memory again, so the
    /// collection never holds entries the store does not.
    pub fn save(&mut self, mut record: DreamRecord) -> Result<&DreamRecord> {
        record.id = self.next_id();
        self.dreams.push(record);

        if let Err(e) = self.store.save_all(&self.dreams) {
            self.dreams.pop();
            return Err(e);
        }

        let saved = &self.dreams[self.dreams.len() - 1];
        tracing::debug!(id = saved.id, total = self.dreams.len(), "dream saved");
        Ok(saved)
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
