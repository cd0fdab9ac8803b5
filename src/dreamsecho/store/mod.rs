//! # Storage Layer
//!
//! The journal is persisted as a single JSON array. Storage sits behind the
//! [`DreamStore`] trait so the session and command layers never touch the
//! filesystem directly.
//!
//! ## Implementations
//!
//! - [`fs::JsonFileStore`]: production storage
//!   - The whole collection lives in `dreams.json`, pretty-printed UTF-8
//!   - Every save rewrites the file through a temp file + rename, so a crash
//!     mid-write leaves the previous version intact
//!
//! - [`memory::InMemoryStore`]: storage for tests
//!   - No persistence
//!   - Can be told to fail writes or to report a corrupt file
//!
//! ## Storage Format
//!
//! ```text
//! <data dir>/
//! ├── dreams.json         # All dream records (JSON array)
//! ├── config.json         # Settings
//! └── generated/          # Illustrations: dream_<id>_<unix ts>.png
//! ```
//!
//! There is no schema version and no partial-read recovery. Unknown keys in a
//! record are carried through untouched (see [`crate::model::DreamRecord`]).

use crate::error::Result;
use crate::model::DreamRecord;

pub mod fs;
pub mod memory;

/// Abstract interface for the dream collection's backing storage.
///
/// Stores deal in whole collections: there is no per-record update.
pub trait DreamStore {
    /// Read every stored record. A store that has never been written to
    /// yields an empty collection, not an error.
    fn load_all(&self) -> Result<Vec<DreamRecord>>;

    /// Replace the stored collection with `dreams`.
    fn save_all(&mut self, dreams: &[DreamRecord]) -> Result<()>;

    /// Move unreadable stored data out of the way under a name carrying
    /// `tag`, so the next write starts a fresh collection without destroying
    /// it. Returns where the data went, or `None` if there was nothing to move.
    fn set_aside(&mut self, tag: &str) -> Result<Option<String>>;

    /// Human readable location, for messages and logs
    fn location(&self) -> String;
}
