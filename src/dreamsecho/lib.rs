//! # DreamsEcho Architecture
//!
//! DreamsEcho is a **UI-agnostic dream journal library**. Dreams are written
//! down as free text, optionally analysed for emotions and themes, optionally
//! illustrated, and browsed with aggregate statistics. The command-line client
//! in `cli/` is one client of the library, not the other way around.
//!
//! ## The Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, renders templates, sets exit codes     │
//! │  - The ONLY place that knows about stdout/stderr            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Owns the session, the services and the settings          │
//! │  - Thin dispatch to commands, returns Result<CmdResult>     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - add, list, view, stats, config, init                     │
//! │  - Pure logic over the session and injected services        │
//! └─────────────────────────────────────────────────────────────┘
//!                     │                     │
//!                     ▼                     ▼
//! ┌───────────────────────────┐ ┌───────────────────────────────┐
//! │  Session + Store          │ │  Services                     │
//! │  - DreamSession           │ │  - DreamAnalyzer              │
//! │  - JsonFileStore /        │ │  - ImageGenerator             │
//! │    InMemoryStore          │ │  (OpenAI-compatible, offline) │
//! └───────────────────────────┘ └───────────────────────────────┘
//! ```
//!
//! ## No I/O Assumptions in Core
//!
//! From `api.rs` inward, code takes regular Rust arguments and returns
//! regular Rust types. It never prints and never exits. Diagnostics go
//! through `tracing`; whether and where they are written is up to the client.
//!
//! ## Enrichment Is Best-Effort
//!
//! A dream is always saved if its text is valid and the journal can be
//! written. Analysis and illustration failures are reported as messages on
//! the [`commands::CmdResult`] and leave the corresponding field empty.
//!
//! ## Testing Strategy
//!
//! 1. **Commands**: most tests live here, against `InMemoryStore` and the
//!    stub services in `test_utils`.
//! 2. **Store / session**: filesystem round-trips with `tempfile`.
//! 3. **CLI**: rendering tests in `cli/render.rs`, end-to-end runs of the
//!    binary in `tests/`.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, entry point for all operations
//! - [`commands`]: Logic for each command
//! - [`session`]: The in-memory collection and its id assignment
//! - [`store`]: Storage abstraction and implementations
//! - [`services`]: Analyzer and image generator traits and providers
//! - [`model`]: Core data types (`DreamRecord`, `Analysis`, `DreamDraft`)
//! - [`config`]: Configuration, paths and process settings
//! - [`error`]: Error types
//! - `cli`: Argument parsing and templated rendering for the binary (not part of the lib API)

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod model;
pub mod services;
pub mod session;
pub mod store;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
