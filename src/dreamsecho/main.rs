//! # DreamsEcho CLI
//!
//! The binary is intentionally thin: the client lives in `cli/`, and this file
//! only invokes `cli::run()` and turns an error into a message and exit code.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (src/dreamsecho/cli/)                            │
//! │  - clap argument parsing (setup.rs)                         │
//! │  - Context wiring, logging, dispatch (commands.rs)          │
//! │  - Terminal rendering via minijinja templates (render.rs)   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs) → commands → session/store, services    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Templates live in `cli/templates/` and are embedded with `include_str!()`,
//! so the binary is self-contained.

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
