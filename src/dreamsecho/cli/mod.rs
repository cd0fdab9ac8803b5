//! # CLI Behavior
//!
//! One possible client for the journal. It is the only place that knows about
//! terminal I/O, exit codes and output formatting.
//!
//! ### Naked Execution (`dreamsecho`)
//!
//! Running `dreamsecho` with no arguments defaults to `dreamsecho list`.
//!
//! ### Adding a Dream (`dreamsecho add`)
//!
//! The dream text comes from, in order:
//! 1. **Piped input**: `cat last-night.txt | dreamsecho add --title "Tides"`
//! 2. **Arguments**: `dreamsecho add I was flying over the city`
//!
//! Analysis runs unless `--no-analysis` is given (or `analyze_by_default` is
//! off). An illustration is only requested with `--image`.
//!
//! ### Output
//!
//! `--output json` prints the command's data as JSON instead of rendering
//! templates; messages still go to stdout as text.
//!
//! ### Logging
//!
//! Diagnostics go to stderr through `tracing`. The default level is `warn`,
//! `-v` raises it to `debug`, and `DREAMSECHO_LOG` takes any `EnvFilter`
//! directive.

mod commands;
mod render;
mod setup;
mod styles;
mod templates;

pub use commands::run;
