//! # CLI Templates
//!
//! Terminal output is rendered from minijinja templates kept in
//! `cli/templates/`, included here as string constants. Keeping them out of
//! the Rust code makes them easier to edit and diff.
//!
//! The environment runs with `trim_blocks` and `lstrip_blocks`, so block tags
//! on their own line produce no output. Widths, truncation and padding are
//! computed in Rust and passed in ready to print; templates only pick styles
//! through the `style` filter and decide what to show.

pub const LIST_TEMPLATE: &str = include_str!("templates/list.tmp");
pub const DREAM_TEMPLATE: &str = include_str!("templates/dream.tmp");
pub const STATS_TEMPLATE: &str = include_str!("templates/stats.tmp");
pub const CONFIG_TEMPLATE: &str = include_str!("templates/config.tmp");
pub const MESSAGES_TEMPLATE: &str = include_str!("templates/messages.tmp");
