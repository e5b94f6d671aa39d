//! CLI module
//!
//! Command-line interface over the shipped collections.
//!
//! # Commands
//!
//! - `list` - Stream every record of a collection, one JSON object per line
//! - `page` - Fetch a single page, by query or by server URL
//! - `fetch` - Fetch one record by SID

mod commands;
mod runner;

pub use commands::{Cli, Commands, ListArgs, OutputFormat, ResourceArgs, ResourceKind};
pub use runner::Runner;
