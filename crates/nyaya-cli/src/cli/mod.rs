//! Command-line interface for nyaya.

mod commands;
pub mod progress;

pub use commands::{is_verbose, run};
