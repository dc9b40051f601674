//! CLI layer for the compliance engine.
//!
//! Provides the command-line interface using clap, with commands to
//! validate and correct documents, manage the module catalogue, and
//! inspect cache, metrics, and audit state.

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::execute;
pub use output::OutputFormat;
pub use parser::{Cli, Commands};
