//! CLI layer: argument parsing and exit-code mapping

pub mod args;
pub mod error;
pub mod output;

pub use args::Cli;
pub use error::{CliError, CliResult};
