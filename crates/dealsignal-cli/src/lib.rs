//! Dealsignal CLI library.
//!
//! Configuration loading, store wiring, command execution and output
//! formatting for the `dealsignal` binary.

pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use app::App;
pub use cli::{Cli, Command, DataCommand};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;
