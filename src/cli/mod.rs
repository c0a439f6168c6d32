//! CLI module for the Halldyll stack tool.
//!
//! This module provides the command-line interface for rendering,
//! validating and inspecting stacks.

mod commands;
mod output;

pub use commands::{Cli, Commands, OutputFormat, ParameterArgs};
pub use output::OutputFormatter;
