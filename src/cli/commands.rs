//! CLI command definitions.
//!
//! This module defines all CLI commands and their arguments using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Halldyll Stack - typed, parameterized deployment stacks.
#[derive(Parser, Debug)]
#[command(name = "halldyll-stack")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the stack file (searched upward from the current directory if omitted).
    #[arg(short, long, global = true, env = "STACK_FILE")]
    pub file: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines.
    #[arg(long, global = true, env = "HALLDYLL_LOG_JSON")]
    pub log_json: bool,

    /// Output format (yaml, json, text).
    #[arg(long, global = true, default_value = "yaml")]
    pub output: OutputFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render the stack with a parameter set.
    Render {
        /// Parameter sources.
        #[command(flatten)]
        params: ParameterArgs,

        /// Write the rendered stack to a file instead of stdout.
        #[arg(short = 'o', long = "out")]
        out: Option<PathBuf>,
    },

    /// Validate the stack, optionally against a parameter set.
    Validate {
        /// Show all warnings, not just errors.
        #[arg(short, long)]
        warnings: bool,

        /// Parameter sources.
        #[command(flatten)]
        params: ParameterArgs,
    },

    /// List the placeholders of the stack and their resolution.
    Inspect {
        /// Parameter sources.
        #[command(flatten)]
        params: ParameterArgs,
    },
}

/// Parameter sources, applied in order: files, env files, then `--set`.
#[derive(Args, Debug, Default, Clone)]
pub struct ParameterArgs {
    /// YAML parameter file (repeatable, later files win).
    #[arg(short = 'p', long = "parameters", value_name = "FILE")]
    pub parameters: Vec<PathBuf>,

    /// Dotenv parameter file (repeatable, later files win).
    #[arg(long = "env-file", value_name = "FILE")]
    pub env_files: Vec<PathBuf>,

    /// Single parameter override.
    #[arg(short = 's', long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,
}

impl ParameterArgs {
    /// Returns true if no parameter source was given.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty() && self.env_files.is_empty() && self.set.is_empty()
    }
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// YAML output.
    #[default]
    Yaml,
    /// JSON output for scripting.
    Json,
    /// Human-readable text output.
    Text,
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
