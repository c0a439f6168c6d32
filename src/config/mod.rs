//! Configuration module for Halldyll stacks.
//!
//! This module handles everything around a stack document:
//! - Parsing and deserializing stack files
//! - Loading parameter sets from YAML, dotenv files and `--set` pairs
//! - Validation of stacks before rendering
//! - Computing stack fingerprints for change detection

mod hash;
mod params;
mod parser;
mod validator;

pub use hash::StackHasher;
pub use params::{
    load_parameters_file, parameters_from_env_file, parameters_from_yaml, parse_set_values,
};
pub use parser::{find_stack_file, StackParser, DEFAULT_STACK_FILES};
pub use validator::{StackValidator, ValidationIssue, ValidationResult};
