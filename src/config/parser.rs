//! Stack document parser.
//!
//! Loads stack documents from YAML files and reports deserialization failures
//! with the document path of the offending field.

use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};
use tracing::{debug, info};

use crate::error::{ConfigError, Result, StackError, TemplateError};
use crate::stack::Stack;
use crate::template::MALFORMED_TEMPLATE_TAG;

/// Name given to bare-spec documents read from a source without a file stem.
const FALLBACK_STACK_NAME: &str = "stack";

/// Parser for stack documents.
#[derive(Debug, Default)]
pub struct StackParser {
    /// Base path for resolving relative paths.
    base_path: Option<PathBuf>,
}

impl StackParser {
    /// Creates a new stack parser.
    #[must_use]
    pub const fn new() -> Self {
        Self { base_path: None }
    }

    /// Sets the base path for resolving relative paths.
    #[must_use]
    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Resolves `path` against the base path when it is relative.
    #[must_use]
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        match &self.base_path {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Loads a stack from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not describe a
    /// valid stack.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Stack> {
        let path = self.resolve(path);
        info!("Loading stack from: {}", path.display());

        let content = read_file(&path)?;
        self.parse_yaml(&content, Some(&path))
    }

    /// Parses a stack from a YAML string.
    ///
    /// A document with a top-level `services` key and no `spec` is read as a
    /// bare stack spec and named after the source file stem.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ParseError`] for invalid YAML or unknown keys,
    /// and [`TemplateError::MalformedTemplate`] for invalid placeholder syntax.
    pub fn parse_yaml(&self, content: &str, source: Option<&Path>) -> Result<Stack> {
        debug!("Parsing YAML stack document");

        let mut document: Value = serde_yaml::from_str(content).map_err(|e| {
            StackError::Config(ConfigError::ParseError {
                message: format!("YAML parse error: {e}"),
                location: yaml_location(source, &e),
            })
        })?;

        if is_bare_spec(&document) {
            let name = source
                .and_then(Path::file_stem)
                .and_then(|stem| stem.to_str())
                .unwrap_or(FALLBACK_STACK_NAME);
            debug!("Wrapping bare spec document into stack: {}", name);
            document = wrap_bare_spec(document, name);
        }

        let stack: Stack =
            serde_path_to_error::deserialize(document).map_err(|e| document_error(&e, source))?;

        debug!("Successfully parsed stack: {}", stack.name());
        Ok(stack)
    }
}

/// Default stack file names to search for.
pub const DEFAULT_STACK_FILES: &[&str] = &[
    "stack.yaml",
    "stack.yml",
    "docker-stack.yaml",
    "docker-stack.yml",
];

/// Finds a stack file in the given directory or its parents.
///
/// # Errors
///
/// Returns an error if no stack file is found.
pub fn find_stack_file(start_dir: impl AsRef<Path>) -> Result<PathBuf> {
    let start = start_dir.as_ref();
    let mut current = start.to_path_buf();

    loop {
        for filename in DEFAULT_STACK_FILES {
            let candidate = current.join(filename);
            if candidate.exists() {
                info!("Found stack file: {}", candidate.display());
                return Ok(candidate);
            }
        }

        if !current.pop() {
            break;
        }
    }

    Err(StackError::Config(ConfigError::FileNotFound {
        path: start.join(DEFAULT_STACK_FILES[0]),
    }))
}

/// Reads a whole file, mapping a missing file to [`ConfigError::FileNotFound`].
pub(crate) fn read_file(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(StackError::Config(ConfigError::FileNotFound {
            path: path.to_path_buf(),
        }));
    }

    std::fs::read_to_string(path).map_err(|e| {
        StackError::Config(ConfigError::ParseError {
            message: format!("Failed to read file: {e}"),
            location: Some(path.display().to_string()),
        })
    })
}

/// Formats the source and line/column of a YAML syntax error.
pub(crate) fn yaml_location(source: Option<&Path>, err: &serde_yaml::Error) -> Option<String> {
    let file = source.map(|p| p.display().to_string());
    match (file, err.location()) {
        (Some(file), Some(loc)) => Some(format!("{file}:{}:{}", loc.line(), loc.column())),
        (None, Some(loc)) => Some(format!("line {}, column {}", loc.line(), loc.column())),
        (file, None) => file,
    }
}

fn is_bare_spec(document: &Value) -> bool {
    document
        .as_mapping()
        .is_some_and(|m| m.contains_key("services") && !m.contains_key("spec"))
}

fn wrap_bare_spec(spec: Value, name: &str) -> Value {
    let mut metadata = Mapping::new();
    metadata.insert(Value::from("name"), Value::from(name));

    let mut stack = Mapping::new();
    stack.insert(Value::from("metadata"), Value::Mapping(metadata));
    stack.insert(Value::from("spec"), spec);
    Value::Mapping(stack)
}

fn document_error(
    err: &serde_path_to_error::Error<serde_yaml::Error>,
    source: Option<&Path>,
) -> StackError {
    let path = err.path().to_string();
    let message = err.inner().to_string();

    if let Some(start) = message.find(MALFORMED_TEMPLATE_TAG) {
        return StackError::Template(TemplateError::MalformedTemplate {
            path,
            reason: message[start + MALFORMED_TEMPLATE_TAG.len()..].to_string(),
        });
    }

    StackError::Config(ConfigError::ParseError {
        message: format!("{path}: {message}"),
        location: source.map(|p| p.display().to_string()),
    })
}
