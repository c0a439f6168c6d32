//! Stack validation.
//!
//! Checks a parsed stack for problems that can be found before rendering:
//! naming, literal values that do not coerce, dangling object references and
//! parameter coverage.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use tracing::debug;

use crate::error::{ConfigError, Result, StackError};
use crate::stack::{
    FileObjectConfig, FileReferenceConfig, ServiceConfig, Stack, StackSpec, STACK_KIND,
};
use crate::template::{FieldPath, ParameterSet, Visit};

/// Naming rule shown in invalid-name errors.
const NAME_RULE: &str = "Must be lowercase alphanumeric with hyphens or underscores.";

/// Validator for stacks.
#[derive(Debug, Default)]
pub struct StackValidator;

/// Validation result containing every issue found.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Problems that prevent rendering or deploying.
    pub errors: Vec<ValidationIssue>,
    /// Non-fatal issues.
    pub warnings: Vec<ValidationIssue>,
}

/// A single validation finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// The field path the finding is about.
    pub field: String,
    /// The message.
    pub message: String,
}

impl StackValidator {
    /// Creates a new validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates a stack, failing on the first error.
    ///
    /// With a parameter set, placeholders are also checked against it and
    /// the stack is trial-rendered.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] for the first error found.
    pub fn validate(
        &self,
        stack: &Stack,
        params: Option<&ParameterSet>,
    ) -> Result<ValidationResult> {
        let result = self.check(stack, params);

        match result.errors.first() {
            None => {
                debug!("Stack validation passed");
                Ok(result)
            }
            Some(first) => Err(StackError::Config(ConfigError::validation(
                first.message.clone(),
                first.field.clone(),
            ))),
        }
    }

    /// Collects every error and warning.
    #[must_use]
    pub fn check(&self, stack: &Stack, params: Option<&ParameterSet>) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_metadata(stack, &mut result);

        let Some(spec) = &stack.spec else {
            result.error("spec", format!("Stack '{}' has no spec", stack.name()));
            return result;
        };

        Self::validate_literals(spec, &mut result);
        Self::validate_services(spec, &mut result);
        if let Some(params) = params {
            Self::validate_parameters(stack, params, &mut result);
        }

        debug!(
            "Checked stack {}: {} errors, {} warnings",
            stack.name(),
            result.error_count(),
            result.warning_count()
        );
        result
    }

    /// Validates identity and kind.
    fn validate_metadata(stack: &Stack, result: &mut ValidationResult) {
        let name = stack.name();
        if name.is_empty() {
            result.error("metadata.name", "Stack name cannot be empty");
        } else if !is_valid_name(name) {
            result.error(
                "metadata.name",
                format!("Stack name '{name}' is invalid. {NAME_RULE}"),
            );
        }

        if stack.type_meta.kind != STACK_KIND {
            result.warn(
                "kind",
                format!("Unexpected kind '{}', expected '{STACK_KIND}'", stack.type_meta.kind),
            );
        }
    }

    /// Coerces every literal value to its target type.
    fn validate_literals(spec: &StackSpec, result: &mut ValidationResult) {
        spec.visit(&FieldPath::root(), &mut |path, field| {
            if let Some(Err(err)) = field.check_literal() {
                result.error(path, err.to_string());
            }
        });
    }

    /// Validates service names, object references, ports and images.
    fn validate_services(spec: &StackSpec, result: &mut ValidationResult) {
        if spec.services.is_empty() {
            result.warn("services", "No services defined in stack");
            return;
        }

        let root = FieldPath::root().field("services");
        let mut seen_names = HashSet::new();
        let mut published: HashMap<u64, String> = HashMap::new();

        for (i, service) in spec.services.iter().enumerate() {
            let prefix = root.index(i);
            let name_path = prefix.field("name");

            if service.name.is_empty() {
                result.error(&name_path, "Service name cannot be empty");
            } else if !is_valid_name(&service.name) {
                result.error(
                    &name_path,
                    format!("Service name '{}' is invalid. {NAME_RULE}", service.name),
                );
            }

            if !service.name.is_empty() && !seen_names.insert(service.name.as_str()) {
                result.error(&name_path, format!("Duplicate service name: {}", service.name));
            }

            Self::validate_references(
                &service.secrets,
                &spec.secrets,
                "secret",
                &prefix.field("secrets"),
                result,
            );
            Self::validate_references(
                &service.configs,
                &spec.configs,
                "config",
                &prefix.field("configs"),
                result,
            );
            Self::validate_ports(service, &prefix, &mut published, result);
            Self::validate_image(service, &prefix, result);
        }
    }

    /// Checks that literal references name a declared object.
    fn validate_references(
        references: &[FileReferenceConfig],
        declared: &BTreeMap<String, FileObjectConfig>,
        kind: &str,
        prefix: &FieldPath,
        result: &mut ValidationResult,
    ) {
        for (i, reference) in references.iter().enumerate() {
            let path = prefix.index(i).field("source");
            if !reference.source.is_literal() {
                result.warn(
                    &path,
                    format!(
                        "Templated {kind} source '{}' cannot be checked before rendering",
                        reference.source.raw()
                    ),
                );
                continue;
            }

            let source = reference.source.raw();
            if !declared.contains_key(source) {
                result.error(&path, format!("Undefined {kind} '{source}'"));
            }
        }
    }

    /// Detects literal published ports used twice across the stack.
    fn validate_ports(
        service: &ServiceConfig,
        prefix: &FieldPath,
        published: &mut HashMap<u64, String>,
        result: &mut ValidationResult,
    ) {
        for (i, port) in service.ports.iter().enumerate() {
            let Some(Ok(number)) = port.published.as_ref().and_then(|p| p.check_literal()) else {
                continue;
            };

            let path = prefix.field("ports").index(i).field("published");
            if let Some(owner) = published.get(&number) {
                result.error(
                    &path,
                    format!("Published port {number} is already used by {owner}"),
                );
            } else {
                published.insert(number, path.to_string());
            }
        }
    }

    /// Warns about floating image tags.
    fn validate_image(service: &ServiceConfig, prefix: &FieldPath, result: &mut ValidationResult) {
        let Some(image) = service.image.as_ref().filter(|image| image.is_literal()) else {
            return;
        };

        if image.raw().ends_with(":latest") {
            result.warn(
                prefix.field("image"),
                "Using ':latest' tag is not recommended for production",
            );
        }
    }

    /// Checks parameter coverage, then trial-renders.
    fn validate_parameters(stack: &Stack, params: &ParameterSet, result: &mut ValidationResult) {
        let placeholders = stack.placeholders();
        let mut missing = false;

        for reference in &placeholders {
            if !params.contains(&reference.name) {
                missing = true;
                result.error(
                    &reference.path,
                    format!("Parameter '{}' is not defined", reference.name),
                );
            }
        }

        let required = stack.required_parameters();
        for name in params.names().filter(|name| !required.contains(*name)) {
            result.warn(
                FieldPath::root().field("parameters").key(name),
                format!("Parameter '{name}' is not used by the stack"),
            );
        }

        if missing || !result.is_valid() {
            return;
        }

        if let Err(StackError::Template(err)) = stack.render(params) {
            result.error(err.path(), err.to_string());
        }
    }
}

/// Validates that a name follows the naming convention.
/// Names must be lowercase alphanumeric with hyphens or underscores, starting
/// with a letter or digit.
fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();

    match chars.next() {
        Some(first) if first.is_ascii_lowercase() || first.is_ascii_digit() => {}
        _ => return false,
    }

    if !chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_') {
        return false;
    }

    !name.ends_with('-')
}

impl ValidationResult {
    /// Returns true if validation passed (no errors).
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of errors.
    #[must_use]
    pub const fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Returns the number of warnings.
    #[must_use]
    pub const fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    fn error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ValidationIssue::new(field, message));
    }

    fn warn(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationIssue::new(field, message));
    }
}

impl ValidationIssue {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}
