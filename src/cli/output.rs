//! Output formatting for CLI commands.
//!
//! This module provides formatting utilities for displaying
//! information to the user in various formats.

use colored::Colorize;
use std::fmt::Write;
use tabled::{Table, Tabled};

use crate::config::{StackHasher, ValidationIssue, ValidationResult};
use crate::error::{Result, StackError};
use crate::stack::{PlaceholderRef, RenderedService, RenderedStack};
use crate::template::ParameterSet;

use super::commands::OutputFormat;

/// Output formatter for CLI.
#[derive(Debug)]
pub struct OutputFormatter {
    /// Output format.
    format: OutputFormat,
}

/// Service row for table display.
#[derive(Tabled)]
struct ServiceRow {
    #[tabled(rename = "Service")]
    name: String,
    #[tabled(rename = "Image")]
    image: String,
    #[tabled(rename = "Replicas")]
    replicas: String,
    #[tabled(rename = "Ports")]
    ports: String,
    #[tabled(rename = "Hash")]
    hash: String,
}

/// Placeholder row for table display.
#[derive(Tabled)]
struct PlaceholderRow {
    #[tabled(rename = "Parameter")]
    name: String,
    #[tabled(rename = "Field")]
    path: String,
    #[tabled(rename = "Type")]
    target: String,
    #[tabled(rename = "Value")]
    value: String,
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a rendered stack for display or export.
    ///
    /// # Errors
    ///
    /// Returns an error if the stack cannot be serialized.
    pub fn format_rendered(&self, stack: &RenderedStack) -> Result<String> {
        match self.format {
            OutputFormat::Yaml => serde_yaml::to_string(stack)
                .map_err(|e| StackError::internal(format!("YAML serialization failed: {e}"))),
            OutputFormat::Json => serde_json::to_string_pretty(stack)
                .map(|mut json| {
                    json.push('\n');
                    json
                })
                .map_err(|e| StackError::internal(format!("JSON serialization failed: {e}"))),
            OutputFormat::Text => Self::format_rendered_text(stack),
        }
    }

    /// Formats a rendered stack as a service table.
    fn format_rendered_text(stack: &RenderedStack) -> Result<String> {
        let hasher = StackHasher::new();
        let mut output = String::new();

        let fingerprint = hasher.hash_rendered(stack)?;
        let _ = write!(
            output,
            "\nStack: {}\n   Fingerprint: {}\n\n",
            stack.metadata.name.bold(),
            hasher.short_hash(&fingerprint)
        );

        if stack.spec.services.is_empty() {
            output.push_str("   No services defined.\n");
            return Ok(output);
        }

        let rows = stack
            .spec
            .services
            .iter()
            .map(|service| {
                let hash = hasher.hash_service(service)?;
                Ok(ServiceRow {
                    name: service.name.clone(),
                    image: Self::truncate(service.image.as_deref().unwrap_or("-"), 40),
                    replicas: service
                        .deploy
                        .replicas
                        .map_or_else(|| String::from("-"), |r| r.to_string()),
                    ports: Self::format_ports(service),
                    hash: hasher.short_hash(&hash),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        output.push_str(&Table::new(rows).to_string());
        output.push('\n');

        let _ = write!(
            output,
            "\n{} services, {} secrets, {} configs\n",
            stack.spec.services.len(),
            stack.spec.secrets.len(),
            stack.spec.configs.len()
        );
        Ok(output)
    }

    /// Formats a validation result.
    #[must_use]
    pub fn format_validation(&self, result: &ValidationResult, show_warnings: bool) -> String {
        match self.format {
            OutputFormat::Json | OutputFormat::Yaml => {
                let report = ValidationJson::new(result, show_warnings);
                if self.format == OutputFormat::Json {
                    serde_json::to_string_pretty(&report).unwrap_or_default()
                } else {
                    serde_yaml::to_string(&report).unwrap_or_default()
                }
            }
            OutputFormat::Text => Self::format_validation_text(result, show_warnings),
        }
    }

    /// Formats a validation result as text.
    fn format_validation_text(result: &ValidationResult, show_warnings: bool) -> String {
        let mut output = String::new();

        if result.is_valid() {
            let _ = writeln!(output, "{} Stack is valid", "ok".green());
        } else {
            let _ = writeln!(
                output,
                "{} Stack has {} error(s):",
                "error".red(),
                result.error_count()
            );
            for issue in &result.errors {
                let _ = writeln!(output, "   - {issue}");
            }
        }

        if show_warnings && !result.warnings.is_empty() {
            let _ = writeln!(
                output,
                "\n{} {} warning(s):",
                "warning".yellow(),
                result.warning_count()
            );
            for issue in &result.warnings {
                let _ = writeln!(output, "   - {issue}");
            }
        } else if !result.warnings.is_empty() {
            let _ = writeln!(
                output,
                "   {} warning(s) hidden, use --warnings to show them",
                result.warning_count()
            );
        }

        output
    }

    /// Formats placeholder references with their resolved values.
    #[must_use]
    pub fn format_placeholders(&self, refs: &[PlaceholderRef], params: &ParameterSet) -> String {
        match self.format {
            OutputFormat::Json | OutputFormat::Yaml => {
                let entries: Vec<PlaceholderJson> = refs
                    .iter()
                    .map(|r| PlaceholderJson {
                        name: r.name.clone(),
                        path: r.path.clone(),
                        target: r.target,
                        value: params.get(&r.name).map(str::to_string),
                    })
                    .collect();
                if self.format == OutputFormat::Json {
                    serde_json::to_string_pretty(&entries).unwrap_or_default()
                } else {
                    serde_yaml::to_string(&entries).unwrap_or_default()
                }
            }
            OutputFormat::Text => Self::format_placeholders_text(refs, params),
        }
    }

    /// Formats placeholder references as a table.
    fn format_placeholders_text(refs: &[PlaceholderRef], params: &ParameterSet) -> String {
        if refs.is_empty() {
            return String::from("Stack has no placeholders.\n");
        }

        let missing = refs.iter().filter(|r| !params.contains(&r.name)).count();
        let rows: Vec<PlaceholderRow> = refs
            .iter()
            .map(|r| PlaceholderRow {
                name: r.name.clone(),
                path: r.path.clone(),
                target: r.target.to_string(),
                value: params.get(&r.name).map_or_else(
                    || "<missing>".red().to_string(),
                    |v| Self::truncate(v, 30),
                ),
            })
            .collect();

        let mut output = Table::new(rows).to_string();
        output.push('\n');
        if missing > 0 {
            let _ = writeln!(
                output,
                "\n{} {missing} reference(s) without a value",
                "warning".yellow()
            );
        }
        output
    }

    /// Formats the ports of a service as `published:target/protocol`.
    fn format_ports(service: &RenderedService) -> String {
        if service.ports.is_empty() {
            return String::from("-");
        }

        service
            .ports
            .iter()
            .map(|p| {
                let protocol = p.protocol.as_deref().unwrap_or("tcp");
                p.published.map_or_else(
                    || format!("{}/{protocol}", p.target),
                    |published| format!("{published}:{}/{protocol}", p.target),
                )
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Truncates a string to a maximum length.
    fn truncate(s: &str, max_len: usize) -> String {
        if s.chars().count() <= max_len {
            s.to_string()
        } else {
            let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
            format!("{kept}...")
        }
    }
}

// Serialization helpers

#[derive(serde::Serialize)]
struct ValidationJson<'a> {
    valid: bool,
    errors: Vec<IssueJson<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<IssueJson<'a>>,
}

#[derive(serde::Serialize)]
struct IssueJson<'a> {
    field: &'a str,
    message: &'a str,
}

impl<'a> ValidationJson<'a> {
    fn new(result: &'a ValidationResult, show_warnings: bool) -> Self {
        let issues = |list: &'a [ValidationIssue]| -> Vec<IssueJson<'a>> {
            list.iter()
                .map(|issue| IssueJson {
                    field: &issue.field,
                    message: &issue.message,
                })
                .collect()
        };
        Self {
            valid: result.is_valid(),
            errors: issues(&result.errors),
            warnings: if show_warnings {
                issues(&result.warnings)
            } else {
                Vec::new()
            },
        }
    }
}

#[derive(serde::Serialize)]
struct PlaceholderJson {
    name: String,
    path: String,
    target: &'static str,
    value: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::{ServiceConfig, Stack, StackSpec};

    fn rendered() -> RenderedStack {
        let mut web = ServiceConfig::new("web");
        web.image = Some("nginx:1.25".parse().unwrap());
        web.deploy.replicas = Some("2".parse().unwrap());
        Stack::new(
            "demo",
            StackSpec {
                services: vec![web],
                ..StackSpec::default()
            },
        )
        .render(&ParameterSet::new())
        .unwrap()
    }

    #[test]
    fn test_rendered_json_is_parseable() {
        let json = OutputFormatter::new(OutputFormat::Json)
            .format_rendered(&rendered())
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["metadata"]["name"], "demo");
        assert_eq!(value["spec"]["services"][0]["deploy"]["replicas"], 2);
    }

    #[test]
    fn test_rendered_text_lists_services() {
        colored::control::set_override(false);
        let text = OutputFormatter::new(OutputFormat::Text)
            .format_rendered(&rendered())
            .unwrap();
        assert!(text.contains("Stack: demo"));
        assert!(text.contains("nginx:1.25"));
        assert!(text.contains("1 services"));
    }

    #[test]
    fn test_validation_json_hides_warnings() {
        let result = ValidationResult {
            errors: vec![],
            warnings: vec![ValidationIssue {
                field: String::from("kind"),
                message: String::from("unexpected"),
            }],
        };
        let formatter = OutputFormatter::new(OutputFormat::Json);

        let hidden: serde_json::Value =
            serde_json::from_str(&formatter.format_validation(&result, false)).unwrap();
        assert_eq!(hidden["valid"], true);
        assert!(hidden.get("warnings").is_none());

        let shown: serde_json::Value =
            serde_json::from_str(&formatter.format_validation(&result, true)).unwrap();
        assert_eq!(shown["warnings"][0]["field"], "kind");
    }

    #[test]
    fn test_placeholders_mark_missing_values() {
        colored::control::set_override(false);
        let refs = vec![
            PlaceholderRef {
                name: String::from("tag"),
                path: String::from("services[0].image"),
                target: "string",
            },
            PlaceholderRef {
                name: String::from("replicas"),
                path: String::from("services[0].deploy.replicas"),
                target: "unsigned integer",
            },
        ];
        let mut params = ParameterSet::new();
        params.insert("tag", "1.25").unwrap();

        let text = OutputFormatter::new(OutputFormat::Text).format_placeholders(&refs, &params);
        assert!(text.contains("<missing>"));
        assert!(text.contains("1 reference(s) without a value"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(OutputFormatter::truncate("short", 10), "short");
        assert_eq!(OutputFormatter::truncate("a-very-long-image-name", 10), "a-very-...");
    }
}
