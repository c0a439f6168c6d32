//! Parameter loading from YAML files, dotenv files and `KEY=VALUE` pairs.

use std::path::Path;

use serde_yaml::Value;
use tracing::{debug, info, warn};

use crate::error::{ConfigError, Result, StackError};
use crate::template::ParameterSet;

use super::parser::{read_file, yaml_location};

/// Reads parameters from a YAML mapping.
///
/// Nested mappings are flattened with `.`, so `db: {port: 5432}` defines
/// `db.port`. Scalars are kept as their text; sequences and nulls are rejected.
///
/// # Errors
///
/// Returns an error if the YAML is invalid or holds an unsupported value.
pub fn parameters_from_yaml(content: &str) -> Result<ParameterSet> {
    parse_parameters(content, None)
}

/// Loads parameters from a YAML file.
///
/// # Errors
///
/// Same as [`parameters_from_yaml`], plus file errors.
pub fn load_parameters_file(path: impl AsRef<Path>) -> Result<ParameterSet> {
    let path = path.as_ref();
    info!("Loading parameters from: {}", path.display());

    let content = read_file(path)?;
    parse_parameters(&content, Some(path))
}

/// Loads parameters from a dotenv file.
///
/// The process environment is left untouched.
///
/// # Errors
///
/// Returns an error if the file is missing or has invalid lines.
pub fn parameters_from_env_file(path: impl AsRef<Path>) -> Result<ParameterSet> {
    let path = path.as_ref();
    info!("Loading parameters from env file: {}", path.display());

    if !path.exists() {
        return Err(StackError::Config(ConfigError::FileNotFound {
            path: path.to_path_buf(),
        }));
    }

    let env_error = |e: dotenvy::Error| {
        StackError::Config(ConfigError::ParseError {
            message: format!("Failed to load env file: {e}"),
            location: Some(path.display().to_string()),
        })
    };

    let mut params = ParameterSet::new();
    for item in dotenvy::from_path_iter(path).map_err(env_error)? {
        let (name, value) = item.map_err(env_error)?;
        params.insert(name, value)?;
    }

    debug!("Read {} parameters from env file", params.len());
    Ok(params)
}

/// Parses `KEY=VALUE` pairs, typically from `--set` flags.
///
/// The value is everything after the first `=` and may be empty.
///
/// # Errors
///
/// Returns an error if a pair has no `=` or an invalid name.
pub fn parse_set_values<I, S>(values: I) -> Result<ParameterSet>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut params = ParameterSet::new();
    for raw in values {
        let raw = raw.as_ref();
        let Some((name, value)) = raw.split_once('=') else {
            return Err(ConfigError::invalid_parameter(raw, "expected KEY=VALUE").into());
        };
        let name = name.trim();
        if params.insert(name, value)?.is_some() {
            warn!("Parameter '{}' set more than once; the last value wins", name);
        }
    }
    Ok(params)
}

fn parse_parameters(content: &str, source: Option<&Path>) -> Result<ParameterSet> {
    let mut params = ParameterSet::new();
    if content.trim().is_empty() {
        return Ok(params);
    }

    let document: Value = serde_yaml::from_str(content).map_err(|e| {
        StackError::Config(ConfigError::ParseError {
            message: format!("YAML parse error: {e}"),
            location: yaml_location(source, &e),
        })
    })?;

    match document {
        Value::Null => {}
        Value::Mapping(_) => flatten_into(&mut params, None, document)?,
        other => {
            return Err(StackError::Config(ConfigError::ParseError {
                message: format!("parameter file must be a mapping, got {}", value_kind(&other)),
                location: source.map(|p| p.display().to_string()),
            }));
        }
    }

    debug!("Read {} parameters from YAML", params.len());
    Ok(params)
}

fn flatten_into(params: &mut ParameterSet, prefix: Option<&str>, value: Value) -> Result<()> {
    let Value::Mapping(mapping) = value else {
        return Ok(());
    };

    for (key, value) in mapping {
        let key = scalar_text(&key).ok_or_else(|| {
            ConfigError::invalid_parameter(
                prefix.unwrap_or_default(),
                format!("keys must be scalars, got {}", value_kind(&key)),
            )
        })?;
        let name = prefix.map_or_else(|| key.clone(), |p| format!("{p}.{key}"));

        match value {
            Value::Mapping(_) => flatten_into(params, Some(&name), value)?,
            Value::Tagged(tagged) => {
                reject_float(&name, &tagged.value)?;
                let text = scalar_text(&tagged.value).ok_or_else(|| {
                    ConfigError::invalid_parameter(&name, "tagged values must be scalars")
                })?;
                params.insert(name, text)?;
            }
            other => {
                reject_float(&name, &other)?;
                let text = scalar_text(&other).ok_or_else(|| {
                    ConfigError::invalid_parameter(
                        &name,
                        format!("{} values are not supported", value_kind(&other)),
                    )
                })?;
                params.insert(name, text)?;
            }
        }
    }
    Ok(())
}

fn reject_float(name: &str, value: &Value) -> Result<()> {
    if matches!(value, Value::Number(n) if n.is_f64()) {
        return Err(ConfigError::invalid_parameter(
            name,
            "unquoted decimal numbers do not keep their exact text, quote the value",
        )
        .into());
    }
    Ok(())
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

const fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_parameters_are_flattened() {
        let yaml = r"
tag: '1.25'
replicas: 3
debug: false
db:
  host: postgres
  port: 5432
";
        let params = parameters_from_yaml(yaml).unwrap();
        assert_eq!(params.get("tag"), Some("1.25"));
        assert_eq!(params.get("replicas"), Some("3"));
        assert_eq!(params.get("debug"), Some("false"));
        assert_eq!(params.get("db.host"), Some("postgres"));
        assert_eq!(params.get("db.port"), Some("5432"));
        assert_eq!(params.len(), 5);
    }

    #[test]
    fn test_yaml_parameters_reject_sequences_and_nulls() {
        let err = parameters_from_yaml("hosts: [a, b]").unwrap_err();
        assert!(matches!(
            err,
            StackError::Config(ConfigError::InvalidParameter { ref name, .. }) if name == "hosts"
        ));

        assert!(parameters_from_yaml("tag: ~").is_err());
        assert!(parameters_from_yaml("- a\n- b\n").is_err());
    }

    #[test]
    fn test_yaml_parameters_reject_unquoted_decimals() {
        let err = parameters_from_yaml("tag: 1.10").unwrap_err();
        assert!(matches!(
            err,
            StackError::Config(ConfigError::InvalidParameter { ref name, .. }) if name == "tag"
        ));

        let params = parameters_from_yaml("tag: '1.10'\nport: 8080").unwrap();
        assert_eq!(params.get("tag"), Some("1.10"));
        assert_eq!(params.get("port"), Some("8080"));
    }

    #[test]
    fn test_empty_yaml_is_empty_set() {
        assert!(parameters_from_yaml("").unwrap().is_empty());
    }

    #[test]
    fn test_env_file_parameters() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prod.env");
        std::fs::write(&path, "# production\nTAG=1.25\nREPLICAS=\"3\"\n").unwrap();

        let params = parameters_from_env_file(&path).unwrap();
        assert_eq!(params.get("TAG"), Some("1.25"));
        assert_eq!(params.get("REPLICAS"), Some("3"));
        assert!(std::env::var("REPLICAS").is_err());
    }

    #[test]
    fn test_missing_env_file() {
        let err = parameters_from_env_file("/nonexistent/.env").unwrap_err();
        assert!(matches!(err, StackError::Config(ConfigError::FileNotFound { .. })));
    }

    #[test]
    fn test_set_values() {
        let params = parse_set_values(["tag=1.25", "url=http://x/?a=b", "empty="]).unwrap();
        assert_eq!(params.get("tag"), Some("1.25"));
        assert_eq!(params.get("url"), Some("http://x/?a=b"));
        assert_eq!(params.get("empty"), Some(""));

        assert!(parse_set_values(["novalue"]).is_err());
        assert!(parse_set_values(["bad name=x"]).is_err());
    }

    #[test]
    fn test_load_parameters_file_with_location() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.yaml");
        std::fs::write(&path, "tag: [unclosed").unwrap();

        let err = load_parameters_file(&path).unwrap_err();
        match err {
            StackError::Config(ConfigError::ParseError { location, .. }) => {
                assert!(location.unwrap().contains("params.yaml"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
