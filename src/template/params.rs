//! Parameter sets supplied at render time.

use std::collections::BTreeMap;

use crate::error::ConfigError;

use super::token::is_valid_name;

/// Mapping from parameter name to its literal value.
///
/// Values are kept as text and coerced by the field that reads them. A render
/// pass only borrows the set, so the same set can serve concurrent renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSet {
    values: BTreeMap<String, String>,
}

impl ParameterSet {
    /// Creates an empty parameter set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    /// Inserts or replaces a parameter.
    ///
    /// # Errors
    ///
    /// Returns an error if the name does not match the placeholder grammar.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Option<String>, ConfigError> {
        let name = name.into();
        if !is_valid_name(&name) {
            return Err(ConfigError::invalid_parameter(
                name,
                "names must be non-empty and use only letters, digits, '_', '.' or '-'",
            ));
        }
        Ok(self.values.insert(name, value.into()))
    }

    /// Returns the value of a parameter.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Returns true if the parameter is defined.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no parameter is defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over parameters in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns parameter names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Layers `overrides` on top of this set; overriding values win.
    #[must_use]
    pub fn layered(mut self, overrides: Self) -> Self {
        self.values.extend(overrides.values);
        self
    }
}

impl<'a> IntoIterator for &'a ParameterSet {
    type Item = (&'a String, &'a String);
    type IntoIter = std::collections::btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut params = ParameterSet::new();
        assert!(params.insert("replica_count", "3").unwrap().is_none());
        assert_eq!(params.get("replica_count"), Some("3"));
        assert_eq!(params.insert("replica_count", "4").unwrap().as_deref(), Some("3"));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_rejects_invalid_names() {
        let mut params = ParameterSet::new();
        assert!(params.insert("", "x").is_err());
        assert!(params.insert("with space", "x").is_err());
        assert!(params.is_empty());
    }

    #[test]
    fn test_layered_overrides_win() {
        let mut base = ParameterSet::new();
        base.insert("tag", "v1").unwrap();
        base.insert("port", "80").unwrap();
        let mut overrides = ParameterSet::new();
        overrides.insert("tag", "v2").unwrap();

        let merged = base.layered(overrides);
        assert_eq!(merged.get("tag"), Some("v2"));
        assert_eq!(merged.get("port"), Some("80"));
        assert_eq!(merged.names().collect::<Vec<_>>(), vec!["port", "tag"]);
    }
}
