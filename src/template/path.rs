//! Field paths attached to template errors.

use std::fmt;

/// Location of a field inside a stack, e.g. `services[2].ports[0].target`.
///
/// Paths are built while walking the model; each step allocates a new path so
/// that a parent path can be reused for every child.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath(String);

impl FieldPath {
    /// The empty path.
    #[must_use]
    pub const fn root() -> Self {
        Self(String::new())
    }

    /// Appends a named field.
    #[must_use]
    pub fn field(&self, name: &str) -> Self {
        if self.0.is_empty() {
            Self(name.to_string())
        } else {
            Self(format!("{}.{name}", self.0))
        }
    }

    /// Appends a sequence index.
    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        Self(format!("{}[{index}]", self.0))
    }

    /// Appends a map key.
    ///
    /// Keys containing `.`, brackets, quotes or backslashes are written as a
    /// quoted string with `"` and `\` escaped: `labels["a].b"]`.
    #[must_use]
    pub fn key(&self, key: &str) -> Self {
        if !key.contains(['.', '[', ']', '"', '\\']) {
            return Self(format!("{}[{key}]", self.0));
        }

        let mut out = String::with_capacity(self.0.len() + key.len() + 4);
        out.push_str(&self.0);
        out.push_str("[\"");
        for c in key.chars() {
            if matches!(c, '"' | '\\') {
                out.push('\\');
            }
            out.push(c);
        }
        out.push_str("\"]");
        Self(out)
    }

    /// Returns the path as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.0
    }
}

impl From<&FieldPath> for String {
    fn from(path: &FieldPath) -> Self {
        path.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_building() {
        let path = FieldPath::root().field("services").index(2).field("ports").index(0).field("target");
        assert_eq!(path.as_str(), "services[2].ports[0].target");
    }

    #[test]
    fn test_map_keys_are_bracketed() {
        let path = FieldPath::root().field("secrets").key("db.password").field("file");
        assert_eq!(path.to_string(), "secrets[\"db.password\"].file");

        let plain = FieldPath::root().field("labels").key("team");
        assert_eq!(plain.as_str(), "labels[team]");
    }

    #[test]
    fn test_ambiguous_keys_are_quoted() {
        let labels = FieldPath::root().field("services").index(0).field("labels");
        assert_eq!(labels.key("a].b").as_str(), r#"services[0].labels["a].b"]"#);
        assert_eq!(labels.key(r#"say "hi""#).as_str(), r#"services[0].labels["say \"hi\""]"#);
        assert_eq!(labels.key(r"c:\tmp").as_str(), r#"services[0].labels["c:\\tmp"]"#);
    }
}
