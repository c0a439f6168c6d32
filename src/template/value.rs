//! The generic templated field wrapper.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::str::FromStr;

use serde::de::{self, Deserialize, Deserializer, Visitor};
use serde::{Serialize, Serializer};

use crate::error::{CoerceError, TemplateError, TokenError};

use super::coerce::{self, Coerce};
use super::params::ParameterSet;
use super::path::FieldPath;
use super::token::{TemplateToken, TokenKind};

/// Marker placed in deserialization errors raised for template syntax, so the
/// document parser can tell them apart from structural YAML errors.
pub(crate) const MALFORMED_TEMPLATE_TAG: &str = "malformed template: ";

/// A field that is either a literal of type `C::Output` or a template
/// expression resolved at render time.
pub struct TemplateValue<C> {
    token: TemplateToken,
    strategy: PhantomData<fn() -> C>,
}

/// Text field.
pub type StringTemplate = TemplateValue<coerce::Text>;
/// Boolean field.
pub type BoolOrTemplate = TemplateValue<coerce::Bool>;
/// Unsigned integer field.
pub type UInt64OrTemplate = TemplateValue<coerce::UInt64>;
/// Duration field.
pub type DurationOrTemplate = TemplateValue<coerce::Duration>;
/// Byte-size field.
pub type UnitBytesOrTemplate = TemplateValue<coerce::ByteSize>;

impl<C: Coerce> TemplateValue<C> {
    /// Parses a raw field value.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid placeholder syntax, or for a mixed token
    /// in a field whose type is not text.
    pub fn parse(raw: &str) -> Result<Self, TokenError> {
        let token = TemplateToken::parse(raw)?;
        if token.kind() == TokenKind::Mixed && !C::ACCEPTS_MIXED {
            return Err(TokenError::MixedNotAllowed { target: C::NAME });
        }
        Ok(Self::from_token(token))
    }

    /// Parses a raw field value, reporting errors at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::MalformedTemplate`] when [`Self::parse`] fails.
    pub fn parse_at(raw: &str, path: &FieldPath) -> Result<Self, TemplateError> {
        Self::parse(raw).map_err(|err| TemplateError::malformed(path, &err))
    }

    /// Wraps a literal value without scanning it for placeholders.
    #[must_use]
    pub fn literal(value: impl fmt::Display) -> Self {
        Self::from_token(TemplateToken::literal(value.to_string()))
    }

    const fn from_token(token: TemplateToken) -> Self {
        Self {
            token,
            strategy: PhantomData,
        }
    }

    /// Returns the parsed token.
    #[must_use]
    pub const fn token(&self) -> &TemplateToken {
        &self.token
    }

    /// Returns the original text.
    #[must_use]
    pub fn raw(&self) -> &str {
        self.token.raw()
    }

    /// Returns true if the value has no placeholder.
    #[must_use]
    pub fn is_literal(&self) -> bool {
        self.token.is_literal()
    }

    /// Resolves placeholders and coerces the result to `C::Output`.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::UnresolvedParameter`] for a missing parameter,
    /// and [`TemplateError::TypeMismatch`] or [`TemplateError::OutOfRange`]
    /// when the resolved text does not coerce.
    pub fn render(
        &self,
        params: &ParameterSet,
        path: &FieldPath,
    ) -> Result<C::Output, TemplateError> {
        let text = self.token.resolve(params, path)?;
        C::coerce(&text).map_err(|err| err.at(path))
    }

    /// Coerces a literal value without parameters.
    ///
    /// Returns `None` for values that contain placeholders.
    #[must_use]
    pub fn check_literal(&self) -> Option<Result<C::Output, CoerceError>> {
        self.is_literal().then(|| C::coerce(self.token.raw()))
    }
}

impl<C: Coerce> FromStr for TemplateValue<C> {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<C> Clone for TemplateValue<C> {
    fn clone(&self) -> Self {
        Self {
            token: self.token.clone(),
            strategy: PhantomData,
        }
    }
}

impl<C> PartialEq for TemplateValue<C> {
    fn eq(&self, other: &Self) -> bool {
        self.token == other.token
    }
}

impl<C> Eq for TemplateValue<C> {}

impl<C> Hash for TemplateValue<C> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.token.hash(state);
    }
}

impl<C: Coerce> fmt::Debug for TemplateValue<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateValue")
            .field("type", &C::NAME)
            .field("raw", &self.token.raw())
            .field("kind", &self.token.kind())
            .finish()
    }
}

impl<C> Serialize for TemplateValue<C> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.token.raw())
    }
}

impl<'de, C: Coerce> Deserialize<'de> for TemplateValue<C> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ScalarVisitor(PhantomData))
    }
}

/// Accepts any YAML scalar and uses its text as the raw template.
struct ScalarVisitor<C>(PhantomData<fn() -> C>);

impl<C: Coerce> ScalarVisitor<C> {
    fn parse<E: de::Error>(raw: &str) -> Result<TemplateValue<C>, E> {
        TemplateValue::parse(raw)
            .map_err(|err| E::custom(format_args!("{MALFORMED_TEMPLATE_TAG}{err}")))
    }
}

impl<C: Coerce> Visitor<'_> for ScalarVisitor<C> {
    type Value = TemplateValue<C>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a {} value or a ${{parameter}} template", C::NAME)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Self::parse(v)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(TemplateValue::literal(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(TemplateValue::literal(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(TemplateValue::literal(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        if C::VERBATIM {
            return Err(E::custom(format_args!(
                "unquoted number {v:?} does not keep its exact text, quote the value"
            )));
        }
        // Debug keeps the fractional part, so `3.0` stays float-shaped.
        Ok(TemplateValue::literal(format!("{v:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn params(pairs: &[(&str, &str)]) -> ParameterSet {
        let mut set = ParameterSet::new();
        for (name, value) in pairs {
            set.insert(*name, *value).unwrap();
        }
        set
    }

    #[test]
    fn test_literal_renders_with_empty_parameters() {
        let empty = ParameterSet::new();
        let root = FieldPath::root();
        assert_eq!("3".parse::<UInt64OrTemplate>().unwrap().render(&empty, &root), Ok(3));
        assert_eq!("TRUE".parse::<BoolOrTemplate>().unwrap().render(&empty, &root), Ok(true));
        assert_eq!(
            "30s".parse::<DurationOrTemplate>().unwrap().render(&empty, &root),
            Ok(Duration::from_secs(30))
        );
        assert_eq!(
            "512m".parse::<UnitBytesOrTemplate>().unwrap().render(&empty, &root),
            Ok(536_870_912)
        );
    }

    #[test]
    fn test_placeholder_is_coerced_after_lookup() {
        let value: UInt64OrTemplate = "${replica_count}".parse().unwrap();
        let rendered = value.render(&params(&[("replica_count", "3")]), &FieldPath::root());
        assert_eq!(rendered, Ok(3));
    }

    #[test]
    fn test_missing_parameter() {
        let value: UInt64OrTemplate = "${replica_count}".parse().unwrap();
        let path = FieldPath::root().field("deploy").field("replicas");
        let err = value.render(&ParameterSet::new(), &path).unwrap_err();
        assert_eq!(
            err,
            TemplateError::UnresolvedParameter {
                name: String::from("replica_count"),
                path: String::from("deploy.replicas"),
            }
        );
    }

    #[test]
    fn test_bad_parameter_value_is_type_mismatch() {
        let value: BoolOrTemplate = "${tty}".parse().unwrap();
        let err = value.render(&params(&[("tty", "1")]), &FieldPath::root().field("tty")).unwrap_err();
        assert!(matches!(err, TemplateError::TypeMismatch { ref path, .. } if path == "tty"));
    }

    #[test]
    fn test_mixed_rejected_outside_text() {
        assert_eq!(
            "${size}m".parse::<UnitBytesOrTemplate>(),
            Err(TokenError::MixedNotAllowed { target: "byte size" })
        );
        assert!("prefix-${name}".parse::<StringTemplate>().is_ok());
    }

    #[test]
    fn test_parse_at_reports_path() {
        let err = StringTemplate::parse_at("${oops", &FieldPath::root().field("image")).unwrap_err();
        assert!(matches!(err, TemplateError::MalformedTemplate { ref path, .. } if path == "image"));
    }

    #[test]
    fn test_deserialize_any_scalar() {
        let replicas: UInt64OrTemplate = serde_yaml::from_str("3").unwrap();
        assert_eq!(replicas.raw(), "3");
        let tty: BoolOrTemplate = serde_yaml::from_str("true").unwrap();
        assert_eq!(tty.raw(), "true");
        let cpus: StringTemplate = serde_yaml::from_str("\"0.5\"").unwrap();
        assert_eq!(cpus.raw(), "0.5");
        let image: StringTemplate = serde_yaml::from_str("\"myapp:${tag}\"").unwrap();
        assert!(!image.is_literal());
    }

    #[test]
    fn test_unquoted_floats() {
        let replicas: UInt64OrTemplate = serde_yaml::from_str("3.0").unwrap();
        assert_eq!(replicas.raw(), "3.0");
        assert!(matches!(
            replicas.render(&ParameterSet::new(), &FieldPath::root()),
            Err(TemplateError::TypeMismatch { .. })
        ));
        let target: UInt64OrTemplate = serde_yaml::from_str("8e1").unwrap();
        assert_eq!(target.raw(), "80.0");

        let err = serde_yaml::from_str::<StringTemplate>("1.10").unwrap_err();
        assert!(err.to_string().contains("quote the value"));
        assert!(!err.to_string().contains(MALFORMED_TEMPLATE_TAG));
    }

    #[test]
    fn test_deserialize_malformed_is_tagged() {
        let err = serde_yaml::from_str::<StringTemplate>("\"${tag\"").unwrap_err();
        assert!(err.to_string().contains(MALFORMED_TEMPLATE_TAG));
    }

    #[test]
    fn test_check_literal() {
        let bad: UInt64OrTemplate = "-1".parse().unwrap();
        assert!(matches!(bad.check_literal(), Some(Err(_))));
        let templated: UInt64OrTemplate = "${n}".parse().unwrap();
        assert!(templated.check_literal().is_none());
    }
}
