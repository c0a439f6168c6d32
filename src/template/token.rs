//! Template tokens: the parsed form of one field's raw text.
//!
//! A placeholder is written `${name}` where `name` matches `[A-Za-z0-9_.-]+`.
//! A `$` that is not followed by `{` is ordinary text; there is no escape
//! sequence.

use std::borrow::Cow;

use crate::error::{TemplateError, TokenError};

use super::params::ParameterSet;
use super::path::FieldPath;

/// Classification of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// No placeholder; the raw text is the value.
    Literal,
    /// The whole text is exactly one placeholder.
    Placeholder,
    /// Any other combination containing at least one placeholder.
    Mixed,
}

/// One piece of a token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Literal text, kept verbatim.
    Text(String),
    /// A reference to a named parameter.
    Placeholder(String),
}

/// Parsed representation of a raw field value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TemplateToken {
    raw: String,
    kind: TokenKind,
    segments: Vec<Segment>,
}

impl TemplateToken {
    /// Parses raw text into a token.
    ///
    /// # Errors
    ///
    /// Returns an error for an unterminated `${`, an empty name or a name with
    /// characters outside the identifier grammar.
    pub fn parse(raw: &str) -> Result<Self, TokenError> {
        let mut segments = Vec::new();
        let mut text_start = 0;
        let mut cursor = 0;

        while let Some(found) = raw[cursor..].find("${") {
            let open = cursor + found;
            let name_start = open + 2;
            let Some(len) = raw[name_start..].find('}') else {
                return Err(TokenError::Unterminated { offset: open });
            };
            let name = &raw[name_start..name_start + len];
            if name.is_empty() {
                return Err(TokenError::EmptyName { offset: open });
            }
            if !is_valid_name(name) {
                return Err(TokenError::InvalidName {
                    name: name.to_string(),
                });
            }

            if open > text_start {
                segments.push(Segment::Text(raw[text_start..open].to_string()));
            }
            segments.push(Segment::Placeholder(name.to_string()));

            cursor = name_start + len + 1;
            text_start = cursor;
        }

        if segments.is_empty() {
            return Ok(Self::literal(raw));
        }
        if text_start < raw.len() {
            segments.push(Segment::Text(raw[text_start..].to_string()));
        }

        let kind = match segments.as_slice() {
            [Segment::Placeholder(_)] => TokenKind::Placeholder,
            _ => TokenKind::Mixed,
        };

        Ok(Self {
            raw: raw.to_string(),
            kind,
            segments,
        })
    }

    /// Creates a literal token without scanning for placeholders.
    #[must_use]
    pub fn literal(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        Self {
            segments: vec![Segment::Text(raw.clone())],
            raw,
            kind: TokenKind::Literal,
        }
    }

    /// Returns the original text.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Returns the token classification.
    #[must_use]
    pub const fn kind(&self) -> TokenKind {
        self.kind
    }

    /// Returns true if the token contains no placeholder.
    #[must_use]
    pub fn is_literal(&self) -> bool {
        self.kind == TokenKind::Literal
    }

    /// Returns the segments in order.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns referenced parameter names in order of appearance.
    pub fn placeholder_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Placeholder(name) => Some(name.as_str()),
            Segment::Text(_) => None,
        })
    }

    /// Resolves the token to text against a parameter set.
    ///
    /// Literal tokens borrow their raw text, a single placeholder borrows the
    /// parameter value and mixed tokens are substituted left to right.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::UnresolvedParameter`] for the first missing name.
    pub fn resolve<'a>(
        &'a self,
        params: &'a ParameterSet,
        path: &FieldPath,
    ) -> Result<Cow<'a, str>, TemplateError> {
        match (self.kind, self.segments.as_slice()) {
            (TokenKind::Literal, _) => Ok(Cow::Borrowed(self.raw.as_str())),
            (TokenKind::Placeholder, [Segment::Placeholder(name)]) => {
                lookup(params, name, path).map(Cow::Borrowed)
            }
            _ => {
                let mut out = String::with_capacity(self.raw.len());
                for segment in &self.segments {
                    match segment {
                        Segment::Text(text) => out.push_str(text),
                        Segment::Placeholder(name) => out.push_str(lookup(params, name, path)?),
                    }
                }
                Ok(Cow::Owned(out))
            }
        }
    }
}

fn lookup<'a>(
    params: &'a ParameterSet,
    name: &str,
    path: &FieldPath,
) -> Result<&'a str, TemplateError> {
    params
        .get(name)
        .ok_or_else(|| TemplateError::UnresolvedParameter {
            name: name.to_string(),
            path: path.into(),
        })
}

/// Returns true if `name` matches the placeholder identifier grammar.
#[must_use]
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}
