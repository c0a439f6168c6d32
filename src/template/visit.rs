//! Read-only walks over every template value of a structure.

use std::collections::BTreeMap;

use crate::error::CoerceError;

use super::coerce::Coerce;
use super::path::FieldPath;
use super::token::TemplateToken;
use super::value::TemplateValue;

/// Type-erased view of one templated field.
pub trait TemplateField {
    /// The parsed token.
    fn token(&self) -> &TemplateToken;

    /// Name of the target type.
    fn target(&self) -> &'static str;

    /// Coerces a literal value, discarding the result.
    ///
    /// Returns `None` for values that contain placeholders.
    fn check_literal(&self) -> Option<Result<(), CoerceError>>;
}

impl<C: Coerce> TemplateField for TemplateValue<C> {
    fn token(&self) -> &TemplateToken {
        Self::token(self)
    }

    fn target(&self) -> &'static str {
        C::NAME
    }

    fn check_literal(&self) -> Option<Result<(), CoerceError>> {
        Self::check_literal(self).map(|result| result.map(|_| ()))
    }
}

/// Callback receiving each templated field with its path.
pub type FieldVisitor<'a> = dyn FnMut(&FieldPath, &dyn TemplateField) + 'a;

/// Structures whose templated fields can be enumerated.
///
/// The walk order is the same as the render order.
pub trait Visit {
    /// Calls `visitor` for every templated field under `path`.
    fn visit(&self, path: &FieldPath, visitor: &mut FieldVisitor<'_>);
}

impl<C: Coerce> Visit for TemplateValue<C> {
    fn visit(&self, path: &FieldPath, visitor: &mut FieldVisitor<'_>) {
        visitor(path, self);
    }
}

impl<T: Visit> Visit for Option<T> {
    fn visit(&self, path: &FieldPath, visitor: &mut FieldVisitor<'_>) {
        if let Some(inner) = self {
            inner.visit(path, visitor);
        }
    }
}

impl<T: Visit> Visit for Vec<T> {
    fn visit(&self, path: &FieldPath, visitor: &mut FieldVisitor<'_>) {
        for (i, item) in self.iter().enumerate() {
            item.visit(&path.index(i), visitor);
        }
    }
}

impl<T: Visit> Visit for BTreeMap<String, T> {
    fn visit(&self, path: &FieldPath, visitor: &mut FieldVisitor<'_>) {
        for (key, value) in self {
            value.visit(&path.key(key), visitor);
        }
    }
}
