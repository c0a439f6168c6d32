//! The render trait and its implementations for templates and collections.

use std::collections::BTreeMap;

use crate::error::TemplateError;

use super::coerce::Coerce;
use super::params::ParameterSet;
use super::path::FieldPath;
use super::value::TemplateValue;

/// Resolution of a templated structure into its concrete counterpart.
///
/// Implementations walk their fields in declaration order and stop at the
/// first error, so a failed pass always reports the same field.
pub trait Render {
    /// The concrete type produced.
    type Output;

    /// Renders `self` against `params`; `path` is the location of `self`.
    ///
    /// # Errors
    ///
    /// Returns the first [`TemplateError`] met during the walk.
    fn render(
        &self,
        params: &ParameterSet,
        path: &FieldPath,
    ) -> Result<Self::Output, TemplateError>;
}

impl<C: Coerce> Render for TemplateValue<C> {
    type Output = C::Output;

    fn render(
        &self,
        params: &ParameterSet,
        path: &FieldPath,
    ) -> Result<Self::Output, TemplateError> {
        Self::render(self, params, path)
    }
}

impl<T: Render> Render for Option<T> {
    type Output = Option<T::Output>;

    fn render(
        &self,
        params: &ParameterSet,
        path: &FieldPath,
    ) -> Result<Self::Output, TemplateError> {
        self.as_ref().map(|inner| inner.render(params, path)).transpose()
    }
}

impl<T: Render> Render for Vec<T> {
    type Output = Vec<T::Output>;

    fn render(
        &self,
        params: &ParameterSet,
        path: &FieldPath,
    ) -> Result<Self::Output, TemplateError> {
        self.iter()
            .enumerate()
            .map(|(i, item)| item.render(params, &path.index(i)))
            .collect()
    }
}

impl<T: Render> Render for BTreeMap<String, T> {
    type Output = BTreeMap<String, T::Output>;

    fn render(
        &self,
        params: &ParameterSet,
        path: &FieldPath,
    ) -> Result<Self::Output, TemplateError> {
        self.iter()
            .map(|(key, value)| Ok((key.clone(), value.render(params, &path.key(key))?)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{StringTemplate, UInt64OrTemplate};

    #[test]
    fn test_vec_stops_at_first_error() {
        let values: Vec<UInt64OrTemplate> = vec![
            "1".parse().unwrap(),
            "${missing}".parse().unwrap(),
            "oops".parse().unwrap(),
        ];
        let err = values
            .render(&ParameterSet::new(), &FieldPath::root().field("retries"))
            .unwrap_err();
        assert_eq!(err.path(), "retries[1]");
    }

    #[test]
    fn test_map_walks_in_key_order() {
        let mut labels: BTreeMap<String, StringTemplate> = BTreeMap::new();
        labels.insert(String::from("b"), "${second}".parse().unwrap());
        labels.insert(String::from("a"), "${first}".parse().unwrap());
        let err = labels
            .render(&ParameterSet::new(), &FieldPath::root().field("labels"))
            .unwrap_err();
        assert_eq!(
            err,
            TemplateError::UnresolvedParameter {
                name: String::from("first"),
                path: String::from("labels[a]"),
            }
        );
    }

    #[test]
    fn test_absent_option_stays_absent() {
        let value: Option<UInt64OrTemplate> = None;
        assert_eq!(value.render(&ParameterSet::new(), &FieldPath::root()), Ok(None));
    }
}
