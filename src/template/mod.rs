//! Templated values.
//!
//! This module holds the building blocks every stack field is made of:
//! - tokenizing raw text into literal and `${name}` placeholder segments
//! - typed wrappers that coerce resolved text to strings, booleans, integers,
//!   durations and byte sizes
//! - parameter sets, field paths and the render/visit traits

pub mod coerce;
mod params;
mod path;
mod render;
mod token;
mod value;
mod visit;

pub use coerce::Coerce;
pub use params::ParameterSet;
pub use path::FieldPath;
pub use render::Render;
pub use token::{is_valid_name, Segment, TemplateToken, TokenKind};
pub use value::{
    BoolOrTemplate, DurationOrTemplate, StringTemplate, TemplateValue, UInt64OrTemplate,
    UnitBytesOrTemplate,
};
pub(crate) use value::MALFORMED_TEMPLATE_TAG;
pub use visit::{FieldVisitor, TemplateField, Visit};
