// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # Halldyll Stack
//!
//! Typed, parameterized deployment stacks: parse, validate and render
//! templated service specifications.
//!
//! ## Overview
//!
//! A stack describes services, secrets and config objects. Any scalar field
//! may hold a literal or a `${name}` placeholder expression. Rendering a stack
//! against a parameter set produces a fully concrete stack, or fails with the
//! field path of the first value that could not be resolved or coerced.
//!
//! ## Architecture
//!
//! 1. **Templates**: every field is a typed template value (string, boolean,
//!    unsigned integer, duration, byte size)
//! 2. **Stack**: the templated document with its identity and status
//! 3. **Render pass**: substitutes parameters and coerces every field, in
//!    declaration order
//!
//! ## Modules
//!
//! - [`template`]: Tokens, typed template values, parameter sets
//! - [`stack`]: Stack model, render pass and snapshots
//! - [`config`]: Document parsing, parameter loading, validation, fingerprints
//! - [`cli`]: Command-line interface
//!
//! ## Example
//!
//! ```yaml
//! apiVersion: compose.docker.com/v1beta2
//! kind: Stack
//! metadata:
//!   name: shop
//! spec:
//!   services:
//!     - name: api
//!       image: "shop/api:${tag}"
//!       deploy:
//!         replicas: "${replicas}"
//!         resources:
//!           limits:
//!             memory: 512m
//!       ports:
//!         - target: 8080
//!           published: "${port}"
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod cli;
pub mod config;
pub mod error;
pub mod stack;
pub mod template;

// ============================================================================
// Re-exports
// ============================================================================

pub use cli::{Cli, Commands, OutputFormatter};
pub use config::{StackHasher, StackParser, StackValidator};
pub use error::{Result, StackError};
pub use stack::{RenderedStack, Stack, StackSnapshot, StackSpec};
pub use template::{ParameterSet, TemplateValue};
