//! Schema validation for effective configurations
//!
//! Checks a value against a JSON-Schema-like document and reports every
//! non-conformance as a [`Violation`] instead of failing fast.

pub mod validator;
pub mod violation;

pub use validator::validate;
pub use violation::Violation;
