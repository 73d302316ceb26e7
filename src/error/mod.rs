//! Error handling module
//!
//! Defines the override engine's error taxonomy with CLI exit codes

pub mod types;

pub use types::*;
