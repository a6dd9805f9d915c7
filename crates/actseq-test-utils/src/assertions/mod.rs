//! Assertion helpers for validation findings.
//!
//! Helpers return a `Result` so a failing check reads as a proper error in
//! `anyhow`-based tests.

mod validation;

pub use validation::*;
