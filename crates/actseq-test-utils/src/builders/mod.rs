//! Document fixtures.
//!
//! Builders return the document together with views of the statements a
//! test usually wants to poke at.

mod customer_report;

pub use customer_report::*;
