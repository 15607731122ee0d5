//! Test utilities
//!
//! Fixtures and helpers shared by unit and integration tests.

pub mod helpers;

pub use fixtures::{order, reviews_batch, sales_batch, visitor_model};
pub use helpers::{datetime, write_text};
