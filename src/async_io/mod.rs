//! Async input loading
//!
//! File reads are blocking, so each table is loaded on tokio's blocking pool
//! and the three loads run concurrently.

pub mod loader;

pub use loader::{load_inputs, load_orders_async, read_table_async};
