//! Data layer for the sales report pipeline.
//!
//! Responsible for reading and cleaning the raw CSV rows, aggregating the
//! cleaned table into a summary, and running the top-level pipeline.

pub mod aggregator;
pub mod analysis;
pub mod loader;

pub use report_core as core;
