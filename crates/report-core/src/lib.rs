//! Core domain layer for the sales report pipeline.
//!
//! Holds the cleaned record and summary models, the error taxonomy, the CLI
//! settings surface and shared formatting helpers. This crate performs no
//! file or network I/O of its own.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
