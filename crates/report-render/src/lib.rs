//! Report rendering for the sales report pipeline.
//!
//! Turns a [`PipelineResult`](report_data::analysis::PipelineResult) into a
//! Markdown document.

pub mod markdown;
