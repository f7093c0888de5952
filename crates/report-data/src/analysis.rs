//! Top-level pipeline: load and clean the source, then aggregate.
//!
//! One invocation owns its table and summary exclusively; nothing is shared
//! or persisted across runs, so rerunning over the same input is safe and
//! produces an identical result.

use chrono::Utc;
use report_core::error::Result;
use report_core::models::{Issue, SalesSummary};
use report_core::settings::PipelineConfig;
use tracing::info;

use crate::aggregator::SalesAggregator;
use crate::loader::load_records;

// ── Public types ──────────────────────────────────────────────────────────────

/// Metadata produced alongside the summary.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RunMetadata {
    /// ISO-8601 timestamp when this result was generated.
    pub generated_at: String,
    /// Number of data rows read from the source.
    pub rows_read: u64,
    /// Rows surviving cleaning (repaired rows included).
    pub rows_cleaned: u64,
    /// Rows excluded from the cleaned table.
    pub rows_dropped: u64,
    /// Rows kept with a corrected revenue.
    pub rows_repaired: u64,
    /// Wall-clock seconds spent loading and cleaning.
    pub load_time_seconds: f64,
    /// Wall-clock seconds spent aggregating.
    pub aggregate_time_seconds: f64,
}

/// The complete output of [`run_pipeline`].
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PipelineResult {
    /// The aggregate view consumed by the report renderer.
    pub summary: SalesSummary,
    /// Data-quality issues found during cleaning, in discovery order.
    pub issues: Vec<Issue>,
    /// Metadata about this run.
    pub metadata: RunMetadata,
}

// ── Public function ───────────────────────────────────────────────────────────

/// Run the full pipeline.
///
/// 1. Load and clean the rows from `config.source`.
/// 2. Aggregate the cleaned table into a [`SalesSummary`].
/// 3. Return summary, issue log and run metadata.
///
/// Row-level problems never abort the run; only a structural read failure or
/// an entirely unrecognized schema is propagated as an error.
pub fn run_pipeline(config: &PipelineConfig) -> Result<PipelineResult> {
    // ── Step 1: Load and clean ────────────────────────────────────────────────
    let load_start = std::time::Instant::now();
    let outcome = load_records(config)?;
    let load_time = load_start.elapsed().as_secs_f64();

    info!(
        "Cleaned {}: {} of {} rows kept, {} issues",
        config.source.display(),
        outcome.records.len(),
        outcome.rows_read,
        outcome.issues.len()
    );

    // ── Step 2: Aggregate ─────────────────────────────────────────────────────
    let aggregate_start = std::time::Instant::now();
    let summary = SalesAggregator::aggregate(&outcome.records, config.top_n);
    let aggregate_time = aggregate_start.elapsed().as_secs_f64();

    // ── Step 3: Build result ──────────────────────────────────────────────────
    let metadata = RunMetadata {
        generated_at: Utc::now().to_rfc3339(),
        rows_read: outcome.rows_read,
        rows_cleaned: outcome.records.len() as u64,
        rows_dropped: outcome.dropped_count(),
        rows_repaired: outcome.repaired_count(),
        load_time_seconds: load_time,
        aggregate_time_seconds: aggregate_time,
    };

    Ok(PipelineResult {
        summary,
        issues: outcome.issues,
        metadata,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use report_core::error::ReportError;
    use report_core::models::IssueReason;
    use std::io::Write;
    use tempfile::TempDir;

    const HEADER: &str = "date,category,region,salesperson,product,quantity,unit_price,revenue";

    fn write_csv(dir: &std::path::Path, name: &str, lines: &[&str]) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        path
    }

    // ── run_pipeline ──────────────────────────────────────────────────────────

    #[test]
    fn test_pipeline_bad_date_scenario() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            dir.path(),
            "sales.csv",
            &[
                HEADER,
                "2024-01-05,A,East,Kim,Widget,2,10.0,",
                "bad-date,A,East,Kim,Widget,1,5.0,",
            ],
        );

        let result = run_pipeline(&PipelineConfig::new(path)).unwrap();

        assert_eq!(result.metadata.rows_cleaned, 1);
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].reason, IssueReason::InvalidDate);
        assert!((result.summary.totals.total_revenue - 20.0).abs() < 1e-9);
        assert_eq!(result.summary.totals.total_quantity, 2);
        assert_eq!(result.summary.totals.order_count, 1);
    }

    #[test]
    fn test_pipeline_empty_data_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(dir.path(), "empty.csv", &[HEADER]);

        let result = run_pipeline(&PipelineConfig::new(path)).unwrap();

        assert_eq!(result.summary.totals.order_count, 0);
        assert_eq!(result.summary.totals.average_order_value, 0.0);
        assert!(result.summary.by_category.is_empty());
        assert!(result.summary.top_products.is_empty());
        assert!(result.issues.is_empty());
    }

    #[test]
    fn test_pipeline_totals_match_surviving_rows() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            dir.path(),
            "sales.csv",
            &[
                HEADER,
                "2024-01-05,A,East,Kim,Widget,2,10.0,",
                "2024-01-06,B,West,Lee,Gadget,3,4.0,99.0", // repaired to 12.0
                "oops,A,East,Kim,Widget,1,1.0,",           // dropped
            ],
        );

        let result = run_pipeline(&PipelineConfig::new(path)).unwrap();

        // 20.0 + 12.0 from the two surviving rows, nothing double counted.
        assert!((result.summary.totals.total_revenue - 32.0).abs() < 1e-9);
        assert_eq!(result.summary.totals.total_quantity, 5);
        assert_eq!(result.metadata.rows_repaired, 1);
        assert_eq!(result.metadata.rows_dropped, 1);
        assert_eq!(
            result.metadata.rows_cleaned + result.metadata.rows_dropped,
            result.metadata.rows_read
        );
    }

    #[test]
    fn test_pipeline_rerun_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            dir.path(),
            "sales.csv",
            &[
                HEADER,
                "2024-01-05,A,East,Kim,Widget,2,10.0,",
                "2024-01-06,B,West,Lee,Gadget,1,50.0,",
            ],
        );
        let config = PipelineConfig::new(path);

        let first = run_pipeline(&config).unwrap();
        let second = run_pipeline(&config).unwrap();

        let first_json = serde_json::to_string(&first.summary).unwrap();
        let second_json = serde_json::to_string(&second.summary).unwrap();
        assert_eq!(first_json, second_json);
        assert_eq!(first.issues, second.issues);
    }

    #[test]
    fn test_pipeline_missing_source_is_fatal() {
        let config = PipelineConfig::new("/tmp/no-such-sales-file.csv");
        let err = run_pipeline(&config).unwrap_err();
        assert!(matches!(err, ReportError::SourceRead { .. }));
    }

    #[test]
    fn test_pipeline_metadata_populated() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            dir.path(),
            "sales.csv",
            &[HEADER, "2024-01-05,A,East,Kim,Widget,2,10.0,"],
        );

        let result = run_pipeline(&PipelineConfig::new(path)).unwrap();

        assert!(!result.metadata.generated_at.is_empty());
        assert_eq!(result.metadata.rows_read, 1);
        assert!(result.metadata.load_time_seconds >= 0.0);
        assert!(result.metadata.aggregate_time_seconds >= 0.0);
    }

    #[test]
    fn test_pipeline_top_n_from_config() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            dir.path(),
            "sales.csv",
            &[
                HEADER,
                "2024-01-05,A,East,Kim,P1,1,10.0,",
                "2024-01-05,A,East,Kim,P2,1,20.0,",
                "2024-01-05,A,East,Kim,P3,1,30.0,",
            ],
        );
        let mut config = PipelineConfig::new(path);
        config.top_n = 2;

        let result = run_pipeline(&config).unwrap();
        assert_eq!(result.summary.top_products.len(), 2);
        assert_eq!(result.summary.top_products[0].label, "P3");
    }
}
