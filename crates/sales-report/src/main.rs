mod bootstrap;

use anyhow::Result;
use clap::Parser;
use report_core::settings::{PipelineConfig, Settings};
use report_data::analysis::run_pipeline;
use report_render::markdown;

fn main() -> Result<()> {
    let mut settings = Settings::parse();
    if settings.debug {
        settings.log_level = "DEBUG".to_string();
    }
    bootstrap::setup_logging(&settings.log_level)?;

    tracing::info!("sales-report v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Source: {}, top-N: {}",
        settings.source.display(),
        settings.top_n
    );

    let config = PipelineConfig::try_from(&settings)?;
    let result = run_pipeline(&config)?;

    tracing::info!(
        "Summary: {} orders, {} revenue, {} issues",
        result.summary.totals.order_count,
        report_core::formatting::format_currency(result.summary.totals.total_revenue),
        result.issues.len()
    );

    let report_path = settings
        .output
        .clone()
        .unwrap_or_else(|| markdown::default_report_path(&config.source));
    let document = markdown::render_report(&result);
    markdown::write_report(&report_path, &document)?;

    if settings.json {
        let json_path = report_path.with_extension("json");
        std::fs::write(&json_path, serde_json::to_string_pretty(&result)?)?;
        tracing::info!("JSON artifact written to {}", json_path.display());
    }

    // The report path on stdout is the contract with downstream delivery
    // tooling (mailers, schedulers).
    println!("{}", report_path.display());

    Ok(())
}
