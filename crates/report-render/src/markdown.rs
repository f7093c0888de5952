//! Markdown rendering of the sales summary and issue log.

use std::path::{Path, PathBuf};

use report_core::error::Result;
use report_core::formatting::{format_count, format_currency, percentage};
use report_core::models::{BreakdownEntry, SalesSummary};
use report_data::analysis::PipelineResult;
use tracing::info;

// ── Public API ────────────────────────────────────────────────────────────────

/// Default report path next to the source file: `<stem>_sales_report.md`.
pub fn default_report_path(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "sales".to_string());
    source.with_file_name(format!("{}_sales_report.md", stem))
}

/// Render the full Markdown report.
pub fn render_report(result: &PipelineResult) -> String {
    let summary = &result.summary;
    let mut out = String::new();

    out.push_str("# Sales Data Analysis Report\n\n");
    if let Some((start, end)) = summary.totals.date_range {
        out.push_str(&format!("**Analysis period:** {} to {}\n\n", start, end));
    }
    out.push_str(&format!("**Generated:** {}\n\n", result.metadata.generated_at));

    render_overall_summary(&mut out, summary);
    render_insights(&mut out, summary);
    render_breakdown(&mut out, "Category Breakdown", "Category", &summary.by_category, summary);
    render_breakdown(&mut out, "Region Breakdown", "Region", &summary.by_region, summary);
    render_breakdown(
        &mut out,
        "Salesperson Performance",
        "Salesperson",
        &summary.by_salesperson,
        summary,
    );
    render_breakdown(
        &mut out,
        "Top Products",
        "Product",
        &summary.top_products,
        summary,
    );
    render_daily_trend(&mut out, summary);
    render_data_quality(&mut out, result);

    out
}

/// Write `content` to `path` and log the location.
pub fn write_report(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content)?;
    info!("Report written to {}", path.display());
    Ok(())
}

// ── Sections ──────────────────────────────────────────────────────────────────

fn render_overall_summary(out: &mut String, summary: &SalesSummary) {
    let totals = &summary.totals;
    out.push_str("## Overall Summary\n\n");
    out.push_str("| Metric | Value |\n");
    out.push_str("| --- | ---: |\n");
    out.push_str(&format!(
        "| Total revenue | {} |\n",
        format_currency(totals.total_revenue)
    ));
    out.push_str(&format!(
        "| Total quantity | {} |\n",
        format_count(totals.total_quantity)
    ));
    out.push_str(&format!(
        "| Order count | {} |\n",
        format_count(totals.order_count)
    ));
    out.push_str(&format!(
        "| Average order value | {} |\n",
        format_currency(totals.average_order_value)
    ));
    if let Some((start, end)) = totals.date_range {
        let days = (end - start).num_days() + 1;
        out.push_str(&format!("| Days covered | {} |\n", days));
    }
    out.push('\n');
}

fn render_insights(out: &mut String, summary: &SalesSummary) {
    let leaders = [
        ("Top category", summary.by_category.first()),
        ("Top region", summary.by_region.first()),
        ("Top salesperson", summary.by_salesperson.first()),
        ("Best-selling product", summary.top_products.first()),
    ];
    if leaders.iter().all(|(_, entry)| entry.is_none()) {
        return;
    }

    out.push_str("## Key Insights\n\n");
    for (title, entry) in leaders {
        if let Some(leader) = entry {
            out.push_str(&format!(
                "- {}: **{}** with {} in revenue\n",
                title,
                leader.label,
                format_currency(leader.stats.revenue)
            ));
        }
    }
    out.push('\n');
}

fn render_breakdown(
    out: &mut String,
    heading: &str,
    label_column: &str,
    entries: &[BreakdownEntry],
    summary: &SalesSummary,
) {
    out.push_str(&format!("## {}\n\n", heading));
    if entries.is_empty() {
        out.push_str("No data.\n\n");
        return;
    }

    out.push_str(&format!(
        "| {} | Revenue | Share | Avg order | Orders | Quantity |\n",
        label_column
    ));
    out.push_str("| --- | ---: | ---: | ---: | ---: | ---: |\n");
    for entry in entries {
        let share = percentage(entry.stats.revenue, summary.totals.total_revenue, 1);
        out.push_str(&format!(
            "| {} | {} | {:.1}% | {} | {} | {} |\n",
            entry.label,
            format_currency(entry.stats.revenue),
            share,
            format_currency(entry.stats.average_order_value()),
            format_count(entry.stats.orders),
            format_count(entry.stats.quantity),
        ));
    }
    out.push('\n');
}

fn render_daily_trend(out: &mut String, summary: &SalesSummary) {
    if summary.daily_trend.is_empty() {
        return;
    }

    out.push_str("## Daily Trend\n\n");
    out.push_str("| Date | Revenue | Quantity |\n");
    out.push_str("| --- | ---: | ---: |\n");
    for point in &summary.daily_trend {
        out.push_str(&format!(
            "| {} | {} | {} |\n",
            point.date,
            format_currency(point.revenue),
            format_count(point.quantity),
        ));
    }
    out.push('\n');
}

fn render_data_quality(out: &mut String, result: &PipelineResult) {
    out.push_str("## Data Quality\n\n");
    out.push_str(&format!(
        "{} of {} rows kept ({} dropped, {} repaired).\n\n",
        format_count(result.metadata.rows_cleaned),
        format_count(result.metadata.rows_read),
        format_count(result.metadata.rows_dropped),
        format_count(result.metadata.rows_repaired),
    ));

    if result.issues.is_empty() {
        out.push_str("No issues found.\n");
        return;
    }

    for issue in &result.issues {
        let action = if issue.is_dropped() { "dropped" } else { "repaired" };
        out.push_str(&format!(
            "- Row {}: {} ({}, {})\n",
            issue.row,
            issue.reason.describe(),
            issue.detail,
            action,
        ));
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
