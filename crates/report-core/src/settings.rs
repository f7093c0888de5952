use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ReportError, Result};

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Sales data analysis and report generation
#[derive(Parser, Debug, Clone)]
#[command(
    name = "sales-report",
    about = "Aggregate tabular sales records and render a summary report",
    version
)]
pub struct Settings {
    /// Path to the sales CSV file
    pub source: PathBuf,

    /// Number of products in the top-N ranking
    #[arg(long, default_value = "10")]
    pub top_n: usize,

    /// Field delimiter (single ASCII character)
    #[arg(long, default_value = ",")]
    pub delimiter: String,

    /// Accepted date format (strftime pattern, may be repeated)
    #[arg(long = "date-format")]
    pub date_formats: Vec<String>,

    /// Override the date column name
    #[arg(long)]
    pub date_column: Option<String>,

    /// Override the category column name
    #[arg(long)]
    pub category_column: Option<String>,

    /// Override the region column name
    #[arg(long)]
    pub region_column: Option<String>,

    /// Override the salesperson column name
    #[arg(long)]
    pub salesperson_column: Option<String>,

    /// Override the product column name
    #[arg(long)]
    pub product_column: Option<String>,

    /// Override the quantity column name
    #[arg(long)]
    pub quantity_column: Option<String>,

    /// Override the unit price column name
    #[arg(long)]
    pub unit_price_column: Option<String>,

    /// Override the revenue column name
    #[arg(long)]
    pub revenue_column: Option<String>,

    /// Report output path (default: next to the source file)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Also write the summary and issue log as JSON
    #[arg(long)]
    pub json: bool,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

// ── Record fields ──────────────────────────────────────────────────────────────

/// The fields a cleaned record must carry, in schema order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordField {
    Date,
    Category,
    Region,
    Salesperson,
    Product,
    Quantity,
    UnitPrice,
    Revenue,
}

impl RecordField {
    /// Every field, required ones first. `Revenue` is optional in the source.
    pub const ALL: [RecordField; 8] = [
        RecordField::Date,
        RecordField::Category,
        RecordField::Region,
        RecordField::Salesperson,
        RecordField::Product,
        RecordField::Quantity,
        RecordField::UnitPrice,
        RecordField::Revenue,
    ];

    /// Whether a row missing this field must be dropped.
    pub fn is_required(&self) -> bool {
        !matches!(self, RecordField::Revenue)
    }

    /// Canonical field name used in issue details and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            RecordField::Date => "date",
            RecordField::Category => "category",
            RecordField::Region => "region",
            RecordField::Salesperson => "salesperson",
            RecordField::Product => "product",
            RecordField::Quantity => "quantity",
            RecordField::UnitPrice => "unit_price",
            RecordField::Revenue => "revenue",
        }
    }

    /// Default header spellings accepted for this field, in normalized form
    /// (lowercase, separators removed). Sources in the wild use both
    /// `unit_price` and `UnitPrice`, and revenue columns are often called
    /// `TotalPrice`.
    fn default_candidates(&self) -> &'static [&'static str] {
        match self {
            RecordField::Date => &["date"],
            RecordField::Category => &["category"],
            RecordField::Region => &["region"],
            RecordField::Salesperson => &["salesperson"],
            RecordField::Product => &["product", "productname"],
            RecordField::Quantity => &["quantity"],
            RecordField::UnitPrice => &["unitprice"],
            RecordField::Revenue => &["revenue", "totalprice"],
        }
    }
}

// ── ColumnMap ──────────────────────────────────────────────────────────────────

/// Maps record fields to source column names.
///
/// Header matching is case-insensitive and ignores `_`, `-` and spaces, so a
/// `UnitPrice` header satisfies the default `unit_price` mapping. An explicit
/// override replaces the default candidate list for that field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnMap {
    pub date: Option<String>,
    pub category: Option<String>,
    pub region: Option<String>,
    pub salesperson: Option<String>,
    pub product: Option<String>,
    pub quantity: Option<String>,
    pub unit_price: Option<String>,
    pub revenue: Option<String>,
}

/// Normalize a header name for comparison: lowercase with separators removed.
pub fn normalize_header(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(|c| c.to_lowercase())
        .collect()
}

impl ColumnMap {
    fn override_for(&self, field: RecordField) -> Option<&String> {
        match field {
            RecordField::Date => self.date.as_ref(),
            RecordField::Category => self.category.as_ref(),
            RecordField::Region => self.region.as_ref(),
            RecordField::Salesperson => self.salesperson.as_ref(),
            RecordField::Product => self.product.as_ref(),
            RecordField::Quantity => self.quantity.as_ref(),
            RecordField::UnitPrice => self.unit_price.as_ref(),
            RecordField::Revenue => self.revenue.as_ref(),
        }
    }

    /// Returns `true` when `header` names `field` under this mapping.
    pub fn matches(&self, field: RecordField, header: &str) -> bool {
        let normalized = normalize_header(header);
        match self.override_for(field) {
            Some(name) => normalize_header(name) == normalized,
            None => field
                .default_candidates()
                .iter()
                .any(|candidate| *candidate == normalized),
        }
    }
}

// ── PipelineConfig ─────────────────────────────────────────────────────────────

/// Default strftime patterns tried when parsing dates.
pub const DEFAULT_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y", "%Y/%m/%d"];

/// Default size of the top-N product ranking.
pub const DEFAULT_TOP_N: usize = 10;

/// Everything the pipeline needs for one run, resolved and validated.
///
/// Built from [`Settings`] at startup and passed by reference; the pipeline
/// keeps no global state.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Path to the source CSV file.
    pub source: PathBuf,
    /// Size of the top-N product ranking.
    pub top_n: usize,
    /// CSV field delimiter.
    pub delimiter: u8,
    /// Candidate strftime patterns for date parsing, tried in order.
    pub date_formats: Vec<String>,
    /// Column-name overrides.
    pub columns: ColumnMap,
}

impl PipelineConfig {
    /// Build a config for `source` with all defaults.
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            top_n: DEFAULT_TOP_N,
            delimiter: b',',
            date_formats: DEFAULT_DATE_FORMATS.iter().map(|s| s.to_string()).collect(),
            columns: ColumnMap::default(),
        }
    }
}

impl TryFrom<&Settings> for PipelineConfig {
    type Error = ReportError;

    fn try_from(settings: &Settings) -> Result<Self> {
        if settings.top_n == 0 {
            return Err(ReportError::Config("top-n must be at least 1".to_string()));
        }

        let delimiter = match settings.delimiter.as_bytes() {
            [b] => *b,
            _ => {
                return Err(ReportError::Config(format!(
                    "delimiter must be a single ASCII character, got {:?}",
                    settings.delimiter
                )))
            }
        };

        let date_formats = if settings.date_formats.is_empty() {
            DEFAULT_DATE_FORMATS.iter().map(|s| s.to_string()).collect()
        } else {
            settings.date_formats.clone()
        };

        Ok(PipelineConfig {
            source: settings.source.clone(),
            top_n: settings.top_n,
            delimiter,
            date_formats,
            columns: ColumnMap {
                date: settings.date_column.clone(),
                category: settings.category_column.clone(),
                region: settings.region_column.clone(),
                salesperson: settings.salesperson_column.clone(),
                product: settings.product_column.clone(),
                quantity: settings.quantity_column.clone(),
                unit_price: settings.unit_price_column.clone(),
                revenue: settings.revenue_column.clone(),
            },
        })
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
