//! CSV loading and cleaning.
//!
//! Reads raw sales rows from a delimited file, validates and normalizes each
//! one, and emits a cleaned table together with an ordered issue log. A bad
//! row is never fatal; only a failure to read the source itself or a header
//! row with no recognizable column aborts the run.

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use report_core::error::{ReportError, Result};
use report_core::models::{Issue, IssueAction, IssueReason, SalesRecord};
use report_core::settings::{ColumnMap, PipelineConfig, RecordField};
use tracing::{debug, warn};

// ── Public types ──────────────────────────────────────────────────────────────

/// Maximum accepted gap between a supplied revenue value and
/// `quantity * unit_price` before the row is repaired. One cent.
pub const REVENUE_TOLERANCE: f64 = 0.01;

/// The result of one load-and-clean pass over the source.
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    /// Cleaned rows, in source order.
    pub records: Vec<SalesRecord>,
    /// Issues found, in discovery order.
    pub issues: Vec<Issue>,
    /// Number of data rows read from the source (header excluded).
    pub rows_read: u64,
}

impl LoadOutcome {
    /// Number of rows excluded from the cleaned table.
    ///
    /// Always satisfies `records.len() + dropped_count() == rows_read`.
    pub fn dropped_count(&self) -> u64 {
        self.issues.iter().filter(|i| i.is_dropped()).count() as u64
    }

    /// Number of rows kept with a corrected value.
    pub fn repaired_count(&self) -> u64 {
        self.issues.iter().filter(|i| !i.is_dropped()).count() as u64
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Read `config.source` and produce the cleaned table plus issue log.
///
/// Validation rules are applied per row in a fixed order; the first failing
/// rule determines the disposition:
/// 1. required cell absent, or an empty date / quantity / unit price → drop;
/// 2. date matching no accepted format → drop;
/// 3. non-numeric or negative quantity / unit price → drop;
/// 4. supplied revenue off by more than [`REVENUE_TOLERANCE`] → repair with
///    the computed value;
/// 5. label empty after trimming → drop.
pub fn load_records(config: &PipelineConfig) -> Result<LoadOutcome> {
    let file = std::fs::File::open(&config.source).map_err(|e| ReportError::SourceRead {
        path: config.source.clone(),
        source: e,
    })?;

    let mut reader = ReaderBuilder::new()
        .delimiter(config.delimiter)
        .flexible(true)
        .from_reader(file);

    let headers = reader.headers()?.clone();
    let columns = ColumnIndexes::resolve(&headers, &config.columns);
    if columns.matched_count() == 0 {
        return Err(ReportError::SchemaUnrecognized {
            path: config.source.clone(),
            headers: headers.iter().collect::<Vec<_>>().join(", "),
        });
    }

    let mut records: Vec<SalesRecord> = Vec::new();
    let mut issues: Vec<Issue> = Vec::new();
    let mut rows_read = 0u64;

    for row_result in reader.records() {
        // A mid-stream decode failure is a structural read error, not a bad
        // row, and aborts the run.
        let raw = row_result?;
        rows_read += 1;

        match clean_row(&raw, rows_read, &columns, &config.date_formats) {
            Ok((record, repair)) => {
                if let Some(issue) = repair {
                    warn!(
                        "Row {}: {} ({})",
                        issue.row,
                        issue.reason.describe(),
                        issue.detail
                    );
                    issues.push(issue);
                }
                records.push(record);
            }
            Err(issue) => {
                warn!(
                    "Row {} dropped: {} ({})",
                    issue.row,
                    issue.reason.describe(),
                    issue.detail
                );
                issues.push(issue);
            }
        }
    }

    debug!(
        "Loaded {}: {} rows read, {} cleaned, {} dropped, {} repaired",
        config.source.display(),
        rows_read,
        records.len(),
        issues.iter().filter(|i| i.is_dropped()).count(),
        issues.iter().filter(|i| !i.is_dropped()).count(),
    );

    Ok(LoadOutcome {
        records,
        issues,
        rows_read,
    })
}

/// Try each configured strftime pattern in order; first match wins.
pub fn parse_date(value: &str, formats: &[String]) -> Option<NaiveDate> {
    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}

// ── Column resolution ─────────────────────────────────────────────────────────

/// Positions of the schema fields within the source header row.
#[derive(Debug, Clone, Default)]
struct ColumnIndexes {
    date: Option<usize>,
    category: Option<usize>,
    region: Option<usize>,
    salesperson: Option<usize>,
    product: Option<usize>,
    quantity: Option<usize>,
    unit_price: Option<usize>,
    revenue: Option<usize>,
}

impl ColumnIndexes {
    /// Match every expected field against the header row. The first matching
    /// header wins for each field.
    fn resolve(headers: &StringRecord, map: &ColumnMap) -> Self {
        let mut indexes = ColumnIndexes::default();
        for field in RecordField::ALL {
            let found = headers
                .iter()
                .position(|header| map.matches(field, header.trim()));
            *indexes.slot_mut(field) = found;
        }
        indexes
    }

    fn slot_mut(&mut self, field: RecordField) -> &mut Option<usize> {
        match field {
            RecordField::Date => &mut self.date,
            RecordField::Category => &mut self.category,
            RecordField::Region => &mut self.region,
            RecordField::Salesperson => &mut self.salesperson,
            RecordField::Product => &mut self.product,
            RecordField::Quantity => &mut self.quantity,
            RecordField::UnitPrice => &mut self.unit_price,
            RecordField::Revenue => &mut self.revenue,
        }
    }

    fn slot(&self, field: RecordField) -> Option<usize> {
        match field {
            RecordField::Date => self.date,
            RecordField::Category => self.category,
            RecordField::Region => self.region,
            RecordField::Salesperson => self.salesperson,
            RecordField::Product => self.product,
            RecordField::Quantity => self.quantity,
            RecordField::UnitPrice => self.unit_price,
            RecordField::Revenue => self.revenue,
        }
    }

    fn matched_count(&self) -> usize {
        RecordField::ALL
            .iter()
            .filter(|f| self.slot(**f).is_some())
            .count()
    }
}

// ── Row cleaning ──────────────────────────────────────────────────────────────

/// Validate one raw row.
///
/// Returns the cleaned record, with an optional repair issue when the
/// supplied revenue had to be recomputed, or the issue that dropped the row.
fn clean_row(
    raw: &StringRecord,
    row: u64,
    columns: &ColumnIndexes,
    date_formats: &[String],
) -> std::result::Result<(SalesRecord, Option<Issue>), Issue> {
    let reject = |reason: IssueReason, detail: String| Issue {
        row,
        reason,
        action: IssueAction::Dropped,
        detail,
    };

    // Rule 1: required cells must be present. Date and numeric cells must
    // also be non-empty; an empty-but-present label falls through to rule 5.
    let mut cells: Vec<Option<&str>> = Vec::with_capacity(RecordField::ALL.len());
    for field in RecordField::ALL {
        let cell = columns.slot(field).and_then(|idx| raw.get(idx));
        if field.is_required() {
            let missing = match cell {
                None => true,
                Some(value) => {
                    matches!(
                        field,
                        RecordField::Date | RecordField::Quantity | RecordField::UnitPrice
                    ) && value.trim().is_empty()
                }
            };
            if missing {
                return Err(reject(
                    IssueReason::MissingField,
                    format!("no value for {}", field.name()),
                ));
            }
        }
        cells.push(cell);
    }
    let cell = |field: RecordField| cells[field as usize].unwrap_or("").trim();

    // Rule 2: the date must match one of the accepted formats.
    let date_text = cell(RecordField::Date);
    let date = parse_date(date_text, date_formats).ok_or_else(|| {
        reject(
            IssueReason::InvalidDate,
            format!("unparseable date {:?}", date_text),
        )
    })?;

    // Rule 3: quantity and unit price must be non-negative numbers.
    let quantity_text = cell(RecordField::Quantity);
    let quantity = parse_quantity(quantity_text).ok_or_else(|| {
        reject(
            IssueReason::InvalidNumber,
            format!("invalid quantity {:?}", quantity_text),
        )
    })?;

    let price_text = cell(RecordField::UnitPrice);
    let unit_price = parse_price(price_text).ok_or_else(|| {
        reject(
            IssueReason::InvalidNumber,
            format!("invalid unit price {:?}", price_text),
        )
    })?;

    // Rule 4: reconcile supplied revenue against the computed value. The
    // computed value wins whenever the supplied one is off or unusable.
    let computed = quantity as f64 * unit_price;
    let supplied = Some(cell(RecordField::Revenue)).filter(|s| !s.is_empty());
    let (revenue, repair) = match supplied {
        None => (computed, None),
        Some(text) => match text.parse::<f64>() {
            Ok(value) if (value - computed).abs() <= REVENUE_TOLERANCE => (value, None),
            _ => (
                computed,
                Some(Issue {
                    row,
                    reason: IssueReason::RevenueMismatch,
                    action: IssueAction::Repaired,
                    detail: format!("{:?} replaced with {:.2}", text, computed),
                }),
            ),
        },
    };

    // Rule 5: labels must be non-empty after trimming.
    let mut labels = [
        (RecordField::Category, String::new()),
        (RecordField::Region, String::new()),
        (RecordField::Salesperson, String::new()),
        (RecordField::Product, String::new()),
    ];
    for (field, slot) in labels.iter_mut() {
        let trimmed = cell(*field);
        if trimmed.is_empty() {
            return Err(reject(
                IssueReason::EmptyLabel,
                format!("empty {}", field.name()),
            ));
        }
        *slot = trimmed.to_string();
    }
    let [(_, category), (_, region), (_, salesperson), (_, product)] = labels;

    Ok((
        SalesRecord {
            date,
            category,
            region,
            salesperson,
            product,
            quantity,
            unit_price,
            revenue,
        },
        repair,
    ))
}

/// Parse a quantity: a non-negative whole number. Values written with a
/// redundant fraction (`"2.0"`) are accepted.
fn parse_quantity(text: &str) -> Option<u64> {
    if let Ok(n) = text.parse::<u64>() {
        return Some(n);
    }
    let value = text.parse::<f64>().ok()?;
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 {
        Some(value as u64)
    } else {
        None
    }
}

/// Parse a unit price: a non-negative finite decimal.
fn parse_price(text: &str) -> Option<f64> {
    let value = text.parse::<f64>().ok()?;
    if value.is_finite() && value >= 0.0 {
        Some(value)
    } else {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
