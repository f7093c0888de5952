use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ── SalesRecord ───────────────────────────────────────────────────────────────

/// A single cleaned sales row.
///
/// A `SalesRecord` is only ever constructed after every validation rule has
/// passed, so downstream code can rely on its invariants structurally: labels
/// are trimmed and non-empty, numeric fields are non-negative, and `revenue`
/// is consistent with `quantity * unit_price`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    /// Calendar date of the sale.
    pub date: NaiveDate,
    /// Product category label.
    pub category: String,
    /// Sales region label.
    pub region: String,
    /// Salesperson name.
    pub salesperson: String,
    /// Product name.
    pub product: String,
    /// Units sold.
    pub quantity: u64,
    /// Price per unit in the source currency.
    pub unit_price: f64,
    /// Row revenue, reconciled to `quantity * unit_price`.
    pub revenue: f64,
}

// ── Issue ─────────────────────────────────────────────────────────────────────

/// Why a row was dropped or repaired during cleaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueReason {
    /// A required cell was absent or empty.
    MissingField,
    /// The date matched none of the accepted formats.
    InvalidDate,
    /// Quantity or unit price was non-numeric or negative.
    InvalidNumber,
    /// A label field was empty after trimming.
    EmptyLabel,
    /// Supplied revenue disagreed with quantity times unit price.
    RevenueMismatch,
}

impl IssueReason {
    /// Human-readable reason used in logs and the report's data-quality
    /// section.
    pub fn describe(&self) -> &'static str {
        match self {
            IssueReason::MissingField => "missing field",
            IssueReason::InvalidDate => "invalid date",
            IssueReason::InvalidNumber => "invalid quantity/price",
            IssueReason::EmptyLabel => "empty label",
            IssueReason::RevenueMismatch => "revenue mismatch, recomputed",
        }
    }
}

/// What the cleaner did with the offending row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueAction {
    /// The row was excluded from the cleaned table.
    Dropped,
    /// The row was kept with a corrected value.
    Repaired,
}

/// One entry of the issue log: a row that was dropped or repaired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// 1-based data row number in the source (header excluded).
    pub row: u64,
    /// The first validation rule that failed.
    pub reason: IssueReason,
    /// Disposition of the row.
    pub action: IssueAction,
    /// Free-text detail, e.g. the offending value.
    pub detail: String,
}

impl Issue {
    /// True when the row was excluded from the cleaned table.
    pub fn is_dropped(&self) -> bool {
        self.action == IssueAction::Dropped
    }
}

// ── Totals ────────────────────────────────────────────────────────────────────

/// Overall totals across the cleaned table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    /// Sum of revenue over all cleaned rows.
    pub total_revenue: f64,
    /// Sum of quantity over all cleaned rows.
    pub total_quantity: u64,
    /// Number of cleaned rows (orders).
    pub order_count: u64,
    /// `total_revenue / order_count`, or `0.0` for an empty table.
    pub average_order_value: f64,
    /// Earliest and latest sale dates, `None` for an empty table.
    pub date_range: Option<(NaiveDate, NaiveDate)>,
}

// ── GroupStats / BreakdownEntry ───────────────────────────────────────────────

/// Revenue, quantity and order count accumulated for one group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupStats {
    /// Sum of revenue within the group.
    pub revenue: f64,
    /// Sum of quantity within the group.
    pub quantity: u64,
    /// Number of rows in the group.
    pub orders: u64,
}

impl GroupStats {
    /// Add a single record's measures to the running totals.
    pub fn add_record(&mut self, record: &SalesRecord) {
        self.revenue += record.revenue;
        self.quantity += record.quantity;
        self.orders += 1;
    }

    /// Mean revenue per order, `0.0` when the group is empty.
    pub fn average_order_value(&self) -> f64 {
        if self.orders == 0 {
            0.0
        } else {
            self.revenue / self.orders as f64
        }
    }
}

/// One labelled group within a breakdown, e.g. one category or one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownEntry {
    /// The grouping label.
    pub label: String,
    /// Accumulated stats for the group.
    pub stats: GroupStats,
}

// ── DailyPoint ────────────────────────────────────────────────────────────────

/// Revenue and quantity for a single calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPoint {
    /// The day.
    pub date: NaiveDate,
    /// Revenue summed over the day.
    pub revenue: f64,
    /// Quantity summed over the day.
    pub quantity: u64,
}

// ── SalesSummary ──────────────────────────────────────────────────────────────

/// The complete aggregate view over the cleaned table.
///
/// All breakdown vectors are ordered by descending revenue with ties broken
/// by ascending label, so repeated runs over identical input produce an
/// identical summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesSummary {
    /// Overall totals.
    pub totals: Totals,
    /// Per-category breakdown.
    pub by_category: Vec<BreakdownEntry>,
    /// Per-region breakdown.
    pub by_region: Vec<BreakdownEntry>,
    /// Per-salesperson breakdown.
    pub by_salesperson: Vec<BreakdownEntry>,
    /// The top N products by revenue (fewer when fewer products exist).
    pub top_products: Vec<BreakdownEntry>,
    /// Per-day revenue trend, ascending by date.
    pub daily_trend: Vec<DailyPoint>,
}

// ── Tests ─────────────────────────────────────────────────────────────────────
