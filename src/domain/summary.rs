//! Derived spending summaries. None of these are persisted; they are rebuilt
//! from the transaction list whenever a view needs them.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::period::Period;

/// Percentage at which a category is flagged for attention.
pub const ALERT_THRESHOLD: f64 = 75.0;
/// Percentage at which the display turns to a warning colour.
pub const NEAR_LIMIT_THRESHOLD: f64 = 85.0;
/// Percentage at which a category is over budget.
pub const OVER_THRESHOLD: f64 = 100.0;

/// Display banding for a spend percentage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum BudgetStatus {
    Good,
    Alert,
    Warning,
    Over,
}

impl BudgetStatus {
    /// Undefined percentages (no usable budget) are shown as `Good`.
    pub fn from_percentage(percentage: Option<f64>) -> Self {
        match percentage {
            Some(p) if p >= OVER_THRESHOLD => BudgetStatus::Over,
            Some(p) if p >= NEAR_LIMIT_THRESHOLD => BudgetStatus::Warning,
            Some(p) if p >= ALERT_THRESHOLD => BudgetStatus::Alert,
            _ => BudgetStatus::Good,
        }
    }
}

impl fmt::Display for BudgetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BudgetStatus::Good => "good",
            BudgetStatus::Alert => "alert",
            BudgetStatus::Warning => "warning",
            BudgetStatus::Over => "over",
        };
        f.write_str(label)
    }
}

/// Grouping key for spending. Transactions without a category, or pointing
/// at a category that no longer exists, land in `Unknown`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SpendingBucket {
    Category(Uuid),
    Unknown,
}

impl SpendingBucket {
    pub fn category_id(&self) -> Option<Uuid> {
        match self {
            SpendingBucket::Category(id) => Some(*id),
            SpendingBucket::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategorySpendingSummary {
    pub bucket: SpendingBucket,
    pub amount: f64,
    pub transaction_count: usize,
}

impl CategorySpendingSummary {
    pub fn empty(bucket: SpendingBucket) -> Self {
        Self {
            bucket,
            amount: 0.0,
            transaction_count: 0,
        }
    }

    pub(crate) fn record(&mut self, magnitude: f64) {
        self.amount += magnitude;
        self.transaction_count += 1;
    }
}

/// Per-bucket spending for one period.
#[derive(Debug, Clone, PartialEq)]
pub struct SpendingReport {
    pub period: Period,
    entries: BTreeMap<SpendingBucket, CategorySpendingSummary>,
}

impl SpendingReport {
    pub(crate) fn new(
        period: Period,
        entries: BTreeMap<SpendingBucket, CategorySpendingSummary>,
    ) -> Self {
        Self { period, entries }
    }

    pub fn get(&self, bucket: SpendingBucket) -> Option<&CategorySpendingSummary> {
        self.entries.get(&bucket)
    }

    pub fn for_category(&self, id: Uuid) -> Option<&CategorySpendingSummary> {
        self.get(SpendingBucket::Category(id))
    }

    pub fn unknown(&self) -> Option<&CategorySpendingSummary> {
        self.get(SpendingBucket::Unknown)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategorySpendingSummary> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all buckets, the unknown bucket included.
    pub fn total(&self) -> f64 {
        self.entries.values().map(|entry| entry.amount).sum()
    }

    pub fn transaction_count(&self) -> usize {
        self.entries
            .values()
            .map(|entry| entry.transaction_count)
            .sum()
    }
}

/// One month of a spending trend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendPoint {
    pub period: Period,
    pub label: String,
    pub total_amount: f64,
    pub transaction_count: usize,
}

/// Headline numbers for a period: overall budget against overall spending.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BudgetOverview {
    pub period: Period,
    pub total_budget: f64,
    pub total_spent: f64,
    pub remaining: f64,
    pub spent_percentage: f64,
    pub daily_average: f64,
}

impl BudgetOverview {
    pub fn is_over_budget(&self) -> bool {
        self.total_spent > self.total_budget
    }

    pub fn is_near_limit(&self) -> bool {
        self.spent_percentage >= NEAR_LIMIT_THRESHOLD
    }

    pub fn status(&self) -> BudgetStatus {
        if self.total_budget > 0.0 {
            BudgetStatus::from_percentage(Some(self.spent_percentage))
        } else {
            BudgetStatus::Good
        }
    }
}
