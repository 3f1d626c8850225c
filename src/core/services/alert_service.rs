//! Budget threshold alerts with a resettable one-shot latch per
//! `(category name, alert kind)`.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::format::{format_currency, format_percentage};
use crate::domain::summary::{ALERT_THRESHOLD, OVER_THRESHOLD};
use crate::domain::Category;
use crate::notify::NotificationSink;

/// Default age after which latched alerts may be purged.
pub const DEFAULT_ALERT_MAX_AGE_HOURS: i64 = 24;

/// Spend level of a category as seen by the alert evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AlertState {
    Normal,
    Warning,
    Over,
}

impl AlertState {
    /// `None` (no usable budget) is treated as `Normal`.
    pub fn from_percentage(percentage: Option<f64>) -> Self {
        match percentage {
            Some(p) if p >= OVER_THRESHOLD => AlertState::Over,
            Some(p) if p >= ALERT_THRESHOLD => AlertState::Warning,
            _ => AlertState::Normal,
        }
    }

    pub fn of(category: &Category) -> Self {
        Self::from_percentage(category.percentage())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Warning,
    Over,
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AlertKind::Warning => "warning",
            AlertKind::Over => "over",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AlertKey {
    pub category_name: String,
    pub kind: AlertKind,
}

impl AlertKey {
    pub fn new(category_name: impl Into<String>, kind: AlertKind) -> Self {
        Self {
            category_name: category_name.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertRecord {
    pub key: AlertKey,
    pub first_fired: DateTime<Utc>,
}

/// Dedup latches for fired alerts. Owned by the caller and passed into
/// [`AlertEvaluator::evaluate`], so separate instances never interfere.
#[derive(Debug, Default, Clone)]
pub struct AlertStore {
    fired: HashMap<AlertKey, DateTime<Utc>>,
}

impl AlertStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &AlertKey) -> bool {
        self.fired.contains_key(key)
    }

    /// Latches `key`; returns `false` when it was already latched, in which
    /// case the first timestamp is kept.
    pub fn latch(&mut self, key: AlertKey, now: DateTime<Utc>) -> bool {
        if self.fired.contains_key(&key) {
            return false;
        }
        self.fired.insert(key, now);
        true
    }

    pub fn clear(&mut self) {
        self.fired.clear();
    }

    /// Drops latches older than `max_age`. Returns how many were removed.
    pub fn cleanup(&mut self, max_age: Duration, now: DateTime<Utc>) -> usize {
        let before = self.fired.len();
        self.fired
            .retain(|_, first_fired| now.signed_duration_since(*first_fired) <= max_age);
        before - self.fired.len()
    }

    pub fn len(&self) -> usize {
        self.fired.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fired.is_empty()
    }

    /// Latched alerts ordered by category name and kind.
    pub fn records(&self) -> Vec<AlertRecord> {
        let mut records: Vec<AlertRecord> = self
            .fired
            .iter()
            .map(|(key, first_fired)| AlertRecord {
                key: key.clone(),
                first_fired: *first_fired,
            })
            .collect();
        records.sort_by(|a, b| a.key.cmp(&b.key));
        records
    }
}

/// A threshold crossing worth telling the user about.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetAlert {
    pub kind: AlertKind,
    pub category_id: Uuid,
    pub category_name: String,
    pub spent: f64,
    pub budget: f64,
    pub percentage: f64,
}

impl BudgetAlert {
    pub fn message(&self) -> String {
        match self.kind {
            AlertKind::Over => format!(
                "Budget Exceeded! {} is {} over budget ({} of {})",
                self.category_name,
                format_percentage(self.percentage),
                format_currency(self.spent),
                format_currency(self.budget)
            ),
            AlertKind::Warning => format!(
                "Budget Alert! {} has reached {} of budget ({} of {})",
                self.category_name,
                format_percentage(self.percentage),
                format_currency(self.spent),
                format_currency(self.budget)
            ),
        }
    }
}

impl fmt::Display for BudgetAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

pub struct AlertEvaluator;

impl AlertEvaluator {
    /// Compares `current` against `previous` and returns the alerts that
    /// should fire now. Categories missing from `previous` start at
    /// [`AlertState::Normal`]. Categories without a usable budget or spend are
    /// skipped. Every returned alert has been latched in `store`.
    pub fn evaluate(
        current: &[Category],
        previous: &[Category],
        store: &mut AlertStore,
        now: DateTime<Utc>,
    ) -> Vec<BudgetAlert> {
        let previous_states: HashMap<Uuid, AlertState> = previous
            .iter()
            .map(|category| (category.id, AlertState::of(category)))
            .collect();

        let mut alerts = Vec::new();
        for category in current {
            let Some(percentage) = category.percentage() else {
                warn!(
                    "skipping alert check for `{}`: budget {} / spent {} unusable",
                    category.name, category.budget_amount, category.spent_amount
                );
                continue;
            };
            let before = previous_states
                .get(&category.id)
                .copied()
                .unwrap_or(AlertState::Normal);
            let after = AlertState::from_percentage(Some(percentage));
            let Some(kind) = Self::transition(before, after) else {
                continue;
            };
            if !store.latch(AlertKey::new(category.name.clone(), kind), now) {
                debug!("suppressed repeated {} alert for `{}`", kind, category.name);
                continue;
            }
            alerts.push(BudgetAlert {
                kind,
                category_id: category.id,
                category_name: category.name.clone(),
                spent: category.spent_amount,
                budget: category.budget_amount,
                percentage,
            });
        }
        alerts
    }

    /// Alert fired by moving from `before` to `after`. Only upward moves fire,
    /// and a jump straight to `Over` fires only the over-budget alert.
    pub fn transition(before: AlertState, after: AlertState) -> Option<AlertKind> {
        if after <= before {
            return None;
        }
        match after {
            AlertState::Over => Some(AlertKind::Over),
            AlertState::Warning => Some(AlertKind::Warning),
            AlertState::Normal => None,
        }
    }

    /// Routes warnings to `show_warning` and over-budget alerts to `show_error`.
    pub fn dispatch(alerts: &[BudgetAlert], sink: &dyn NotificationSink) {
        for alert in alerts {
            info!(
                "{} alert for `{}` at {:.1}%",
                alert.kind, alert.category_name, alert.percentage
            );
            match alert.kind {
                AlertKind::Warning => sink.show_warning(&alert.message()),
                AlertKind::Over => sink.show_error(&alert.message()),
            }
        }
    }
}
