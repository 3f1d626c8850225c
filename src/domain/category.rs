//! Domain types representing budget categories.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;
use crate::domain::summary::BudgetStatus;
use crate::errors::BudgetError;

pub const DEFAULT_ICON: &str = "ShoppingBag";
pub const DEFAULT_COLOR: &str = "#6B7280";

/// A monthly spending envelope.
///
/// `spent_amount` is a cache filled by the last aggregation pass. It is not
/// kept in sync with the transaction list; recompute it with
/// [`SpendingAggregator::apply_spent_amounts`](crate::core::services::SpendingAggregator::apply_spent_amounts)
/// after any transaction change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub budget_amount: f64,
    #[serde(default = "default_icon")]
    pub icon: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub spent_amount: f64,
}

fn default_icon() -> String {
    DEFAULT_ICON.into()
}

fn default_color() -> String {
    DEFAULT_COLOR.into()
}

impl Category {
    pub fn new(name: impl Into<String>, budget_amount: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            budget_amount,
            icon: default_icon(),
            color: default_color(),
            spent_amount: 0.0,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_spent(mut self, spent_amount: f64) -> Self {
        self.spent_amount = spent_amount;
        self
    }

    /// Spent share of the budget in percent, `None` when the budget cannot
    /// support the division.
    pub fn percentage(&self) -> Option<f64> {
        budget_percentage(self.spent_amount, self.budget_amount)
    }

    pub fn remaining(&self) -> f64 {
        self.budget_amount - self.spent_amount
    }

    pub fn status(&self) -> BudgetStatus {
        BudgetStatus::from_percentage(self.percentage())
    }

    pub fn validate(&self) -> Result<(), BudgetError> {
        if self.name.trim().is_empty() {
            return Err(BudgetError::validation("Please enter a category name"));
        }
        if !self.budget_amount.is_finite() || self.budget_amount <= 0.0 {
            return Err(BudgetError::validation("Please enter a valid budget amount"));
        }
        Ok(())
    }
}

/// `spent / budget * 100`, undefined for zero, negative, or non-finite input.
pub fn budget_percentage(spent: f64, budget: f64) -> Option<f64> {
    if !spent.is_finite() || !budget.is_finite() || budget <= 0.0 {
        return None;
    }
    Some(spent / budget * 100.0)
}

impl Identifiable for Category {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Displayable for Category {
    fn display_label(&self) -> String {
        format!("{} ({})", self.name, self.status())
    }
}

/// Partial update for a category; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl CategoryPatch {
    pub fn has_effect(&self) -> bool {
        self.name.is_some()
            || self.budget_amount.is_some()
            || self.icon.is_some()
            || self.color.is_some()
    }

    /// Returns the patched copy after validating it; `category` is untouched.
    pub fn apply(&self, category: &Category) -> Result<Category, BudgetError> {
        let mut updated = category.clone();
        if let Some(name) = &self.name {
            updated.name = name.trim().to_string();
        }
        if let Some(amount) = self.budget_amount {
            updated.budget_amount = amount;
        }
        if let Some(icon) = &self.icon {
            updated.icon = icon.clone();
        }
        if let Some(color) = &self.color {
            updated.color = color.clone();
        }
        updated.validate()?;
        Ok(updated)
    }
}
