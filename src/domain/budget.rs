//! Overall spending limit for one month.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;
use crate::domain::period::Period;
use crate::errors::BudgetError;

/// Limit used for a month that has no stored budget.
pub const DEFAULT_MONTHLY_BUDGET: f64 = 3500.0;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyBudget {
    pub id: Uuid,
    pub period: Period,
    pub total_budget: f64,
}

impl MonthlyBudget {
    pub fn new(period: Period, total_budget: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            period,
            total_budget,
        }
    }

    /// Unsaved placeholder for a month without a stored budget.
    pub fn default_for(period: Period) -> Self {
        Self::new(period, DEFAULT_MONTHLY_BUDGET)
    }

    pub fn validate(&self) -> Result<(), BudgetError> {
        if !self.total_budget.is_finite() || self.total_budget <= 0.0 {
            return Err(BudgetError::validation("Please enter a valid budget amount"));
        }
        Ok(())
    }
}

impl Identifiable for MonthlyBudget {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Displayable for MonthlyBudget {
    fn display_label(&self) -> String {
        format!("{} budget {:.2}", self.period.label(), self.total_budget)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyBudgetPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_budget: Option<f64>,
}

impl MonthlyBudgetPatch {
    pub fn apply(&self, budget: &MonthlyBudget) -> Result<MonthlyBudget, BudgetError> {
        let mut updated = budget.clone();
        if let Some(total) = self.total_budget {
            updated.total_budget = total;
        }
        updated.validate()?;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_budget_covers_missing_months() {
        let march = Period::new(2024, 3).unwrap();
        let budget = MonthlyBudget::default_for(march);
        assert_eq!(budget.period, march);
        assert_eq!(budget.total_budget, DEFAULT_MONTHLY_BUDGET);
        assert!(budget.validate().is_ok());
    }

    #[test]
    fn patch_rejects_non_positive_totals() {
        let budget = MonthlyBudget::new(Period::new(2024, 3).unwrap(), 3200.0);
        let patch = MonthlyBudgetPatch {
            total_budget: Some(0.0),
        };
        assert!(matches!(patch.apply(&budget), Err(BudgetError::Validation(_))));
        let raise = MonthlyBudgetPatch {
            total_budget: Some(4000.0),
        };
        assert_eq!(raise.apply(&budget).unwrap().total_budget, 4000.0);
    }

    #[test]
    fn deserializes_camel_case() {
        let raw = r#"{
            "id": "b0000000-0000-4000-8000-000000000001",
            "period": {"year": 2024, "month": 3},
            "totalBudget": 3200
        }"#;
        let budget: MonthlyBudget = serde_json::from_str(raw).unwrap();
        assert_eq!(budget.period.label(), "Mar 2024");
        assert_eq!(budget.total_budget, 3200.0);
    }
}
