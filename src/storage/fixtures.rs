//! Seed data bundled with the crate.

use crate::domain::{Category, MonthlyBudget, Transaction};
use crate::errors::Result;

const CATEGORIES_JSON: &str = include_str!("../../fixtures/categories.json");
const TRANSACTIONS_JSON: &str = include_str!("../../fixtures/transactions.json");
const BUDGETS_JSON: &str = include_str!("../../fixtures/budgets.json");

pub fn categories() -> Result<Vec<Category>> {
    Ok(serde_json::from_str(CATEGORIES_JSON)?)
}

pub fn transactions() -> Result<Vec<Transaction>> {
    Ok(serde_json::from_str(TRANSACTIONS_JSON)?)
}

pub fn budgets() -> Result<Vec<MonthlyBudget>> {
    Ok(serde_json::from_str(BUDGETS_JSON)?)
}
