//! Store contracts for categories, transactions, and monthly budgets plus
//! the in-memory, fixture-seeded implementations used by the dashboard.

pub mod fixtures;
pub mod memory;

use std::future::Future;

use uuid::Uuid;

use crate::domain::{
    Category, CategoryPatch, MonthlyBudget, MonthlyBudgetPatch, Period, Transaction,
    TransactionPatch,
};
use crate::errors::Result;

pub use memory::{InMemoryBudgetStore, InMemoryCategoryStore, InMemoryTransactionStore};

/// Asynchronous category persistence. `get`, `update`, and `delete` fail
/// with [`BudgetError::NotFound`](crate::errors::BudgetError::NotFound) for
/// unknown ids.
pub trait CategoryStore: Send + Sync {
    fn list_all(&self) -> impl Future<Output = Result<Vec<Category>>> + Send;
    fn get(&self, id: Uuid) -> impl Future<Output = Result<Category>> + Send;
    fn create(&self, category: Category) -> impl Future<Output = Result<Category>> + Send;
    fn update(
        &self,
        id: Uuid,
        patch: CategoryPatch,
    ) -> impl Future<Output = Result<Category>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = Result<Category>> + Send;
}

/// Asynchronous transaction persistence. Listings are newest first.
pub trait TransactionStore: Send + Sync {
    fn list_all(&self) -> impl Future<Output = Result<Vec<Transaction>>> + Send;
    fn get(&self, id: Uuid) -> impl Future<Output = Result<Transaction>> + Send;
    fn create(&self, transaction: Transaction)
        -> impl Future<Output = Result<Transaction>> + Send;
    fn update(
        &self,
        id: Uuid,
        patch: TransactionPatch,
    ) -> impl Future<Output = Result<Transaction>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = Result<Transaction>> + Send;
    fn recent(&self, limit: usize) -> impl Future<Output = Result<Vec<Transaction>>> + Send;
    fn by_category(&self, id: Uuid) -> impl Future<Output = Result<Vec<Transaction>>> + Send;
    fn in_period(&self, period: Period) -> impl Future<Output = Result<Vec<Transaction>>> + Send;
    /// Case-insensitive free-text match over merchant and note.
    fn search(&self, query: String) -> impl Future<Output = Result<Vec<Transaction>>> + Send;
}

/// Asynchronous persistence of per-month overall budgets. At most one
/// budget is stored per period.
pub trait BudgetStore: Send + Sync {
    fn list_all(&self) -> impl Future<Output = Result<Vec<MonthlyBudget>>> + Send;
    fn get(&self, id: Uuid) -> impl Future<Output = Result<MonthlyBudget>> + Send;
    /// The stored budget for `period`, or
    /// [`MonthlyBudget::default_for`] when none exists.
    fn for_period(&self, period: Period) -> impl Future<Output = Result<MonthlyBudget>> + Send;
    fn create(&self, budget: MonthlyBudget) -> impl Future<Output = Result<MonthlyBudget>> + Send;
    fn update(
        &self,
        id: Uuid,
        patch: MonthlyBudgetPatch,
    ) -> impl Future<Output = Result<MonthlyBudget>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = Result<MonthlyBudget>> + Send;
}
