use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

use crate::config::{Latency, StoreOp};
use crate::domain::{
    Category, CategoryPatch, Displayable, Identifiable, MonthlyBudget, MonthlyBudgetPatch, Period,
    Transaction, TransactionPatch,
};
use crate::errors::{BudgetError, Result};
use crate::storage::{fixtures, BudgetStore, CategoryStore, TransactionStore};

/// Rows keyed by id with a simulated round trip before every operation.
struct MemoryTable<T> {
    entity: &'static str,
    rows: DashMap<Uuid, T>,
    latency: Latency,
    available: AtomicBool,
}

impl<T> MemoryTable<T>
where
    T: Identifiable + Displayable + Clone + Send + Sync,
{
    fn new(entity: &'static str, latency: Latency, rows: Vec<T>) -> Self {
        let map = DashMap::with_capacity(rows.len());
        for row in rows {
            map.insert(row.id(), row);
        }
        Self {
            entity,
            rows: map,
            latency,
            available: AtomicBool::new(true),
        }
    }

    async fn round_trip(&self, op: StoreOp) -> Result<()> {
        let delay = self.latency.delay(op);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if !self.available.load(Ordering::SeqCst) {
            return Err(BudgetError::LoadFailure(format!(
                "{} store is unavailable",
                self.entity.to_lowercase()
            )));
        }
        debug!("{} store {:?}", self.entity, op);
        Ok(())
    }

    fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn rows(&self) -> Vec<T> {
        self.rows.iter().map(|entry| entry.value().clone()).collect()
    }

    fn get(&self, id: Uuid) -> Result<T> {
        self.rows
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| BudgetError::not_found(self.entity, id))
    }

    fn insert(&self, row: T) -> Result<T> {
        let id = row.id();
        if self.rows.contains_key(&id) {
            return Err(BudgetError::validation(format!(
                "{} {} already exists",
                self.entity, id
            )));
        }
        debug!("{} created: {}", self.entity, row.display_label());
        self.rows.insert(id, row.clone());
        Ok(row)
    }

    fn replace<F>(&self, id: Uuid, patch: F) -> Result<T>
    where
        F: FnOnce(&T) -> Result<T>,
    {
        let mut entry = self
            .rows
            .get_mut(&id)
            .ok_or_else(|| BudgetError::not_found(self.entity, id))?;
        let updated = patch(entry.value())?;
        *entry.value_mut() = updated.clone();
        Ok(updated)
    }

    fn remove(&self, id: Uuid) -> Result<T> {
        let (_, row) = self
            .rows
            .remove(&id)
            .ok_or_else(|| BudgetError::not_found(self.entity, id))?;
        debug!("{} removed: {}", self.entity, row.display_label());
        Ok(row)
    }
}

/// In-memory [`CategoryStore`], listed alphabetically by name.
pub struct InMemoryCategoryStore {
    table: MemoryTable<Category>,
}

impl InMemoryCategoryStore {
    pub fn new(latency: Latency) -> Self {
        Self::with_categories(latency, Vec::new())
    }

    pub fn with_categories(latency: Latency, categories: Vec<Category>) -> Self {
        Self {
            table: MemoryTable::new("Category", latency, categories),
        }
    }

    /// Store preloaded with the bundled fixture categories.
    pub fn seeded(latency: Latency) -> Result<Self> {
        Ok(Self::with_categories(latency, fixtures::categories()?))
    }

    /// Simulates an outage: while unavailable every call fails with
    /// [`BudgetError::LoadFailure`].
    pub fn set_available(&self, available: bool) {
        self.table.set_available(available);
    }
}

impl CategoryStore for InMemoryCategoryStore {
    async fn list_all(&self) -> Result<Vec<Category>> {
        self.table.round_trip(StoreOp::List).await?;
        let mut categories = self.table.rows();
        categories.sort_by_key(|category| category.name.to_lowercase());
        Ok(categories)
    }

    async fn get(&self, id: Uuid) -> Result<Category> {
        self.table.round_trip(StoreOp::Get).await?;
        self.table.get(id)
    }

    async fn create(&self, category: Category) -> Result<Category> {
        self.table.round_trip(StoreOp::Create).await?;
        self.table.insert(category)
    }

    async fn update(&self, id: Uuid, patch: CategoryPatch) -> Result<Category> {
        self.table.round_trip(StoreOp::Update).await?;
        self.table.replace(id, |current| patch.apply(current))
    }

    async fn delete(&self, id: Uuid) -> Result<Category> {
        self.table.round_trip(StoreOp::Delete).await?;
        self.table.remove(id)
    }
}

/// In-memory [`TransactionStore`].
pub struct InMemoryTransactionStore {
    table: MemoryTable<Transaction>,
}

impl InMemoryTransactionStore {
    pub fn new(latency: Latency) -> Self {
        Self::with_transactions(latency, Vec::new())
    }

    pub fn with_transactions(latency: Latency, transactions: Vec<Transaction>) -> Self {
        Self {
            table: MemoryTable::new("Transaction", latency, transactions),
        }
    }

    /// Store preloaded with the bundled fixture transactions.
    pub fn seeded(latency: Latency) -> Result<Self> {
        Ok(Self::with_transactions(latency, fixtures::transactions()?))
    }

    pub fn set_available(&self, available: bool) {
        self.table.set_available(available);
    }

    async fn filtered<F>(&self, keep: F) -> Result<Vec<Transaction>>
    where
        F: Fn(&Transaction) -> bool,
    {
        self.table.round_trip(StoreOp::List).await?;
        let mut rows: Vec<Transaction> = self.table.rows().into_iter().filter(keep).collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(rows)
    }
}

impl TransactionStore for InMemoryTransactionStore {
    async fn list_all(&self) -> Result<Vec<Transaction>> {
        self.filtered(|_| true).await
    }

    async fn get(&self, id: Uuid) -> Result<Transaction> {
        self.table.round_trip(StoreOp::Get).await?;
        self.table.get(id)
    }

    async fn create(&self, transaction: Transaction) -> Result<Transaction> {
        self.table.round_trip(StoreOp::Create).await?;
        self.table.insert(transaction)
    }

    async fn update(&self, id: Uuid, patch: TransactionPatch) -> Result<Transaction> {
        self.table.round_trip(StoreOp::Update).await?;
        self.table.replace(id, |current| patch.apply(current))
    }

    async fn delete(&self, id: Uuid) -> Result<Transaction> {
        self.table.round_trip(StoreOp::Delete).await?;
        self.table.remove(id)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<Transaction>> {
        let mut rows = self.filtered(|_| true).await?;
        rows.truncate(limit);
        Ok(rows)
    }

    async fn by_category(&self, id: Uuid) -> Result<Vec<Transaction>> {
        self.filtered(|txn| txn.category_id == Some(id)).await
    }

    async fn in_period(&self, period: Period) -> Result<Vec<Transaction>> {
        self.filtered(|txn| period.contains(&txn.date)).await
    }

    async fn search(&self, query: String) -> Result<Vec<Transaction>> {
        self.filtered(|txn| txn.matches_text(&query)).await
    }
}

/// In-memory [`BudgetStore`], listed oldest period first.
pub struct InMemoryBudgetStore {
    table: MemoryTable<MonthlyBudget>,
}

impl InMemoryBudgetStore {
    pub fn new(latency: Latency) -> Self {
        Self::with_budgets(latency, Vec::new())
    }

    pub fn with_budgets(latency: Latency, budgets: Vec<MonthlyBudget>) -> Self {
        Self {
            table: MemoryTable::new("Budget", latency, budgets),
        }
    }

    /// Store preloaded with the bundled fixture budgets.
    pub fn seeded(latency: Latency) -> Result<Self> {
        Ok(Self::with_budgets(latency, fixtures::budgets()?))
    }

    pub fn set_available(&self, available: bool) {
        self.table.set_available(available);
    }

    fn find_period(&self, period: Period) -> Option<MonthlyBudget> {
        self.table
            .rows()
            .into_iter()
            .find(|budget| budget.period == period)
    }
}

impl BudgetStore for InMemoryBudgetStore {
    async fn list_all(&self) -> Result<Vec<MonthlyBudget>> {
        self.table.round_trip(StoreOp::List).await?;
        let mut budgets = self.table.rows();
        budgets.sort_by_key(|budget| budget.period);
        Ok(budgets)
    }

    async fn get(&self, id: Uuid) -> Result<MonthlyBudget> {
        self.table.round_trip(StoreOp::Get).await?;
        self.table.get(id)
    }

    async fn for_period(&self, period: Period) -> Result<MonthlyBudget> {
        self.table.round_trip(StoreOp::Get).await?;
        Ok(self
            .find_period(period)
            .unwrap_or_else(|| MonthlyBudget::default_for(period)))
    }

    async fn create(&self, budget: MonthlyBudget) -> Result<MonthlyBudget> {
        self.table.round_trip(StoreOp::Create).await?;
        budget.validate()?;
        if self.find_period(budget.period).is_some() {
            return Err(BudgetError::validation(format!(
                "A budget for {} already exists",
                budget.period.label()
            )));
        }
        self.table.insert(budget)
    }

    async fn update(&self, id: Uuid, patch: MonthlyBudgetPatch) -> Result<MonthlyBudget> {
        self.table.round_trip(StoreOp::Update).await?;
        self.table.replace(id, |current| patch.apply(current))
    }

    async fn delete(&self, id: Uuid) -> Result<MonthlyBudget> {
        self.table.round_trip(StoreOp::Delete).await?;
        self.table.remove(id)
    }
}
