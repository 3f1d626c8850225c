use tracing::info;
use uuid::Uuid;

use crate::domain::{Displayable, MonthlyBudget, MonthlyBudgetPatch, Period};
use crate::storage::BudgetStore;

use super::ServiceResult;

/// Per-month overall budget management on top of a [`BudgetStore`].
pub struct BudgetService;

impl BudgetService {
    /// The budget in effect for `period`. Months without a stored budget
    /// get the default limit.
    pub async fn for_period<S>(store: &S, period: Period) -> ServiceResult<MonthlyBudget>
    where
        S: BudgetStore,
    {
        store.for_period(period).await
    }

    pub async fn create<S>(store: &S, budget: MonthlyBudget) -> ServiceResult<MonthlyBudget>
    where
        S: BudgetStore,
    {
        budget.validate()?;
        let created = store.create(budget).await?;
        info!("created {}", created.display_label());
        Ok(created)
    }

    pub async fn update<S>(store: &S, id: Uuid, total_budget: f64) -> ServiceResult<MonthlyBudget>
    where
        S: BudgetStore,
    {
        let patch = MonthlyBudgetPatch {
            total_budget: Some(total_budget),
        };
        Ok(store.update(id, patch).await?)
    }

    /// Stores `total_budget` for `period`, updating the existing record or
    /// creating one when the month still uses the default.
    pub async fn set_for_period<S>(
        store: &S,
        period: Period,
        total_budget: f64,
    ) -> ServiceResult<MonthlyBudget>
    where
        S: BudgetStore,
    {
        let existing = store
            .list_all()
            .await?
            .into_iter()
            .find(|budget| budget.period == period);
        match existing {
            Some(budget) => Self::update(store, budget.id, total_budget).await,
            None => Self::create(store, MonthlyBudget::new(period, total_budget)).await,
        }
    }

    pub async fn remove<S>(store: &S, id: Uuid) -> ServiceResult<MonthlyBudget>
    where
        S: BudgetStore,
    {
        let removed = store.delete(id).await?;
        info!("deleted {}", removed.display_label());
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Latency;
    use crate::domain::DEFAULT_MONTHLY_BUDGET;
    use crate::errors::BudgetError;
    use crate::storage::InMemoryBudgetStore;

    fn april() -> Period {
        Period::new(2024, 4).unwrap()
    }

    #[tokio::test]
    async fn set_for_period_creates_then_updates() {
        let store = InMemoryBudgetStore::new(Latency::none());
        assert_eq!(
            BudgetService::for_period(&store, april()).await.unwrap().total_budget,
            DEFAULT_MONTHLY_BUDGET
        );

        let created = BudgetService::set_for_period(&store, april(), 2800.0)
            .await
            .unwrap();
        let updated = BudgetService::set_for_period(&store, april(), 3000.0)
            .await
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(store.list_all().await.unwrap().len(), 1);
        assert_eq!(
            BudgetService::for_period(&store, april()).await.unwrap().total_budget,
            3000.0
        );
    }

    #[tokio::test]
    async fn rejects_invalid_totals() {
        let store = InMemoryBudgetStore::new(Latency::none());
        let err = BudgetService::set_for_period(&store, april(), f64::NAN)
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Please enter a valid budget amount");
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn remove_restores_the_default() {
        let store = InMemoryBudgetStore::new(Latency::none());
        let created = BudgetService::create(&store, MonthlyBudget::new(april(), 1200.0))
            .await
            .unwrap();
        BudgetService::remove(&store, created.id).await.unwrap();
        assert_eq!(
            BudgetService::for_period(&store, april()).await.unwrap().total_budget,
            DEFAULT_MONTHLY_BUDGET
        );
        assert!(matches!(
            BudgetService::remove(&store, created.id).await,
            Err(BudgetError::NotFound { .. })
        ));
    }
}
