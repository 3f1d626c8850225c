//! Business logic helpers for recording and editing transactions.

use tracing::info;
use uuid::Uuid;

use crate::domain::{Period, Transaction, TransactionDraft, TransactionPatch};
use crate::errors::BudgetError;
use crate::storage::{CategoryStore, TransactionStore};

use super::ServiceResult;

/// Validated transaction CRUD on top of a [`TransactionStore`].
pub struct TransactionService;

impl TransactionService {
    /// Validates `draft`, checks its category exists, and stores the signed
    /// transaction.
    pub async fn record<T, C>(
        transactions: &T,
        categories: &C,
        draft: TransactionDraft,
    ) -> ServiceResult<Transaction>
    where
        T: TransactionStore,
        C: CategoryStore,
    {
        draft.validate()?;
        if let Some(category_id) = draft.category_id {
            Self::ensure_category(categories, category_id).await?;
        }
        let transaction = draft.into_transaction()?;
        let created = transactions.create(transaction).await?;
        info!(
            "recorded {} of {:.2} at `{}`",
            created.kind(),
            created.magnitude(),
            created.merchant
        );
        Ok(created)
    }

    /// Applies `patch`, re-checking the category when it changes.
    pub async fn update<T, C>(
        transactions: &T,
        categories: &C,
        id: Uuid,
        patch: TransactionPatch,
    ) -> ServiceResult<Transaction>
    where
        T: TransactionStore,
        C: CategoryStore,
    {
        if !patch.has_effect() {
            return Ok(transactions.get(id).await?);
        }
        if let Some(Some(category_id)) = patch.category_id {
            Self::ensure_category(categories, category_id).await?;
        }
        Ok(transactions.update(id, patch).await?)
    }

    /// Removes the transaction identified by `id`, returning the removed instance.
    pub async fn remove<T>(transactions: &T, id: Uuid) -> ServiceResult<Transaction>
    where
        T: TransactionStore,
    {
        let removed = transactions.delete(id).await?;
        info!("removed transaction at `{}`", removed.merchant);
        Ok(removed)
    }

    pub async fn search<T>(transactions: &T, query: &str) -> ServiceResult<Vec<Transaction>>
    where
        T: TransactionStore,
    {
        let query = query.trim();
        if query.is_empty() {
            return Ok(transactions.list_all().await?);
        }
        Ok(transactions.search(query.to_string()).await?)
    }

    pub async fn for_period<T>(transactions: &T, period: Period) -> ServiceResult<Vec<Transaction>>
    where
        T: TransactionStore,
    {
        Ok(transactions.in_period(period).await?)
    }

    pub async fn for_category<T>(transactions: &T, category_id: Uuid) -> ServiceResult<Vec<Transaction>>
    where
        T: TransactionStore,
    {
        Ok(transactions.by_category(category_id).await?)
    }

    async fn ensure_category<C>(categories: &C, id: Uuid) -> ServiceResult<()>
    where
        C: CategoryStore,
    {
        match categories.get(id).await {
            Ok(_) => Ok(()),
            Err(BudgetError::NotFound { .. }) => {
                Err(BudgetError::validation("Please select a category"))
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Latency;
    use crate::domain::Category;
    use crate::storage::{InMemoryCategoryStore, InMemoryTransactionStore};

    fn stores() -> (InMemoryTransactionStore, InMemoryCategoryStore, Category) {
        let category = Category::new("Groceries", 600.0);
        let categories =
            InMemoryCategoryStore::with_categories(Latency::none(), vec![category.clone()]);
        (InMemoryTransactionStore::new(Latency::none()), categories, category)
    }

    #[tokio::test]
    async fn record_stores_expense_as_negative_amount() {
        let (transactions, categories, groceries) = stores();
        let draft = TransactionDraft::expense(42.5, groceries.id, " Market ").with_note("  ");
        let created = TransactionService::record(&transactions, &categories, draft)
            .await
            .unwrap();
        assert_eq!(created.amount, -42.5);
        assert_eq!(created.merchant, "Market");
        assert_eq!(created.note, None);
        assert_eq!(transactions.list_all().await.unwrap(), vec![created]);
    }

    #[tokio::test]
    async fn record_rejects_unknown_category() {
        let (transactions, categories, _) = stores();
        let draft = TransactionDraft::expense(10.0, Uuid::new_v4(), "Market");
        let err = TransactionService::record(&transactions, &categories, draft)
            .await
            .unwrap_err();
        assert!(
            matches!(err, BudgetError::Validation(ref message) if message == "Please select a category"),
            "unexpected error: {err:?}"
        );
        assert!(transactions.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn record_rejects_invalid_amount_before_touching_stores() {
        let (transactions, categories, groceries) = stores();
        categories.set_available(false);
        let draft = TransactionDraft::expense(0.0, groceries.id, "Market");
        let err = TransactionService::record(&transactions, &categories, draft)
            .await
            .unwrap_err();
        assert!(matches!(err, BudgetError::Validation(ref message) if message.contains("amount")));
    }

    #[tokio::test]
    async fn income_needs_no_category() {
        let (transactions, categories, _) = stores();
        let created = TransactionService::record(
            &transactions,
            &categories,
            TransactionDraft::income(3200.0, "Payroll"),
        )
        .await
        .unwrap();
        assert_eq!(created.amount, 3200.0);
        assert!(created.category_id.is_none());
    }

    #[tokio::test]
    async fn update_and_remove_missing_transaction_fail() {
        let (transactions, categories, _) = stores();
        let patch = TransactionPatch {
            merchant: Some("Elsewhere".into()),
            ..TransactionPatch::default()
        };
        let err = TransactionService::update(&transactions, &categories, Uuid::new_v4(), patch)
            .await
            .unwrap_err();
        assert!(matches!(err, BudgetError::NotFound { entity: "Transaction", .. }));
        assert!(TransactionService::remove(&transactions, Uuid::new_v4())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn blank_search_lists_everything() {
        let (transactions, categories, groceries) = stores();
        for merchant in ["Market", "Bakery"] {
            TransactionService::record(
                &transactions,
                &categories,
                TransactionDraft::expense(5.0, groceries.id, merchant),
            )
            .await
            .unwrap();
        }
        assert_eq!(TransactionService::search(&transactions, "  ").await.unwrap().len(), 2);
        assert_eq!(TransactionService::search(&transactions, "bak").await.unwrap().len(), 1);
        assert_eq!(
            TransactionService::for_category(&transactions, groceries.id)
                .await
                .unwrap()
                .len(),
            2
        );
    }
}
