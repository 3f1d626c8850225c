use tracing::info;
use uuid::Uuid;

use crate::domain::{Category, CategoryPatch};
use crate::errors::BudgetError;
use crate::storage::{CategoryStore, TransactionStore};

use super::ServiceResult;

/// Validated category CRUD on top of a [`CategoryStore`].
pub struct CategoryService;

/// What a category deletion left behind.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRemoval {
    pub category: Category,
    /// Transactions still pointing at the deleted id. They are kept as-is and
    /// aggregate into the unknown bucket from now on.
    pub orphaned_transactions: usize,
}

impl CategoryService {
    pub async fn add<S>(store: &S, category: Category) -> ServiceResult<Category>
    where
        S: CategoryStore,
    {
        category.validate()?;
        Self::validate_name(store, None, &category.name).await?;
        let created = store.create(category).await?;
        info!("created category `{}`", created.name);
        Ok(created)
    }

    pub async fn edit<S>(store: &S, id: Uuid, patch: CategoryPatch) -> ServiceResult<Category>
    where
        S: CategoryStore,
    {
        if !patch.has_effect() {
            return Ok(store.get(id).await?);
        }
        if let Some(name) = &patch.name {
            Self::validate_name(store, Some(id), name).await?;
        }
        Ok(store.update(id, patch).await?)
    }

    /// Deletes the category and orphans the transactions that referenced it.
    pub async fn remove<C, T>(categories: &C, transactions: &T, id: Uuid) -> ServiceResult<CategoryRemoval>
    where
        C: CategoryStore,
        T: TransactionStore,
    {
        // nothing is deleted unless the orphans could be counted
        let orphaned_transactions = transactions.by_category(id).await?.len();
        let category = categories.delete(id).await?;
        info!(
            "deleted category `{}`, {} transaction(s) orphaned",
            category.name, orphaned_transactions
        );
        Ok(CategoryRemoval {
            category,
            orphaned_transactions,
        })
    }

    async fn validate_name<S>(store: &S, exclude: Option<Uuid>, candidate: &str) -> ServiceResult<()>
    where
        S: CategoryStore,
    {
        let normalized = candidate.trim().to_lowercase();
        let duplicate = store.list_all().await?.iter().any(|category| {
            category.name.trim().to_lowercase() == normalized
                && exclude.map_or(true, |id| category.id != id)
        });
        if duplicate {
            Err(BudgetError::validation(format!(
                "Category `{}` already exists",
                candidate.trim()
            )))
        } else {
            Ok(())
        }
    }
}
