pub mod budget;
pub mod category;
pub mod common;
pub mod period;
pub mod summary;
pub mod transaction;

pub use budget::{MonthlyBudget, MonthlyBudgetPatch, DEFAULT_MONTHLY_BUDGET};
pub use category::{budget_percentage, Category, CategoryPatch};
pub use common::{Displayable, Identifiable};
pub use period::Period;
pub use summary::{
    BudgetOverview, BudgetStatus, CategorySpendingSummary, SpendingBucket, SpendingReport,
    TrendPoint,
};
pub use transaction::{Transaction, TransactionDraft, TransactionKind, TransactionPatch};
