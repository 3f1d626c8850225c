pub mod alert_service;
pub mod budget_service;
pub mod category_service;
pub mod spending_service;
pub mod transaction_service;

pub use alert_service::{
    AlertEvaluator, AlertKey, AlertKind, AlertRecord, AlertState, AlertStore, BudgetAlert,
    DEFAULT_ALERT_MAX_AGE_HOURS,
};
pub use budget_service::BudgetService;
pub use category_service::{CategoryRemoval, CategoryService};
pub use spending_service::SpendingAggregator;
pub use transaction_service::TransactionService;

use crate::errors::BudgetError;

pub type ServiceResult<T> = Result<T, BudgetError>;
