use thiserror::Error;
use uuid::Uuid;

/// Error type shared by the stores, services, and dashboard.
#[derive(Debug, Error)]
pub enum BudgetError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Load failed: {0}")]
    LoadFailure(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BudgetError>;

impl BudgetError {
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Only load failures offer a retry action; everything else is final.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::LoadFailure(_))
    }

    /// Text suitable for a toast or status line.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::NotFound { entity, .. } => format!("{entity} not found"),
            Self::LoadFailure(_) => "Failed to load your budget dashboard".into(),
            other => other.to_string(),
        }
    }
}
