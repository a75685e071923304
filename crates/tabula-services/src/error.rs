use tabula_core::TabulaError;
use thiserror::Error;
use uuid::Uuid;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service-level errors with user-friendly messages
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Edit session {0} not found")]
    SessionNotFound(Uuid),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("{0}")]
    Rejected(#[source] TabulaError),

    #[error("Save failed: {0}")]
    SaveFailed(#[source] TabulaError),

    #[error("Delete failed: {0}")]
    DeleteFailed(#[source] TabulaError),

    #[error("Table registry error: {0}")]
    RegistryFailed(#[source] TabulaError),

    #[error("Action cancelled")]
    Cancelled,
}

impl ServiceError {
    /// Map a registry lookup failure
    pub(crate) fn from_lookup(error: TabulaError) -> Self {
        match error {
            TabulaError::NotFound(what) => ServiceError::TableNotFound(what),
            other => ServiceError::RegistryFailed(other),
        }
    }
}
