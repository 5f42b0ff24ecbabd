//! Error type for transactional workflows.

use domain::MembershipError;
use thiserror::Error;

/// Failure of a repository workflow that runs inside a transaction.
///
/// Any error rolls the transaction back.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Rejected(#[from] MembershipError),
}

impl WorkflowError {
    /// Returns the domain rejection, if this is one.
    pub fn rejection(&self) -> Option<&MembershipError> {
        match self {
            WorkflowError::Rejected(e) => Some(e),
            WorkflowError::Database(_) => None,
        }
    }
}
