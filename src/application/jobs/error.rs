use thiserror::Error;

use crate::domain::foundation::DomainError;
use crate::ports::MailError;

/// Errors that abort a whole job run.
///
/// Per-item failures are logged and counted in the job report instead.
#[derive(Debug, Clone, Error)]
pub enum JobError {
    #[error("Repository error: {0}")]
    Repository(#[from] DomainError),

    #[error("Mail error: {0}")]
    Mail(#[from] MailError),
}
