use thiserror::Error;

use crate::engine::StepName;
use crate::storage::StoreError;

/// Errors surfaced by the orchestrator's public operations.
#[derive(Debug, Error)]
pub enum OnboardingError {
    #[error("unknown employee '{0}'")]
    UnknownEmployee(String),

    #[error("employee '{0}' already has an active onboarding workflow")]
    DuplicateActiveWorkflow(String),

    #[error("unknown workflow thread '{0}'")]
    UnknownThread(String),

    #[error("gave up on workflow '{thread_id}' after {attempts} version conflicts")]
    ConcurrencyConflict { thread_id: String, attempts: usize },

    #[error("step '{step}' of workflow '{thread_id}' is not in a failed state")]
    StepNotFailed { thread_id: String, step: StepName },

    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    #[error("employee directory error: {0}")]
    Directory(#[source] Box<dyn std::error::Error + Send + Sync>),
}
