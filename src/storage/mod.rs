use thiserror::Error;

pub mod implementations;
pub use implementations::*;

use crate::engine::WorkflowInstance;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("workflow '{0}' not found")]
    NotFound(String),

    #[error("workflow '{0}' already exists")]
    AlreadyExists(String),

    #[error("version conflict on workflow '{0}'")]
    VersionConflict(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[async_trait::async_trait]
pub trait InstanceStore: Send + Sync {
    async fn init(&self) -> Result<(), StoreError>;

    /// Insert a brand-new instance under an unused thread id.
    async fn insert(&self, instance: &WorkflowInstance) -> Result<(), StoreError>;

    async fn get(&self, thread_id: &str) -> Result<Option<WorkflowInstance>, StoreError>;

    /// The employee's most recently created instance, terminal or not.
    async fn find_by_employee(
        &self,
        employee_id: &str,
    ) -> Result<Option<WorkflowInstance>, StoreError>;

    /// Compare-and-swap write: succeeds only when the stored version is
    /// exactly one behind the incoming instance's version.
    async fn put_versioned(&self, instance: &WorkflowInstance) -> Result<(), StoreError>;

    /// Thread ids of instances that have not reached a terminal stage.
    async fn list_active(&self) -> Result<Vec<String>, StoreError>;
}
