use async_trait::async_trait;
use sqlx::{sqlite::SqlitePoolOptions, Pool, Row, Sqlite};

use crate::engine::{Stage, WorkflowInstance};
use crate::storage::{InstanceStore, StoreError};

pub struct SqliteStore {
    pub pool: Pool<Sqlite>,
}

impl SqliteStore {
    pub async fn new(database_url: &str) -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl InstanceStore for SqliteStore {
    async fn init(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS instances (
                thread_id TEXT PRIMARY KEY,
                employee_id TEXT NOT NULL,
                stage TEXT NOT NULL,
                version INTEGER NOT NULL,
                instance TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_instances_employee
            ON instances (employee_id)
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn insert(&self, instance: &WorkflowInstance) -> Result<(), StoreError> {
        let document = serde_json::to_string(instance)?;
        sqlx::query(
            r#"
            INSERT INTO instances (thread_id, employee_id, stage, version, instance, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&instance.thread_id)
        .bind(&instance.employee_id)
        .bind(instance.stage.as_str())
        .bind(instance.version as i64)
        .bind(document)
        .bind(instance.created_at.to_rfc3339())
        .bind(instance.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, thread_id: &str) -> Result<Option<WorkflowInstance>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT instance
            FROM instances
            WHERE thread_id = ?
            "#,
        )
        .bind(thread_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let document: String = row.get(0);
                Ok(Some(serde_json::from_str(&document)?))
            }
            None => Ok(None),
        }
    }

    async fn find_by_employee(
        &self,
        employee_id: &str,
    ) -> Result<Option<WorkflowInstance>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT instance
            FROM instances
            WHERE employee_id = ?
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(employee_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let document: String = row.get(0);
                Ok(Some(serde_json::from_str(&document)?))
            }
            None => Ok(None),
        }
    }

    async fn put_versioned(&self, instance: &WorkflowInstance) -> Result<(), StoreError> {
        let document = serde_json::to_string(instance)?;
        let result = sqlx::query(
            r#"
            UPDATE instances
            SET stage = ?, version = ?, instance = ?, updated_at = ?
            WHERE thread_id = ? AND version = ?
            "#,
        )
        .bind(instance.stage.as_str())
        .bind(instance.version as i64)
        .bind(document)
        .bind(instance.updated_at.to_rfc3339())
        .bind(&instance.thread_id)
        .bind((instance.version - 1) as i64)
        .execute(&self.pool)
        .await?;

        // A missing row and a lost race look the same here; both mean the
        // caller must re-read before writing again.
        if result.rows_affected() == 0 {
            return Err(StoreError::VersionConflict(instance.thread_id.clone()));
        }
        Ok(())
    }

    async fn list_active(&self) -> Result<Vec<String>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT thread_id
            FROM instances
            WHERE stage NOT IN (?, ?)
            "#,
        )
        .bind(Stage::Complete.as_str())
        .bind(Stage::Failed.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|row| row.get(0)).collect())
    }
}
