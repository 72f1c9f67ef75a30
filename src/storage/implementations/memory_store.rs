use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::engine::{Stage, WorkflowInstance};
use crate::storage::{InstanceStore, StoreError};

/// In-memory implementation of InstanceStore for testing
#[derive(Clone)]
pub struct MemoryStore {
    instances: Arc<Mutex<HashMap<String, WorkflowInstance>>>,
    write_calls: Arc<Mutex<Vec<(String, u64, Stage)>>>,
}

impl MemoryStore {
    /// Create a new empty memory store
    pub fn new() -> Self {
        Self {
            instances: Arc::new(Mutex::new(HashMap::new())),
            write_calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Get a copy of a stored instance without going through the trait
    pub fn snapshot(&self, thread_id: &str) -> Option<WorkflowInstance> {
        self.instances.lock().unwrap().get(thread_id).cloned()
    }

    /// Get all versioned writes made to this store
    pub fn get_write_calls(&self) -> Vec<(String, u64, Stage)> {
        self.write_calls.lock().unwrap().clone()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InstanceStore for MemoryStore {
    async fn init(&self) -> Result<(), StoreError> {
        // Nothing to initialize for in-memory storage
        Ok(())
    }

    async fn insert(&self, instance: &WorkflowInstance) -> Result<(), StoreError> {
        let mut instances = self.instances.lock().unwrap();
        if instances.contains_key(&instance.thread_id) {
            return Err(StoreError::AlreadyExists(instance.thread_id.clone()));
        }
        instances.insert(instance.thread_id.clone(), instance.clone());
        Ok(())
    }

    async fn get(&self, thread_id: &str) -> Result<Option<WorkflowInstance>, StoreError> {
        Ok(self.instances.lock().unwrap().get(thread_id).cloned())
    }

    async fn find_by_employee(
        &self,
        employee_id: &str,
    ) -> Result<Option<WorkflowInstance>, StoreError> {
        let instances = self.instances.lock().unwrap();
        Ok(instances
            .values()
            .filter(|instance| instance.employee_id == employee_id)
            .max_by_key(|instance| instance.created_at)
            .cloned())
    }

    async fn put_versioned(&self, instance: &WorkflowInstance) -> Result<(), StoreError> {
        let mut instances = self.instances.lock().unwrap();
        let stored = instances
            .get(&instance.thread_id)
            .ok_or_else(|| StoreError::NotFound(instance.thread_id.clone()))?;

        if stored.version + 1 != instance.version {
            return Err(StoreError::VersionConflict(instance.thread_id.clone()));
        }

        // Record the accepted write
        {
            let mut calls = self.write_calls.lock().unwrap();
            calls.push((instance.thread_id.clone(), instance.version, instance.stage));
        }

        instances.insert(instance.thread_id.clone(), instance.clone());
        Ok(())
    }

    async fn list_active(&self) -> Result<Vec<String>, StoreError> {
        let instances = self.instances.lock().unwrap();
        Ok(instances
            .values()
            .filter(|instance| !instance.stage.is_terminal())
            .map(|instance| instance.thread_id.clone())
            .collect())
    }
}
