use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

/// What the orchestrator needs to know about an employee to address
/// documents and notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub id: String,
    pub email: String,
    pub name: String,
}

/// The employee record store. Lives outside the orchestrator; only the
/// lookup is specified here.
#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    async fn find(
        &self,
        employee_id: &str,
    ) -> Result<Option<EmployeeRecord>, Box<dyn Error + Send + Sync>>;
}

/// In-memory directory for demos and tests.
#[derive(Clone)]
pub struct MemoryDirectory {
    employees: Arc<Mutex<HashMap<String, EmployeeRecord>>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self {
            employees: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn insert(&self, record: EmployeeRecord) {
        self.employees
            .lock()
            .unwrap()
            .insert(record.id.clone(), record);
    }
}

impl Default for MemoryDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmployeeDirectory for MemoryDirectory {
    async fn find(
        &self,
        employee_id: &str,
    ) -> Result<Option<EmployeeRecord>, Box<dyn Error + Send + Sync>> {
        Ok(self.employees.lock().unwrap().get(employee_id).cloned())
    }
}
