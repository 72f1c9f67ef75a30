use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::stage::Stage;
use super::step::{FinalTask, StepName, StepState, StepStatus};

/// One employee's onboarding workflow, the unit of orchestration and the
/// document persisted by the instance store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowInstance {
    pub thread_id: String,
    pub employee_id: String,
    pub stage: Stage,
    pub steps: BTreeMap<StepName, StepState>,
    /// Incremented on every persisted mutation; the store rejects writes
    /// whose version is not exactly one ahead of the stored one.
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkflowInstance {
    pub fn new(employee_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            thread_id: format!("thread_{}", Uuid::new_v4()),
            employee_id: employee_id.into(),
            stage: Stage::NotStarted,
            steps: StepName::ALL
                .iter()
                .map(|name| (*name, StepState::new()))
                .collect(),
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn step(&self, name: StepName) -> Option<&StepState> {
        self.steps.get(&name)
    }

    pub fn step_status(&self, name: StepName) -> StepStatus {
        self.steps
            .get(&name)
            .map(|step| step.status)
            .unwrap_or(StepStatus::NotStarted)
    }

    pub fn step_mut(&mut self, name: StepName) -> &mut StepState {
        self.steps.entry(name).or_default()
    }

    pub fn completed_steps(&self) -> usize {
        self.steps.values().filter(|step| step.is_complete()).count()
    }

    /// Completed steps over the twelve total, as a percentage rounded to
    /// two decimals.
    pub fn progress_percent(&self) -> f64 {
        let fraction = self.completed_steps() as f64 / StepName::ALL.len() as f64;
        (fraction * 100.0 * 100.0).round() / 100.0
    }

    pub fn parallel_complete(&self) -> bool {
        FinalTask::ALL
            .iter()
            .all(|task| self.step_status(task.step()) == StepStatus::Complete)
    }

    pub fn is_terminal(&self) -> bool {
        self.stage.is_terminal()
    }

    /// Bump the version ahead of the next persisted mutation.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.version += 1;
        self.updated_at = now;
    }

    pub fn snapshot(&self) -> WorkflowStatus {
        WorkflowStatus {
            thread_id: self.thread_id.clone(),
            employee_id: self.employee_id.clone(),
            stage: self.stage,
            progress_percent: self.progress_percent(),
            steps: self.steps.clone(),
        }
    }
}

/// Read-only status view returned by `get_status`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowStatus {
    pub thread_id: String,
    pub employee_id: String,
    pub stage: Stage,
    pub progress_percent: f64,
    pub steps: BTreeMap<StepName, StepState>,
}

#[cfg(test)]
mod tests;
