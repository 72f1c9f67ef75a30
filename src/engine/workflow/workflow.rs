use chrono::Utc;
use log::{debug, info, warn};
use std::sync::Arc;

use super::super::event::{Event, EventOutcome};
use super::super::instance::{WorkflowInstance, WorkflowStatus};
use super::super::options::EngineOptions;
use super::super::stage::Stage;
use super::super::step::{DocumentKind, StepName, StepStatus};
use super::super::transition::{self, Evaluation, Transition};
use crate::directory::{EmployeeDirectory, EmployeeRecord};
use crate::dispatch::{NotificationService, SigningService, StepDispatcher};
use crate::error::OnboardingError;
use crate::storage::{InstanceStore, StoreError};

/// The orchestrator. Owns one state machine per onboarding employee and
/// drives it from inbound events, persisting every mutation through the
/// version-checked instance store.
pub struct OnboardingEngine {
    /// Storage backend for persisting workflow instances
    store: Arc<dyn InstanceStore>,
    /// Employee record lookup, an external collaborator
    directory: Arc<dyn EmployeeDirectory>,
    /// Issues external calls with the two-phase dispatch record
    dispatcher: StepDispatcher,
    options: EngineOptions,
}

impl OnboardingEngine {
    pub fn new(
        store: Arc<dyn InstanceStore>,
        directory: Arc<dyn EmployeeDirectory>,
        signing: Arc<dyn SigningService>,
        notifier: Arc<dyn NotificationService>,
    ) -> Self {
        Self {
            dispatcher: StepDispatcher::new(store.clone(), signing, notifier),
            store,
            directory,
            options: EngineOptions::default(),
        }
    }

    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.dispatcher = self
            .dispatcher
            .with_retry_policy(options.retry_policy.clone())
            .with_confirm_retries(options.conflict_retries);
        self.options = options;
        self
    }

    /// Create a workflow for an employee and dispatch the first document.
    /// Fails if the employee is unknown or already mid-onboarding.
    pub async fn start(&self, employee_id: &str) -> Result<String, OnboardingError> {
        let employee = self.employee(employee_id).await?;

        if let Some(existing) = self.store.find_by_employee(employee_id).await? {
            if !existing.is_terminal() {
                return Err(OnboardingError::DuplicateActiveWorkflow(
                    employee_id.to_string(),
                ));
            }
        }

        let mut instance = WorkflowInstance::new(employee_id);
        self.store.insert(&instance).await?;
        info!(
            "Started onboarding workflow '{}' for employee '{}'",
            instance.thread_id, employee_id
        );

        self.dispatcher
            .dispatch_document(&mut instance, &employee, DocumentKind::CompanyPolicy)
            .await?;

        Ok(instance.thread_id)
    }

    pub async fn get_status(&self, thread_id: &str) -> Result<WorkflowStatus, OnboardingError> {
        let instance = self
            .store
            .get(thread_id)
            .await?
            .ok_or_else(|| OnboardingError::UnknownThread(thread_id.to_string()))?;
        Ok(instance.snapshot())
    }

    /// Apply one inbound event: read the employee's instance, classify the
    /// event, run the matching transition and persist. A version conflict
    /// restarts the whole cycle, up to the configured bound.
    ///
    /// Safe to call concurrently; the event ingestor additionally orders
    /// calls per employee so retries stay rare.
    pub async fn apply_event(&self, event: &Event) -> Result<EventOutcome, OnboardingError> {
        let mut attempts = 0;
        loop {
            attempts += 1;
            let mut instance = self
                .store
                .find_by_employee(&event.employee_id)
                .await?
                .ok_or_else(|| OnboardingError::UnknownEmployee(event.employee_id.clone()))?;

            match transition::evaluate(&instance, &event.kind) {
                Evaluation::Duplicate => {
                    debug!(
                        "Duplicate event {} for employee '{}' acknowledged",
                        event.kind, event.employee_id
                    );
                    return Ok(EventOutcome::Duplicate);
                }
                Evaluation::Stale => {
                    warn!(
                        "Discarding stale event {} for employee '{}' at stage '{}'",
                        event.kind, event.employee_id, instance.stage
                    );
                    return Ok(EventOutcome::Stale);
                }
                Evaluation::Apply(transition) => {
                    match self.perform(&mut instance, transition, event).await {
                        Ok(()) => return Ok(EventOutcome::Applied),
                        Err(OnboardingError::Store(StoreError::VersionConflict(_)))
                            if attempts <= self.options.conflict_retries =>
                        {
                            debug!(
                                "Version conflict applying event for employee '{}', retrying",
                                event.employee_id
                            );
                        }
                        Err(OnboardingError::Store(StoreError::VersionConflict(_))) => {
                            return Err(OnboardingError::ConcurrencyConflict {
                                thread_id: instance.thread_id.clone(),
                                attempts,
                            });
                        }
                        Err(error) => return Err(error),
                    }
                }
            }
        }
    }

    /// Re-drive dispatches interrupted by a crash. Steps whose intent was
    /// persisted without a confirmed call are re-issued; dispatched and
    /// awaiting steps are left to their inbound events.
    pub async fn resume(&self, thread_id: &str) -> Result<(), OnboardingError> {
        let instance = self
            .store
            .get(thread_id)
            .await?
            .ok_or_else(|| OnboardingError::UnknownThread(thread_id.to_string()))?;

        if instance.is_terminal() {
            debug!("Workflow '{}' is terminal; nothing to resume", thread_id);
            return Ok(());
        }

        let interrupted: Vec<StepName> = StepName::ALL
            .iter()
            .copied()
            .filter(|name| {
                instance
                    .step(*name)
                    .map(|step| {
                        step.status == StepStatus::DispatchIntended && step.tracking_id.is_none()
                    })
                    .unwrap_or(false)
            })
            .collect();

        if interrupted.is_empty() {
            debug!("Workflow '{}' has no interrupted dispatches", thread_id);
            return Ok(());
        }

        let employee = self.employee(&instance.employee_id).await?;
        for step in interrupted {
            self.dispatcher
                .resume_step(thread_id, &employee, step)
                .await?;
        }
        Ok(())
    }

    /// Operator re-arm of a step stuck in a failed state.
    pub async fn redispatch_step(
        &self,
        thread_id: &str,
        step: StepName,
    ) -> Result<(), OnboardingError> {
        let mut instance = self
            .store
            .get(thread_id)
            .await?
            .ok_or_else(|| OnboardingError::UnknownThread(thread_id.to_string()))?;

        if !instance.step_status(step).is_failed() {
            return Err(OnboardingError::StepNotFailed {
                thread_id: thread_id.to_string(),
                step,
            });
        }

        let employee = self.employee(&instance.employee_id).await?;
        self.dispatcher
            .redispatch(&mut instance, &employee, step)
            .await
    }

    pub(crate) async fn employee_finished(
        &self,
        employee_id: &str,
    ) -> Result<bool, OnboardingError> {
        Ok(self
            .store
            .find_by_employee(employee_id)
            .await?
            .map(|instance| instance.is_terminal())
            .unwrap_or(false))
    }

    async fn perform(
        &self,
        instance: &mut WorkflowInstance,
        transition: Transition,
        event: &Event,
    ) -> Result<(), OnboardingError> {
        let at = event.received_at;
        match transition {
            Transition::DocumentAcked { document } => {
                instance.step_mut(document.sent_step()).complete(at);
                debug!(
                    "Delivery of '{}' acknowledged on workflow '{}'",
                    document, instance.thread_id
                );
                self.persist(instance).await
            }
            Transition::DocumentSigned { document } => {
                let employee = self.employee(&instance.employee_id).await?;
                let sent = instance.step_mut(document.sent_step());
                if !sent.is_complete() {
                    // A signature implies the delivery, even if the ack was lost.
                    sent.complete(at);
                }
                instance.step_mut(document.signed_step()).complete(at);
                info!(
                    "Document '{}' signed on workflow '{}'",
                    document, instance.thread_id
                );
                self.dispatcher
                    .dispatch_quiz(instance, &employee, document)
                    .await
            }
            Transition::QuizFailed { document } => {
                let employee = self.employee(&instance.employee_id).await?;
                self.dispatcher
                    .redispatch_quiz(instance, &employee, document, at)
                    .await
            }
            Transition::QuizPassed { document } => {
                let employee = self.employee(&instance.employee_id).await?;
                instance.step_mut(document.quiz_step()).complete(at);
                info!(
                    "Quiz '{}' passed on workflow '{}'",
                    document.quiz_name(),
                    instance.thread_id
                );
                match document.next() {
                    Some(next) => {
                        self.dispatcher
                            .dispatch_document(instance, &employee, next)
                            .await
                    }
                    None => {
                        self.dispatcher
                            .dispatch_final_tasks(instance, &employee)
                            .await
                    }
                }
            }
            Transition::TaskFinished { task } => {
                instance.step_mut(task.step()).complete(at);
                if instance.parallel_complete() {
                    instance.stage = Stage::Complete;
                    info!(
                        "Workflow '{}' complete for employee '{}'",
                        instance.thread_id, instance.employee_id
                    );
                } else {
                    debug!(
                        "Task '{}' finished on workflow '{}'",
                        task, instance.thread_id
                    );
                }
                self.persist(instance).await
            }
        }
    }

    async fn persist(&self, instance: &mut WorkflowInstance) -> Result<(), OnboardingError> {
        instance.touch(Utc::now());
        Ok(self.store.put_versioned(instance).await?)
    }

    async fn employee(&self, employee_id: &str) -> Result<EmployeeRecord, OnboardingError> {
        self.directory
            .find(employee_id)
            .await
            .map_err(OnboardingError::Directory)?
            .ok_or_else(|| OnboardingError::UnknownEmployee(employee_id.to_string()))
    }
}
