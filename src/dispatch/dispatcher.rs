use chrono::{DateTime, Utc};
use futures::future::join_all;
use log::{debug, error, info};
use std::sync::Arc;

use super::retry::RetryPolicy;
use super::services::{NotificationService, ServiceError, ServiceErrorKind, SigningService};
use crate::directory::EmployeeRecord;
use crate::engine::{
    DocumentKind, FinalTask, Stage, StepKind, StepName, StepStatus, WorkflowInstance,
};
use crate::error::OnboardingError;
use crate::storage::{InstanceStore, StoreError};

/// Issues the external action behind a step with a two-phase record: the
/// dispatch intent is persisted before the call goes out, the confirmation
/// (and tracking handle) after it returns. A crash between the phases leaves
/// a `dispatch_intended` step with no tracking handle, which is safe to
/// re-issue on resume.
pub struct StepDispatcher {
    store: Arc<dyn InstanceStore>,
    signing: Arc<dyn SigningService>,
    notifier: Arc<dyn NotificationService>,
    retry: RetryPolicy,
    confirm_retries: usize,
}

impl StepDispatcher {
    pub fn new(
        store: Arc<dyn InstanceStore>,
        signing: Arc<dyn SigningService>,
        notifier: Arc<dyn NotificationService>,
    ) -> Self {
        Self {
            store,
            signing,
            notifier,
            retry: RetryPolicy::default(),
            confirm_retries: 3,
        }
    }

    pub fn with_retry_policy(mut self, value: RetryPolicy) -> Self {
        self.retry = value;
        self
    }

    pub fn with_confirm_retries(mut self, value: usize) -> Self {
        self.confirm_retries = value;
        self
    }

    /// Send a document chain's opening dispatch: the sent step's intent and
    /// the stage move are persisted together, then the signing call is made.
    pub async fn dispatch_document(
        &self,
        instance: &mut WorkflowInstance,
        employee: &EmployeeRecord,
        document: DocumentKind,
    ) -> Result<(), OnboardingError> {
        instance.step_mut(document.sent_step()).begin_dispatch();
        instance.stage = document.sent_stage();
        self.persist(instance).await?;
        debug!(
            "Recorded dispatch intent for '{}' on workflow '{}'",
            document.sent_step(),
            instance.thread_id
        );

        let thread_id = instance.thread_id.clone();
        self.call_and_confirm_document(&thread_id, employee, document)
            .await
    }

    /// Dispatch a chain's quiz after the signature arrived.
    pub async fn dispatch_quiz(
        &self,
        instance: &mut WorkflowInstance,
        employee: &EmployeeRecord,
        document: DocumentKind,
    ) -> Result<(), OnboardingError> {
        instance.step_mut(document.quiz_step()).begin_dispatch();
        instance.stage = document.quiz_stage();
        self.persist(instance).await?;

        let thread_id = instance.thread_id.clone();
        self.call_and_confirm_quiz(&thread_id, employee, document)
            .await
    }

    /// Re-send a quiz after a failed attempt. The step regresses from
    /// awaiting_result to dispatched while the notification goes back out.
    pub async fn redispatch_quiz(
        &self,
        instance: &mut WorkflowInstance,
        employee: &EmployeeRecord,
        document: DocumentKind,
        at: DateTime<Utc>,
    ) -> Result<(), OnboardingError> {
        let attempts = {
            let step = instance.step_mut(document.quiz_step());
            step.begin_retry();
            step.last_event_at = Some(at);
            step.attempt_count
        };
        self.persist(instance).await?;
        info!(
            "Re-sending quiz '{}' for workflow '{}' (attempt {})",
            document.quiz_name(),
            instance.thread_id,
            attempts
        );

        let thread_id = instance.thread_id.clone();
        self.call_and_confirm_quiz(&thread_id, employee, document)
            .await
    }

    /// Fan out the three provisioning tasks: one persisted mutation marks
    /// all three intents, the calls run concurrently, and one persisted
    /// mutation records the outcomes. A failed sibling blocks nothing.
    pub async fn dispatch_final_tasks(
        &self,
        instance: &mut WorkflowInstance,
        employee: &EmployeeRecord,
    ) -> Result<(), OnboardingError> {
        for task in FinalTask::ALL {
            instance.step_mut(task.step()).begin_dispatch();
        }
        instance.stage = Stage::ParallelDispatched;
        self.persist(instance).await?;

        let thread_id = instance.thread_id.clone();
        info!(
            "Dispatching {} provisioning tasks for workflow '{}'",
            FinalTask::ALL.len(),
            thread_id
        );

        let calls = FinalTask::ALL.map(|task| {
            let label = format!("task notification '{}'", task);
            async move {
                let result = self
                    .retry
                    .run(&label, || self.notifier.send_task_notification(employee, task))
                    .await;
                (task, result)
            }
        });
        let outcomes = join_all(calls).await;

        for (task, result) in &outcomes {
            if let Err(error) = result {
                error!(
                    "Task notification '{}' failed for workflow '{}': {}",
                    task, thread_id, error
                );
            }
        }

        self.confirm(&thread_id, |inst| {
            for (task, result) in &outcomes {
                inst.step_mut(task.step()).status = match result {
                    Ok(()) => StepStatus::AwaitingResult,
                    Err(error) => failed_status(error),
                };
            }
        })
        .await
    }

    /// Operator re-arm of a failed step: a fresh intent is persisted and the
    /// call is made again.
    pub async fn redispatch(
        &self,
        instance: &mut WorkflowInstance,
        employee: &EmployeeRecord,
        step: StepName,
    ) -> Result<(), OnboardingError> {
        instance.step_mut(step).begin_dispatch();
        self.persist(instance).await?;
        info!(
            "Re-dispatching step '{}' of workflow '{}'",
            step, instance.thread_id
        );

        let thread_id = instance.thread_id.clone();
        self.issue_step(&thread_id, employee, step).await
    }

    /// Re-drive a step whose intent was persisted but whose call never
    /// completed. No new intent is written.
    pub async fn resume_step(
        &self,
        thread_id: &str,
        employee: &EmployeeRecord,
        step: StepName,
    ) -> Result<(), OnboardingError> {
        info!(
            "Re-issuing interrupted dispatch for step '{}' of workflow '{}'",
            step, thread_id
        );
        self.issue_step(thread_id, employee, step).await
    }

    async fn issue_step(
        &self,
        thread_id: &str,
        employee: &EmployeeRecord,
        step: StepName,
    ) -> Result<(), OnboardingError> {
        match step.kind() {
            StepKind::DocumentSend(document) => {
                self.call_and_confirm_document(thread_id, employee, document)
                    .await
            }
            StepKind::Quiz(document) => {
                self.call_and_confirm_quiz(thread_id, employee, document)
                    .await
            }
            StepKind::FinalTask(task) => {
                self.call_and_confirm_task(thread_id, employee, task).await
            }
            // Signature waits carry no outbound call.
            StepKind::SignatureWait(_) => Ok(()),
        }
    }

    async fn call_and_confirm_document(
        &self,
        thread_id: &str,
        employee: &EmployeeRecord,
        document: DocumentKind,
    ) -> Result<(), OnboardingError> {
        let label = format!("document dispatch '{}'", document);
        match self
            .retry
            .run(&label, || self.signing.send_document(employee, document))
            .await
        {
            Ok(tracking_id) => {
                info!(
                    "Document '{}' dispatched for workflow '{}' (tracking '{}')",
                    document, thread_id, tracking_id
                );
                self.confirm(thread_id, |inst| {
                    let sent = inst.step_mut(document.sent_step());
                    sent.status = StepStatus::Dispatched;
                    sent.tracking_id = Some(tracking_id.clone());
                    // The signature wait watches the same envelope.
                    let signed = inst.step_mut(document.signed_step());
                    signed.status = StepStatus::AwaitingResult;
                    signed.tracking_id = Some(tracking_id.clone());
                })
                .await
            }
            Err(error) => {
                error!(
                    "Document dispatch '{}' failed for workflow '{}': {}",
                    document, thread_id, error
                );
                let status = failed_status(&error);
                self.confirm(thread_id, |inst| {
                    inst.step_mut(document.sent_step()).status = status;
                })
                .await
            }
        }
    }

    async fn call_and_confirm_quiz(
        &self,
        thread_id: &str,
        employee: &EmployeeRecord,
        document: DocumentKind,
    ) -> Result<(), OnboardingError> {
        let label = format!("quiz notification '{}'", document.quiz_name());
        match self
            .retry
            .run(&label, || self.notifier.send_quiz_notification(employee, document))
            .await
        {
            Ok(()) => {
                self.confirm(thread_id, |inst| {
                    inst.step_mut(document.quiz_step()).status = StepStatus::AwaitingResult;
                })
                .await
            }
            Err(error) => {
                error!(
                    "Quiz notification '{}' failed for workflow '{}': {}",
                    document.quiz_name(),
                    thread_id,
                    error
                );
                let status = failed_status(&error);
                self.confirm(thread_id, |inst| {
                    inst.step_mut(document.quiz_step()).status = status;
                })
                .await
            }
        }
    }

    async fn call_and_confirm_task(
        &self,
        thread_id: &str,
        employee: &EmployeeRecord,
        task: FinalTask,
    ) -> Result<(), OnboardingError> {
        let label = format!("task notification '{}'", task);
        match self
            .retry
            .run(&label, || self.notifier.send_task_notification(employee, task))
            .await
        {
            Ok(()) => {
                self.confirm(thread_id, |inst| {
                    inst.step_mut(task.step()).status = StepStatus::AwaitingResult;
                })
                .await
            }
            Err(error) => {
                error!(
                    "Task notification '{}' failed for workflow '{}': {}",
                    task, thread_id, error
                );
                let status = failed_status(&error);
                self.confirm(thread_id, |inst| {
                    inst.step_mut(task.step()).status = status;
                })
                .await
            }
        }
    }

    async fn persist(&self, instance: &mut WorkflowInstance) -> Result<(), OnboardingError> {
        instance.touch(Utc::now());
        Ok(self.store.put_versioned(instance).await?)
    }

    /// Persist a dispatch outcome against the freshest copy of the instance.
    /// Conflicts are resolved by re-reading, since the mutation only touches
    /// the dispatched step itself.
    async fn confirm<F>(&self, thread_id: &str, mutate: F) -> Result<(), OnboardingError>
    where
        F: Fn(&mut WorkflowInstance),
    {
        let mut attempts = 0;
        loop {
            attempts += 1;
            let mut instance = self
                .store
                .get(thread_id)
                .await?
                .ok_or_else(|| OnboardingError::UnknownThread(thread_id.to_string()))?;
            mutate(&mut instance);
            instance.touch(Utc::now());

            match self.store.put_versioned(&instance).await {
                Ok(()) => return Ok(()),
                Err(StoreError::VersionConflict(_)) if attempts <= self.confirm_retries => {
                    debug!(
                        "Version conflict confirming dispatch on workflow '{}', retrying",
                        thread_id
                    );
                }
                Err(StoreError::VersionConflict(_)) => {
                    return Err(OnboardingError::ConcurrencyConflict {
                        thread_id: thread_id.to_string(),
                        attempts,
                    });
                }
                Err(error) => return Err(error.into()),
            }
        }
    }
}

fn failed_status(error: &ServiceError) -> StepStatus {
    match error.kind {
        ServiceErrorKind::Transient => StepStatus::FailedTransient,
        ServiceErrorKind::Permanent => StepStatus::FailedPermanent,
    }
}
