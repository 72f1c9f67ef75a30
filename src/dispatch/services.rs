use async_trait::async_trait;
use chrono::Utc;
use log::info;
use std::fmt;
use thiserror::Error;

use crate::directory::EmployeeRecord;
use crate::engine::{DocumentKind, FinalTask};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceErrorKind {
    /// Timeouts, connection resets, 5xx responses. Worth retrying.
    Transient,
    /// Validation failures, malformed responses. Retrying cannot help.
    Permanent,
}

impl ServiceErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceErrorKind::Transient => "transient",
            ServiceErrorKind::Permanent => "permanent",
        }
    }
}

impl fmt::Display for ServiceErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An external call failure, classified so the retry controller knows
/// whether another attempt makes sense.
#[derive(Debug, Clone, Error)]
#[error("{kind} service error: {message}")]
pub struct ServiceError {
    pub kind: ServiceErrorKind,
    pub message: String,
}

impl ServiceError {
    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            kind: ServiceErrorKind::Transient,
            message: message.into(),
        }
    }

    pub fn permanent(message: impl Into<String>) -> Self {
        Self {
            kind: ServiceErrorKind::Permanent,
            message: message.into(),
        }
    }

    pub fn is_transient(&self) -> bool {
        self.kind == ServiceErrorKind::Transient
    }
}

/// The external e-signature service.
#[async_trait]
pub trait SigningService: Send + Sync {
    /// Send a document out for signature, returning the provider's
    /// tracking handle.
    async fn send_document(
        &self,
        employee: &EmployeeRecord,
        document: DocumentKind,
    ) -> Result<String, ServiceError>;
}

/// The notification channel for quiz invitations and provisioning tasks.
#[async_trait]
pub trait NotificationService: Send + Sync {
    async fn send_quiz_notification(
        &self,
        employee: &EmployeeRecord,
        quiz: DocumentKind,
    ) -> Result<(), ServiceError>;

    async fn send_task_notification(
        &self,
        employee: &EmployeeRecord,
        task: FinalTask,
    ) -> Result<(), ServiceError>;
}

/// A stand-in signing service that fabricates tracking handles, for demos
/// and tests.
pub struct SimulatedSigningService;

#[async_trait]
impl SigningService for SimulatedSigningService {
    async fn send_document(
        &self,
        employee: &EmployeeRecord,
        document: DocumentKind,
    ) -> Result<String, ServiceError> {
        info!(
            "Simulated send of '{}' to {} for signature",
            document, employee.email
        );
        Ok(format!("sim_{}_{}", document.as_str(), Utc::now().timestamp()))
    }
}

/// A stand-in notification channel that only logs, for demos and tests.
pub struct SimulatedNotificationService;

#[async_trait]
impl NotificationService for SimulatedNotificationService {
    async fn send_quiz_notification(
        &self,
        employee: &EmployeeRecord,
        quiz: DocumentKind,
    ) -> Result<(), ServiceError> {
        info!("Simulated '{}' invitation to {}", quiz.quiz_name(), employee.email);
        Ok(())
    }

    async fn send_task_notification(
        &self,
        employee: &EmployeeRecord,
        task: FinalTask,
    ) -> Result<(), ServiceError> {
        info!("Simulated '{}' notification for {}", task, employee.email);
        Ok(())
    }
}
