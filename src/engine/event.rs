use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::step::{DocumentKind, FinalTask};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Sent,
    Signed,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Sent => "sent",
            DocumentStatus::Signed => "signed",
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An inbound notification from the signing service, the quiz channel or the
/// provisioning tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    DocumentStatus {
        document: DocumentKind,
        status: DocumentStatus,
    },
    QuizResult {
        quiz: DocumentKind,
        score: u32,
        passed: bool,
        attempt_number: u32,
    },
    TaskDone {
        task: FinalTask,
    },
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::DocumentStatus { document, status } => {
                write!(f, "document_status({}, {})", document, status)
            }
            EventKind::QuizResult { quiz, passed, attempt_number, .. } => {
                write!(
                    f,
                    "quiz_result({}, {}, attempt {})",
                    quiz.quiz_name(),
                    if *passed { "passed" } else { "failed" },
                    attempt_number
                )
            }
            EventKind::TaskDone { task } => write!(f, "task_done({})", task),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub employee_id: String,
    pub kind: EventKind,
    pub received_at: DateTime<Utc>,
}

impl Event {
    pub fn document_status(
        employee_id: impl Into<String>,
        document: DocumentKind,
        status: DocumentStatus,
    ) -> Self {
        Self {
            employee_id: employee_id.into(),
            kind: EventKind::DocumentStatus { document, status },
            received_at: Utc::now(),
        }
    }

    pub fn quiz_result(
        employee_id: impl Into<String>,
        quiz: DocumentKind,
        score: u32,
        passed: bool,
        attempt_number: u32,
    ) -> Self {
        Self {
            employee_id: employee_id.into(),
            kind: EventKind::QuizResult {
                quiz,
                score,
                passed,
                attempt_number,
            },
            received_at: Utc::now(),
        }
    }

    pub fn task_done(employee_id: impl Into<String>, task: FinalTask) -> Self {
        Self {
            employee_id: employee_id.into(),
            kind: EventKind::TaskDone { task },
            received_at: Utc::now(),
        }
    }
}

/// How the orchestrator handled an ingested event. Duplicates and stale
/// deliveries are acknowledged, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Applied,
    Duplicate,
    Stale,
}
