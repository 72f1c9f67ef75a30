//! The transition table of the onboarding state machine.
//!
//! `evaluate` is a pure function over the persisted instance and an inbound
//! event. It classifies the event before any transition fires: an event whose
//! outcome is already recorded is a duplicate, an event that does not match
//! the current stage is stale. The duplicate check runs first, so redelivered
//! notifications are acknowledged even after the workflow has moved on.

use super::event::{DocumentStatus, EventKind};
use super::instance::WorkflowInstance;
use super::stage::Stage;
use super::step::{DocumentKind, FinalTask, StepStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Delivery acknowledged; the sent step completes, the stage holds.
    DocumentAcked { document: DocumentKind },
    /// Signature received; the chain's quiz is dispatched next.
    DocumentSigned { document: DocumentKind },
    /// Quiz failed; the quiz notification is re-sent, the stage holds.
    QuizFailed { document: DocumentKind },
    /// Quiz passed; the next chain starts, or the final fan-out begins.
    QuizPassed { document: DocumentKind },
    /// One provisioning task finished.
    TaskFinished { task: FinalTask },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    Apply(Transition),
    Duplicate,
    Stale,
}

pub fn evaluate(instance: &WorkflowInstance, event: &EventKind) -> Evaluation {
    if is_duplicate(instance, event) {
        return Evaluation::Duplicate;
    }
    match transition_for(instance.stage, event) {
        Some(transition) => Evaluation::Apply(transition),
        None => Evaluation::Stale,
    }
}

/// True when the event's outcome is already recorded on the instance.
fn is_duplicate(instance: &WorkflowInstance, event: &EventKind) -> bool {
    match event {
        EventKind::DocumentStatus {
            document,
            status: DocumentStatus::Sent,
        } => instance.step_status(document.sent_step()) == StepStatus::Complete,
        EventKind::DocumentStatus {
            document,
            status: DocumentStatus::Signed,
        } => instance.step_status(document.signed_step()) == StepStatus::Complete,
        EventKind::QuizResult { quiz, passed: true, .. } => {
            instance.step_status(quiz.quiz_step()) == StepStatus::Complete
        }
        // A failed attempt is acted on by bumping the step's attempt count,
        // so any result numbered below the current count was already handled.
        EventKind::QuizResult {
            quiz,
            passed: false,
            attempt_number,
            ..
        } => {
            let attempts = instance
                .step(quiz.quiz_step())
                .map(|step| step.attempt_count)
                .unwrap_or(0);
            *attempt_number < attempts
        }
        EventKind::TaskDone { task } => {
            instance.step_status(task.step()) == StepStatus::Complete
        }
    }
}

fn transition_for(stage: Stage, event: &EventKind) -> Option<Transition> {
    match (stage, event) {
        (stage, EventKind::DocumentStatus { document, status })
            if stage == document.sent_stage() =>
        {
            Some(match status {
                DocumentStatus::Sent => Transition::DocumentAcked {
                    document: *document,
                },
                DocumentStatus::Signed => Transition::DocumentSigned {
                    document: *document,
                },
            })
        }
        (stage, EventKind::QuizResult { quiz, passed, .. }) if stage == quiz.quiz_stage() => {
            Some(if *passed {
                Transition::QuizPassed { document: *quiz }
            } else {
                Transition::QuizFailed { document: *quiz }
            })
        }
        (Stage::ParallelDispatched, EventKind::TaskDone { task }) => {
            Some(Transition::TaskFinished { task: *task })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests;
