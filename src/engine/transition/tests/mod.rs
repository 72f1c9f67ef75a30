#[cfg(test)]
mod tests {
    use chrono::Utc;

    use crate::engine::transition::{evaluate, Evaluation, Transition};
    use crate::engine::{
        DocumentKind, DocumentStatus, EventKind, FinalTask, Stage, StepStatus, WorkflowInstance,
    };

    fn instance_at(stage: Stage) -> WorkflowInstance {
        let mut instance = WorkflowInstance::new("emp_1");
        instance.stage = stage;
        instance
    }

    fn signed(document: DocumentKind) -> EventKind {
        EventKind::DocumentStatus {
            document,
            status: DocumentStatus::Signed,
        }
    }

    fn sent(document: DocumentKind) -> EventKind {
        EventKind::DocumentStatus {
            document,
            status: DocumentStatus::Sent,
        }
    }

    fn quiz(document: DocumentKind, passed: bool, attempt_number: u32) -> EventKind {
        EventKind::QuizResult {
            quiz: document,
            score: if passed { 90 } else { 40 },
            passed,
            attempt_number,
        }
    }

    #[test]
    fn test_sent_ack_completes_without_stage_change() {
        let instance = instance_at(Stage::PolicySent);
        assert_eq!(
            evaluate(&instance, &sent(DocumentKind::CompanyPolicy)),
            Evaluation::Apply(Transition::DocumentAcked {
                document: DocumentKind::CompanyPolicy
            })
        );
    }

    #[test]
    fn test_signed_triggers_quiz_dispatch() {
        let instance = instance_at(Stage::NdaSent);
        assert_eq!(
            evaluate(&instance, &signed(DocumentKind::Nda)),
            Evaluation::Apply(Transition::DocumentSigned {
                document: DocumentKind::Nda
            })
        );
    }

    #[test]
    fn test_quiz_results_at_quiz_pending() {
        let mut instance = instance_at(Stage::PolicyQuizPending);
        let step = instance.step_mut(DocumentKind::CompanyPolicy.quiz_step());
        step.begin_dispatch();
        step.status = StepStatus::AwaitingResult;

        assert_eq!(
            evaluate(&instance, &quiz(DocumentKind::CompanyPolicy, false, 1)),
            Evaluation::Apply(Transition::QuizFailed {
                document: DocumentKind::CompanyPolicy
            })
        );
        assert_eq!(
            evaluate(&instance, &quiz(DocumentKind::CompanyPolicy, true, 1)),
            Evaluation::Apply(Transition::QuizPassed {
                document: DocumentKind::CompanyPolicy
            })
        );
    }

    #[test]
    fn test_quiz_for_later_chain_is_stale() {
        let instance = instance_at(Stage::PolicyQuizPending);
        assert_eq!(
            evaluate(&instance, &quiz(DocumentKind::Nda, true, 1)),
            Evaluation::Stale
        );
    }

    #[test]
    fn test_signed_for_wrong_stage_is_stale() {
        let instance = instance_at(Stage::PolicySent);
        assert_eq!(
            evaluate(&instance, &signed(DocumentKind::DevGuidelines)),
            Evaluation::Stale
        );
    }

    #[test]
    fn test_redelivered_signed_is_duplicate() {
        let mut instance = instance_at(Stage::PolicyQuizPending);
        let now = Utc::now();
        instance
            .step_mut(DocumentKind::CompanyPolicy.sent_step())
            .complete(now);
        instance
            .step_mut(DocumentKind::CompanyPolicy.signed_step())
            .complete(now);

        assert_eq!(
            evaluate(&instance, &signed(DocumentKind::CompanyPolicy)),
            Evaluation::Duplicate
        );
        assert_eq!(
            evaluate(&instance, &sent(DocumentKind::CompanyPolicy)),
            Evaluation::Duplicate
        );
    }

    #[test]
    fn test_redelivered_quiz_failure_is_duplicate() {
        let mut instance = instance_at(Stage::PolicyQuizPending);
        let step = instance.step_mut(DocumentKind::CompanyPolicy.quiz_step());
        // First failure already handled: attempt count is now 2.
        step.begin_dispatch();
        step.begin_retry();
        step.status = StepStatus::AwaitingResult;

        assert_eq!(
            evaluate(&instance, &quiz(DocumentKind::CompanyPolicy, false, 1)),
            Evaluation::Duplicate
        );
        // The outstanding attempt's failure is new.
        assert_eq!(
            evaluate(&instance, &quiz(DocumentKind::CompanyPolicy, false, 2)),
            Evaluation::Apply(Transition::QuizFailed {
                document: DocumentKind::CompanyPolicy
            })
        );
    }

    #[test]
    fn test_task_done_only_during_fan_out() {
        let instance = instance_at(Stage::ParallelDispatched);
        assert_eq!(
            evaluate(&instance, &EventKind::TaskDone { task: FinalTask::JiraAccess }),
            Evaluation::Apply(Transition::TaskFinished {
                task: FinalTask::JiraAccess
            })
        );

        let early = instance_at(Stage::NdaSent);
        assert_eq!(
            evaluate(&early, &EventKind::TaskDone { task: FinalTask::JiraAccess }),
            Evaluation::Stale
        );
    }

    #[test]
    fn test_terminal_instance_still_acknowledges_duplicates() {
        let mut instance = instance_at(Stage::Complete);
        let now = Utc::now();
        for name in crate::engine::StepName::ALL {
            instance.step_mut(name).complete(now);
        }

        assert_eq!(
            evaluate(&instance, &EventKind::TaskDone { task: FinalTask::SlackInvite }),
            Evaluation::Duplicate
        );
        assert_eq!(
            evaluate(&instance, &signed(DocumentKind::DevGuidelines)),
            Evaluation::Duplicate
        );
        // A result that was never applied is stale, not a duplicate.
        assert_eq!(
            evaluate(&instance, &quiz(DocumentKind::DevGuidelines, false, 5)),
            Evaluation::Stale
        );
    }
}
