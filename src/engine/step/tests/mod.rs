#[cfg(test)]
mod tests {
    use crate::engine::{DocumentKind, FinalTask, Stage, StepKind, StepName, StepState, StepStatus};

    #[test]
    fn test_document_chain_order() {
        assert_eq!(DocumentKind::CompanyPolicy.next(), Some(DocumentKind::Nda));
        assert_eq!(DocumentKind::Nda.next(), Some(DocumentKind::DevGuidelines));
        assert_eq!(DocumentKind::DevGuidelines.next(), None);
    }

    #[test]
    fn test_document_quiz_names() {
        assert_eq!(DocumentKind::CompanyPolicy.quiz_name(), "company_policy_quiz");
        assert_eq!(DocumentKind::from_quiz_name("nda_quiz"), Some(DocumentKind::Nda));
        assert_eq!(DocumentKind::from_quiz_name("nda"), None);
    }

    #[test]
    fn test_document_stages() {
        assert_eq!(DocumentKind::CompanyPolicy.sent_stage(), Stage::PolicySent);
        assert_eq!(DocumentKind::Nda.quiz_stage(), Stage::NdaQuizPending);
        assert_eq!(DocumentKind::DevGuidelines.sent_stage(), Stage::GuidelinesSent);
    }

    #[test]
    fn test_step_names_cover_pipeline_in_order() {
        assert_eq!(StepName::ALL.len(), 12);
        assert_eq!(StepName::ALL[0], StepName::CompanyPolicySent);
        assert_eq!(StepName::ALL[8], StepName::DevGuidelinesQuiz);
        assert_eq!(StepName::ALL[11], StepName::OnboardingCall);
        for window in StepName::ALL.windows(2) {
            assert!(window[0] < window[1]);
        }
    }

    #[test]
    fn test_step_name_round_trip() {
        for name in StepName::ALL {
            assert_eq!(StepName::from_str(name.as_str()), Some(name));
        }
        assert_eq!(StepName::from_str("unknown_step"), None);
    }

    #[test]
    fn test_step_kinds() {
        assert_eq!(
            StepName::NdaSent.kind(),
            StepKind::DocumentSend(DocumentKind::Nda)
        );
        assert_eq!(
            StepName::CompanyPolicySigned.kind(),
            StepKind::SignatureWait(DocumentKind::CompanyPolicy)
        );
        assert_eq!(
            StepName::DevGuidelinesQuiz.kind(),
            StepKind::Quiz(DocumentKind::DevGuidelines)
        );
        assert_eq!(
            StepName::JiraAccess.kind(),
            StepKind::FinalTask(FinalTask::JiraAccess)
        );
    }

    #[test]
    fn test_final_task_steps() {
        for task in FinalTask::ALL {
            assert_eq!(task.step().as_str(), task.as_str());
        }
    }

    #[test]
    fn test_step_state_dispatch_lifecycle() {
        let mut step = StepState::new();
        assert_eq!(step.status, StepStatus::NotStarted);
        assert_eq!(step.attempt_count, 0);

        step.begin_dispatch();
        assert_eq!(step.status, StepStatus::DispatchIntended);
        assert_eq!(step.attempt_count, 1);
        assert!(step.tracking_id.is_none());
    }

    #[test]
    fn test_step_state_retry_increments_attempts() {
        let mut step = StepState::new();
        step.begin_dispatch();
        step.status = StepStatus::AwaitingResult;

        step.begin_retry();
        assert_eq!(step.status, StepStatus::Dispatched);
        assert_eq!(step.attempt_count, 2);
    }

    #[test]
    fn test_step_status_is_failed() {
        assert!(StepStatus::FailedTransient.is_failed());
        assert!(StepStatus::FailedPermanent.is_failed());
        assert!(!StepStatus::AwaitingResult.is_failed());
        assert!(!StepStatus::Complete.is_failed());
    }
}
