#[cfg(test)]
mod tests {
    use crate::engine::Stage;

    #[test]
    fn test_stage_as_str() {
        assert_eq!(Stage::NotStarted.as_str(), "not_started");
        assert_eq!(Stage::PolicySent.as_str(), "policy_sent");
        assert_eq!(Stage::PolicyQuizPending.as_str(), "policy_quiz_pending");
        assert_eq!(Stage::ParallelDispatched.as_str(), "parallel_dispatched");
        assert_eq!(Stage::Complete.as_str(), "complete");
        assert_eq!(Stage::Failed.as_str(), "failed");
    }

    #[test]
    fn test_stage_from_str() {
        assert_eq!(Stage::from_str("not_started"), Some(Stage::NotStarted));
        assert_eq!(Stage::from_str("nda_sent"), Some(Stage::NdaSent));
        assert_eq!(
            Stage::from_str("guidelines_quiz_pending"),
            Some(Stage::GuidelinesQuizPending)
        );
        assert_eq!(Stage::from_str("complete"), Some(Stage::Complete));
        assert_eq!(Stage::from_str("invalid"), None);
    }

    #[test]
    fn test_stage_round_trip() {
        let stages = [
            Stage::NotStarted,
            Stage::PolicySent,
            Stage::PolicyQuizPending,
            Stage::NdaSent,
            Stage::NdaQuizPending,
            Stage::GuidelinesSent,
            Stage::GuidelinesQuizPending,
            Stage::ParallelDispatched,
            Stage::Complete,
            Stage::Failed,
        ];
        for stage in stages {
            assert_eq!(Stage::from_str(stage.as_str()), Some(stage));
        }
    }

    #[test]
    fn test_stage_ordinals_follow_pipeline_order() {
        let pipeline = [
            Stage::NotStarted,
            Stage::PolicySent,
            Stage::PolicyQuizPending,
            Stage::NdaSent,
            Stage::NdaQuizPending,
            Stage::GuidelinesSent,
            Stage::GuidelinesQuizPending,
            Stage::ParallelDispatched,
            Stage::Complete,
        ];
        for window in pipeline.windows(2) {
            assert!(window[0].ordinal() < window[1].ordinal());
        }
    }

    #[test]
    fn test_stage_terminal() {
        assert!(Stage::Complete.is_terminal());
        assert!(Stage::Failed.is_terminal());
        assert!(!Stage::NotStarted.is_terminal());
        assert!(!Stage::ParallelDispatched.is_terminal());
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(format!("{}", Stage::NdaQuizPending), "nda_quiz_pending");
        assert_eq!(format!("{}", Stage::Complete), "complete");
    }
}
