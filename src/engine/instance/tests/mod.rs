#[cfg(test)]
mod tests {
    use chrono::Utc;

    use crate::engine::{FinalTask, Stage, StepName, StepStatus, WorkflowInstance};

    #[test]
    fn test_new_instance_defaults() {
        let instance = WorkflowInstance::new("emp_1");

        assert!(instance.thread_id.starts_with("thread_"));
        assert_eq!(instance.employee_id, "emp_1");
        assert_eq!(instance.stage, Stage::NotStarted);
        assert_eq!(instance.version, 1);
        assert_eq!(instance.steps.len(), 12);
        for name in StepName::ALL {
            assert_eq!(instance.step_status(name), StepStatus::NotStarted);
        }
    }

    #[test]
    fn test_thread_ids_are_unique() {
        let a = WorkflowInstance::new("emp_1");
        let b = WorkflowInstance::new("emp_1");
        assert_ne!(a.thread_id, b.thread_id);
    }

    #[test]
    fn test_progress_percent_rounding() {
        let mut instance = WorkflowInstance::new("emp_1");
        assert_eq!(instance.progress_percent(), 0.0);

        let now = Utc::now();
        instance.step_mut(StepName::CompanyPolicySent).complete(now);
        assert_eq!(instance.progress_percent(), 8.33);

        instance.step_mut(StepName::CompanyPolicySigned).complete(now);
        assert_eq!(instance.progress_percent(), 16.67);

        instance.step_mut(StepName::CompanyPolicyQuiz).complete(now);
        assert_eq!(instance.progress_percent(), 25.0);

        for name in StepName::ALL {
            instance.step_mut(name).complete(now);
        }
        assert_eq!(instance.progress_percent(), 100.0);
    }

    #[test]
    fn test_touch_bumps_version() {
        let mut instance = WorkflowInstance::new("emp_1");
        let before = instance.version;
        instance.touch(Utc::now());
        assert_eq!(instance.version, before + 1);
    }

    #[test]
    fn test_parallel_complete() {
        let mut instance = WorkflowInstance::new("emp_1");
        assert!(!instance.parallel_complete());

        let now = Utc::now();
        instance.step_mut(StepName::SlackInvite).complete(now);
        instance.step_mut(StepName::JiraAccess).complete(now);
        assert!(!instance.parallel_complete());

        instance.step_mut(StepName::OnboardingCall).complete(now);
        assert!(instance.parallel_complete());
        for task in FinalTask::ALL {
            assert_eq!(instance.step_status(task.step()), StepStatus::Complete);
        }
    }

    #[test]
    fn test_snapshot_reflects_instance() {
        let mut instance = WorkflowInstance::new("emp_1");
        instance.stage = Stage::PolicySent;
        instance.step_mut(StepName::CompanyPolicySent).complete(Utc::now());

        let snapshot = instance.snapshot();
        assert_eq!(snapshot.thread_id, instance.thread_id);
        assert_eq!(snapshot.stage, Stage::PolicySent);
        assert_eq!(snapshot.progress_percent, 8.33);
        assert_eq!(
            snapshot.steps[&StepName::CompanyPolicySent].status,
            StepStatus::Complete
        );
    }

    #[test]
    fn test_instance_survives_serialization() {
        let mut instance = WorkflowInstance::new("emp_1");
        instance.stage = Stage::NdaQuizPending;
        instance.step_mut(StepName::NdaQuiz).begin_dispatch();
        instance.step_mut(StepName::NdaSent).tracking_id = Some("sim_nda_1".into());

        let json = serde_json::to_string(&instance).unwrap();
        let restored: WorkflowInstance = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, instance);
    }
}
