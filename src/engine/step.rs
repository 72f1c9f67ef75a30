use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::stage::Stage;

/// The three documents every new hire works through, in pipeline order.
/// Each document anchors one sent/signed/quiz chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    CompanyPolicy,
    Nda,
    DevGuidelines,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 3] = [
        DocumentKind::CompanyPolicy,
        DocumentKind::Nda,
        DocumentKind::DevGuidelines,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::CompanyPolicy => "company_policy",
            DocumentKind::Nda => "nda",
            DocumentKind::DevGuidelines => "dev_guidelines",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "company_policy" => Some(DocumentKind::CompanyPolicy),
            "nda" => Some(DocumentKind::Nda),
            "dev_guidelines" => Some(DocumentKind::DevGuidelines),
            _ => None,
        }
    }

    pub fn quiz_name(&self) -> &'static str {
        match self {
            DocumentKind::CompanyPolicy => "company_policy_quiz",
            DocumentKind::Nda => "nda_quiz",
            DocumentKind::DevGuidelines => "dev_guidelines_quiz",
        }
    }

    pub fn from_quiz_name(s: &str) -> Option<Self> {
        match s {
            "company_policy_quiz" => Some(DocumentKind::CompanyPolicy),
            "nda_quiz" => Some(DocumentKind::Nda),
            "dev_guidelines_quiz" => Some(DocumentKind::DevGuidelines),
            _ => None,
        }
    }

    /// The chain that starts once this document's quiz is passed.
    pub fn next(&self) -> Option<DocumentKind> {
        match self {
            DocumentKind::CompanyPolicy => Some(DocumentKind::Nda),
            DocumentKind::Nda => Some(DocumentKind::DevGuidelines),
            DocumentKind::DevGuidelines => None,
        }
    }

    pub fn sent_step(&self) -> StepName {
        match self {
            DocumentKind::CompanyPolicy => StepName::CompanyPolicySent,
            DocumentKind::Nda => StepName::NdaSent,
            DocumentKind::DevGuidelines => StepName::DevGuidelinesSent,
        }
    }

    pub fn signed_step(&self) -> StepName {
        match self {
            DocumentKind::CompanyPolicy => StepName::CompanyPolicySigned,
            DocumentKind::Nda => StepName::NdaSigned,
            DocumentKind::DevGuidelines => StepName::DevGuidelinesSigned,
        }
    }

    pub fn quiz_step(&self) -> StepName {
        match self {
            DocumentKind::CompanyPolicy => StepName::CompanyPolicyQuiz,
            DocumentKind::Nda => StepName::NdaQuiz,
            DocumentKind::DevGuidelines => StepName::DevGuidelinesQuiz,
        }
    }

    /// Stage the workflow rests in while this document awaits a signature.
    pub fn sent_stage(&self) -> Stage {
        match self {
            DocumentKind::CompanyPolicy => Stage::PolicySent,
            DocumentKind::Nda => Stage::NdaSent,
            DocumentKind::DevGuidelines => Stage::GuidelinesSent,
        }
    }

    /// Stage the workflow rests in while this document's quiz awaits a result.
    pub fn quiz_stage(&self) -> Stage {
        match self {
            DocumentKind::CompanyPolicy => Stage::PolicyQuizPending,
            DocumentKind::Nda => Stage::NdaQuizPending,
            DocumentKind::DevGuidelines => Stage::GuidelinesQuizPending,
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The three provisioning tasks dispatched together after the last quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalTask {
    SlackInvite,
    JiraAccess,
    OnboardingCall,
}

impl FinalTask {
    pub const ALL: [FinalTask; 3] = [
        FinalTask::SlackInvite,
        FinalTask::JiraAccess,
        FinalTask::OnboardingCall,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FinalTask::SlackInvite => "slack_invite",
            FinalTask::JiraAccess => "jira_access",
            FinalTask::OnboardingCall => "onboarding_call",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "slack_invite" => Some(FinalTask::SlackInvite),
            "jira_access" => Some(FinalTask::JiraAccess),
            "onboarding_call" => Some(FinalTask::OnboardingCall),
            _ => None,
        }
    }

    pub fn step(&self) -> StepName {
        match self {
            FinalTask::SlackInvite => StepName::SlackInvite,
            FinalTask::JiraAccess => StepName::JiraAccess,
            FinalTask::OnboardingCall => StepName::OnboardingCall,
        }
    }
}

impl fmt::Display for FinalTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The twelve tracked steps of one onboarding workflow, in pipeline order.
/// The derived `Ord` follows the declaration order, so a `BTreeMap` keyed by
/// `StepName` iterates in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepName {
    CompanyPolicySent,
    CompanyPolicySigned,
    CompanyPolicyQuiz,
    NdaSent,
    NdaSigned,
    NdaQuiz,
    DevGuidelinesSent,
    DevGuidelinesSigned,
    DevGuidelinesQuiz,
    SlackInvite,
    JiraAccess,
    OnboardingCall,
}

impl StepName {
    pub const ALL: [StepName; 12] = [
        StepName::CompanyPolicySent,
        StepName::CompanyPolicySigned,
        StepName::CompanyPolicyQuiz,
        StepName::NdaSent,
        StepName::NdaSigned,
        StepName::NdaQuiz,
        StepName::DevGuidelinesSent,
        StepName::DevGuidelinesSigned,
        StepName::DevGuidelinesQuiz,
        StepName::SlackInvite,
        StepName::JiraAccess,
        StepName::OnboardingCall,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StepName::CompanyPolicySent => "company_policy_sent",
            StepName::CompanyPolicySigned => "company_policy_signed",
            StepName::CompanyPolicyQuiz => "company_policy_quiz",
            StepName::NdaSent => "nda_sent",
            StepName::NdaSigned => "nda_signed",
            StepName::NdaQuiz => "nda_quiz",
            StepName::DevGuidelinesSent => "dev_guidelines_sent",
            StepName::DevGuidelinesSigned => "dev_guidelines_signed",
            StepName::DevGuidelinesQuiz => "dev_guidelines_quiz",
            StepName::SlackInvite => "slack_invite",
            StepName::JiraAccess => "jira_access",
            StepName::OnboardingCall => "onboarding_call",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        StepName::ALL.iter().copied().find(|name| name.as_str() == s)
    }

    /// What kind of external action backs this step.
    pub fn kind(&self) -> StepKind {
        match self {
            StepName::CompanyPolicySent => StepKind::DocumentSend(DocumentKind::CompanyPolicy),
            StepName::CompanyPolicySigned => StepKind::SignatureWait(DocumentKind::CompanyPolicy),
            StepName::CompanyPolicyQuiz => StepKind::Quiz(DocumentKind::CompanyPolicy),
            StepName::NdaSent => StepKind::DocumentSend(DocumentKind::Nda),
            StepName::NdaSigned => StepKind::SignatureWait(DocumentKind::Nda),
            StepName::NdaQuiz => StepKind::Quiz(DocumentKind::Nda),
            StepName::DevGuidelinesSent => StepKind::DocumentSend(DocumentKind::DevGuidelines),
            StepName::DevGuidelinesSigned => StepKind::SignatureWait(DocumentKind::DevGuidelines),
            StepName::DevGuidelinesQuiz => StepKind::Quiz(DocumentKind::DevGuidelines),
            StepName::SlackInvite => StepKind::FinalTask(FinalTask::SlackInvite),
            StepName::JiraAccess => StepKind::FinalTask(FinalTask::JiraAccess),
            StepName::OnboardingCall => StepKind::FinalTask(FinalTask::OnboardingCall),
        }
    }
}

impl fmt::Display for StepName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    DocumentSend(DocumentKind),
    SignatureWait(DocumentKind),
    Quiz(DocumentKind),
    FinalTask(FinalTask),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    NotStarted,
    DispatchIntended,
    Dispatched,
    AwaitingResult,
    FailedTransient,
    FailedPermanent,
    Complete,
}

impl StepStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepStatus::NotStarted => "not_started",
            StepStatus::DispatchIntended => "dispatch_intended",
            StepStatus::Dispatched => "dispatched",
            StepStatus::AwaitingResult => "awaiting_result",
            StepStatus::FailedTransient => "failed_transient",
            StepStatus::FailedPermanent => "failed_permanent",
            StepStatus::Complete => "complete",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "not_started" => Some(StepStatus::NotStarted),
            "dispatch_intended" => Some(StepStatus::DispatchIntended),
            "dispatched" => Some(StepStatus::Dispatched),
            "awaiting_result" => Some(StepStatus::AwaitingResult),
            "failed_transient" => Some(StepStatus::FailedTransient),
            "failed_permanent" => Some(StepStatus::FailedPermanent),
            "complete" => Some(StepStatus::Complete),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, StepStatus::FailedTransient | StepStatus::FailedPermanent)
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-step progress record kept on the workflow instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepState {
    pub status: StepStatus,
    /// Handle returned by the external dispatch call, absent until confirmed.
    pub tracking_id: Option<String>,
    pub attempt_count: u32,
    pub last_event_at: Option<DateTime<Utc>>,
}

impl StepState {
    pub fn new() -> Self {
        Self {
            status: StepStatus::NotStarted,
            tracking_id: None,
            attempt_count: 0,
            last_event_at: None,
        }
    }

    /// Record the intent to dispatch, before the external call is made.
    pub fn begin_dispatch(&mut self) {
        self.status = StepStatus::DispatchIntended;
        self.attempt_count += 1;
    }

    /// Record the intent to re-dispatch after a failed quiz attempt. This is
    /// the one permitted status regression (awaiting_result to dispatched).
    pub fn begin_retry(&mut self) {
        self.status = StepStatus::Dispatched;
        self.attempt_count += 1;
    }

    pub fn complete(&mut self, at: DateTime<Utc>) {
        self.status = StepStatus::Complete;
        self.last_event_at = Some(at);
    }

    pub fn is_complete(&self) -> bool {
        self.status == StepStatus::Complete
    }
}

impl Default for StepState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests;
