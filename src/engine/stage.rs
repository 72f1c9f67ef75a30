use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    NotStarted,
    PolicySent,
    PolicyQuizPending,
    NdaSent,
    NdaQuizPending,
    GuidelinesSent,
    GuidelinesQuizPending,
    ParallelDispatched,
    Complete,
    Failed,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::NotStarted => "not_started",
            Stage::PolicySent => "policy_sent",
            Stage::PolicyQuizPending => "policy_quiz_pending",
            Stage::NdaSent => "nda_sent",
            Stage::NdaQuizPending => "nda_quiz_pending",
            Stage::GuidelinesSent => "guidelines_sent",
            Stage::GuidelinesQuizPending => "guidelines_quiz_pending",
            Stage::ParallelDispatched => "parallel_dispatched",
            Stage::Complete => "complete",
            Stage::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "not_started" => Some(Stage::NotStarted),
            "policy_sent" => Some(Stage::PolicySent),
            "policy_quiz_pending" => Some(Stage::PolicyQuizPending),
            "nda_sent" => Some(Stage::NdaSent),
            "nda_quiz_pending" => Some(Stage::NdaQuizPending),
            "guidelines_sent" => Some(Stage::GuidelinesSent),
            "guidelines_quiz_pending" => Some(Stage::GuidelinesQuizPending),
            "parallel_dispatched" => Some(Stage::ParallelDispatched),
            "complete" => Some(Stage::Complete),
            "failed" => Some(Stage::Failed),
            _ => None,
        }
    }

    /// Position in the pipeline. Progress is monotonic over this ordinal.
    pub fn ordinal(&self) -> u8 {
        match self {
            Stage::NotStarted => 0,
            Stage::PolicySent => 1,
            Stage::PolicyQuizPending => 2,
            Stage::NdaSent => 3,
            Stage::NdaQuizPending => 4,
            Stage::GuidelinesSent => 5,
            Stage::GuidelinesQuizPending => 6,
            Stage::ParallelDispatched => 7,
            Stage::Complete => 8,
            Stage::Failed => 9,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Complete | Stage::Failed)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests;
