use serde::{Deserialize, Serialize};

/// UI state of one submission attempt. Success/Error are terminal per
/// attempt; an explicit reset or a new submission restarts the cycle. Not
/// persisted across process restarts.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", content = "message", rename_all = "camelCase")]
pub enum SubmissionState {
    #[default]
    Idle,
    Loading,
    Success(String),
    Error(String),
}

impl SubmissionState {
    pub fn is_loading(&self) -> bool {
        matches!(self, SubmissionState::Loading)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, SubmissionState::Error(_))
    }
}
