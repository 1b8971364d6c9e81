#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Per-task progress status reported for the current user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum ProgressStatus {
    Solved,
    Attempted,
    /// Any status this client does not know about yet
    #[cfg_attr(feature = "serde", serde(other))]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ProgressEntry {
    pub task_id: String,
    pub status: ProgressStatus,
}

impl ProgressEntry {
    pub fn is_solved(&self) -> bool {
        matches!(self.status, ProgressStatus::Solved)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SubmitAnswerRequest {
    pub answer: String,
}

/// Grading outcome of a submitted answer.
///
/// Grading happens server-side and the payload is not fixed; `correct` is
/// read when present and everything else is kept verbatim in `details`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct SubmissionResult {
    #[cfg_attr(
        feature = "serde",
        serde(default, alias = "isCorrect", skip_serializing_if = "Option::is_none")
    )]
    pub correct: Option<bool>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub status: Option<ProgressStatus>,
    #[cfg(feature = "serde")]
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

impl SubmissionResult {
    /// True when the server explicitly marked the answer correct or solved
    pub fn is_accepted(&self) -> bool {
        self.correct == Some(true) || self.status == Some(ProgressStatus::Solved)
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    #[test]
    fn unknown_progress_status_is_tolerated() {
        let entries: Vec<ProgressEntry> = serde_json::from_str(
            r#"[{"taskId":"1","status":"SOLVED"},{"taskId":"2","status":"PENDING_REVIEW"}]"#,
        )
        .unwrap();
        assert!(entries[0].is_solved());
        assert_eq!(entries[1].status, ProgressStatus::Unknown);
    }

    #[test]
    fn submission_result_keeps_extra_fields() {
        let result: SubmissionResult = serde_json::from_str(
            r#"{"isCorrect":true,"message":"Well done"}"#,
        )
        .unwrap();
        assert!(result.is_accepted());
        assert_eq!(
            result.details.get("message"),
            Some(&serde_json::json!("Well done"))
        );
    }
}
