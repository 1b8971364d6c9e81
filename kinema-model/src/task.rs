use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Task difficulty, ordered from easiest to hardest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Extreme,
}

impl Difficulty {
    pub fn all() -> &'static [Difficulty] {
        use Difficulty::*;
        &[Easy, Medium, Hard, Extreme]
    }

    /// Sort rank used by the student catalog (1 = easiest)
    pub fn rank(&self) -> u8 {
        match self {
            Difficulty::Easy => 1,
            Difficulty::Medium => 2,
            Difficulty::Hard => 3,
            Difficulty::Extreme => 4,
        }
    }

    pub fn api_name(&self) -> &'static str {
        match self {
            Difficulty::Easy => "EASY",
            Difficulty::Medium => "MEDIUM",
            Difficulty::Hard => "HARD",
            Difficulty::Extreme => "EXTREME",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::Extreme => "Extreme",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for Difficulty {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::all()
            .iter()
            .copied()
            .find(|d| d.api_name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ModelError::UnknownVariant {
                kind: "difficulty",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum TaskStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

impl TaskStatus {
    pub fn is_published(&self) -> bool {
        matches!(self, TaskStatus::Published)
    }
}

/// How the submitted answer is compared server-side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum AnswerType {
    #[default]
    Text,
    Number,
    Formula,
}

impl AnswerType {
    pub fn api_name(&self) -> &'static str {
        match self {
            AnswerType::Text => "TEXT",
            AnswerType::Number => "NUMBER",
            AnswerType::Formula => "FORMULA",
        }
    }
}

impl FromStr for AnswerType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [AnswerType::Text, AnswerType::Number, AnswerType::Formula]
            .into_iter()
            .find(|t| t.api_name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ModelError::UnknownVariant {
                kind: "answer type",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Task {
    pub id: String,
    pub title: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub content: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub body_md: String,
    pub difficulty: Difficulty,
    #[cfg_attr(feature = "serde", serde(default))]
    pub status: TaskStatus,
    #[cfg_attr(feature = "serde", serde(default))]
    pub official_solution: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub correct_answer: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub answer_type: AnswerType,
    pub topic_id: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub author_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub image_url: Option<String>,
}

/// Image attached to a new task, uploaded as a multipart file part
#[derive(Clone, PartialEq, Eq)]
pub struct TaskImage {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for TaskImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskImage")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Task creation form. Sent as multipart, so it is not a serde type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub body_md: String,
    pub difficulty: Difficulty,
    pub topic_id: String,
    pub official_solution: String,
    pub correct_answer: String,
    pub answer_type: AnswerType,
    pub image: Option<TaskImage>,
}

impl NewTask {
    /// Text form fields in the order the backend documents them
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("title", self.title.clone()),
            ("bodyMd", self.body_md.clone()),
            ("difficulty", self.difficulty.api_name().to_string()),
            ("topicId", self.topic_id.clone()),
            ("officialSolution", self.official_solution.clone()),
            ("correctAnswer", self.correct_answer.clone()),
            ("answerType", self.answer_type.api_name().to_string()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct TaskUpdate {
    pub title: String,
    pub body_md: String,
    pub difficulty: Difficulty,
    pub topic_id: String,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub official_solution: Option<String>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub correct_answer: Option<String>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub answer_type: Option<AnswerType>,
}

impl From<&Task> for TaskUpdate {
    fn from(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            body_md: task.body_md.clone(),
            difficulty: task.difficulty,
            topic_id: task.topic_id.clone(),
            official_solution: Some(task.official_solution.clone()),
            correct_answer: Some(task.correct_answer.clone()),
            answer_type: Some(task.answer_type),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct PublishTaskRequest {
    pub task_id: String,
}

/// A student's written solution to a task
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Solution {
    pub id: String,
    pub body_md: String,
    pub task_id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_rank_matches_ordering() {
        let ranks: Vec<u8> =
            Difficulty::all().iter().map(Difficulty::rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4]);
        assert!(Difficulty::Easy < Difficulty::Extreme);
    }

    #[test]
    fn difficulty_parses_case_insensitively() {
        assert_eq!("hard".parse::<Difficulty>(), Ok(Difficulty::Hard));
        assert_eq!(
            "impossible".parse::<Difficulty>(),
            Err(ModelError::UnknownVariant {
                kind: "difficulty",
                value: "impossible".into(),
            })
        );
    }

    #[test]
    fn new_task_form_fields_use_api_names() {
        let task = NewTask {
            title: "Free fall".into(),
            body_md: "Drop a ball".into(),
            difficulty: Difficulty::Medium,
            topic_id: "t1".into(),
            official_solution: "h = gt^2/2".into(),
            correct_answer: "19.6".into(),
            answer_type: AnswerType::Number,
            image: None,
        };
        let fields = task.form_fields();
        assert!(fields.contains(&("difficulty", "MEDIUM".to_string())));
        assert!(fields.contains(&("answerType", "NUMBER".to_string())));
        assert_eq!(fields.len(), 7);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn task_tolerates_missing_optional_text() {
        let task: Task = serde_json::from_str(
            r#"{
                "id": "42",
                "title": "Inclined plane",
                "difficulty": "HARD",
                "status": "PUBLISHED",
                "topicId": "t1",
                "createdAt": "2024-09-01T10:00:00Z",
                "updatedAt": "2024-09-01T10:00:00Z"
            }"#,
        )
        .unwrap();
        assert_eq!(task.difficulty, Difficulty::Hard);
        assert!(task.status.is_published());
        assert_eq!(task.answer_type, AnswerType::Text);
        assert!(task.description.is_empty());
        assert!(task.image_url.is_none());
    }
}
