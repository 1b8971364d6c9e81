//! Data model definitions shared across Kinema crates.
//!
//! Field names follow the backend's JSON (camelCase) and enum values its
//! SCREAMING_CASE spelling when the `serde` feature is enabled.
#![allow(missing_docs)]

pub mod auth;
pub mod error;
pub mod progress;
pub mod task;
pub mod topic;
pub mod user;

pub use auth::{
    LoginRequest, Profile, RefreshRequest, RefreshResponse, RegisterRequest,
    Role, TokenPair,
};
pub use error::{ModelError, Result as ModelResult};
pub use progress::{
    ProgressEntry, ProgressStatus, SubmissionResult, SubmitAnswerRequest,
};
pub use task::{
    AnswerType, Difficulty, NewTask, PublishTaskRequest, Solution, Task,
    TaskImage, TaskStatus, TaskUpdate,
};
pub use topic::{NewTopic, SchoolClass, Topic, TopicUpdate};
pub use user::User;
