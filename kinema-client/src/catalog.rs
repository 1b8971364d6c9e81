//! Client-side task catalog: the student view of published tasks.
//!
//! Everything here is pure over already-fetched data except
//! [`load_published`], which walks the topic list through the content API.

use std::cmp::Ordering;
use std::collections::HashSet;

use kinema_model::{Difficulty, ProgressEntry, Task, Topic};
use log::{debug, warn};

use crate::api::ContentApi;
use crate::errors::ApiResult;

/// Class number used for tasks whose topic or class is unknown
pub const UNKNOWN_CLASS: u8 = 255;
const UNKNOWN_CLASS_RANK: u16 = 999;
const UNKNOWN_TOPIC: &str = "Unknown";

/// Keep published tasks only, easiest first, oldest first within a difficulty
pub fn sort_for_students(tasks: Vec<Task>) -> Vec<Task> {
    let mut published: Vec<Task> = tasks
        .into_iter()
        .filter(|task| task.status.is_published())
        .collect();
    published.sort_by(|a, b| {
        a.difficulty
            .rank()
            .cmp(&b.difficulty.rank())
            .then_with(|| a.created_at.cmp(&b.created_at))
    });
    published
}

/// Fetch every topic's tasks and return the published ones in student order.
///
/// A topic whose tasks cannot be fetched is skipped; failing to list the
/// topics themselves is an error.
pub async fn load_published(content: &ContentApi) -> ApiResult<Vec<Task>> {
    let topics = content.topics().await?;
    load_published_for(content, &topics).await
}

/// [`load_published`] over a topic list the caller already holds
pub async fn load_published_for(
    content: &ContentApi,
    topics: &[Topic],
) -> ApiResult<Vec<Task>> {
    let mut all = Vec::new();
    for topic in topics {
        match content.tasks_by_topic(&topic.id).await {
            Ok(tasks) => all.extend(tasks),
            Err(e) if e.is_session_expired() => return Err(e),
            Err(e) => {
                warn!(
                    "[Catalog] Skipping topic {} ({}): {}",
                    topic.id, topic.title, e
                );
            }
        }
    }
    let tasks = sort_for_students(all);
    debug!(
        "[Catalog] Loaded {} published tasks across {} topics",
        tasks.len(),
        topics.len()
    );
    Ok(tasks)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchScope {
    /// Match the title only (task table)
    #[default]
    Title,
    /// Match title, description and content (dashboard)
    FullText,
}

#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub search: Option<String>,
    pub scope: SearchScope,
    pub difficulty: Option<Difficulty>,
    pub topic_id: Option<String>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(difficulty) = self.difficulty
            && task.difficulty != difficulty
        {
            return false;
        }
        if let Some(topic_id) = &self.topic_id
            && &task.topic_id != topic_id
        {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(query) => {
                let query = query.to_lowercase();
                let hit = |text: &str| text.to_lowercase().contains(&query);
                match self.scope {
                    SearchScope::Title => hit(&task.title),
                    SearchScope::FullText => {
                        hit(&task.title)
                            || hit(&task.description)
                            || hit(&task.content)
                    }
                }
            }
        }
    }

    pub fn apply<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        tasks.iter().filter(|task| self.matches(task)).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClassSort {
    #[default]
    None,
    Asc,
    Desc,
}

impl std::str::FromStr for ClassSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(ClassSort::None),
            "asc" => Ok(ClassSort::Asc),
            "desc" => Ok(ClassSort::Desc),
            other => Err(format!("unknown class sort '{other}'")),
        }
    }
}

fn class_rank(topics: &[Topic], topic_id: &str) -> u16 {
    topics
        .iter()
        .find(|topic| topic.id == topic_id)
        .and_then(|topic| topic.school_class)
        .map(|class| u16::from(class.grade()))
        .unwrap_or(UNKNOWN_CLASS_RANK)
}

impl ClassSort {
    /// Stable sort by the school class of each task's topic
    pub fn sort(&self, tasks: &mut [&Task], topics: &[Topic]) {
        let order = |a: &&Task, b: &&Task| -> Ordering {
            let ca = class_rank(topics, &a.topic_id);
            let cb = class_rank(topics, &b.topic_id);
            match self {
                ClassSort::None => Ordering::Equal,
                ClassSort::Asc => ca.cmp(&cb),
                ClassSort::Desc => cb.cmp(&ca),
            }
        };
        if *self != ClassSort::None {
            tasks.sort_by(order);
        }
    }
}

/// Title of the topic with `topic_id`, or `"Unknown"`
pub fn topic_title<'a>(topics: &'a [Topic], topic_id: &str) -> &'a str {
    topics
        .iter()
        .find(|topic| topic.id == topic_id)
        .map(|topic| topic.title.as_str())
        .unwrap_or(UNKNOWN_TOPIC)
}

/// Class number of the topic with `topic_id`, or [`UNKNOWN_CLASS`]
pub fn topic_class(topics: &[Topic], topic_id: &str) -> u8 {
    topics
        .iter()
        .find(|topic| topic.id == topic_id)
        .and_then(|topic| topic.school_class)
        .map(|class| class.grade())
        .unwrap_or(UNKNOWN_CLASS)
}

pub fn solved_task_ids(progress: &[ProgressEntry]) -> HashSet<String> {
    progress
        .iter()
        .filter(|entry| entry.is_solved())
        .map(|entry| entry.task_id.clone())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DifficultyStats {
    pub total: usize,
    pub easy: usize,
    pub medium: usize,
    pub hard: usize,
    pub extreme: usize,
}

impl DifficultyStats {
    pub fn from_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        tasks.into_iter().fold(Self::default(), |mut stats, task| {
            stats.total += 1;
            match task.difficulty {
                Difficulty::Easy => stats.easy += 1,
                Difficulty::Medium => stats.medium += 1,
                Difficulty::Hard => stats.hard += 1,
                Difficulty::Extreme => stats.extreme += 1,
            }
            stats
        })
    }

    pub fn count(&self, difficulty: Difficulty) -> usize {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Medium => self.medium,
            Difficulty::Hard => self.hard,
            Difficulty::Extreme => self.extreme,
        }
    }
}

/// Sidebar numbers for the student dashboard
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProgressStats {
    pub total: usize,
    pub solved: usize,
    pub by_difficulty: DifficultyStats,
}

impl ProgressStats {
    pub fn new(tasks: &[Task], progress: &[ProgressEntry]) -> Self {
        Self {
            total: tasks.len(),
            solved: solved_task_ids(progress).len(),
            by_difficulty: DifficultyStats::from_tasks(tasks),
        }
    }

    pub fn completion_percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.solved as f64 / self.total as f64 * 100.0
    }
}
