use std::fmt;

use jiff::SignedDuration;
use jiff::civil::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::clock;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Bucket the task belongs to
    #[serde(rename = "type")]
    pub task_type: TaskType,
    /// Store-wide unique number, assigned by the store on add
    pub id: u64,
    /// Title of the task, unique within its bucket
    pub title: String,
    /// Free text, may be empty
    pub description: String,
    /// Tags of the task, no blanks and no duplicates
    pub tags: Vec<String>,
    /// Optional hard deadline
    #[serde(with = "clock::minute::option")]
    pub deadline: Option<DateTime>,
    /// When the task was created
    #[serde(with = "clock::minute")]
    pub created_at: DateTime,
    pub finished: bool,
    /// When the task was last finished, present only while `finished` is set
    #[serde(with = "clock::minute::option")]
    pub finished_at: Option<DateTime>,
}

#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Daily,
    Overall,
}

impl TaskType {
    pub const ALL: [TaskType; 2] = [TaskType::Daily, TaskType::Overall];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Daily => "daily",
            TaskType::Overall => "overall",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskType {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(TaskType::Daily),
            "overall" => Ok(TaskType::Overall),
            other => Err(TaskError::UnknownType(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TaskError {
    #[error("Invalid task record: {0}")]
    InvalidRecord(String),

    #[error("Unknown task type '{0}', expected daily or overall")]
    UnknownType(String),
}

/// How a task stands against its deadline, used to pick a display style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineStatus {
    Finished,
    NoDeadline,
    Overdue,
    DueToday,
    Upcoming,
}

impl Task {
    pub fn new(
        task_type: TaskType,
        id: u64,
        title: impl Into<String>,
        description: impl Into<String>,
        tags: Vec<String>,
        deadline: Option<DateTime>,
    ) -> Result<Task, TaskError> {
        let task = Task {
            task_type,
            id,
            title: title.into(),
            description: description.into(),
            tags: normalize_tags(tags),
            deadline: deadline.map(clock::truncate),
            created_at: clock::now(),
            finished: false,
            finished_at: None,
        };
        task.validate()?;
        Ok(task)
    }

    pub fn validate(&self) -> Result<(), TaskError> {
        if self.title.trim().is_empty() {
            return Err(TaskError::InvalidRecord("title must not be empty".into()));
        }
        if self.finished != self.finished_at.is_some() {
            return Err(TaskError::InvalidRecord(format!(
                "task {} has finished={} but finished_at={:?}",
                self.id,
                self.finished,
                self.finished_at.map(clock::format)
            )));
        }
        if self.tags != normalize_tags(self.tags.clone()) {
            return Err(TaskError::InvalidRecord(format!(
                "task {} has blank or duplicate tags",
                self.id
            )));
        }
        Ok(())
    }

    pub fn toggle_finished(&mut self) {
        self.toggle_finished_at(clock::now());
    }

    pub fn toggle_finished_at(&mut self, now: DateTime) {
        self.finished = !self.finished;
        self.finished_at = self.finished.then(|| clock::truncate(now));
    }

    pub fn add_tag(&mut self, tag: &str) {
        let tag = tag.trim();
        if !tag.is_empty() && !self.tags.iter().any(|t| t == tag) {
            self.tags.push(tag.to_string());
        }
    }

    pub fn remove_tag(&mut self, tag: &str) {
        let tag = tag.trim();
        self.tags.retain(|t| t != tag);
    }

    pub fn set_deadline(&mut self, deadline: DateTime) {
        self.deadline = Some(clock::truncate(deadline));
    }

    pub fn remove_deadline(&mut self) {
        self.deadline = None;
    }

    /// `deadline - now`, or `None` when there is no deadline. Negative once
    /// the deadline has passed.
    pub fn time_remaining(&self) -> Option<SignedDuration> {
        self.time_remaining_at(clock::now())
    }

    pub fn time_remaining_at(&self, now: DateTime) -> Option<SignedDuration> {
        self.deadline.map(|deadline| deadline.duration_since(now))
    }

    pub fn is_overdue(&self) -> bool {
        self.is_overdue_at(clock::now())
    }

    pub fn is_overdue_at(&self, now: DateTime) -> bool {
        match self.deadline {
            Some(deadline) if !self.finished => now > deadline,
            _ => false,
        }
    }

    pub fn deadline_status_at(&self, now: DateTime) -> DeadlineStatus {
        if self.finished {
            return DeadlineStatus::Finished;
        }
        match self.time_remaining_at(now) {
            None => DeadlineStatus::NoDeadline,
            Some(left) if left.is_negative() => DeadlineStatus::Overdue,
            Some(left) if left < SignedDuration::from_hours(24) => DeadlineStatus::DueToday,
            Some(_) => DeadlineStatus::Upcoming,
        }
    }

    pub fn to_record(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    pub fn from_record(record: Value) -> Result<Task, TaskError> {
        let mut task: Task = serde_json::from_value(record)
            .map_err(|e| TaskError::InvalidRecord(e.to_string()))?;
        task.tags = normalize_tags(task.tags);
        task.validate()?;
        Ok(task)
    }
}

/// Trims tags, drops blanks and keeps the first occurrence of each.
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !normalized.iter().any(|t| t == tag) {
            normalized.push(tag.to_string());
        }
    }
    normalized
}
