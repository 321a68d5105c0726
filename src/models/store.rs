use serde::{Deserialize, Serialize};

use crate::models::task::{self, Task, TaskError, TaskType};

/// The persisted document. Field order matches the file layout.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Store {
    /// Highest id ever handed out, shared by both buckets
    pub latest_id: u64,
    /// Every tag ever attached to a task
    pub tags: Vec<String>,
    pub daily: Vec<Task>,
    pub overall: Vec<Task>,
}

impl Store {
    pub fn bucket(&self, task_type: TaskType) -> &Vec<Task> {
        match task_type {
            TaskType::Daily => &self.daily,
            TaskType::Overall => &self.overall,
        }
    }

    pub fn bucket_mut(&mut self, task_type: TaskType) -> &mut Vec<Task> {
        match task_type {
            TaskType::Daily => &mut self.daily,
            TaskType::Overall => &mut self.overall,
        }
    }

    pub fn next_id(&self) -> u64 {
        self.latest_id + 1
    }

    pub fn allocate_id(&mut self) -> u64 {
        self.latest_id += 1;
        self.latest_id
    }

    pub fn get_task(&self, id: u64) -> Option<(&Task, TaskType)> {
        TaskType::ALL.into_iter().find_map(|task_type| {
            self.bucket(task_type)
                .iter()
                .find(|t| t.id == id)
                .map(|t| (t, task_type))
        })
    }

    pub fn get_task_mut(&mut self, id: u64, task_type: TaskType) -> Option<&mut Task> {
        self.bucket_mut(task_type).iter_mut().find(|t| t.id == id)
    }

    pub fn position(&self, id: u64, task_type: TaskType) -> Option<usize> {
        self.bucket(task_type).iter().position(|t| t.id == id)
    }

    pub fn get_all_tasks(&self) -> impl Iterator<Item = &Task> {
        self.daily.iter().chain(self.overall.iter())
    }

    pub fn is_title_or_id_taken(&self, task: &Task, task_type: TaskType) -> bool {
        self.bucket(task_type)
            .iter()
            .any(|t| t.title == task.title || t.id == task.id)
    }

    /// Adds unseen tags to the vocabulary, returns how many were new.
    pub fn merge_tags(&mut self, tags: &[String]) -> usize {
        let before = self.tags.len();
        for tag in tags {
            if !tag.is_empty() && !self.tags.contains(tag) {
                self.tags.push(tag.clone());
            }
        }
        self.tags.len() - before
    }

    /// Trims and dedupes the vocabulary and every task's tags.
    pub fn normalize_tags(&mut self) {
        self.tags = task::normalize_tags(std::mem::take(&mut self.tags));
        for t in self.daily.iter_mut().chain(self.overall.iter_mut()) {
            t.tags = task::normalize_tags(std::mem::take(&mut t.tags));
        }
    }

    /// Checks every invariant of a loaded document.
    pub fn validate(&self) -> Result<(), TaskError> {
        let mut seen_ids = std::collections::HashSet::new();

        for task_type in TaskType::ALL {
            let bucket = self.bucket(task_type);
            for (index, task) in bucket.iter().enumerate() {
                task.validate()?;

                if !seen_ids.insert(task.id) {
                    return Err(TaskError::InvalidRecord(format!(
                        "id {} is used more than once",
                        task.id
                    )));
                }
                if task.id > self.latest_id {
                    return Err(TaskError::InvalidRecord(format!(
                        "id {} is above latest_id {}",
                        task.id, self.latest_id
                    )));
                }
                if bucket[..index].iter().any(|t| t.title == task.title) {
                    return Err(TaskError::InvalidRecord(format!(
                        "title '{}' appears twice in {}",
                        task.title, task_type
                    )));
                }
            }
        }

        Ok(())
    }
}
