use jiff::civil::{Date, DateTime};
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    models::{
        clock,
        store::Store,
        task::{Task, TaskError, TaskType},
    },
    storage::{Storage, StorageError},
};

#[derive(Debug, Error)]
pub enum AddTaskError {
    #[error("A {1} task titled '{0}' already exists")]
    DuplicateTitle(String, TaskType),

    #[error("A {1} task with id {0} already exists")]
    DuplicateId(u64, TaskType),

    #[error(transparent)]
    InvalidRecord(#[from] TaskError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Debug, Error)]
pub enum EditTaskError {
    #[error("No {1} task with id {0}")]
    TaskNotFound(u64, TaskType),

    #[error("A {1} task titled '{0}' already exists")]
    DuplicateTitle(String, TaskType),

    #[error(transparent)]
    InvalidRecord(#[from] TaskError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Debug, Error)]
pub enum DeleteTaskError {
    #[error("No {1} task with id {0}")]
    TaskNotFound(u64, TaskType),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Debug, Error)]
pub enum ToggleTaskError {
    #[error("No {1} task with id {0}")]
    TaskNotFound(u64, TaskType),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Owns the in-memory document and writes it back after every change.
///
/// Every rejected operation leaves the document untouched, so callers can
/// report the error and keep going.
pub struct TaskStore<S: Storage> {
    store: Store,
    storage: S,
}

impl<S: Storage> TaskStore<S> {
    /// Loads the document, creating and saving an empty one on first use.
    pub fn open(storage: S) -> Result<Self, StorageError> {
        let store = match storage.load()? {
            Some(store) => store,
            None => {
                let store = Store::default();
                storage.save(&store)?;
                info!("created empty task file");
                store
            }
        };

        Ok(Self { store, storage })
    }

    pub fn document(&self) -> &Store {
        &self.store
    }

    fn persist(&self) -> Result<(), StorageError> {
        self.storage.save(&self.store)
    }

    /// Id the next added task will get. Does not reserve it.
    pub fn next_id(&self) -> u64 {
        self.store.next_id()
    }

    pub fn add_task(&mut self, mut task: Task, task_type: TaskType) -> Result<Task, AddTaskError> {
        task.validate()?;

        // The id is checked as supplied by the caller, before it is replaced
        // with a freshly allocated one. A caller that pre-fills `next_id()`
        // never collides here; only the title check matters in that case.
        if let Some(existing) = self
            .store
            .bucket(task_type)
            .iter()
            .find(|t| t.title == task.title || t.id == task.id)
        {
            debug!(title = %task.title, id = task.id, %task_type, "rejected duplicate task");
            return Err(if existing.title == task.title {
                AddTaskError::DuplicateTitle(task.title, task_type)
            } else {
                AddTaskError::DuplicateId(task.id, task_type)
            });
        }

        task.id = self.store.allocate_id();
        task.task_type = task_type;
        self.store.merge_tags(&task.tags);
        self.store.bucket_mut(task_type).push(task.clone());

        self.persist()?;

        info!(id = task.id, title = %task.title, %task_type, "added task");
        Ok(task)
    }

    pub fn edit_task(&mut self, mut task: Task, task_type: TaskType) -> Result<Task, EditTaskError> {
        task.validate()?;

        let index = self
            .store
            .position(task.id, task_type)
            .ok_or(EditTaskError::TaskNotFound(task.id, task_type))?;

        if self
            .store
            .bucket(task_type)
            .iter()
            .any(|t| t.id != task.id && t.title == task.title)
        {
            debug!(id = task.id, title = %task.title, "rejected edit to a taken title");
            return Err(EditTaskError::DuplicateTitle(task.title, task_type));
        }

        task.task_type = task_type;
        self.store.bucket_mut(task_type)[index] = task.clone();
        self.store.merge_tags(&task.tags);

        self.persist()?;

        info!(id = task.id, %task_type, "edited task");
        Ok(task)
    }

    pub fn delete_task(&mut self, id: u64, task_type: TaskType) -> Result<Task, DeleteTaskError> {
        let index = self
            .store
            .position(id, task_type)
            .ok_or(DeleteTaskError::TaskNotFound(id, task_type))?;

        let removed = self.store.bucket_mut(task_type).remove(index);

        self.persist()?;

        info!(id, %task_type, "deleted task");
        Ok(removed)
    }

    pub fn toggle_task_finished(
        &mut self,
        id: u64,
        task_type: TaskType,
    ) -> Result<Task, ToggleTaskError> {
        self.toggle_task_finished_at(id, task_type, clock::now())
    }

    pub fn toggle_task_finished_at(
        &mut self,
        id: u64,
        task_type: TaskType,
        now: DateTime,
    ) -> Result<Task, ToggleTaskError> {
        let task = self
            .store
            .get_task_mut(id, task_type)
            .ok_or(ToggleTaskError::TaskNotFound(id, task_type))?;

        task.toggle_finished_at(now);
        let toggled = task.clone();

        self.persist()?;

        info!(id, %task_type, finished = toggled.finished, "toggled task");
        Ok(toggled)
    }

    pub fn reset_tasks(&mut self, task_type: TaskType) -> Result<(), StorageError> {
        let removed = self.store.bucket(task_type).len();
        self.store.bucket_mut(task_type).clear();

        self.persist()?;

        info!(%task_type, removed, "reset tasks");
        Ok(())
    }

    /// Clears the vocabulary and the tags of every task. Not reversible.
    pub fn reset_tags(&mut self) -> Result<(), StorageError> {
        self.store.tags.clear();
        for task_type in TaskType::ALL {
            for task in self.store.bucket_mut(task_type) {
                task.tags.clear();
            }
        }

        self.persist()?;

        info!("reset tags");
        Ok(())
    }

    /// Re-opens daily tasks finished before today. Returns how many changed.
    pub fn reset_daily_finished(&mut self) -> Result<usize, StorageError> {
        self.reset_daily_finished_on(clock::today())
    }

    pub fn reset_daily_finished_on(&mut self, today: Date) -> Result<usize, StorageError> {
        let mut reset = 0;
        for task in self.store.bucket_mut(TaskType::Daily) {
            let finished_before_today = task.finished_at.is_some_and(|at| at.date() < today);
            if task.finished && finished_before_today {
                task.finished = false;
                task.finished_at = None;
                reset += 1;
            }
        }

        if reset > 0 {
            self.persist()?;
            info!(reset, %today, "rolled over daily tasks");
        } else {
            debug!(%today, "no daily tasks to roll over");
        }
        Ok(reset)
    }

    pub fn tag_vocabulary(&self) -> &[String] {
        &self.store.tags
    }

    pub fn count_by_type(&self, task_type: TaskType) -> usize {
        self.store.bucket(task_type).len()
    }

    pub fn list_by_type(&self, task_type: TaskType) -> &[Task] {
        self.store.bucket(task_type)
    }

    pub fn find_by_id(&self, id: u64) -> Option<(&Task, TaskType)> {
        self.store.get_task(id)
    }

    pub fn is_type_empty(&self, task_type: TaskType) -> bool {
        self.store.bucket(task_type).is_empty()
    }

    pub fn task_exists(&self, id: u64) -> bool {
        self.store.get_task(id).is_some()
    }

    pub fn is_title_or_id_taken(&self, task: &Task, task_type: TaskType) -> bool {
        self.store.is_title_or_id_taken(task, task_type)
    }

    pub fn tasks_with_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Task> + 'a {
        self.store
            .get_all_tasks()
            .filter(move |t| t.tags.iter().any(|candidate| candidate == tag))
    }
}
