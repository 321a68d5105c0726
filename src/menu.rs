use std::io::{BufRead, Write};

use colored::*;
use thiserror::Error;

use crate::{
    models::{
        clock,
        task::{Task, TaskType},
    },
    services::tasks::{AddTaskError, DeleteTaskError, EditTaskError, TaskStore, ToggleTaskError},
    storage::{Storage, StorageError},
    ui,
};

#[derive(Debug, Error)]
pub enum MenuError {
    #[error("Terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Input closed")]
    EndOfInput,
}

/// Fields typed in by the user for a new or edited task.
struct TaskInput {
    title: String,
    description: String,
    tags: Vec<String>,
    deadline: Option<jiff::civil::DateTime>,
}

/// The numbered text menu. Reads answers from `input`, writes to `output`.
pub struct Menu<'a, S: Storage, R: BufRead, W: Write> {
    store: &'a mut TaskStore<S>,
    input: R,
    output: W,
}

impl<'a, S: Storage, R: BufRead, W: Write> Menu<'a, S, R, W> {
    pub fn new(store: &'a mut TaskStore<S>, input: R, output: W) -> Self {
        Self {
            store,
            input,
            output,
        }
    }

    /// Runs until the user picks Exit or input ends.
    pub fn run(&mut self) -> Result<(), MenuError> {
        match self.main_loop() {
            Err(MenuError::EndOfInput) => {
                writeln!(self.output)?;
                Ok(())
            }
            other => other,
        }
    }

    fn main_loop(&mut self) -> Result<(), MenuError> {
        loop {
            writeln!(self.output, "\n========================")?;
            writeln!(
                self.output,
                "Main Menu: (Daily: {} - Overall: {})",
                self.store.count_by_type(TaskType::Daily),
                self.store.count_by_type(TaskType::Overall)
            )?;
            writeln!(self.output, "\t0. Exit")?;
            writeln!(self.output, "\t1. Add task")?;
            writeln!(self.output, "\t2. Show tasks")?;
            writeln!(self.output, "\t3. Reset daily tasks")?;
            writeln!(self.output, "\t4. Reset overall tasks")?;
            writeln!(self.output, "\t5. Reset tags")?;

            match self.prompt("Choose operation: ")?.as_str() {
                "0" => {
                    writeln!(self.output, "\nExiting program...")?;
                    return Ok(());
                }
                "1" => self.add_task()?,
                "2" => {
                    let task_type = self.ask_task_type()?;
                    if self.store.is_type_empty(task_type) {
                        writeln!(self.output, "\nNo {} tasks available.", task_type)?;
                    } else {
                        self.task_menu(task_type)?;
                    }
                }
                "3" => {
                    self.store.reset_tasks(TaskType::Daily)?;
                    writeln!(self.output, "\nDaily tasks cleared.")?;
                }
                "4" => {
                    self.store.reset_tasks(TaskType::Overall)?;
                    writeln!(self.output, "\nOverall tasks cleared.")?;
                }
                "5" => {
                    self.store.reset_tags()?;
                    writeln!(self.output, "\nAll tags cleared.")?;
                }
                _ => writeln!(self.output, "\nInvalid option.")?,
            }
        }
    }

    fn task_menu(&mut self, task_type: TaskType) -> Result<(), MenuError> {
        let now = clock::now();
        let tasks = self.store.list_by_type(task_type);
        let header = ui::view_header(&format!("{} tasks", capitalize(task_type.as_str())), tasks.len());
        writeln!(self.output, "{}", header)?;
        for task in tasks {
            writeln!(self.output, "{}", ui::task_line(task, now))?;
        }

        writeln!(self.output, "\nAvailable operations:")?;
        writeln!(self.output, "\t0. BACK TO MAIN MENU")?;
        writeln!(self.output, "\t1. Show task information by ID")?;

        match self.prompt("Choose operation: ")?.as_str() {
            "0" => Ok(()),
            "1" => {
                let id = self.ask_existing_task_id()?;
                self.single_task_menu(id)
            }
            _ => {
                writeln!(self.output, "\nInvalid option.")?;
                Ok(())
            }
        }
    }

    fn single_task_menu(&mut self, id: u64) -> Result<(), MenuError> {
        let Some((task, task_type)) = self.store.find_by_id(id) else {
            writeln!(self.output, "\nTask ID not found.")?;
            return Ok(());
        };
        let existing = task.clone();
        writeln!(
            self.output,
            "{}",
            ui::task_details(&existing, task_type, clock::now())
        )?;

        writeln!(self.output, "\nAvailable operations for task {}:", id)?;
        writeln!(self.output, "\t0. BACK TO MAIN MENU")?;
        writeln!(self.output, "\t1. Edit task")?;
        writeln!(self.output, "\t2. Delete task")?;
        writeln!(self.output, "\t3. Toggle finished")?;

        match self.prompt("Choose operation: ")?.as_str() {
            "0" => {}
            "1" => self.edit_task(existing, task_type)?,
            "2" => match self.store.delete_task(id, task_type) {
                Ok(_) => writeln!(self.output, "\nTask deleted.")?,
                Err(DeleteTaskError::Storage(e)) => return Err(e.into()),
                Err(e) => writeln!(self.output, "\n{}", e)?,
            },
            "3" => match self.store.toggle_task_finished(id, task_type) {
                Ok(task) if task.finished => writeln!(self.output, "\nTask marked as finished.")?,
                Ok(_) => writeln!(self.output, "\nTask marked as not finished.")?,
                Err(ToggleTaskError::Storage(e)) => return Err(e.into()),
                Err(e) => writeln!(self.output, "\n{}", e)?,
            },
            _ => writeln!(self.output, "\nInvalid option.")?,
        }
        Ok(())
    }

    fn add_task(&mut self) -> Result<(), MenuError> {
        let task_type = self.ask_task_type()?;
        let input = self.ask_task_information(task_type)?;

        let task = match Task::new(
            task_type,
            self.store.next_id(),
            input.title,
            input.description,
            input.tags,
            input.deadline,
        ) {
            Ok(task) => task,
            Err(e) => {
                writeln!(self.output, "\n{}", e)?;
                return Ok(());
            }
        };

        if self.store.is_title_or_id_taken(&task, task_type) {
            writeln!(self.output, "\nTask already exists.")?;
            return Ok(());
        }

        match self.store.add_task(task, task_type) {
            Ok(_) => writeln!(self.output, "\nTask added successfully.")?,
            Err(AddTaskError::Storage(e)) => return Err(e.into()),
            Err(e) => writeln!(self.output, "\n{}", e)?,
        }
        Ok(())
    }

    fn edit_task(&mut self, existing: Task, task_type: TaskType) -> Result<(), MenuError> {
        writeln!(self.output, "\nEDITING TASK ID \"{}\"", existing.id)?;
        let input = self.ask_task_information(task_type)?;
        // Daily tasks are never asked for a deadline, one set from the CLI stays.
        let deadline = match task_type {
            TaskType::Daily => existing.deadline,
            TaskType::Overall => input.deadline,
        };

        let mut edited = match Task::new(
            task_type,
            existing.id,
            input.title,
            input.description,
            input.tags,
            deadline,
        ) {
            Ok(task) => task,
            Err(e) => {
                writeln!(self.output, "\n{}", e)?;
                return Ok(());
            }
        };
        edited.created_at = existing.created_at;
        edited.finished = existing.finished;
        edited.finished_at = existing.finished_at;

        match self.store.edit_task(edited, task_type) {
            Ok(_) => writeln!(self.output, "\nTask edited successfully.")?,
            Err(EditTaskError::Storage(e)) => return Err(e.into()),
            Err(e) => writeln!(self.output, "\n{}", e)?,
        }
        Ok(())
    }

    fn ask_task_type(&mut self) -> Result<TaskType, MenuError> {
        loop {
            match self.prompt("\nTask type (daily/overall): ")?.parse::<TaskType>() {
                Ok(task_type) => return Ok(task_type),
                Err(_) => writeln!(self.output, "\nInvalid task type. Try again.")?,
            }
        }
    }

    fn ask_task_information(&mut self, task_type: TaskType) -> Result<TaskInput, MenuError> {
        let title = loop {
            let title = self.prompt("Task title: ")?;
            if !title.is_empty() {
                break title;
            }
            writeln!(self.output, "\nTitle can't be empty. Try again.")?;
        };
        let description = self.prompt("Task description: ")?;
        let tags = self
            .prompt("Task tags (comma separated): ")?
            .split(',')
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect();

        let deadline = match task_type {
            TaskType::Daily => None,
            TaskType::Overall => loop {
                let text = self.prompt("Task deadline (ex: 2023-01-25 23:59): ")?;
                match clock::parse_user_input(&text) {
                    Ok(deadline) => break Some(deadline),
                    Err(_) => writeln!(self.output, "\nInvalid date format. Try again.")?,
                }
            },
        };

        Ok(TaskInput {
            title,
            description,
            tags,
            deadline,
        })
    }

    fn ask_existing_task_id(&mut self) -> Result<u64, MenuError> {
        loop {
            match self.prompt("\nEnter task ID: ")?.parse::<u64>() {
                Ok(id) if self.store.task_exists(id) => return Ok(id),
                Ok(_) => writeln!(self.output, "\nTask ID not found. Try again.")?,
                Err(_) => writeln!(self.output, "\nInvalid task id. Try again.")?,
            }
        }
    }

    fn prompt(&mut self, label: &str) -> Result<String, MenuError> {
        write!(self.output, "{}", label.bold())?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(MenuError::EndOfInput);
        }
        Ok(line.trim().to_string())
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use tempfile::TempDir;

    use crate::storage::json::JsonFileStorage;

    fn run_menu(store: &mut TaskStore<JsonFileStorage>, script: &str) -> String {
        colored::control::set_override(false);
        let mut output = Vec::new();
        Menu::new(store, Cursor::new(script.to_string()), &mut output)
            .run()
            .unwrap();
        String::from_utf8(output).unwrap()
    }

    fn open_store(dir: &TempDir) -> TaskStore<JsonFileStorage> {
        TaskStore::open(JsonFileStorage::new(dir.path().join("data.json"))).unwrap()
    }

    #[test]
    fn test_exit_immediately() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);

        let output = run_menu(&mut store, "0\n");
        assert!(output.contains("Main Menu: (Daily: 0 - Overall: 0)"));
        assert!(output.contains("Exiting program..."));
    }

    #[test]
    fn test_end_of_input_exits_cleanly() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);

        let output = run_menu(&mut store, "");
        assert!(output.contains("Choose operation: "));
    }

    #[test]
    fn test_add_overall_task_retries_bad_input() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);

        let script = "1\nweekly\noverall\nBuy milk\n\nerrand, home,,\nsoon\n2030-01-01 09:00\n0\n";
        let output = run_menu(&mut store, script);

        assert!(output.contains("Invalid task type. Try again."));
        assert!(output.contains("Invalid date format. Try again."));
        assert!(output.contains("Task added successfully."));

        let (task, task_type) = store.find_by_id(1).unwrap();
        assert_eq!(task_type, TaskType::Overall);
        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.tags, vec!["errand".to_string(), "home".to_string()]);
        assert_eq!(task.deadline.map(clock::format).as_deref(), Some("2030-01-01T09:00"));
    }

    #[test]
    fn test_add_duplicate_title_reports_it() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);

        let script = "1\ndaily\nStretch\n\n\n1\ndaily\nStretch\n\n\n0\n";
        let output = run_menu(&mut store, script);

        assert!(output.contains("Task already exists."));
        assert_eq!(store.count_by_type(TaskType::Daily), 1);
    }

    #[test]
    fn test_show_empty_bucket() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);

        let output = run_menu(&mut store, "2\ndaily\n0\n");
        assert!(output.contains("No daily tasks available."));
    }

    #[test]
    fn test_toggle_and_delete_from_single_task_menu() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);
        let script = concat!(
            "1\ndaily\nStretch\nmorning\nhealth\n",
            "2\ndaily\n1\nx\n7\n1\n3\n",
            "2\ndaily\n1\n1\n2\n",
            "0\n"
        );

        let output = run_menu(&mut store, script);

        assert!(output.contains("Invalid task id. Try again."));
        assert!(output.contains("Task ID not found. Try again."));
        assert!(output.contains("Task marked as finished."));
        assert!(output.contains("Task deleted."));
        assert!(store.is_type_empty(TaskType::Daily));
    }

    #[test]
    fn test_edit_keeps_id_and_creation_time() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);
        let original = store
            .add_task(
                Task::new(TaskType::Daily, 0, "Stretch", "", vec![], None).unwrap(),
                TaskType::Daily,
            )
            .unwrap();
        store
            .toggle_task_finished(original.id, TaskType::Daily)
            .unwrap();

        let script = "2\ndaily\n1\n1\n1\nYoga\n20 minutes\nhealth\n0\n";
        let output = run_menu(&mut store, script);
        assert!(output.contains("EDITING TASK ID \"1\""));
        assert!(output.contains("Task edited successfully."));

        let (edited, _) = store.find_by_id(1).unwrap();
        assert_eq!(edited.title, "Yoga");
        assert_eq!(edited.description, "20 minutes");
        assert_eq!(edited.created_at, original.created_at);
        assert!(edited.finished);
        assert_eq!(store.tag_vocabulary(), ["health".to_string()]);
    }

    #[test]
    fn test_edit_daily_task_keeps_deadline() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);
        let deadline = clock::parse("2030-01-01T09:00").unwrap();
        store
            .add_task(
                Task::new(TaskType::Daily, 0, "Stretch", "", vec![], Some(deadline)).unwrap(),
                TaskType::Daily,
            )
            .unwrap();

        let output = run_menu(&mut store, "2\ndaily\n1\n1\n1\nYoga\n\n\n0\n");
        assert!(output.contains("Task edited successfully."));

        let (edited, _) = store.find_by_id(1).unwrap();
        assert_eq!(edited.title, "Yoga");
        assert_eq!(edited.deadline, Some(deadline));
    }

    #[test]
    fn test_resets() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);
        let script = concat!(
            "1\ndaily\nStretch\n\nhealth\n",
            "1\noverall\nTaxes\n\nmoney\n2030-04-15\n",
            "5\n3\n9\n0\n"
        );

        let output = run_menu(&mut store, script);

        assert!(output.contains("All tags cleared."));
        assert!(output.contains("Daily tasks cleared."));
        assert!(output.contains("Invalid option."));
        assert!(store.is_type_empty(TaskType::Daily));
        assert_eq!(store.count_by_type(TaskType::Overall), 1);
        assert!(store.tag_vocabulary().is_empty());
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("daily"), "Daily");
        assert_eq!(capitalize(""), "");
    }
}
