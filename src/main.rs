use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::*;

use tasky::{
    config::Config,
    logging,
    menu::Menu,
    models::{
        clock,
        task::{Task, TaskType},
    },
    services::tasks::{AddTaskError, DeleteTaskError, EditTaskError, TaskStore, ToggleTaskError},
    storage::json::JsonFileStorage,
    ui,
};

#[derive(Parser)]
#[command(
    name = "tasky",
    about = "Track daily and deadline-bound tasks from your terminal"
)]
struct Cli {
    /// Path of the task file
    #[arg(long, global = true, env = "TASKY_DATA_FILE")]
    data_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive menu (default)
    Menu,

    /// Add a new task
    Add {
        /// Task title
        title: String,

        /// Daily (recurring) or overall (deadline-bound)
        #[arg(short = 'T', long = "type", value_enum)]
        task_type: TaskType,

        /// Task description
        #[arg(short, long, default_value = "")]
        description: String,

        /// Add tags (can be used multiple times)
        #[arg(short, long, action = clap::ArgAction::Append)]
        tag: Vec<String>,

        /// Deadline (e.g., "2030-01-25 23:59"), required for overall tasks
        #[arg(long)]
        deadline: Option<String>,
    },

    /// Edit an existing task
    Edit {
        /// Task id
        id: u64,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New description
        #[arg(short, long)]
        description: Option<String>,

        /// Add tags (can be used multiple times)
        #[arg(short, long, action = clap::ArgAction::Append)]
        tag: Vec<String>,

        /// Remove tags (can be used multiple times)
        #[arg(long, action = clap::ArgAction::Append)]
        untag: Vec<String>,

        /// Remove every tag before adding new ones
        #[arg(long)]
        clear_tags: bool,

        /// New deadline (e.g., "2030-01-25 23:59")
        #[arg(long, conflicts_with = "no_deadline")]
        deadline: Option<String>,

        /// Remove the deadline
        #[arg(long)]
        no_deadline: bool,
    },

    /// List tasks of one type
    List {
        #[arg(value_enum)]
        task_type: TaskType,
    },

    /// Show every field of a task
    Show { id: u64 },

    /// Toggle a task between finished and open
    Done { id: u64 },

    /// Delete a task
    Delete { id: u64 },

    /// Clear a bucket or all tags
    #[command(subcommand)]
    Reset(ResetCommands),

    /// List known tags, or the tasks carrying one tag
    Tags {
        /// Only show tasks with this tag
        name: Option<String>,
    },

    /// Print the id the next task will get
    NextId,
}

#[derive(Debug, Subcommand)]
enum ResetCommands {
    /// Delete every daily task
    Daily,
    /// Delete every overall task
    Overall,
    /// Forget all tags, also on every task
    Tags,
}

fn main() {
    let cli = Cli::parse();

    logging::init(cli.verbose);

    let config = Config::resolve(cli.data_file);
    config.ensure_data_dir().unwrap_or_else(|e| {
        eprintln!("Error: Failed to create data directory: {}", e);
        std::process::exit(1);
    });

    let storage = JsonFileStorage::new(config.data_file);

    let mut store = match TaskStore::open(storage) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error: Failed to load tasks: {}", e);
            eprintln!("\nThe file was left untouched. Fix or move it, then try again.");
            std::process::exit(1);
        }
    };

    if let Err(e) = store.reset_daily_finished() {
        eprintln!("Error: Failed to roll over daily tasks: {}", e);
        std::process::exit(1);
    }

    match cli.command {
        None | Some(Commands::Menu) => {
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            if let Err(e) = Menu::new(&mut store, stdin.lock(), stdout.lock()).run() {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Add {
            title,
            task_type,
            description,
            tag,
            deadline,
        }) => {
            let deadline = match (task_type, deadline) {
                (_, Some(text)) => Some(parse_deadline(&text)),
                (TaskType::Overall, None) => {
                    eprintln!("Error: Overall tasks need a deadline");
                    eprintln!("\nExample: tasky add 'File taxes' --type overall --deadline '2030-04-15 17:00'");
                    std::process::exit(1);
                }
                (TaskType::Daily, None) => None,
            };

            let task = match Task::new(task_type, store.next_id(), title, description, tag, deadline) {
                Ok(task) => task,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            };

            match store.add_task(task, task_type) {
                Ok(task) => {
                    println!("✓ Task added: {}", task.title);
                    println!("  #{} ({})", task.id, task_type);
                }
                Err(AddTaskError::DuplicateTitle(title, task_type)) => {
                    eprintln!("Error: A {} task titled '{}' already exists", task_type, title);
                    std::process::exit(1);
                }
                Err(AddTaskError::Storage(e)) => {
                    eprintln!("Error: Failed to save task: {}", e);
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Some(Commands::Edit {
            id,
            title,
            description,
            tag,
            untag,
            clear_tags,
            deadline,
            no_deadline,
        }) => {
            let Some((existing, task_type)) = store.find_by_id(id) else {
                eprintln!("Error: Task #{} not found", id);
                std::process::exit(1);
            };

            let mut edited = existing.clone();
            if let Some(title) = title {
                edited.title = title;
            }
            if let Some(description) = description {
                edited.description = description;
            }
            if clear_tags {
                edited.tags.clear();
            }
            for name in &untag {
                edited.remove_tag(name);
            }
            for name in &tag {
                edited.add_tag(name);
            }
            if no_deadline {
                edited.remove_deadline();
            } else if let Some(text) = deadline {
                edited.set_deadline(parse_deadline(&text));
            }

            match store.edit_task(edited, task_type) {
                Ok(task) => {
                    println!("✓ Task edited: {}", task.title);
                    println!("  #{} ({})", task.id, task_type);
                }
                Err(EditTaskError::TaskNotFound(id, _)) => {
                    eprintln!("Error: Task #{} not found", id);
                    std::process::exit(1);
                }
                Err(EditTaskError::Storage(e)) => {
                    eprintln!("Error: Failed to save task: {}", e);
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Some(Commands::List { task_type }) => {
            let tasks = store.list_by_type(task_type);

            if tasks.is_empty() {
                println!("No {} tasks found", task_type);
            } else {
                let title = match task_type {
                    TaskType::Daily => "Daily",
                    TaskType::Overall => "Overall",
                };
                println!("{}", ui::view_header(title, tasks.len()));
                let now = clock::now();
                for task in tasks {
                    println!("{}", ui::task_line(task, now));
                }
            }
        }
        Some(Commands::Show { id }) => match store.find_by_id(id) {
            Some((task, task_type)) => {
                println!("{}", ui::task_details(task, task_type, clock::now()));
            }
            None => {
                eprintln!("Error: Task #{} not found", id);
                std::process::exit(1);
            }
        },
        Some(Commands::Done { id }) => {
            let Some((_, task_type)) = store.find_by_id(id) else {
                eprintln!("Error: Task #{} not found", id);
                std::process::exit(1);
            };

            match store.toggle_task_finished(id, task_type) {
                Ok(task) if task.finished => println!("✓ Task finished: {}", task.title),
                Ok(task) => println!("○ Task reopened: {}", task.title),
                Err(ToggleTaskError::TaskNotFound(id, _)) => {
                    eprintln!("Error: Task #{} not found", id);
                    std::process::exit(1);
                }
                Err(ToggleTaskError::Storage(e)) => {
                    eprintln!("Error: Failed to save task: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Some(Commands::Delete { id }) => {
            let Some((_, task_type)) = store.find_by_id(id) else {
                eprintln!("Error: Task #{} not found", id);
                std::process::exit(1);
            };

            match store.delete_task(id, task_type) {
                Ok(task) => println!("✓ Task deleted: {}", task.title),
                Err(DeleteTaskError::TaskNotFound(id, _)) => {
                    eprintln!("Error: Task #{} not found", id);
                    std::process::exit(1);
                }
                Err(DeleteTaskError::Storage(e)) => {
                    eprintln!("Error: Failed to delete task: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Some(Commands::Reset(reset)) => {
            let (result, message) = match reset {
                ResetCommands::Daily => (store.reset_tasks(TaskType::Daily), "Daily tasks cleared"),
                ResetCommands::Overall => {
                    (store.reset_tasks(TaskType::Overall), "Overall tasks cleared")
                }
                ResetCommands::Tags => (store.reset_tags(), "All tags cleared"),
            };

            if let Err(e) = result {
                eprintln!("Error: Failed to reset: {}", e);
                std::process::exit(1);
            }
            println!("✓ {}", message);
        }
        Some(Commands::Tags { name: Some(name) }) => {
            let tasks: Vec<_> = store.tasks_with_tag(&name).collect();

            if tasks.is_empty() {
                println!("No tasks with tag '{}'", name);
            } else {
                println!("{}", ui::view_header(&format!("#{}", name), tasks.len()));
                let now = clock::now();
                for task in tasks {
                    println!("{}", ui::task_line(task, now));
                }
            }
        }
        Some(Commands::Tags { name: None }) => {
            let vocabulary = store.tag_vocabulary();

            if vocabulary.is_empty() {
                println!("No tags found");
            } else {
                println!(
                    "{} ({} {})\n",
                    "TAGS".cyan(),
                    vocabulary.len(),
                    if vocabulary.len() == 1 { "tag" } else { "tags" }
                );
                for line in ui::tag_lines(vocabulary, store.document().get_all_tasks()) {
                    println!("{}", line);
                }
            }
        }
        Some(Commands::NextId) => {
            println!("{}", store.next_id());
        }
    }
}

fn parse_deadline(text: &str) -> jiff::civil::DateTime {
    clock::parse_user_input(text).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        eprintln!("\nExpected format: YYYY-MM-DD HH:MM (e.g., 2030-01-25 23:59)");
        std::process::exit(1);
    })
}
