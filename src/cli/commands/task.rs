use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{format_task_line, output_empty_collection, output_failure, output_success};
use crate::cli::OutputFormat;
use crate::error::ApiFailure;
use crate::tasks::{CreateTaskInput, Task, UpdateTaskInput};

#[derive(Subcommand)]
pub enum TaskCommands {
    #[command(about = "List all tasks")]
    List,

    #[command(about = "Create a new task")]
    Create {
        #[arg(help = "Task title")]
        title: String,
        #[arg(long, help = "Optional description")]
        description: Option<String>,
    },

    #[command(about = "Show a single task")]
    Get {
        #[arg(help = "Task ID")]
        id: String,
    },

    #[command(about = "Update a task's fields")]
    Update {
        #[arg(help = "Task ID")]
        id: String,
        #[arg(long, help = "New title")]
        title: Option<String>,
        #[arg(long, help = "New description")]
        description: Option<String>,
        #[arg(long, help = "Completion status (true/false)")]
        completed: Option<bool>,
    },

    #[command(about = "Delete a task")]
    Delete {
        #[arg(help = "Task ID")]
        id: String,
    },

    #[command(about = "Toggle a task's completion status")]
    Toggle {
        #[arg(help = "Task ID")]
        id: String,
    },
}

pub async fn handle(cmd: TaskCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let api = super::task_api()?;

    match cmd {
        TaskCommands::List => match api.list().await {
            Ok(tasks) if tasks.is_empty() => {
                output_empty_collection(&output_format, "tasks", "No tasks yet")
            }
            Ok(tasks) => output_tasks(&output_format, &tasks),
            Err(failure) => fail(&output_format, &failure),
        },

        TaskCommands::Create { title, description } => {
            let input = CreateTaskInput { title, description };
            match api.create(input).await {
                Ok(task) => output_task(&output_format, "Task created", &task),
                Err(failure) => fail(&output_format, &failure),
            }
        }

        TaskCommands::Get { id } => match api.get(&id).await {
            Ok(task) => output_task(&output_format, "Task", &task),
            Err(failure) => fail(&output_format, &failure),
        },

        TaskCommands::Update {
            id,
            title,
            description,
            completed,
        } => {
            let input = UpdateTaskInput {
                title,
                description,
                completed,
            };
            match api.update(&id, input).await {
                Ok(task) => output_task(&output_format, "Task updated", &task),
                Err(failure) => fail(&output_format, &failure),
            }
        }

        TaskCommands::Delete { id } => match api.delete(&id).await {
            Ok(()) => output_success(&output_format, &format!("Task {} deleted", id), None),
            Err(failure) => fail(&output_format, &failure),
        },

        TaskCommands::Toggle { id } => match api.toggle(&id).await {
            Ok(task) => {
                let state = if task.completed { "completed" } else { "reopened" };
                output_task(&output_format, &format!("Task {}", state), &task)
            }
            Err(failure) => fail(&output_format, &failure),
        },
    }
}

fn output_tasks(output_format: &OutputFormat, tasks: &[Task]) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({ "tasks": tasks }))?
            );
            Ok(())
        }
        OutputFormat::Text => {
            for task in tasks {
                println!("{}", format_task_line(task));
            }
            Ok(())
        }
    }
}

fn output_task(output_format: &OutputFormat, message: &str, task: &Task) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({ "success": true, "task": task }))?
            );
            Ok(())
        }
        OutputFormat::Text => {
            println!("✓ {}: {}", message, format_task_line(task));
            Ok(())
        }
    }
}

fn fail(output_format: &OutputFormat, failure: &ApiFailure) -> anyhow::Result<()> {
    output_failure(output_format, failure)?;
    std::process::exit(1);
}
