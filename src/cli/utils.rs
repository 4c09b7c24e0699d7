use std::io::{BufRead, Write};

use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::error::ApiFailure;
use crate::tasks::Task;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(target), Some(Value::Object(extra))) =
                (response.as_object_mut(), data)
            {
                target.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an API failure in the appropriate format
pub fn output_failure(output_format: &OutputFormat, failure: &ApiFailure) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&failure.to_json())?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", failure.message());
        }
    }
    Ok(())
}

/// Output an empty collection in the appropriate format
pub fn output_empty_collection(
    output_format: &OutputFormat,
    collection_name: &str,
    message: &str,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    collection_name: []
                }))?
            );
        }
        OutputFormat::Text => {
            println!("{}", message);
        }
    }
    Ok(())
}

/// One task per line: completion marker, id, title, optional description
pub fn format_task_line(task: &Task) -> String {
    let marker = if task.completed { "[x]" } else { "[ ]" };
    match &task.description {
        Some(description) if !description.is_empty() => {
            format!("{} {}  {} - {}", marker, task.id, task.title, description)
        }
        _ => format!("{} {}  {}", marker, task.id, task.title),
    }
}

/// Use the provided password or prompt for one on stdin
pub fn prompt_password(provided: Option<String>) -> anyhow::Result<String> {
    if let Some(password) = provided {
        return Ok(password);
    }

    eprint!("Password: ");
    std::io::stderr().flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
