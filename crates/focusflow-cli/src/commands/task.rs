//! Task management commands for CLI.

use chrono::Utc;
use clap::Subcommand;
use focusflow_core::Config;

use super::open_service;
use crate::output::{print_json, CmdResult};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a new task
    Create {
        /// Task title
        title: String,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
        /// Project ID to put the task in
        #[arg(long, conflicts_with = "folder")]
        project: Option<String>,
        /// Folder ID to put the task in
        #[arg(long)]
        folder: Option<String>,
    },
    /// List tasks
    List {
        /// Filter by project ID
        #[arg(long)]
        project: Option<String>,
        /// Only open tasks
        #[arg(long)]
        open: bool,
    },
    /// Toggle a task's completion; without an ID, complete the timer's task
    Complete {
        /// Task ID
        id: Option<String>,
    },
    /// Delete a task
    Delete {
        /// Task ID
        id: String,
    },
    /// Move a task into a project or folder, or to top level with neither
    Move {
        /// Task ID
        id: String,
        #[arg(long, conflicts_with = "folder")]
        project: Option<String>,
        #[arg(long)]
        folder: Option<String>,
    },
    /// Open tasks grouped by project and folder, plus completed tasks
    Grouped,
}

fn parse_tags(tags: Option<String>) -> Vec<String> {
    tags.map(|t| {
        t.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

pub fn run(action: TaskAction, config: &Config) -> CmdResult {
    let mut service = open_service(config)?;
    let now = Utc::now();

    match action {
        TaskAction::Create {
            title,
            tags,
            project,
            folder,
        } => {
            let task = service.add_task(&title, parse_tags(tags), now)?;
            if project.is_some() {
                service.move_task_to_project(&task.id, project.as_deref())?;
            } else if folder.is_some() {
                service.move_task_to_folder(&task.id, folder.as_deref())?;
            }
            let task = service.board().task(&task.id).cloned().unwrap_or(task);
            print_json(&task)?;
        }
        TaskAction::List { project, open } => {
            let tasks: Vec<_> = service
                .board()
                .tasks
                .iter()
                .filter(|t| project.is_none() || t.project_id == project)
                .filter(|t| !open || !t.completed)
                .collect();
            print_json(&tasks)?;
        }
        TaskAction::Complete { id: Some(id) } => {
            let outcome = service.toggle_task(&id, now)?;
            print_json(&outcome.task)?;
        }
        TaskAction::Complete { id: None } => match service.complete_current_task(now)? {
            Some(outcome) => print_json(&outcome.task)?,
            None => return Err("no open task is selected in the timer".into()),
        },
        TaskAction::Delete { id } => {
            let task = service.delete_task(&id, now)?;
            print_json(&task)?;
        }
        TaskAction::Move {
            id,
            project,
            folder,
        } => {
            if folder.is_some() {
                service.move_task_to_folder(&id, folder.as_deref())?;
            } else {
                service.move_task_to_project(&id, project.as_deref())?;
                if project.is_none() {
                    service.move_task_to_folder(&id, None)?;
                }
            }
            print_json(&service.board().task(&id))?;
        }
        TaskAction::Grouped => print_json(&service.grouped_tasks())?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_trimmed_and_blank_ones_dropped() {
        assert_eq!(
            parse_tags(Some(" deep, ,work ".into())),
            vec!["deep".to_string(), "work".to_string()]
        );
        assert!(parse_tags(None).is_empty());
    }
}
