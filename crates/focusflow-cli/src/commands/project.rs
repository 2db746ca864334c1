//! Project management commands for CLI.

use clap::Subcommand;
use focusflow_core::Config;

use super::open_service;
use crate::output::{print_json, CmdResult};

#[derive(Subcommand)]
pub enum ProjectAction {
    /// Create a new project
    Create {
        /// Project name
        name: String,
        /// CSS color; a random hue when omitted
        #[arg(long)]
        color: Option<String>,
        /// Folder ID to place the project in
        #[arg(long)]
        folder: Option<String>,
    },
    /// List all projects
    List,
    /// Expand or collapse a project
    Toggle {
        /// Project ID
        id: String,
    },
    /// Move a project into a folder, or to top level without one
    Move {
        /// Project ID
        id: String,
        #[arg(long)]
        folder: Option<String>,
    },
    /// Delete a project; its tasks move to top level
    Delete {
        /// Project ID
        id: String,
    },
}

pub fn run(action: ProjectAction, config: &Config) -> CmdResult {
    let mut service = open_service(config)?;

    match action {
        ProjectAction::Create {
            name,
            color,
            folder,
        } => {
            let project = service.add_project(&name, color)?;
            if folder.is_some() {
                service.move_project(&project.id, folder.as_deref())?;
            }
            print_json(&service.board().project(&project.id))?;
        }
        ProjectAction::List => print_json(&service.board().projects)?,
        ProjectAction::Toggle { id } => {
            service.toggle_project(&id)?;
            print_json(&service.board().project(&id))?;
        }
        ProjectAction::Move { id, folder } => {
            service.move_project(&id, folder.as_deref())?;
            print_json(&service.board().project(&id))?;
        }
        ProjectAction::Delete { id } => print_json(&service.delete_project(&id)?)?,
    }
    Ok(())
}
