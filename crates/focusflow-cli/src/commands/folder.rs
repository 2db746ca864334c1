use clap::Subcommand;
use focusflow_core::Config;

use super::open_service;
use crate::output::{print_json, CmdResult};

#[derive(Subcommand)]
pub enum FolderAction {
    /// Create a new folder
    Create {
        /// Folder name
        name: String,
    },
    /// List all folders
    List,
    /// Expand or collapse a folder
    Toggle {
        /// Folder ID
        id: String,
    },
    /// Delete a folder; its tasks and projects move to top level
    Delete {
        /// Folder ID
        id: String,
    },
}

pub fn run(action: FolderAction, config: &Config) -> CmdResult {
    let mut service = open_service(config)?;

    match action {
        FolderAction::Create { name } => print_json(&service.add_folder(&name)?)?,
        FolderAction::List => print_json(&service.board().folders)?,
        FolderAction::Toggle { id } => {
            service.toggle_folder(&id)?;
            print_json(&service.board().folder(&id))?;
        }
        FolderAction::Delete { id } => print_json(&service.delete_folder(&id)?)?,
    }
    Ok(())
}
