use chrono::Utc;
use clap::Subcommand;
use focusflow_core::Config;
use std::path::PathBuf;

use super::open_service;
use crate::output::{print_json, CmdResult};

#[derive(Subcommand)]
pub enum DataAction {
    /// Write every document to a backup file (stdout without a path)
    Export {
        /// Output file, e.g. focusflow-backup-2024-03-09.json
        path: Option<PathBuf>,
    },
    /// Load a backup file; present sections replace the stored ones
    Import {
        /// Backup file
        path: PathBuf,
    },
}

pub fn run(action: DataAction, config: &Config) -> CmdResult {
    let mut service = open_service(config)?;
    let now = Utc::now();

    match action {
        DataAction::Export { path } => {
            let json = service.export(now)?.to_json()?;
            match path {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    eprintln!("exported to {}", path.display());
                }
                None => println!("{json}"),
            }
        }
        DataAction::Import { path } => {
            let json = std::fs::read_to_string(&path)?;
            print_json(&service.import(&json, now)?)?;
        }
    }
    Ok(())
}
