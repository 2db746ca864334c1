pub mod config;
pub mod data;
pub mod folder;
pub mod garden;
pub mod project;
pub mod settings;
pub mod stats;
pub mod task;
pub mod timer;

use focusflow_core::{Config, FocusService};
use std::error::Error;

use crate::output::{StderrNotifier, TerminalBell};

/// Load the service over the data directory with terminal collaborators.
pub fn open_service(config: &Config) -> Result<FocusService, Box<dyn Error>> {
    Ok(FocusService::open(config)?
        .with_notifier(StderrNotifier)
        .with_cue_player(TerminalBell))
}
