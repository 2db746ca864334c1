use chrono::Utc;
use clap::Subcommand;
use focusflow_core::Config;

use super::open_service;
use crate::output::{print_json, CmdResult};

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print timer settings as JSON
    Show,
    /// Change one or more durations; out-of-range values fall back to defaults
    Set {
        /// Focus length in minutes (1-120)
        #[arg(long)]
        focus: Option<String>,
        /// Short break length in minutes (1-60)
        #[arg(long)]
        short_break: Option<String>,
        /// Long break length in minutes (1-120)
        #[arg(long)]
        long_break: Option<String>,
        /// Focus sessions before a long break (2-10)
        #[arg(long)]
        interval: Option<String>,
    },
}

pub fn run(action: SettingsAction, config: &Config) -> CmdResult {
    let mut service = open_service(config)?;

    match action {
        SettingsAction::Show => print_json(service.settings())?,
        SettingsAction::Set {
            focus,
            short_break,
            long_break,
            interval,
        } => {
            let settings = service.settings().with_overrides(
                focus.as_deref(),
                short_break.as_deref(),
                long_break.as_deref(),
                interval.as_deref(),
            );
            service.update_settings(settings, Utc::now())?;
            print_json(service.settings())?;
        }
    }
    Ok(())
}
