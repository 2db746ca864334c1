use chrono::Utc;
use clap::Subcommand;
use focusflow_core::Config;
use serde_json::json;

use super::open_service;
use crate::output::{print_json, CmdResult};

#[derive(Subcommand)]
pub enum GardenAction {
    /// Fish, leaves, pond level and tree stage
    Status,
    /// Feed the fish (once every four hours)
    Feed,
}

pub fn run(action: GardenAction, config: &Config) -> CmdResult {
    let mut service = open_service(config)?;
    let now = Utc::now();

    match action {
        GardenAction::Status => print_json(&service.garden().status(now))?,
        GardenAction::Feed => {
            let fed = service.feed(now)?;
            print_json(&json!({
                "fed": fed,
                "nextFeedAt": service.garden().next_feed_at(),
            }))?;
        }
    }
    Ok(())
}
