use chrono::{NaiveDate, Utc};
use clap::Subcommand;
use focusflow_core::stats::local_date;
use focusflow_core::DocumentStore;
use serde_json::json;

use crate::output::{print_json, CmdResult};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Today's sessions, focus minutes and timeline
    Today,
    /// This month's sessions and focus minutes
    Month,
    /// All-time totals
    All,
    /// Sessions, minutes and timeline of one day
    Day {
        /// Date as YYYY-MM-DD
        date: NaiveDate,
    },
    /// Per-day sessions and minutes for a month
    Calendar {
        /// Any date within the month; defaults to today
        date: Option<NaiveDate>,
    },
}

fn day_report(stats: &focusflow_core::Statistics, date: NaiveDate) -> serde_json::Value {
    json!({
        "date": focusflow_core::stats::date_key(date),
        "sessions": stats.sessions_on(date),
        "focusMinutes": stats.focus_minutes_on(date),
        "blocks": stats.blocks_on(date),
    })
}

pub fn run(action: StatsAction) -> CmdResult {
    let stats = DocumentStore::open()?.statistics()?;
    let today = local_date(Utc::now());

    match action {
        StatsAction::Today => print_json(&day_report(&stats, today))?,
        StatsAction::Month => print_json(&json!({
            "month": focusflow_core::stats::month_key(today),
            "sessions": stats.sessions_in_month(today),
            "focusMinutes": stats.focus_minutes_in_month(today),
        }))?,
        StatsAction::All => print_json(&stats.overview(today))?,
        StatsAction::Day { date } => print_json(&day_report(&stats, date))?,
        StatsAction::Calendar { date } => {
            print_json(&stats.month_calendar(date.unwrap_or(today)))?
        }
    }
    Ok(())
}
