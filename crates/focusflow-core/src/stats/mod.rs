//! Statistics module for FocusFlow
//!
//! Session accounting and the read-only queries the reporting views use:
//! daily and monthly counters, focus minutes, and the per-day timeline of
//! task blocks.

mod ledger;

pub use ledger::{
    date_key, local_date, month_key, BlockKind, DaySummary, HourSlot, Overview, PeriodSummary,
    Statistics, TaskBlock, UNTITLED_SESSION,
};
