//! Timer durations and the long-break cadence.
//!
//! Settings arrive from hand-edited documents, old backups and CLI input, so
//! deserialization never fails: every field is parsed on its own and falls
//! back to its default when it is missing, non-numeric or out of range.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::state::TimerMode;

const FOCUS_RANGE: (u32, u32) = (1, 120);
const SHORT_BREAK_RANGE: (u32, u32) = (1, 60);
const LONG_BREAK_RANGE: (u32, u32) = (1, 120);
const INTERVAL_RANGE: (u32, u32) = (2, 10);

/// Durations in minutes, `long_break_interval` in focus cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "Value")]
pub struct TimerSettings {
    pub focus_time: u32,
    pub short_break: u32,
    pub long_break: u32,
    pub long_break_interval: u32,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            focus_time: 25,
            short_break: 5,
            long_break: 15,
            long_break_interval: 4,
        }
    }
}

impl TimerSettings {
    /// Nominal length of `mode` in minutes.
    pub fn minutes_for(&self, mode: TimerMode) -> u32 {
        match mode {
            TimerMode::Focus => self.focus_time,
            TimerMode::ShortBreak => self.short_break,
            TimerMode::LongBreak => self.long_break,
        }
    }

    /// Nominal length of `mode` in seconds.
    pub fn seconds_for(&self, mode: TimerMode) -> u64 {
        u64::from(self.minutes_for(mode)) * 60
    }

    /// Replace every out-of-range field with its default.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        Self {
            focus_time: in_range(self.focus_time, FOCUS_RANGE).unwrap_or(defaults.focus_time),
            short_break: in_range(self.short_break, SHORT_BREAK_RANGE)
                .unwrap_or(defaults.short_break),
            long_break: in_range(self.long_break, LONG_BREAK_RANGE).unwrap_or(defaults.long_break),
            long_break_interval: in_range(self.long_break_interval, INTERVAL_RANGE)
                .unwrap_or(defaults.long_break_interval),
        }
    }

    /// Apply a partial update given as loosely typed field values.
    ///
    /// Used by the CLI, where each flag is optional and raw.
    pub fn with_overrides(
        self,
        focus_time: Option<&str>,
        short_break: Option<&str>,
        long_break: Option<&str>,
        long_break_interval: Option<&str>,
    ) -> Self {
        let pick = |raw: Option<&str>, current: u32| {
            raw.map(|s| parse_minutes(&Value::String(s.to_string())).unwrap_or(0))
                .unwrap_or(current)
        };
        Self {
            focus_time: pick(focus_time, self.focus_time),
            short_break: pick(short_break, self.short_break),
            long_break: pick(long_break, self.long_break),
            long_break_interval: pick(long_break_interval, self.long_break_interval),
        }
        .sanitized()
    }
}

impl From<Value> for TimerSettings {
    fn from(value: Value) -> Self {
        let field = |key: &str| value.get(key).and_then(parse_minutes).unwrap_or(0);
        Self {
            focus_time: field("focusTime"),
            short_break: field("shortBreak"),
            long_break: field("longBreak"),
            long_break_interval: field("longBreakInterval"),
        }
        .sanitized()
    }
}

fn in_range(v: u32, (lo, hi): (u32, u32)) -> Option<u32> {
    (lo..=hi).contains(&v).then_some(v)
}

/// Accepts integers, whole floats and numeric strings ("25", " 25 ").
fn parse_minutes(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64))
            .and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    }
}
