//! The `statistics` document: lifetime totals, per-day and per-month
//! counters, and the per-day timeline of task blocks.
//!
//! Every map is keyed by local calendar date (`YYYY-MM-DD`) or month
//! (`YYYY-MM`). Reading a key that was never written yields zero or an
//! empty slice.

use chrono::{DateTime, Datelike, Local, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::timer::{CompletedInterval, TimerMode};

pub const UNTITLED_SESSION: &str = "Untitled Session";

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// Local calendar date of a UTC instant.
pub fn local_date(at: DateTime<Utc>) -> NaiveDate {
    at.with_timezone(&Local).date_naive()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Focus,
    /// Older timelines store the break mode itself.
    #[serde(alias = "shortBreak", alias = "longBreak")]
    Break,
}

impl From<TimerMode> for BlockKind {
    fn from(mode: TimerMode) -> Self {
        if mode.is_break() {
            BlockKind::Break
        } else {
            BlockKind::Focus
        }
    }
}

/// One finished interval on the timeline. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskBlock {
    pub id: String,
    #[serde(rename = "taskName")]
    pub task_label: String,
    #[serde(default, rename = "projectName", skip_serializing_if = "Option::is_none")]
    pub project_label: Option<String>,
    #[serde(default, rename = "folderName", skip_serializing_if = "Option::is_none")]
    pub folder_label: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Wall-clock minutes, pauses included.
    #[serde(rename = "duration")]
    pub duration_minutes: f64,
    #[serde(rename = "type")]
    pub kind: BlockKind,
    pub completed: bool,
}

impl TaskBlock {
    /// Block for a finished interval, or `None` when the interval never
    /// recorded a start time.
    pub fn from_interval(
        done: &CompletedInterval,
        project_label: Option<String>,
        folder_label: Option<String>,
    ) -> Option<Self> {
        let start_time = done.started_at?;
        Some(Self {
            id: uuid::Uuid::new_v4().to_string(),
            task_label: done
                .task_label
                .clone()
                .unwrap_or_else(|| UNTITLED_SESSION.to_string()),
            project_label,
            folder_label,
            start_time,
            end_time: done.ended_at,
            duration_minutes: done.wall_clock_minutes().unwrap_or(0.0),
            kind: done.mode.into(),
            completed: done.mode == TimerMode::Focus,
        })
    }

    /// Local hour of day the block started in.
    pub fn start_hour(&self) -> u32 {
        self.start_time.with_timezone(&Local).hour()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Statistics {
    pub total_sessions: u64,
    /// Minutes.
    pub total_focus_time: u64,
    /// Minutes.
    pub total_break_time: u64,
    pub daily_sessions: BTreeMap<String, u64>,
    pub monthly_sessions: BTreeMap<String, u64>,
    pub daily_focus_time: BTreeMap<String, u64>,
    #[serde(deserialize_with = "readable_blocks")]
    pub task_blocks: BTreeMap<String, Vec<TaskBlock>>,
}

/// Timeline loader that drops only the blocks that do not parse, so one bad
/// entry never costs the counters.
fn readable_blocks<'de, D>(deserializer: D) -> Result<BTreeMap<String, Vec<TaskBlock>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .filter_map(|(day, blocks)| {
            let Value::Array(blocks) = blocks else {
                tracing::warn!(day, "dropping unreadable timeline day");
                return None;
            };
            let blocks = blocks
                .into_iter()
                .filter_map(|block| {
                    serde_json::from_value(block)
                        .map_err(|e| tracing::warn!(day, error = %e, "dropping unreadable block"))
                        .ok()
                })
                .collect();
            Some((day, blocks))
        })
        .collect())
}

/// Sessions and focus minutes over some period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodSummary {
    pub sessions: u64,
    pub focus_minutes: u64,
}

/// One cell of a month calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySummary {
    pub date: String,
    pub day: u32,
    pub sessions: u64,
    pub focus_minutes: u64,
}

/// Timeline blocks that started within one hour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourSlot {
    pub hour: u32,
    pub blocks: Vec<TaskBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overview {
    pub total_sessions: u64,
    pub total_focus_time: u64,
    pub total_break_time: u64,
    pub today: PeriodSummary,
    pub this_month: PeriodSummary,
}

impl Statistics {
    /// Account for one finished interval.
    ///
    /// Focus intervals bump the session counters and add `nominal_minutes`
    /// of focus time; breaks only add break time. The block, if any, is
    /// appended to the timeline of `day`.
    pub fn record(
        &mut self,
        mode: TimerMode,
        nominal_minutes: u32,
        day: NaiveDate,
        block: Option<TaskBlock>,
    ) {
        let minutes = u64::from(nominal_minutes);
        if let Some(block) = block {
            self.task_blocks.entry(date_key(day)).or_default().push(block);
        }
        match mode {
            TimerMode::Focus => {
                self.total_sessions += 1;
                self.total_focus_time += minutes;
                *self.daily_sessions.entry(date_key(day)).or_insert(0) += 1;
                *self.monthly_sessions.entry(month_key(day)).or_insert(0) += 1;
                *self.daily_focus_time.entry(date_key(day)).or_insert(0) += minutes;
            }
            TimerMode::ShortBreak | TimerMode::LongBreak => {
                self.total_break_time += minutes;
            }
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn sessions_on(&self, date: NaiveDate) -> u64 {
        self.daily_sessions.get(&date_key(date)).copied().unwrap_or(0)
    }

    pub fn focus_minutes_on(&self, date: NaiveDate) -> u64 {
        self.daily_focus_time.get(&date_key(date)).copied().unwrap_or(0)
    }

    pub fn sessions_in_month(&self, any_day: NaiveDate) -> u64 {
        self.monthly_sessions
            .get(&month_key(any_day))
            .copied()
            .unwrap_or(0)
    }

    pub fn focus_minutes_in_month(&self, any_day: NaiveDate) -> u64 {
        let prefix = month_key(any_day);
        self.daily_focus_time
            .iter()
            .filter(|(date, _)| date.starts_with(&prefix))
            .map(|(_, minutes)| minutes)
            .sum()
    }

    pub fn blocks_on(&self, date: NaiveDate) -> &[TaskBlock] {
        self.task_blocks
            .get(&date_key(date))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All 24 hours of `date`, each with the blocks that started in it.
    pub fn blocks_by_hour(&self, date: NaiveDate) -> Vec<HourSlot> {
        let blocks = self.blocks_on(date);
        (0..24)
            .map(|hour| HourSlot {
                hour,
                blocks: blocks
                    .iter()
                    .filter(|b| b.start_hour() == hour)
                    .cloned()
                    .collect(),
            })
            .collect()
    }

    /// One entry per day of the month containing `any_day`.
    pub fn month_calendar(&self, any_day: NaiveDate) -> Vec<DaySummary> {
        let Some(first) = any_day.with_day(1) else {
            return Vec::new();
        };
        first
            .iter_days()
            .take_while(|d| d.month() == first.month())
            .map(|d| DaySummary {
                date: date_key(d),
                day: d.day(),
                sessions: self.sessions_on(d),
                focus_minutes: self.focus_minutes_on(d),
            })
            .collect()
    }

    pub fn overview(&self, today: NaiveDate) -> Overview {
        Overview {
            total_sessions: self.total_sessions,
            total_focus_time: self.total_focus_time,
            total_break_time: self.total_break_time,
            today: PeriodSummary {
                sessions: self.sessions_on(today),
                focus_minutes: self.focus_minutes_on(today),
            },
            this_month: PeriodSummary {
                sessions: self.sessions_in_month(today),
                focus_minutes: self.focus_minutes_in_month(today),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn block(start: DateTime<Utc>, minutes: i64, kind: BlockKind) -> TaskBlock {
        TaskBlock {
            id: uuid::Uuid::new_v4().to_string(),
            task_label: "Write".into(),
            project_label: None,
            folder_label: None,
            start_time: start,
            end_time: start + Duration::minutes(minutes),
            duration_minutes: minutes as f64,
            kind,
            completed: kind == BlockKind::Focus,
        }
    }

    #[test]
    fn missing_keys_read_as_zero() {
        let stats = Statistics::default();
        let d = day(2024, 3, 9);
        assert_eq!(stats.sessions_on(d), 0);
        assert_eq!(stats.focus_minutes_on(d), 0);
        assert_eq!(stats.sessions_in_month(d), 0);
        assert!(stats.blocks_on(d).is_empty());
    }

    #[test]
    fn focus_record_updates_all_counters() {
        let mut stats = Statistics::default();
        let d = day(2024, 3, 9);
        stats.record(TimerMode::Focus, 25, d, None);
        stats.record(TimerMode::Focus, 25, d, None);
        stats.record(TimerMode::Focus, 50, day(2024, 3, 10), None);

        assert_eq!(stats.total_sessions, 3);
        assert_eq!(stats.total_focus_time, 100);
        assert_eq!(stats.sessions_on(d), 2);
        assert_eq!(stats.focus_minutes_on(d), 50);
        assert_eq!(stats.sessions_in_month(d), 3);
        assert_eq!(stats.focus_minutes_in_month(d), 100);
        assert_eq!(stats.total_break_time, 0);
    }

    #[test]
    fn break_record_only_adds_break_time() {
        let mut stats = Statistics::default();
        let d = day(2024, 3, 9);
        stats.record(TimerMode::ShortBreak, 5, d, None);
        stats.record(TimerMode::LongBreak, 15, d, None);
        assert_eq!(stats.total_break_time, 20);
        assert_eq!(stats.total_sessions, 0);
        assert_eq!(stats.sessions_on(d), 0);
    }

    #[test]
    fn blocks_append_in_order() {
        let mut stats = Statistics::default();
        let d = day(2024, 3, 9);
        let t0 = Utc::now();
        stats.record(TimerMode::Focus, 25, d, Some(block(t0, 25, BlockKind::Focus)));
        stats.record(
            TimerMode::ShortBreak,
            5,
            d,
            Some(block(t0 + Duration::minutes(25), 5, BlockKind::Break)),
        );
        let blocks = stats.blocks_on(d);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].kind, BlockKind::Focus);
        assert!(blocks[0].completed);
        assert_eq!(blocks[1].kind, BlockKind::Break);
        assert!(!blocks[1].completed);
    }

    #[test]
    fn hourly_view_has_every_hour() {
        let mut stats = Statistics::default();
        let start = Utc::now();
        let d = local_date(start);
        stats.record(TimerMode::Focus, 25, d, Some(block(start, 25, BlockKind::Focus)));
        let slots = stats.blocks_by_hour(d);
        assert_eq!(slots.len(), 24);
        let hour = start.with_timezone(&Local).hour();
        assert_eq!(slots[hour as usize].blocks.len(), 1);
        assert_eq!(slots.iter().map(|s| s.blocks.len()).sum::<usize>(), 1);
    }

    #[test]
    fn month_calendar_covers_whole_month() {
        let mut stats = Statistics::default();
        stats.record(TimerMode::Focus, 25, day(2024, 2, 29), None);
        let cal = stats.month_calendar(day(2024, 2, 10));
        assert_eq!(cal.len(), 29);
        assert_eq!(cal[28].date, "2024-02-29");
        assert_eq!(cal[28].sessions, 1);
        assert_eq!(cal[0].sessions, 0);
    }

    #[test]
    fn older_documents_without_new_maps_load() {
        let stats: Statistics = serde_json::from_str(
            r#"{"totalSessions":4,"totalFocusTime":100,"totalBreakTime":15,
                "dailySessions":{"2024-03-09":4},"monthlySessions":{"2024-03":4}}"#,
        )
        .unwrap();
        assert_eq!(stats.sessions_on(day(2024, 3, 9)), 4);
        assert!(stats.daily_focus_time.is_empty());
        assert!(stats.task_blocks.is_empty());
    }

    #[test]
    fn break_blocks_named_by_mode_load_as_breaks() {
        let stats: Statistics = serde_json::from_str(
            r#"{"totalSessions":40,"totalFocusTime":1000,"totalBreakTime":200,
                "dailySessions":{"2024-03-09":2},"monthlySessions":{"2024-03":12},
                "taskBlocks":{"2024-03-09":[
                  {"id":"1","taskName":"Untitled Session","startTime":"2024-03-09T09:00:00.000Z",
                   "endTime":"2024-03-09T09:05:00.000Z","duration":5,"type":"shortBreak","completed":false},
                  {"id":"2","taskName":"Untitled Session","startTime":"2024-03-09T10:00:00.000Z",
                   "endTime":"2024-03-09T10:15:00.000Z","duration":15,"type":"longBreak","completed":false}
                ]}}"#,
        )
        .unwrap();
        assert_eq!(stats.total_sessions, 40);
        let blocks = stats.blocks_on(day(2024, 3, 9));
        assert_eq!(blocks.len(), 2);
        assert!(blocks.iter().all(|b| b.kind == BlockKind::Break));
    }

    #[test]
    fn unreadable_blocks_are_dropped_without_losing_counters() {
        let stats: Statistics = serde_json::from_str(
            r#"{"totalSessions":7,"dailySessions":{"2024-03-09":3},
                "taskBlocks":{
                  "2024-03-09":[
                    {"id":"ok","taskName":"Write","startTime":"2024-03-09T09:00:00Z",
                     "endTime":"2024-03-09T09:25:00Z","duration":25,"type":"focus","completed":true},
                    {"id":"bad","taskName":"Write","type":"nap"}
                  ],
                  "2024-03-10":"not a list"
                }}"#,
        )
        .unwrap();
        assert_eq!(stats.total_sessions, 7);
        assert_eq!(stats.sessions_on(day(2024, 3, 9)), 3);
        let blocks = stats.blocks_on(day(2024, 3, 9));
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].id, "ok");
        assert!(stats.blocks_on(day(2024, 3, 10)).is_empty());
    }

    #[test]
    fn null_timeline_loads_empty() {
        let stats: Statistics =
            serde_json::from_str(r#"{"totalSessions":2,"taskBlocks":null}"#).unwrap();
        assert_eq!(stats.total_sessions, 2);
        assert!(stats.task_blocks.is_empty());
    }

    #[test]
    fn block_document_uses_timeline_field_names() {
        let b = block(Utc::now(), 25, BlockKind::Focus);
        let json = serde_json::to_value(&b).unwrap();
        assert_eq!(json["taskName"], "Write");
        assert_eq!(json["type"], "focus");
        assert_eq!(json["duration"], 25.0);
        assert!(json.get("projectName").is_none());
    }

    #[test]
    fn overview_combines_today_and_month() {
        let mut stats = Statistics::default();
        stats.record(TimerMode::Focus, 25, day(2024, 3, 1), None);
        stats.record(TimerMode::Focus, 25, day(2024, 3, 9), None);
        let o = stats.overview(day(2024, 3, 9));
        assert_eq!(o.today, PeriodSummary { sessions: 1, focus_minutes: 25 });
        assert_eq!(o.this_month, PeriodSummary { sessions: 2, focus_minutes: 50 });
        assert_eq!(o.total_sessions, 2);
    }
}
