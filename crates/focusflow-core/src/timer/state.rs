use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::settings::TimerSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimerMode {
    Focus,
    ShortBreak,
    LongBreak,
}

impl TimerMode {
    pub fn is_break(self) -> bool {
        !matches!(self, TimerMode::Focus)
    }

    pub fn title(self) -> &'static str {
        match self {
            TimerMode::Focus => "Focus Session",
            TimerMode::ShortBreak => "Short Break",
            TimerMode::LongBreak => "Long Break",
        }
    }
}

/// Mode and cycle that follow a completed interval.
///
/// A focus interval leads to a long break on every `long_break_interval`-th
/// cycle and to a short break otherwise. Any break leads back to focus and
/// starts the next cycle.
pub fn next_mode(mode: TimerMode, cycle: u32, long_break_interval: u32) -> (TimerMode, u32) {
    match mode {
        TimerMode::Focus => {
            if long_break_interval != 0 && cycle % long_break_interval == 0 {
                (TimerMode::LongBreak, cycle)
            } else {
                (TimerMode::ShortBreak, cycle)
            }
        }
        TimerMode::ShortBreak | TimerMode::LongBreak => {
            (TimerMode::Focus, cycle.saturating_add(1))
        }
    }
}

/// The persisted `timer-state` document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub mode: TimerMode,
    /// Seconds remaining in the current interval.
    pub time_left: u64,
    pub is_running: bool,
    pub cycle: u32,
    #[serde(default, rename = "currentTask", skip_serializing_if = "Option::is_none")]
    pub current_task_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_task_id: Option<String>,
    /// Wall-clock start of the interval; set on the first start, cleared on
    /// transition or reset.
    #[serde(default, rename = "sessionStartTime", skip_serializing_if = "Option::is_none")]
    pub session_start: Option<DateTime<Utc>>,
}

impl TimerState {
    pub fn initial(settings: &TimerSettings) -> Self {
        Self {
            mode: TimerMode::Focus,
            time_left: settings.seconds_for(TimerMode::Focus),
            is_running: false,
            cycle: 1,
            current_task_label: None,
            current_task_id: None,
            session_start: None,
        }
    }

    /// Full nominal duration of the current mode.
    pub fn total_secs(&self, settings: &TimerSettings) -> u64 {
        settings.seconds_for(self.mode)
    }

    /// `MM:SS` rendering of the remaining time.
    pub fn clock(&self) -> String {
        format!("{:02}:{:02}", self.time_left / 60, self.time_left % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn initial_state_is_first_focus() {
        let s = TimerState::initial(&TimerSettings::default());
        assert_eq!(s.mode, TimerMode::Focus);
        assert_eq!(s.cycle, 1);
        assert_eq!(s.time_left, 1500);
        assert!(!s.is_running);
        assert_eq!(s.clock(), "25:00");
    }

    #[test]
    fn document_uses_original_field_names() {
        let mut s = TimerState::initial(&TimerSettings::default());
        s.current_task_label = Some("Write".into());
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["mode"], "focus");
        assert_eq!(json["timeLeft"], 1500);
        assert_eq!(json["currentTask"], "Write");
        assert!(json.get("sessionStartTime").is_none());
    }

    #[test]
    fn older_documents_without_task_fields_load() {
        let s: TimerState = serde_json::from_str(
            r#"{"mode":"shortBreak","timeLeft":120,"isRunning":false,"cycle":3}"#,
        )
        .unwrap();
        assert_eq!(s.mode, TimerMode::ShortBreak);
        assert!(s.current_task_id.is_none());
    }

    #[test]
    fn break_at_the_last_cycle_does_not_overflow() {
        let (mode, cycle) = next_mode(TimerMode::ShortBreak, u32::MAX, 4);
        assert_eq!(mode, TimerMode::Focus);
        assert_eq!(cycle, u32::MAX);
    }

    proptest! {
        #[test]
        fn focus_goes_long_exactly_on_interval_multiples(cycle in 1u32..10_000, interval in 2u32..=10) {
            let (mode, next_cycle) = next_mode(TimerMode::Focus, cycle, interval);
            prop_assert_eq!(next_cycle, cycle);
            if cycle % interval == 0 {
                prop_assert_eq!(mode, TimerMode::LongBreak);
            } else {
                prop_assert_eq!(mode, TimerMode::ShortBreak);
            }
        }

        #[test]
        fn breaks_always_return_to_focus(cycle in 1u32..10_000, interval in 2u32..=10, long in any::<bool>()) {
            let from = if long { TimerMode::LongBreak } else { TimerMode::ShortBreak };
            prop_assert_eq!(next_mode(from, cycle, interval), (TimerMode::Focus, cycle + 1));
        }
    }
}
