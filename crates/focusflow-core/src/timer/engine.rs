//! Timer engine implementation.
//!
//! The timer engine is a one-second countdown state machine. It does not use
//! internal threads - the caller is responsible for calling `tick()` once per
//! second while the timer runs (see [`crate::driver`]).
//!
//! ## State Transitions
//!
//! ```text
//! Focus --(cycle % interval == 0)--> LongBreak --(cycle + 1)--> Focus
//! Focus --(otherwise)--------------> ShortBreak --(cycle + 1)--> Focus
//! ```
//!
//! Transitions happen only when a running countdown reaches zero. The engine
//! never starts the next interval on its own.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(TimerSettings::default());
//! engine.toggle(Utc::now());
//! // Once per second:
//! if let TickResult::Completed(done) = engine.tick(Utc::now()) { /* account */ }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::settings::TimerSettings;
use super::state::{next_mode, TimerMode, TimerState};
use crate::events::Event;

/// Everything the session accounting needs to know about a finished interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedInterval {
    pub mode: TimerMode,
    pub cycle: u32,
    pub next_mode: TimerMode,
    pub next_cycle: u32,
    /// Configured length of the finished interval, in minutes.
    pub nominal_minutes: u32,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: DateTime<Utc>,
    pub task_id: Option<String>,
    pub task_label: Option<String>,
}

impl CompletedInterval {
    /// Wall-clock minutes between the recorded start and the end, pauses
    /// included.
    pub fn wall_clock_minutes(&self) -> Option<f64> {
        self.started_at
            .map(|start| (self.ended_at - start).num_milliseconds().max(0) as f64 / 60_000.0)
    }
}

/// Outcome of a single `tick()`.
#[derive(Debug, Clone, PartialEq)]
pub enum TickResult {
    /// Not running, or already at zero. Nothing changed.
    Idle,
    /// One second was counted down.
    Counting { time_left: u64 },
    /// The countdown hit zero and the engine moved to the next mode.
    Completed(CompletedInterval),
}

/// Core timer engine.
///
/// Owns the authoritative [`TimerState`] together with the settings used to
/// compute durations.
#[derive(Debug, Clone)]
pub struct TimerEngine {
    settings: TimerSettings,
    state: TimerState,
}

impl TimerEngine {
    /// Create a new timer engine at the first focus interval.
    pub fn new(settings: TimerSettings) -> Self {
        let settings = settings.sanitized();
        Self {
            state: TimerState::initial(&settings),
            settings,
        }
    }

    /// Rebuild the engine from a persisted state.
    ///
    /// A persisted state at zero seconds is stale: it is reset to a full,
    /// paused interval of the same mode so that a reload never fires a
    /// completion.
    pub fn restore(settings: TimerSettings, mut state: TimerState) -> Self {
        let settings = settings.sanitized();
        if state.cycle == 0 {
            state.cycle = 1;
        }
        if state.time_left == 0 {
            tracing::warn!(mode = ?state.mode, "discarding expired timer state on load");
            state.time_left = settings.seconds_for(state.mode);
            state.is_running = false;
            state.session_start = None;
        }
        Self { settings, state }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn settings(&self) -> &TimerSettings {
        &self.settings
    }

    pub fn mode(&self) -> TimerMode {
        self.state.mode
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running
    }

    pub fn time_left(&self) -> u64 {
        self.state.time_left
    }

    pub fn cycle(&self) -> u32 {
        self.state.cycle
    }

    pub fn total_secs(&self) -> u64 {
        self.state.total_secs(&self.settings)
    }

    /// 0.0 .. 100.0 progress within the current interval.
    pub fn progress_pct(&self) -> f64 {
        let total = self.total_secs();
        if total == 0 {
            return 0.0;
        }
        (total.saturating_sub(self.state.time_left) as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self, at: DateTime<Utc>) -> Event {
        Event::StateSnapshot {
            state: self.state.clone(),
            title: self.state.mode.title().to_string(),
            clock: self.state.clock(),
            total_secs: self.total_secs(),
            progress_pct: self.progress_pct(),
            at,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Flip between running and paused.
    pub fn toggle(&mut self, now: DateTime<Utc>) -> Event {
        if self.state.is_running {
            self.state.is_running = false;
            Event::TimerPaused {
                mode: self.state.mode,
                time_left: self.state.time_left,
                at: now,
            }
        } else {
            self.state.is_running = true;
            if self.state.session_start.is_none() {
                self.state.session_start = Some(now);
            }
            Event::TimerStarted {
                mode: self.state.mode,
                cycle: self.state.cycle,
                time_left: self.state.time_left,
                at: now,
            }
        }
    }

    pub fn start(&mut self, now: DateTime<Utc>) -> Option<Event> {
        (!self.state.is_running).then(|| self.toggle(now))
    }

    pub fn pause(&mut self, now: DateTime<Utc>) -> Option<Event> {
        self.state.is_running.then(|| self.toggle(now))
    }

    /// Restart the current mode from its full duration. Mode and cycle stay.
    pub fn reset(&mut self, now: DateTime<Utc>) -> Event {
        self.state.time_left = self.total_secs();
        self.state.is_running = false;
        self.state.session_start = None;
        Event::TimerReset {
            mode: self.state.mode,
            time_left: self.state.time_left,
            at: now,
        }
    }

    /// Count one second down. Completes the interval when it reaches zero.
    pub fn tick(&mut self, now: DateTime<Utc>) -> TickResult {
        if !self.state.is_running || self.state.time_left == 0 {
            return TickResult::Idle;
        }
        self.state.time_left -= 1;
        if self.state.time_left > 0 {
            return TickResult::Counting {
                time_left: self.state.time_left,
            };
        }
        TickResult::Completed(self.complete(now))
    }

    pub fn select_task(&mut self, task_id: &str, label: &str) {
        self.state.current_task_id = Some(task_id.to_string());
        self.state.current_task_label = Some(label.to_string());
    }

    pub fn clear_task(&mut self) {
        self.state.current_task_id = None;
        self.state.current_task_label = None;
    }

    /// Adopt new settings. Returns true when the remaining time was
    /// recomputed, which only happens while paused.
    pub fn apply_settings(&mut self, settings: TimerSettings) -> bool {
        self.settings = settings.sanitized();
        if self.state.is_running {
            return false;
        }
        self.state.time_left = self.total_secs();
        true
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn complete(&mut self, now: DateTime<Utc>) -> CompletedInterval {
        let mode = self.state.mode;
        let cycle = self.state.cycle;
        let (next, next_cycle) = next_mode(mode, cycle, self.settings.long_break_interval);
        let done = CompletedInterval {
            mode,
            cycle,
            next_mode: next,
            next_cycle,
            nominal_minutes: self.settings.minutes_for(mode),
            started_at: self.state.session_start,
            ended_at: now,
            task_id: self.state.current_task_id.clone(),
            task_label: self.state.current_task_label.clone(),
        };

        self.state.mode = next;
        self.state.cycle = next_cycle;
        self.state.time_left = self.settings.seconds_for(next);
        self.state.is_running = false;
        self.state.session_start = None;
        tracing::debug!(from = ?mode, to = ?next, cycle = next_cycle, "interval completed");
        done
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn short_settings() -> TimerSettings {
        TimerSettings {
            focus_time: 1,
            short_break: 1,
            long_break: 2,
            long_break_interval: 2,
        }
    }

    fn run_out(engine: &mut TimerEngine, now: DateTime<Utc>) -> CompletedInterval {
        if !engine.is_running() {
            engine.toggle(now);
        }
        loop {
            if let TickResult::Completed(done) = engine.tick(now) {
                return done;
            }
        }
    }

    #[test]
    fn toggle_records_start_once() {
        let mut engine = TimerEngine::new(TimerSettings::default());
        let t0 = Utc::now();
        assert!(matches!(engine.toggle(t0), Event::TimerStarted { .. }));
        assert_eq!(engine.state().session_start, Some(t0));

        assert!(matches!(engine.toggle(t0 + Duration::seconds(5)), Event::TimerPaused { .. }));
        engine.toggle(t0 + Duration::seconds(9));
        assert_eq!(engine.state().session_start, Some(t0));
    }

    #[test]
    fn start_and_pause_are_idempotent() {
        let mut engine = TimerEngine::new(TimerSettings::default());
        let now = Utc::now();
        assert!(engine.start(now).is_some());
        assert!(engine.start(now).is_none());
        assert!(engine.pause(now).is_some());
        assert!(engine.pause(now).is_none());
    }

    #[test]
    fn tick_counts_only_while_running() {
        let mut engine = TimerEngine::new(TimerSettings::default());
        let now = Utc::now();
        assert_eq!(engine.tick(now), TickResult::Idle);
        assert_eq!(engine.time_left(), 1500);

        engine.toggle(now);
        assert_eq!(engine.tick(now), TickResult::Counting { time_left: 1499 });
    }

    #[test]
    fn completion_moves_to_break_and_stops() {
        let mut engine = TimerEngine::new(short_settings());
        let done = run_out(&mut engine, Utc::now());
        assert_eq!(done.mode, TimerMode::Focus);
        assert_eq!(done.next_mode, TimerMode::ShortBreak);
        assert_eq!(engine.mode(), TimerMode::ShortBreak);
        assert_eq!(engine.time_left(), 60);
        assert!(!engine.is_running());
        assert!(engine.state().session_start.is_none());
        assert_eq!(engine.cycle(), 1);
    }

    #[test]
    fn full_cycle_reaches_long_break() {
        let mut engine = TimerEngine::new(short_settings());
        let now = Utc::now();
        run_out(&mut engine, now); // focus 1 -> short
        run_out(&mut engine, now); // short -> focus 2
        assert_eq!(engine.cycle(), 2);
        let done = run_out(&mut engine, now);
        assert_eq!(done.next_mode, TimerMode::LongBreak);
        assert_eq!(engine.time_left(), 120);
        assert_eq!(engine.cycle(), 2);
    }

    #[test]
    fn tick_after_completion_does_not_complete_again() {
        let mut engine = TimerEngine::new(short_settings());
        let now = Utc::now();
        run_out(&mut engine, now);
        assert_eq!(engine.tick(now), TickResult::Idle);
    }

    #[test]
    fn reset_keeps_mode_and_cycle() {
        let mut engine = TimerEngine::new(short_settings());
        let now = Utc::now();
        run_out(&mut engine, now);
        engine.toggle(now);
        engine.tick(now);
        engine.reset(now);
        assert_eq!(engine.mode(), TimerMode::ShortBreak);
        assert_eq!(engine.time_left(), 60);
        assert!(!engine.is_running());
        assert!(engine.state().session_start.is_none());
    }

    #[test]
    fn restore_discards_expired_state() {
        let mut state = TimerState::initial(&TimerSettings::default());
        state.mode = TimerMode::LongBreak;
        state.time_left = 0;
        state.is_running = true;
        state.session_start = Some(Utc::now());

        let engine = TimerEngine::restore(TimerSettings::default(), state);
        assert_eq!(engine.time_left(), 900);
        assert!(!engine.is_running());
        assert!(engine.state().session_start.is_none());
    }

    #[test]
    fn settings_change_only_rescales_paused_timer() {
        let mut engine = TimerEngine::new(TimerSettings::default());
        let mut longer = TimerSettings::default();
        longer.focus_time = 50;
        assert!(engine.apply_settings(longer));
        assert_eq!(engine.time_left(), 3000);

        engine.toggle(Utc::now());
        longer.focus_time = 10;
        assert!(!engine.apply_settings(longer));
        assert_eq!(engine.time_left(), 3000);
        assert_eq!(engine.settings().focus_time, 10);
    }

    #[test]
    fn wall_clock_minutes_include_pauses() {
        let end = Utc::now();
        let done = CompletedInterval {
            mode: TimerMode::Focus,
            cycle: 1,
            next_mode: TimerMode::ShortBreak,
            next_cycle: 1,
            nominal_minutes: 25,
            started_at: Some(end - Duration::minutes(31)),
            ended_at: end,
            task_id: None,
            task_label: None,
        };
        assert!((done.wall_clock_minutes().unwrap() - 31.0).abs() < 1e-9);
    }

    #[test]
    fn snapshot_returns_valid_event() {
        let engine = TimerEngine::new(TimerSettings::default());
        match engine.snapshot(Utc::now()) {
            Event::StateSnapshot {
                state,
                clock,
                progress_pct,
                ..
            } => {
                assert_eq!(state.mode, TimerMode::Focus);
                assert_eq!(clock, "25:00");
                assert_eq!(progress_pct, 0.0);
            }
            _ => panic!("Expected StateSnapshot"),
        }
    }
}
