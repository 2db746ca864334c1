//! Outbound collaborators: user-facing notifications and sound cues.
//!
//! Both are fire-and-forget. A failing collaborator is logged and never
//! affects the timer or the accounting.

use serde::{Deserialize, Serialize};
use std::error::Error;

use crate::timer::{CompletedInterval, TimerMode};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

impl Notification {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    /// Message for a finished interval.
    pub fn for_interval(done: &CompletedInterval) -> Self {
        match (done.mode, done.next_mode, done.task_label.as_deref()) {
            (TimerMode::Focus, TimerMode::LongBreak, Some(task)) => Self::new(
                "Focus session completed! 🏆",
                format!("Amazing work on \"{task}\"! Time for a long break!"),
            ),
            (TimerMode::Focus, TimerMode::LongBreak, None) => Self::new(
                "Focus session completed! 🏆",
                "Incredible focus! Time for a long break!",
            ),
            (TimerMode::Focus, _, Some(task)) => Self::new(
                "Focus session completed! 🌱",
                format!("Great work on \"{task}\"! A new fish joined your pond!"),
            ),
            (TimerMode::Focus, _, None) => Self::new(
                "Focus session completed! 🌱",
                "A new fish joined your pond!",
            ),
            (TimerMode::ShortBreak | TimerMode::LongBreak, _, _) => Self::new(
                "Break completed! ✨",
                "Ready for another focus session?",
            ),
        }
    }

    pub fn task_completed(title: &str, leaf_added: bool) -> Self {
        let body = if leaf_added {
            format!("\"{title}\" marked as complete! A new leaf has been added to your tree!")
        } else {
            format!("\"{title}\" marked as complete!")
        };
        Self::new("Task completed! 🌱", body)
    }

    pub fn project_completed(name: &str) -> Self {
        Self::new(
            "Project completed! 🎉",
            format!("Every task in \"{name}\" is done."),
        )
    }

    pub fn fish_fed() -> Self {
        Self::new("Fish fed! 🐠", "Your fish are happy and energized!")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SoundCue {
    FocusComplete,
    BreakComplete,
    LongBreakComplete,
}

impl SoundCue {
    pub fn for_mode(mode: TimerMode) -> Self {
        match mode {
            TimerMode::Focus => SoundCue::FocusComplete,
            TimerMode::ShortBreak => SoundCue::BreakComplete,
            TimerMode::LongBreak => SoundCue::LongBreakComplete,
        }
    }
}

/// Receives human-readable messages.
pub trait Notifier: Send {
    fn notify(&self, notification: &Notification) -> Result<(), Box<dyn Error + Send + Sync>>;
}

/// Plays a completion cue.
pub trait CuePlayer: Send {
    fn play(&self, cue: SoundCue) -> Result<(), Box<dyn Error + Send + Sync>>;
}

/// Collaborator that does nothing; the default for both seams.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl Notifier for Silent {
    fn notify(&self, _notification: &Notification) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}

impl CuePlayer for Silent {
    fn play(&self, _cue: SoundCue) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn interval(mode: TimerMode, next: TimerMode, task: Option<&str>) -> CompletedInterval {
        CompletedInterval {
            mode,
            cycle: 4,
            next_mode: next,
            next_cycle: 4,
            nominal_minutes: 25,
            started_at: None,
            ended_at: Utc::now(),
            task_id: None,
            task_label: task.map(str::to_string),
        }
    }

    #[test]
    fn long_break_message_mentions_task() {
        let n = Notification::for_interval(&interval(
            TimerMode::Focus,
            TimerMode::LongBreak,
            Some("Essay"),
        ));
        assert!(n.title.contains("🏆"));
        assert!(n.body.contains("\"Essay\""));
        assert!(n.body.contains("long break"));
    }

    #[test]
    fn break_message_is_generic() {
        let n = Notification::for_interval(&interval(
            TimerMode::ShortBreak,
            TimerMode::Focus,
            Some("Essay"),
        ));
        assert_eq!(n.title, "Break completed! ✨");
    }

    #[test]
    fn task_message_mentions_leaf_only_when_added() {
        assert!(Notification::task_completed("Essay", true).body.contains("leaf"));
        assert!(!Notification::task_completed("Essay", false).body.contains("leaf"));
    }

    #[test]
    fn cues_are_keyed_by_finished_mode() {
        assert_eq!(SoundCue::for_mode(TimerMode::Focus), SoundCue::FocusComplete);
        assert_eq!(
            SoundCue::for_mode(TimerMode::LongBreak),
            SoundCue::LongBreakComplete
        );
        assert_eq!(
            serde_json::to_value(SoundCue::BreakComplete).unwrap(),
            "break-complete"
        );
    }
}
