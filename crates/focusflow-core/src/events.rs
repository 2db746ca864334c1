use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{channel, Receiver, Sender};

use crate::timer::{TimerMode, TimerSettings, TimerState};

/// Every state change in the system produces an Event.
/// Views subscribe to them instead of polling storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        mode: TimerMode,
        cycle: u32,
        time_left: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        mode: TimerMode,
        time_left: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        mode: TimerMode,
        time_left: u64,
        at: DateTime<Utc>,
    },
    TimerCompleted {
        mode: TimerMode,
        cycle: u32,
        next_mode: TimerMode,
        next_cycle: u32,
        task_id: Option<String>,
        at: DateTime<Utc>,
    },
    TaskSelected {
        task_id: String,
        title: String,
        at: DateTime<Utc>,
    },
    TaskCleared {
        at: DateTime<Utc>,
    },
    TaskCompleted {
        task_id: String,
        title: String,
        at: DateTime<Utc>,
    },
    TaskReopened {
        task_id: String,
        at: DateTime<Utc>,
    },
    ProjectCompleted {
        project_id: String,
        name: String,
        at: DateTime<Utc>,
    },
    SettingsChanged {
        settings: TimerSettings,
        at: DateTime<Utc>,
    },
    FishFed {
        at: DateTime<Utc>,
    },
    DataImported {
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: TimerState,
        title: String,
        clock: String,
        total_secs: u64,
        progress_pct: f64,
        at: DateTime<Utc>,
    },
}

/// Fan-out of events to any number of in-process subscribers.
///
/// Subscribers that dropped their receiver are pruned on the next publish.
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Vec<Sender<Event>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> Receiver<Event> {
        let (tx, rx) = channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn publish(&mut self, event: &Event) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
