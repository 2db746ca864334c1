//! # FocusFlow Core Library
//!
//! Core logic for the FocusFlow Pomodoro timer: a countdown engine that
//! alternates focus and break intervals, session statistics, a task
//! organizer, and a small garden that grows as work gets done. The
//! `focusflow` CLI is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Timer Engine**: one-second countdown state machine; the caller ticks
//!   it (see [`driver`])
//! - **Statistics**: counters and a per-day timeline of finished intervals
//! - **Tasks**: tasks grouped into projects and folders
//! - **Garden**: fish and leaves earned by completed work
//! - **Storage**: JSON documents in SQLite plus TOML configuration
//!
//! ## Key Components
//!
//! - [`FocusService`]: owns all state and runs the completion accounting
//! - [`TimerEngine`]: core timer state machine
//! - [`DocumentStore`]: typed access to the persisted documents
//! - [`Config`]: application configuration management

pub mod driver;
pub mod error;
pub mod events;
pub mod garden;
pub mod notify;
pub mod service;
pub mod stats;
pub mod storage;
pub mod task;
pub mod timer;

pub use error::{ConfigError, CoreError, DatabaseError, Result, ValidationError};
pub use events::{Event, EventBus};
pub use garden::{Garden, GardenStatus, LeafSource, PondLevel, TreeStage};
pub use notify::{CuePlayer, Notification, Notifier, Silent, SoundCue};
pub use service::FocusService;
pub use stats::{BlockKind, Statistics, TaskBlock};
pub use storage::{Backup, Config, Database, DocumentStore, ImportSummary};
pub use task::{Folder, Project, Task, TaskBoard};
pub use timer::{CompletedInterval, TickResult, TimerEngine, TimerMode, TimerSettings, TimerState};
