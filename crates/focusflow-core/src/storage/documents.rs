//! Typed access to the persisted JSON documents.
//!
//! Storage failures propagate. Content failures do not: a document that is
//! missing or does not parse loads as its default, and a list drops only the
//! entries that do not parse.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::database::Database;
use crate::error::{DatabaseError, Result};
use crate::garden::Garden;
use crate::stats::Statistics;
use crate::task::{Folder, Project, Task, TaskBoard};
use crate::timer::{TimerSettings, TimerState};

pub mod keys {
    pub const TIMER_SETTINGS: &str = "timer-settings";
    pub const TIMER_STATE: &str = "timer-state";
    pub const STATISTICS: &str = "statistics";
    pub const TASKS: &str = "tasks";
    pub const PROJECTS: &str = "projects";
    pub const FOLDERS: &str = "folders";
    pub const GAMIFICATION: &str = "gamification";
    /// Millisecond timestamp of the last settings save.
    pub const SETTINGS_UPDATED: &str = "settings-updated";
}

pub struct DocumentStore {
    db: Database,
}

impl DocumentStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Open the store in the data directory.
    pub fn open() -> Result<Self> {
        Ok(Self::new(Database::open()?))
    }

    pub fn open_memory() -> Result<Self> {
        Ok(Self::new(Database::open_memory()?))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    // ── Generic ──────────────────────────────────────────────────────

    /// Parsed JSON of a document, `None` when absent or not JSON.
    pub fn load_value(&self, key: &str) -> Result<Option<Value>> {
        let Some(raw) = self.db.kv_get(key).map_err(DatabaseError::from)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::warn!(key, error = %e, "malformed document, using default");
                Ok(None)
            }
        }
    }

    pub fn load<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T> {
        let Some(value) = self.load_value(key)? else {
            return Ok(T::default());
        };
        Ok(serde_json::from_value(value).unwrap_or_else(|e| {
            tracing::warn!(key, error = %e, "unreadable document, using default");
            T::default()
        }))
    }

    pub fn load_list<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        let Some(Value::Array(items)) = self.load_value(key)? else {
            return Ok(Vec::new());
        };
        Ok(items
            .into_iter()
            .filter_map(|item| match serde_json::from_value(item) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!(key, error = %e, "dropping unreadable entry");
                    None
                }
            })
            .collect())
    }

    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.db.kv_set(key, &json).map_err(DatabaseError::from)?;
        Ok(())
    }

    // ── Typed documents ──────────────────────────────────────────────

    pub fn settings(&self) -> Result<TimerSettings> {
        self.load(keys::TIMER_SETTINGS)
    }

    /// Persist settings and bump the change token polled by other views.
    pub fn save_settings(&self, settings: &TimerSettings, at: DateTime<Utc>) -> Result<()> {
        self.save(keys::TIMER_SETTINGS, settings)?;
        self.save(keys::SETTINGS_UPDATED, &at.timestamp_millis())
    }

    pub fn settings_token(&self) -> Result<Option<i64>> {
        Ok(self
            .load_value(keys::SETTINGS_UPDATED)?
            .and_then(|v| v.as_i64().or_else(|| v.as_str()?.parse().ok())))
    }

    pub fn timer_state(&self) -> Result<Option<TimerState>> {
        self.load(keys::TIMER_STATE)
    }

    pub fn save_timer_state(&self, state: &TimerState) -> Result<()> {
        self.save(keys::TIMER_STATE, state)
    }

    pub fn statistics(&self) -> Result<Statistics> {
        self.load(keys::STATISTICS)
    }

    pub fn save_statistics(&self, stats: &Statistics) -> Result<()> {
        self.save(keys::STATISTICS, stats)
    }

    pub fn garden(&self) -> Result<Garden> {
        self.load(keys::GAMIFICATION)
    }

    pub fn save_garden(&self, garden: &Garden) -> Result<()> {
        self.save(keys::GAMIFICATION, garden)
    }

    pub fn tasks(&self) -> Result<Vec<Task>> {
        self.load_list(keys::TASKS)
    }

    pub fn projects(&self) -> Result<Vec<Project>> {
        self.load_list(keys::PROJECTS)
    }

    pub fn folders(&self) -> Result<Vec<Folder>> {
        self.load_list(keys::FOLDERS)
    }

    pub fn board(&self) -> Result<TaskBoard> {
        Ok(TaskBoard::new(self.tasks()?, self.projects()?, self.folders()?))
    }

    pub fn save_board(&self, board: &TaskBoard) -> Result<()> {
        self.save(keys::TASKS, &board.tasks)?;
        self.save(keys::PROJECTS, &board.projects)?;
        self.save(keys::FOLDERS, &board.folders)
    }
}
