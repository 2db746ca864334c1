//! Whole-data export and import.
//!
//! A backup is a single JSON object carrying every persisted document. On
//! import each present field replaces its document on its own; absent fields
//! leave the stored document untouched. There is no rollback.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::documents::{keys, DocumentStore};
use crate::error::{Result, ValidationError};
use crate::garden::Garden;
use crate::stats::Statistics;
use crate::task::{Folder, Project, Task};
use crate::timer::TimerSettings;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timer_settings: Option<TimerSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<Task>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projects: Option<Vec<Project>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folders: Option<Vec<Folder>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics: Option<Statistics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gamification: Option<Garden>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_date: Option<DateTime<Utc>>,
}

/// Which documents an import replaced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub imported: Vec<String>,
}

impl ImportSummary {
    pub fn is_empty(&self) -> bool {
        self.imported.is_empty()
    }
}

impl Backup {
    /// Snapshot every document in the store.
    pub fn export(store: &DocumentStore, now: DateTime<Utc>) -> Result<Self> {
        Ok(Self {
            timer_settings: Some(store.settings()?),
            tasks: Some(store.tasks()?),
            projects: Some(store.projects()?),
            folders: Some(store.folders()?),
            statistics: Some(store.statistics()?),
            gamification: Some(store.garden()?),
            export_date: Some(now),
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a backup file.
    ///
    /// Only a file that is not a JSON object is rejected. Fields that are
    /// present but unreadable are skipped with a warning.
    pub fn parse(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| ValidationError::InvalidBackup(e.to_string()))?;
        let Value::Object(mut fields) = value else {
            return Err(ValidationError::InvalidBackup("expected a JSON object".into()).into());
        };

        fn take<T: serde::de::DeserializeOwned>(
            fields: &mut serde_json::Map<String, Value>,
            name: &str,
        ) -> Option<T> {
            let value = fields.remove(name)?;
            if value.is_null() {
                return None;
            }
            serde_json::from_value(value)
                .map_err(|e| tracing::warn!(field = name, error = %e, "skipping backup field"))
                .ok()
        }

        Ok(Self {
            timer_settings: take(&mut fields, "timerSettings"),
            tasks: take(&mut fields, "tasks"),
            projects: take(&mut fields, "projects"),
            folders: take(&mut fields, "folders"),
            statistics: take(&mut fields, "statistics"),
            gamification: take(&mut fields, "gamification"),
            export_date: take(&mut fields, "exportDate"),
        })
    }

    /// Write every present field to the store.
    ///
    /// Imported settings also bump the settings change token so that other
    /// views pick them up.
    pub fn apply(&self, store: &DocumentStore, now: DateTime<Utc>) -> Result<ImportSummary> {
        let mut summary = ImportSummary::default();
        if let Some(settings) = self.timer_settings {
            store.save_settings(&settings.sanitized(), now)?;
            summary.imported.push(keys::TIMER_SETTINGS.to_string());
        }
        if let Some(tasks) = &self.tasks {
            store.save(keys::TASKS, tasks)?;
            summary.imported.push(keys::TASKS.to_string());
        }
        if let Some(projects) = &self.projects {
            store.save(keys::PROJECTS, projects)?;
            summary.imported.push(keys::PROJECTS.to_string());
        }
        if let Some(folders) = &self.folders {
            store.save(keys::FOLDERS, folders)?;
            summary.imported.push(keys::FOLDERS.to_string());
        }
        if let Some(statistics) = &self.statistics {
            store.save_statistics(statistics)?;
            summary.imported.push(keys::STATISTICS.to_string());
        }
        if let Some(garden) = &self.gamification {
            store.save_garden(garden)?;
            summary.imported.push(keys::GAMIFICATION.to_string());
        }
        tracing::info!(documents = ?summary.imported, "backup imported");
        Ok(summary)
    }

    /// Parse and apply in one step.
    pub fn import(store: &DocumentStore, json: &str, now: DateTime<Utc>) -> Result<ImportSummary> {
        Self::parse(json)?.apply(store, now)
    }
}
