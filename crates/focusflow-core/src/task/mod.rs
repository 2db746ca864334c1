//! Tasks and the containers that organize them.
//!
//! A task belongs to at most one container: either a project or a folder.
//! Projects may themselves sit inside a folder. Progress counters on a task
//! (`pomodoro_count`, `time_spent_minutes`) are only ever advanced by the
//! session accounting when a focus interval completes with the task
//! selected.

mod container;
mod store;

pub use container::{Folder, Project};
pub use store::{FolderGroup, ProjectGroup, TaskBoard, TaskGroups, ToggleOutcome};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub pomodoro_count: u32,
    #[serde(default, rename = "timeSpent")]
    pub time_spent_minutes: u64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn new(title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Task {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            completed: false,
            pomodoro_count: 0,
            time_spent_minutes: 0,
            tags: Vec::new(),
            project_id: None,
            folder_id: None,
            created_at: now,
        }
    }

    /// Credit one finished focus interval of `minutes` nominal length.
    pub fn record_pomodoro(&mut self, minutes: u32) {
        self.pomodoro_count += 1;
        self.time_spent_minutes += u64::from(minutes);
    }

    /// `45m` or `1h 5m`.
    pub fn time_spent_label(&self) -> String {
        let m = self.time_spent_minutes;
        if m < 60 {
            format!("{m}m")
        } else {
            format!("{}h {}m", m / 60, m % 60)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_serialization() {
        let mut task = Task::new("Write report", Utc::now());
        task.tags = vec!["work".into()];
        task.project_id = Some("p1".into());
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["pomodoroCount"], 0);
        assert_eq!(json["timeSpent"], 0);
        assert_eq!(json["projectId"], "p1");
        assert!(json.get("folderId").is_none());

        let decoded: Task = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, task);
    }

    #[test]
    fn record_pomodoro_uses_nominal_minutes() {
        let mut task = Task::new("Read", Utc::now());
        task.record_pomodoro(25);
        task.record_pomodoro(25);
        assert_eq!(task.pomodoro_count, 2);
        assert_eq!(task.time_spent_minutes, 50);
    }

    #[test]
    fn time_spent_label_switches_to_hours() {
        let mut task = Task::new("Read", Utc::now());
        task.time_spent_minutes = 45;
        assert_eq!(task.time_spent_label(), "45m");
        task.time_spent_minutes = 65;
        assert_eq!(task.time_spent_label(), "1h 5m");
    }
}
