//! In-memory task board: the `tasks`, `projects` and `folders` documents
//! edited together so that project completion stays consistent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::container::{Folder, Project};
use super::Task;
use crate::error::{CoreError, Result, ValidationError};

/// What a completion toggle changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub task: Task,
    /// True when the toggle went from open to completed.
    pub completed_now: bool,
    /// Projects whose last open task was just completed.
    pub completed_projects: Vec<Project>,
    /// Projects that were complete and no longer are.
    pub reopened_projects: Vec<Project>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectGroup {
    pub project: Project,
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderGroup {
    pub folder: Folder,
    pub tasks: Vec<Task>,
}

/// Open tasks grouped by container, plus the completed list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskGroups {
    pub orphans: Vec<Task>,
    pub projects: Vec<ProjectGroup>,
    pub folders: Vec<FolderGroup>,
    pub completed: Vec<Task>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskBoard {
    pub tasks: Vec<Task>,
    pub projects: Vec<Project>,
    pub folders: Vec<Folder>,
}

impl TaskBoard {
    pub fn new(tasks: Vec<Task>, projects: Vec<Project>, folders: Vec<Folder>) -> Self {
        Self {
            tasks,
            projects,
            folders,
        }
    }

    // ── Lookups ──────────────────────────────────────────────────────

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn folder(&self, id: &str) -> Option<&Folder> {
        self.folders.iter().find(|f| f.id == id)
    }

    fn task_mut(&mut self, id: &str) -> Result<&mut Task> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| CoreError::not_found("Task", id))
    }

    fn ensure_project(&self, id: &str) -> Result<()> {
        self.project(id)
            .map(|_| ())
            .ok_or_else(|| CoreError::not_found("Project", id))
    }

    fn ensure_folder(&self, id: &str) -> Result<()> {
        self.folder(id)
            .map(|_| ())
            .ok_or_else(|| CoreError::not_found("Folder", id))
    }

    /// Project and folder names a timeline block for this task should carry.
    ///
    /// A task inside a project reports that project's folder, if any.
    pub fn labels_for(&self, task_id: &str) -> (Option<String>, Option<String>) {
        let Some(task) = self.task(task_id) else {
            return (None, None);
        };
        let project = task.project_id.as_deref().and_then(|id| self.project(id));
        let folder_id = task
            .folder_id
            .as_deref()
            .or_else(|| project.and_then(|p| p.folder_id.as_deref()));
        (
            project.map(|p| p.name.clone()),
            folder_id.and_then(|id| self.folder(id)).map(|f| f.name.clone()),
        )
    }

    // ── Tasks ────────────────────────────────────────────────────────

    pub fn add_task(
        &mut self,
        title: &str,
        tags: Vec<String>,
        now: DateTime<Utc>,
    ) -> Result<&Task> {
        let title = non_blank(title, "title")?;
        let mut task = Task::new(title, now);
        task.tags = tags;
        self.tasks.push(task);
        Ok(&self.tasks[self.tasks.len() - 1])
    }

    /// Flip a task's completion flag and refresh project completion.
    pub fn toggle_completed(&mut self, id: &str) -> Result<ToggleOutcome> {
        let task = self.task_mut(id)?;
        task.completed = !task.completed;
        let completed_now = task.completed;
        let task = task.clone();
        let (completed_projects, reopened_projects) = self.recompute_projects();
        Ok(ToggleOutcome {
            task,
            completed_now,
            completed_projects,
            reopened_projects,
        })
    }

    pub fn delete_task(&mut self, id: &str) -> Result<Task> {
        let pos = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| CoreError::not_found("Task", id))?;
        let task = self.tasks.remove(pos);
        self.recompute_projects();
        Ok(task)
    }

    /// Move a task into a project (leaving any folder), or out of all
    /// projects with `None`.
    pub fn set_project(&mut self, task_id: &str, project_id: Option<&str>) -> Result<()> {
        if let Some(pid) = project_id {
            self.ensure_project(pid)?;
        }
        let task = self.task_mut(task_id)?;
        task.project_id = project_id.map(str::to_string);
        if project_id.is_some() {
            task.folder_id = None;
        }
        self.recompute_projects();
        Ok(())
    }

    /// Move a task into a folder (leaving any project), or out with `None`.
    pub fn set_folder(&mut self, task_id: &str, folder_id: Option<&str>) -> Result<()> {
        if let Some(fid) = folder_id {
            self.ensure_folder(fid)?;
        }
        let task = self.task_mut(task_id)?;
        task.folder_id = folder_id.map(str::to_string);
        if folder_id.is_some() {
            task.project_id = None;
        }
        self.recompute_projects();
        Ok(())
    }

    /// Credit a finished focus interval to a task. Unknown ids are ignored
    /// (the task may have been deleted while the timer ran).
    pub fn record_pomodoro(&mut self, task_id: &str, minutes: u32) -> Option<&Task> {
        let task = self.tasks.iter_mut().find(|t| t.id == task_id)?;
        task.record_pomodoro(minutes);
        Some(task)
    }

    // ── Projects & folders ───────────────────────────────────────────

    pub fn add_project(&mut self, name: &str, color: Option<String>) -> Result<&Project> {
        let name = non_blank(name, "name")?;
        let mut project = Project::new(name);
        if let Some(color) = color {
            project.color = color;
        }
        self.projects.push(project);
        Ok(&self.projects[self.projects.len() - 1])
    }

    pub fn add_folder(&mut self, name: &str) -> Result<&Folder> {
        let name = non_blank(name, "name")?;
        self.folders.push(Folder::new(name));
        Ok(&self.folders[self.folders.len() - 1])
    }

    pub fn toggle_project_expanded(&mut self, id: &str) -> Result<bool> {
        let project = self
            .projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| CoreError::not_found("Project", id))?;
        project.expanded = !project.expanded;
        Ok(project.expanded)
    }

    pub fn toggle_folder_expanded(&mut self, id: &str) -> Result<bool> {
        let folder = self
            .folders
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| CoreError::not_found("Folder", id))?;
        folder.expanded = !folder.expanded;
        Ok(folder.expanded)
    }

    /// Place a project inside a folder, or at top level with `None`.
    pub fn move_project(&mut self, project_id: &str, folder_id: Option<&str>) -> Result<()> {
        if let Some(fid) = folder_id {
            self.ensure_folder(fid)?;
        }
        let project = self
            .projects
            .iter_mut()
            .find(|p| p.id == project_id)
            .ok_or_else(|| CoreError::not_found("Project", project_id))?;
        project.folder_id = folder_id.map(str::to_string);
        Ok(())
    }

    /// Remove a project; its tasks become orphans.
    pub fn delete_project(&mut self, id: &str) -> Result<Project> {
        let pos = self
            .projects
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| CoreError::not_found("Project", id))?;
        for task in self.tasks.iter_mut().filter(|t| t.project_id.as_deref() == Some(id)) {
            task.project_id = None;
        }
        Ok(self.projects.remove(pos))
    }

    /// Remove a folder; its tasks and projects move to top level.
    pub fn delete_folder(&mut self, id: &str) -> Result<Folder> {
        let pos = self
            .folders
            .iter()
            .position(|f| f.id == id)
            .ok_or_else(|| CoreError::not_found("Folder", id))?;
        for task in self.tasks.iter_mut().filter(|t| t.folder_id.as_deref() == Some(id)) {
            task.folder_id = None;
        }
        for project in self
            .projects
            .iter_mut()
            .filter(|p| p.folder_id.as_deref() == Some(id))
        {
            project.folder_id = None;
        }
        Ok(self.folders.remove(pos))
    }

    /// Re-derive every project's `completed` flag.
    ///
    /// A project is complete when it has at least one task and all of them
    /// are completed. Returns the projects that just became complete and
    /// those that stopped being complete.
    pub fn recompute_projects(&mut self) -> (Vec<Project>, Vec<Project>) {
        let mut completed = Vec::new();
        let mut reopened = Vec::new();
        for project in &mut self.projects {
            let mut members = self
                .tasks
                .iter()
                .filter(|t| t.project_id.as_deref() == Some(project.id.as_str()))
                .peekable();
            let has_tasks = members.peek().is_some();
            let done = has_tasks && members.all(|t| t.completed);
            if done != project.completed {
                project.completed = done;
                if done {
                    completed.push(project.clone());
                } else {
                    reopened.push(project.clone());
                }
            }
        }
        (completed, reopened)
    }

    // ── Views ────────────────────────────────────────────────────────

    pub fn grouped(&self) -> TaskGroups {
        let open = || self.tasks.iter().filter(|t| !t.completed);
        TaskGroups {
            orphans: open()
                .filter(|t| t.project_id.is_none() && t.folder_id.is_none())
                .cloned()
                .collect(),
            projects: self
                .projects
                .iter()
                .map(|p| ProjectGroup {
                    project: p.clone(),
                    tasks: open()
                        .filter(|t| t.project_id.as_deref() == Some(p.id.as_str()))
                        .cloned()
                        .collect(),
                })
                .collect(),
            folders: self
                .folders
                .iter()
                .map(|f| FolderGroup {
                    folder: f.clone(),
                    tasks: open()
                        .filter(|t| t.folder_id.as_deref() == Some(f.id.as_str()))
                        .cloned()
                        .collect(),
                })
                .collect(),
            completed: self.tasks.iter().filter(|t| t.completed).cloned().collect(),
        }
    }
}

fn non_blank<'a>(value: &'a str, field: &'static str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Blank { field }.into());
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with_project(n: usize) -> (TaskBoard, String, Vec<String>) {
        let mut board = TaskBoard::default();
        let pid = board.add_project("Thesis", None).unwrap().id.clone();
        let ids = (0..n)
            .map(|i| {
                let id = board
                    .add_task(&format!("Chapter {i}"), Vec::new(), Utc::now())
                    .unwrap()
                    .id
                    .clone();
                board.set_project(&id, Some(&pid)).unwrap();
                id
            })
            .collect();
        (board, pid, ids)
    }

    #[test]
    fn blank_titles_are_rejected() {
        let mut board = TaskBoard::default();
        assert!(matches!(
            board.add_task("   ", Vec::new(), Utc::now()),
            Err(CoreError::Validation(ValidationError::Blank { field: "title" }))
        ));
        assert!(board.add_folder("").is_err());
    }

    #[test]
    fn completing_last_task_completes_project() {
        let (mut board, pid, ids) = board_with_project(3);
        board.toggle_completed(&ids[0]).unwrap();
        let second = board.toggle_completed(&ids[1]).unwrap();
        assert!(second.completed_projects.is_empty());

        let last = board.toggle_completed(&ids[2]).unwrap();
        assert!(last.completed_now);
        assert_eq!(last.completed_projects.len(), 1);
        assert!(board.project(&pid).unwrap().completed);

        let undo = board.toggle_completed(&ids[0]).unwrap();
        assert!(!undo.completed_now);
        assert_eq!(undo.reopened_projects.len(), 1);
        assert!(!board.project(&pid).unwrap().completed);
    }

    #[test]
    fn empty_project_is_never_complete() {
        let (mut board, pid, ids) = board_with_project(1);
        board.toggle_completed(&ids[0]).unwrap();
        assert!(board.project(&pid).unwrap().completed);

        board.delete_task(&ids[0]).unwrap();
        assert!(!board.project(&pid).unwrap().completed);
    }

    #[test]
    fn stale_completed_flag_is_corrected() {
        let (mut board, pid, _) = board_with_project(0);
        board.projects[0].completed = true;
        let (_, reopened) = board.recompute_projects();
        assert_eq!(reopened.len(), 1);
        assert!(!board.project(&pid).unwrap().completed);
    }

    #[test]
    fn project_and_folder_are_exclusive() {
        let (mut board, pid, ids) = board_with_project(1);
        let fid = board.add_folder("Inbox").unwrap().id.clone();
        board.set_folder(&ids[0], Some(&fid)).unwrap();
        let task = board.task(&ids[0]).unwrap();
        assert_eq!(task.folder_id.as_deref(), Some(fid.as_str()));
        assert!(task.project_id.is_none());

        board.set_project(&ids[0], Some(&pid)).unwrap();
        let task = board.task(&ids[0]).unwrap();
        assert!(task.folder_id.is_none());
    }

    #[test]
    fn moving_into_unknown_container_fails() {
        let (mut board, _, ids) = board_with_project(1);
        assert!(matches!(
            board.set_folder(&ids[0], Some("nope")),
            Err(CoreError::NotFound { kind: "Folder", .. })
        ));
        assert!(board.toggle_completed("missing").is_err());
    }

    #[test]
    fn labels_follow_project_folder() {
        let (mut board, pid, ids) = board_with_project(1);
        let fid = board.add_folder("Work").unwrap().id.clone();
        board.move_project(&pid, Some(&fid)).unwrap();
        assert_eq!(
            board.labels_for(&ids[0]),
            (Some("Thesis".to_string()), Some("Work".to_string()))
        );
        assert_eq!(board.labels_for("missing"), (None, None));
    }

    #[test]
    fn deleting_containers_detaches_members() {
        let (mut board, pid, ids) = board_with_project(2);
        let fid = board.add_folder("Work").unwrap().id.clone();
        board.move_project(&pid, Some(&fid)).unwrap();
        board.delete_folder(&fid).unwrap();
        assert!(board.project(&pid).unwrap().folder_id.is_none());

        board.delete_project(&pid).unwrap();
        assert!(ids.iter().all(|id| board.task(id).unwrap().project_id.is_none()));
    }

    #[test]
    fn expanded_flags_toggle() {
        let (mut board, pid, _) = board_with_project(0);
        assert!(!board.toggle_project_expanded(&pid).unwrap());
        assert!(board.toggle_project_expanded(&pid).unwrap());
    }

    #[test]
    fn grouped_view_splits_open_and_done() {
        let (mut board, _, ids) = board_with_project(2);
        board.add_task("Loose end", Vec::new(), Utc::now()).unwrap();
        board.toggle_completed(&ids[0]).unwrap();
        let groups = board.grouped();
        assert_eq!(groups.orphans.len(), 1);
        assert_eq!(groups.projects[0].tasks.len(), 1);
        assert_eq!(groups.completed.len(), 1);
    }

    #[test]
    fn record_pomodoro_ignores_unknown_task() {
        let (mut board, _, ids) = board_with_project(1);
        assert!(board.record_pomodoro("gone", 25).is_none());
        let task = board.record_pomodoro(&ids[0], 25).unwrap();
        assert_eq!(task.pomodoro_count, 1);
        assert_eq!(task.time_spent_minutes, 25);
    }
}
