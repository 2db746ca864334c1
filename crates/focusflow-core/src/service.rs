//! The application service.
//!
//! `FocusService` owns the timer, the task board, the statistics ledger and
//! the garden, and writes every change through to the document store. All
//! entry points take `&mut self`, so a tick that completes an interval can
//! never interleave with a toggle or a reset.
//!
//! Every mutation publishes an [`Event`] on the in-process bus.

use chrono::{DateTime, Utc};
use std::sync::mpsc::Receiver;

use crate::error::{CoreError, Result};
use crate::events::{Event, EventBus};
use crate::garden::{Garden, LeafSource};
use crate::notify::{CuePlayer, Notification, Notifier, Silent, SoundCue};
use crate::stats::{local_date, Statistics, TaskBlock};
use crate::storage::{Backup, Config, DocumentStore, ImportSummary};
use crate::task::{Folder, Project, Task, TaskBoard, TaskGroups, ToggleOutcome};
use crate::timer::{
    CompletedInterval, TickResult, TimerEngine, TimerMode, TimerSettings, TimerState,
};

pub struct FocusService {
    store: DocumentStore,
    engine: TimerEngine,
    board: TaskBoard,
    stats: Statistics,
    garden: Garden,
    bus: EventBus,
    leaf_source: LeafSource,
    notifications: bool,
    sound: bool,
    notifier: Box<dyn Notifier>,
    cues: Box<dyn CuePlayer>,
    /// Last `settings-updated` token this service has seen.
    settings_token: Option<i64>,
}

impl FocusService {
    /// Open the store in the data directory and load every document.
    pub fn open(config: &Config) -> Result<Self> {
        Self::load(DocumentStore::open()?, config)
    }

    /// Load every document from `store`.
    ///
    /// An expired persisted timer is reset (see [`TimerEngine::restore`])
    /// and written back, so a reload never completes an interval.
    pub fn load(store: DocumentStore, config: &Config) -> Result<Self> {
        let settings = store.settings()?;
        let engine = match store.timer_state()? {
            Some(state) => TimerEngine::restore(settings, state),
            None => TimerEngine::new(settings),
        };
        store.save_timer_state(engine.state())?;

        let mut board = store.board()?;
        board.recompute_projects();

        Ok(Self {
            stats: store.statistics()?,
            garden: store.garden()?,
            settings_token: store.settings_token()?,
            engine,
            board,
            store,
            bus: EventBus::new(),
            leaf_source: config.gamification.leaf_source,
            notifications: config.notifications.enabled,
            sound: config.notifications.sound,
            notifier: Box::new(Silent),
            cues: Box::new(Silent),
        })
    }

    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    pub fn with_cue_player(mut self, cues: impl CuePlayer + 'static) -> Self {
        self.cues = Box::new(cues);
        self
    }

    pub fn subscribe(&mut self) -> Receiver<Event> {
        self.bus.subscribe()
    }

    // ── Read access ──────────────────────────────────────────────────

    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    pub fn state(&self) -> &TimerState {
        self.engine.state()
    }

    pub fn settings(&self) -> &TimerSettings {
        self.engine.settings()
    }

    pub fn board(&self) -> &TaskBoard {
        &self.board
    }

    pub fn grouped_tasks(&self) -> TaskGroups {
        self.board.grouped()
    }

    pub fn statistics(&self) -> &Statistics {
        &self.stats
    }

    pub fn garden(&self) -> &Garden {
        &self.garden
    }

    pub fn leaf_source(&self) -> LeafSource {
        self.leaf_source
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Give the store back, e.g. to load it again.
    pub fn into_store(self) -> DocumentStore {
        self.store
    }

    pub fn snapshot(&self, at: DateTime<Utc>) -> Event {
        self.engine.snapshot(at)
    }

    // ── Timer ────────────────────────────────────────────────────────

    pub fn toggle(&mut self, now: DateTime<Utc>) -> Result<Event> {
        let event = self.engine.toggle(now);
        self.store.save_timer_state(self.engine.state())?;
        self.bus.publish(&event);
        Ok(event)
    }

    /// Start if paused. `None` when already running.
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<Option<Event>> {
        if self.engine.is_running() {
            return Ok(None);
        }
        self.toggle(now).map(Some)
    }

    /// Pause if running. `None` when already paused.
    pub fn pause(&mut self, now: DateTime<Utc>) -> Result<Option<Event>> {
        if !self.engine.is_running() {
            return Ok(None);
        }
        self.toggle(now).map(Some)
    }

    pub fn reset(&mut self, now: DateTime<Utc>) -> Result<Event> {
        let event = self.engine.reset(now);
        self.store.save_timer_state(self.engine.state())?;
        self.bus.publish(&event);
        Ok(event)
    }

    /// Count one second down; on reaching zero, account for the finished
    /// interval and move to the next mode.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Result<TickResult> {
        let result = self.engine.tick(now);
        match &result {
            TickResult::Idle => {}
            TickResult::Counting { .. } => self.store.save_timer_state(self.engine.state())?,
            TickResult::Completed(done) => self.account(done, now)?,
        }
        Ok(result)
    }

    fn account(&mut self, done: &CompletedInterval, now: DateTime<Utc>) -> Result<()> {
        let (project, folder) = done
            .task_id
            .as_deref()
            .map(|id| self.board.labels_for(id))
            .unwrap_or_default();
        let block = TaskBlock::from_interval(done, project, folder);
        self.stats
            .record(done.mode, done.nominal_minutes, local_date(now), block);

        if done.mode == TimerMode::Focus {
            self.garden.add_fish(1);
            if self.leaf_source == LeafSource::Focus {
                self.garden.add_leaf(1);
            }
            if let Some(task_id) = done.task_id.as_deref() {
                if self.board.record_pomodoro(task_id, done.nominal_minutes).is_none() {
                    tracing::debug!(task_id, "selected task no longer exists");
                }
            }
        }

        // Every document is written even when one write fails, so the ledger
        // and the next mode are never lost to a garden or board error.
        let mut saved = vec![
            self.store.save_statistics(&self.stats),
            self.store.save_timer_state(self.engine.state()),
        ];
        if done.mode == TimerMode::Focus {
            saved.push(self.store.save_garden(&self.garden));
            saved.push(self.store.save_board(&self.board));
        }
        if let Some(err) = saved.into_iter().find_map(Result::err) {
            return Err(err);
        }

        tracing::info!(
            mode = ?done.mode,
            cycle = done.cycle,
            minutes = done.nominal_minutes,
            "interval completed"
        );
        self.bus.publish(&Event::TimerCompleted {
            mode: done.mode,
            cycle: done.cycle,
            next_mode: done.next_mode,
            next_cycle: done.next_cycle,
            task_id: done.task_id.clone(),
            at: now,
        });
        self.announce(&Notification::for_interval(done));
        if self.sound {
            if let Err(e) = self.cues.play(SoundCue::for_mode(done.mode)) {
                tracing::warn!(error = %e, "sound cue failed");
            }
        }
        Ok(())
    }

    fn announce(&self, notification: &Notification) {
        if !self.notifications {
            return;
        }
        if let Err(e) = self.notifier.notify(notification) {
            tracing::warn!(error = %e, title = %notification.title, "notification failed");
        }
    }

    /// Attach a task to the running or upcoming interval.
    pub fn select_task(&mut self, task_id: &str, now: DateTime<Utc>) -> Result<Event> {
        let task = self
            .board
            .task(task_id)
            .ok_or_else(|| CoreError::not_found("Task", task_id))?;
        let event = Event::TaskSelected {
            task_id: task.id.clone(),
            title: task.title.clone(),
            at: now,
        };
        self.engine.select_task(&task.id, &task.title);
        self.store.save_timer_state(self.engine.state())?;
        self.bus.publish(&event);
        Ok(event)
    }

    pub fn clear_task(&mut self, now: DateTime<Utc>) -> Result<Event> {
        self.engine.clear_task();
        self.store.save_timer_state(self.engine.state())?;
        let event = Event::TaskCleared { at: now };
        self.bus.publish(&event);
        Ok(event)
    }

    /// Persist new settings and bump the change token.
    ///
    /// A paused timer restarts the current mode from its new full length; a
    /// running one keeps counting and picks the new lengths up at the next
    /// transition.
    pub fn update_settings(&mut self, settings: TimerSettings, now: DateTime<Utc>) -> Result<Event> {
        let settings = settings.sanitized();
        self.store.save_settings(&settings, now)?;
        self.settings_token = self.store.settings_token()?;
        self.adopt_settings(settings, now)
    }

    /// Pick up settings saved by another view or process.
    ///
    /// Returns the change event when the stored token moved and the stored
    /// settings differ from the ones in use.
    pub fn poll_settings(&mut self, now: DateTime<Utc>) -> Result<Option<Event>> {
        let token = self.store.settings_token()?;
        if token == self.settings_token {
            return Ok(None);
        }
        self.settings_token = token;
        let settings = self.store.settings()?.sanitized();
        if settings == *self.engine.settings() {
            return Ok(None);
        }
        tracing::debug!(?settings, "settings changed elsewhere");
        self.adopt_settings(settings, now).map(Some)
    }

    fn adopt_settings(&mut self, settings: TimerSettings, now: DateTime<Utc>) -> Result<Event> {
        self.engine.apply_settings(settings);
        self.store.save_timer_state(self.engine.state())?;
        let event = Event::SettingsChanged { settings, at: now };
        self.bus.publish(&event);
        Ok(event)
    }

    // ── Tasks ────────────────────────────────────────────────────────

    pub fn add_task(&mut self, title: &str, tags: Vec<String>, now: DateTime<Utc>) -> Result<Task> {
        let task = self.board.add_task(title, tags, now)?.clone();
        self.store.save_board(&self.board)?;
        Ok(task)
    }

    /// Flip a task's completion and reward the first completion with a leaf
    /// when leaves follow tasks.
    pub fn toggle_task(&mut self, task_id: &str, now: DateTime<Utc>) -> Result<ToggleOutcome> {
        let outcome = self.board.toggle_completed(task_id)?;
        let leaf = outcome.completed_now && self.leaf_source == LeafSource::Task;
        if leaf {
            self.garden.add_leaf(1);
            self.store.save_garden(&self.garden)?;
        }
        self.store.save_board(&self.board)?;

        let task = &outcome.task;
        if outcome.completed_now {
            self.bus.publish(&Event::TaskCompleted {
                task_id: task.id.clone(),
                title: task.title.clone(),
                at: now,
            });
            self.announce(&Notification::task_completed(&task.title, leaf));
        } else {
            self.bus.publish(&Event::TaskReopened {
                task_id: task.id.clone(),
                at: now,
            });
        }
        for project in &outcome.completed_projects {
            self.bus.publish(&Event::ProjectCompleted {
                project_id: project.id.clone(),
                name: project.name.clone(),
                at: now,
            });
            self.announce(&Notification::project_completed(&project.name));
        }
        Ok(outcome)
    }

    /// Complete the task selected in the timer and clear the selection.
    ///
    /// Returns `None` when no task is selected. An already completed task
    /// is left as is.
    pub fn complete_current_task(&mut self, now: DateTime<Utc>) -> Result<Option<ToggleOutcome>> {
        let Some(task_id) = self.engine.state().current_task_id.clone() else {
            return Ok(None);
        };
        let open = self.board.task(&task_id).is_some_and(|t| !t.completed);
        let outcome = if open {
            Some(self.toggle_task(&task_id, now)?)
        } else {
            None
        };
        self.clear_task(now)?;
        Ok(outcome)
    }

    /// Delete a task. Deleting the selected task clears the selection.
    pub fn delete_task(&mut self, task_id: &str, now: DateTime<Utc>) -> Result<Task> {
        let task = self.board.delete_task(task_id)?;
        self.store.save_board(&self.board)?;
        if self.engine.state().current_task_id.as_deref() == Some(task_id) {
            self.clear_task(now)?;
        }
        Ok(task)
    }

    pub fn move_task_to_project(&mut self, task_id: &str, project_id: Option<&str>) -> Result<()> {
        self.board.set_project(task_id, project_id)?;
        self.store.save_board(&self.board)
    }

    pub fn move_task_to_folder(&mut self, task_id: &str, folder_id: Option<&str>) -> Result<()> {
        self.board.set_folder(task_id, folder_id)?;
        self.store.save_board(&self.board)
    }

    // ── Projects & folders ───────────────────────────────────────────

    pub fn add_project(&mut self, name: &str, color: Option<String>) -> Result<Project> {
        let project = self.board.add_project(name, color)?.clone();
        self.store.save_board(&self.board)?;
        Ok(project)
    }

    pub fn add_folder(&mut self, name: &str) -> Result<Folder> {
        let folder = self.board.add_folder(name)?.clone();
        self.store.save_board(&self.board)?;
        Ok(folder)
    }

    /// Returns the new `expanded` flag.
    pub fn toggle_project(&mut self, project_id: &str) -> Result<bool> {
        let expanded = self.board.toggle_project_expanded(project_id)?;
        self.store.save_board(&self.board)?;
        Ok(expanded)
    }

    pub fn toggle_folder(&mut self, folder_id: &str) -> Result<bool> {
        let expanded = self.board.toggle_folder_expanded(folder_id)?;
        self.store.save_board(&self.board)?;
        Ok(expanded)
    }

    pub fn move_project(&mut self, project_id: &str, folder_id: Option<&str>) -> Result<()> {
        self.board.move_project(project_id, folder_id)?;
        self.store.save_board(&self.board)
    }

    pub fn delete_project(&mut self, project_id: &str) -> Result<Project> {
        let project = self.board.delete_project(project_id)?;
        self.store.save_board(&self.board)?;
        Ok(project)
    }

    pub fn delete_folder(&mut self, folder_id: &str) -> Result<Folder> {
        let folder = self.board.delete_folder(folder_id)?;
        self.store.save_board(&self.board)?;
        Ok(folder)
    }

    // ── Garden ───────────────────────────────────────────────────────

    /// Feed the fish. `false` when the pond is empty or the cooldown is
    /// still running.
    pub fn feed(&mut self, now: DateTime<Utc>) -> Result<bool> {
        if !self.garden.feed(now) {
            return Ok(false);
        }
        self.store.save_garden(&self.garden)?;
        self.bus.publish(&Event::FishFed { at: now });
        self.announce(&Notification::fish_fed());
        Ok(true)
    }

    // ── Data ─────────────────────────────────────────────────────────

    pub fn export(&self, now: DateTime<Utc>) -> Result<Backup> {
        Backup::export(&self.store, now)
    }

    /// Import a backup file, then reload every document from the store.
    pub fn import(&mut self, json: &str, now: DateTime<Utc>) -> Result<ImportSummary> {
        let summary = Backup::import(&self.store, json, now)?;

        self.board = self.store.board()?;
        self.board.recompute_projects();
        self.store.save_board(&self.board)?;
        self.stats = self.store.statistics()?;
        self.garden = self.store.garden()?;
        self.settings_token = self.store.settings_token()?;
        let settings = self.store.settings()?;
        if settings != *self.engine.settings() {
            self.engine.apply_settings(settings);
        }
        self.store.save_timer_state(self.engine.state())?;

        self.bus.publish(&Event::DataImported { at: now });
        Ok(summary)
    }
}
