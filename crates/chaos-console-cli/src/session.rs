/*
[INPUT]:  Actions from commands, session.json on disk
[OUTPUT]: Persisted console session (filter, recent tasks, watched task)
[POS]:    State layer - session persistence
[UPDATE]: When adding new persisted session fields
*/

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::action::{Action, ExperimentAction, TaskAction};

pub const MAX_RECENT_TASKS: usize = 10;
const SESSION_FILE: &str = "session.json";
const DATA_DIR_NAME: &str = "chaos-console";

/// Session state that survives between console invocations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionState {
    /// Last status filter code used for the experiment list
    pub filter_code: Option<i32>,
    /// Most recent first
    pub recent_tasks: Vec<String>,
    pub watched_task: Option<String>,
    pub last_listed_total: Option<u64>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl SessionState {
    pub fn apply(&mut self, action: impl Into<Action>) {
        match action.into() {
            Action::Experiment(ExperimentAction::FilterSelected(code)) => {
                self.filter_code = Some(code);
            }
            Action::Experiment(ExperimentAction::FilterCleared) => {
                self.filter_code = None;
            }
            Action::Experiment(ExperimentAction::Listed { total }) => {
                self.last_listed_total = Some(total);
            }
            Action::Task(TaskAction::Viewed(task_id)) | Action::Task(TaskAction::Ended(task_id)) => {
                self.remember_task(task_id);
            }
            Action::Task(TaskAction::WatchStarted(task_id)) => {
                self.remember_task(task_id.clone());
                self.watched_task = Some(task_id);
            }
            Action::Task(TaskAction::WatchStopped) => {
                self.watched_task = None;
            }
            Action::Task(TaskAction::Retried { previous, next }) => {
                if self.watched_task.as_deref() == Some(previous.as_str()) {
                    self.watched_task = Some(next.clone());
                }
                self.remember_task(previous);
                self.remember_task(next);
            }
        }
        self.updated_at = Some(Utc::now());
    }

    fn remember_task(&mut self, task_id: String) {
        self.recent_tasks.retain(|id| id != &task_id);
        self.recent_tasks.insert(0, task_id);
        self.recent_tasks.truncate(MAX_RECENT_TASKS);
    }
}

/// Loads and saves [`SessionState`] as JSON
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(SESSION_FILE),
        }
    }

    /// Store under the platform data directory
    pub fn in_data_dir() -> Result<Self> {
        let dir = dirs::data_dir()
            .ok_or_else(|| anyhow!("Could not determine data directory"))?
            .join(DATA_DIR_NAME);
        Ok(Self::new(dir))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Hydrate the session; a missing file yields the default state
    pub async fn load(&self) -> Result<SessionState> {
        if !fs::try_exists(&self.path).await.unwrap_or(false) {
            return Ok(SessionState::default());
        }
        let content = fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("read session from {}", self.path.display()))?;
        let state = serde_json::from_str(&content)
            .with_context(|| format!("parse session file {}", self.path.display()))?;
        Ok(state)
    }

    pub async fn save(&self, state: &SessionState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(state)?;

        // Atomic write: write to temp file then rename
        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, content).await?;
        fs::rename(&temp_path, &self.path).await?;
        Ok(())
    }
}
