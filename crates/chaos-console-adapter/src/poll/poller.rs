/*
[INPUT]:  TaskSource + task id, PollConfig, CancellationToken
[OUTPUT]: Latest classified task snapshot via `watch` until a final update
[POS]:    Polling layer - cancellable periodic task refresh with backoff
[UPDATE]: When changing poll interval, backoff, or terminal semantics
*/

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::TaskSource;
use crate::types::{ExperimentTask, TaskStatus};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);
const DEFAULT_MAX_CONSECUTIVE_ERRORS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_consecutive_errors: u32,
    /// Stop after this many fetches even if the task never finishes
    pub max_polls: Option<u32>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_consecutive_errors: DEFAULT_MAX_CONSECUTIVE_ERRORS,
            max_polls: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PollUpdate {
    /// Nothing fetched yet
    Pending,
    Progress {
        task: ExperimentTask,
        status: TaskStatus,
    },
    Retrying {
        consecutive_errors: u32,
        backoff: Duration,
        error: String,
    },
    /// Task reached a terminal status
    Finished {
        task: ExperimentTask,
        status: TaskStatus,
    },
    /// `max_polls` reached before a terminal status
    Exhausted {
        polls: u32,
        last_status: Option<TaskStatus>,
    },
    Failed {
        error: String,
    },
    Cancelled,
}

impl PollUpdate {
    /// True once the poller has stopped and will publish nothing else.
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            PollUpdate::Finished { .. }
                | PollUpdate::Exhausted { .. }
                | PollUpdate::Failed { .. }
                | PollUpdate::Cancelled
        )
    }

    pub fn status(&self) -> Option<TaskStatus> {
        match self {
            PollUpdate::Progress { status, .. } | PollUpdate::Finished { status, .. } => {
                Some(*status)
            }
            PollUpdate::Exhausted { last_status, .. } => *last_status,
            _ => None,
        }
    }
}

/// Re-fetches one task on a fixed interval until it reaches a terminal status.
#[derive(Debug)]
pub struct TaskPoller<S: ?Sized> {
    source: Arc<S>,
    task_id: String,
    config: PollConfig,
}

impl<S> TaskPoller<S>
where
    S: TaskSource + ?Sized + 'static,
{
    pub fn new(source: Arc<S>, task_id: impl Into<String>, config: PollConfig) -> Self {
        Self {
            source,
            task_id: task_id.into(),
            config,
        }
    }

    /// Spawn the poll loop onto the current Tokio runtime.
    pub fn spawn(self, shutdown: CancellationToken) -> PollerHandle {
        let (updates_tx, updates_rx) = watch::channel(PollUpdate::Pending);
        let worker_shutdown = shutdown.clone();
        let handle = tokio::spawn(async move { self.run(worker_shutdown, updates_tx).await });

        PollerHandle {
            updates: updates_rx,
            shutdown,
            handle,
        }
    }

    /// Run the poll loop to completion, publishing each update.
    ///
    /// Returns the final update, which is also the last value published.
    pub async fn run(
        self,
        shutdown: CancellationToken,
        updates: watch::Sender<PollUpdate>,
    ) -> PollUpdate {
        let finish = |update: PollUpdate| {
            let _ = updates.send(update.clone());
            update
        };

        let mut polls: u32 = 0;
        let mut consecutive_errors: u32 = 0;
        let mut last_status: Option<TaskStatus> = None;

        info!(task_id = %self.task_id, interval = ?self.config.interval, "task poller started");

        loop {
            if shutdown.is_cancelled() {
                return finish(PollUpdate::Cancelled);
            }

            let fetched = tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    return finish(PollUpdate::Cancelled);
                }
                result = self.source.fetch_task(&self.task_id) => result,
            };
            polls = polls.saturating_add(1);

            let delay = match fetched {
                Ok(task) => {
                    consecutive_errors = 0;
                    let status = task.status();
                    last_status = Some(status);
                    debug!(task_id = %self.task_id, polls, status = ?status, "task polled");

                    if status.is_terminal() {
                        info!(task_id = %self.task_id, status = ?status, "task reached terminal status");
                        return finish(PollUpdate::Finished { task, status });
                    }

                    let _ = updates.send(PollUpdate::Progress { task, status });
                    self.config.interval
                }
                Err(err) => {
                    consecutive_errors = consecutive_errors.saturating_add(1);

                    if consecutive_errors >= self.config.max_consecutive_errors {
                        warn!(
                            task_id = %self.task_id,
                            consecutive_errors,
                            error = %err,
                            "task poller gave up"
                        );
                        return finish(PollUpdate::Failed {
                            error: err.to_string(),
                        });
                    }

                    let backoff = backoff_duration(consecutive_errors);
                    warn!(
                        task_id = %self.task_id,
                        consecutive_errors,
                        ?backoff,
                        error = %err,
                        "task fetch failed; retrying with backoff"
                    );
                    let _ = updates.send(PollUpdate::Retrying {
                        consecutive_errors,
                        backoff,
                        error: err.to_string(),
                    });
                    backoff
                }
            };

            if self.config.max_polls.is_some_and(|max| polls >= max) {
                return finish(PollUpdate::Exhausted { polls, last_status });
            }

            tokio::select! {
                _ = shutdown.cancelled() => {
                    return finish(PollUpdate::Cancelled);
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
}

/// Handle to a spawned [`TaskPoller`].
#[derive(Debug)]
pub struct PollerHandle {
    updates: watch::Receiver<PollUpdate>,
    shutdown: CancellationToken,
    handle: JoinHandle<PollUpdate>,
}

impl PollerHandle {
    pub fn subscribe(&self) -> watch::Receiver<PollUpdate> {
        self.updates.clone()
    }

    pub fn latest(&self) -> PollUpdate {
        self.updates.borrow().clone()
    }

    /// Stop polling; the loop exits at its next await point.
    pub fn cancel(&self) {
        self.shutdown.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the poll loop to end and return its final update.
    pub async fn join(self) -> PollUpdate {
        match self.handle.await {
            Ok(update) => update,
            Err(err) => PollUpdate::Failed {
                error: format!("poller task aborted: {err}"),
            },
        }
    }
}

pub(crate) fn backoff_duration(retry_count: u32) -> Duration {
    let exp = retry_count.saturating_sub(1).min(63);
    let secs = 1u64 << exp;
    Duration::from_secs(secs.min(30))
}
