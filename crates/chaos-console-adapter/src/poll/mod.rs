/*
[INPUT]:  Anything that can fetch a task record and its log pages
[OUTPUT]: Task poller and log tail built on that source
[POS]:    Polling layer - periodic refresh in place of push updates
[UPDATE]: When adding new polled resources
*/

pub mod log_tail;
pub mod poller;

use async_trait::async_trait;
use std::sync::Arc;

use crate::http::{ChaosClient, Result};
use crate::types::{ExperimentTask, Page, TaskLogEntry};

pub use log_tail::LogTail;
pub use poller::{PollConfig, PollUpdate, PollerHandle, TaskPoller};

/// Where polled task state comes from.
#[async_trait]
pub trait TaskSource: Send + Sync {
    async fn fetch_task(&self, task_id: &str) -> Result<ExperimentTask>;

    async fn fetch_logs(&self, task_id: &str, page: u32, size: u32) -> Result<Page<TaskLogEntry>>;
}

#[async_trait]
impl TaskSource for ChaosClient {
    async fn fetch_task(&self, task_id: &str) -> Result<ExperimentTask> {
        self.query_task(task_id).await
    }

    async fn fetch_logs(&self, task_id: &str, page: u32, size: u32) -> Result<Page<TaskLogEntry>> {
        self.query_task_logs(task_id, page, size).await
    }
}

#[async_trait]
impl<T> TaskSource for Arc<T>
where
    T: TaskSource + ?Sized,
{
    async fn fetch_task(&self, task_id: &str) -> Result<ExperimentTask> {
        (**self).fetch_task(task_id).await
    }

    async fn fetch_logs(&self, task_id: &str, page: u32, size: u32) -> Result<Page<TaskLogEntry>> {
        (**self).fetch_logs(task_id, page, size).await
    }
}
