/*
[INPUT]:  Task identifiers and log paging parameters
[OUTPUT]: Task records, stop/retry confirmations, task log pages
[POS]:    HTTP layer - task endpoints
[UPDATE]: When adding new task endpoints or changing task flow
*/

use crate::http::{ChaosClient, Result};
use crate::types::{ExperimentTask, Page, TaskHandle, TaskIdRequest, TaskLogEntry, TaskLogRequest};

impl ChaosClient {
    /// Query the current state of a task
    ///
    /// POST /api/QueryExperimentTask
    pub async fn query_task(&self, task_id: &str) -> Result<ExperimentTask> {
        self.call("QueryExperimentTask", &task_request(task_id)).await
    }

    /// Ask the service to end (roll back) a running task
    ///
    /// POST /api/StopExperimentTask
    pub async fn stop_task(&self, task_id: &str) -> Result<bool> {
        self.call_once("StopExperimentTask", &task_request(task_id)).await
    }

    /// Retry the failed phase of a task; returns the superseding task
    ///
    /// POST /api/RetryExperimentTask
    pub async fn retry_task(&self, task_id: &str) -> Result<TaskHandle> {
        self.call_once("RetryExperimentTask", &task_request(task_id)).await
    }

    /// Page through a task's execution log, oldest first
    ///
    /// POST /api/QueryTaskLog
    pub async fn query_task_logs(&self, task_id: &str, page: u32, size: u32) -> Result<Page<TaskLogEntry>> {
        let body = TaskLogRequest {
            task_id: task_id.to_string(),
            page,
            size,
        };
        self.call("QueryTaskLog", &body).await
    }
}

fn task_request(task_id: &str) -> TaskIdRequest {
    TaskIdRequest {
        task_id: task_id.to_string(),
    }
}
