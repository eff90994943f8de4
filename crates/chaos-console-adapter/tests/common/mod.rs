/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities, fixtures, and mock helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for chaos-console-adapter tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chaos_console_adapter::{
    ChaosClient, ClientConfig, ConsoleError, ExperimentTask, Page, TaskLogEntry, TaskSource,
};
use wiremock::MockServer;

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Client pointed at the mock server with fast retries
pub fn client_for(server: &MockServer) -> ChaosClient {
    let config = ClientConfig {
        timeout: Duration::from_millis(500),
        connect_timeout: Duration::from_millis(500),
        max_retries: 2,
        retry_backoff: Duration::from_millis(10),
    };
    ChaosClient::with_config_and_base_url(config, &server.uri()).expect("client init")
}

/// Mock access token for testing
pub fn mock_access_token() -> String {
    "ck-test-0123456789".to_string()
}

pub fn task(run_state: Option<i32>, result_state: Option<i32>) -> ExperimentTask {
    ExperimentTask {
        task_id: "t-1".to_string(),
        experiment_id: "e-1".to_string(),
        experiment_name: Some("cpu burn".to_string()),
        run_state,
        result_state,
        start_time: None,
        end_time: None,
        message: None,
    }
}

pub fn log_entry(id: i64, message: &str) -> TaskLogEntry {
    TaskLogEntry {
        id,
        level: "INFO".to_string(),
        message: message.to_string(),
        time: chrono::DateTime::from_timestamp(1_700_000_000 + id, 0).expect("timestamp"),
        node: None,
    }
}

#[derive(Debug, Clone)]
pub enum Scripted {
    Task(Option<i32>, Option<i32>),
    Fail,
}

/// In-memory task source that replays a script, repeating the last step.
#[derive(Debug)]
pub struct ScriptedSource {
    steps: Mutex<VecDeque<Scripted>>,
    logs: Mutex<Vec<TaskLogEntry>>,
    fetches: AtomicU32,
    /// 1-based log fetch numbers that fail
    failing_log_fetches: Mutex<Vec<u32>>,
    log_fetches: AtomicU32,
}

impl ScriptedSource {
    pub fn new(steps: Vec<Scripted>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            logs: Mutex::new(Vec::new()),
            fetches: AtomicU32::new(0),
            failing_log_fetches: Mutex::new(Vec::new()),
            log_fetches: AtomicU32::new(0),
        }
    }

    pub fn fetches(&self) -> u32 {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Make the given log fetch (counted from 1) fail.
    pub fn fail_log_fetch(&self, fetch: u32) {
        self.failing_log_fetches.lock().expect("failing lock").push(fetch);
    }

    pub fn log_fetches(&self) -> u32 {
        self.log_fetches.load(Ordering::SeqCst)
    }

    pub fn push_logs(&self, entries: impl IntoIterator<Item = TaskLogEntry>) {
        self.logs.lock().expect("logs lock").extend(entries);
    }
}

#[async_trait]
impl TaskSource for ScriptedSource {
    async fn fetch_task(&self, _task_id: &str) -> chaos_console_adapter::Result<ExperimentTask> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let step = {
            let mut steps = self.steps.lock().expect("steps lock");
            if steps.len() > 1 {
                steps.pop_front()
            } else {
                steps.front().cloned()
            }
        };
        match step {
            Some(Scripted::Task(run, result)) => Ok(task(run, result)),
            Some(Scripted::Fail) | None => Err(unavailable()),
        }
    }

    async fn fetch_logs(
        &self,
        _task_id: &str,
        page: u32,
        size: u32,
    ) -> chaos_console_adapter::Result<Page<TaskLogEntry>> {
        let fetch = self.log_fetches.fetch_add(1, Ordering::SeqCst) + 1;
        if self.failing_log_fetches.lock().expect("failing lock").contains(&fetch) {
            return Err(unavailable());
        }
        let logs = self.logs.lock().expect("logs lock");
        let start = ((page.saturating_sub(1)) * size) as usize;
        let items = logs.iter().skip(start).take(size as usize).cloned().collect();
        Ok(Page {
            page,
            size,
            total: logs.len() as u64,
            items,
        })
    }
}

fn unavailable() -> ConsoleError {
    ConsoleError::api_error(reqwest::StatusCode::SERVICE_UNAVAILABLE, "maintenance")
}
