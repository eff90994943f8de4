/*
[INPUT]:  Mock server and temporary directories
[OUTPUT]: Console configuration and response fixtures for command tests
[POS]:    Test infrastructure - shared across CLI test modules
[UPDATE]: When commands need new fixtures
*/

#![allow(dead_code)]

use chaos_console::ConsoleConfig;
use chaos_console::config::{PollSettings, RequestConfig};
use serde_json::{Value, json};
use std::path::Path;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Config pointed at the mock server with fast polling and no retries
pub fn config_for(server: &MockServer, session_dir: &Path) -> ConsoleConfig {
    ConsoleConfig {
        endpoint: server.uri(),
        access_token: Some("ck-test-0123456789".to_string()),
        session_dir: Some(session_dir.to_path_buf()),
        request: RequestConfig {
            timeout_secs: 2,
            connect_timeout_secs: 2,
            max_retries: 0,
            retry_backoff_ms: 10,
        },
        poll: PollSettings {
            interval_ms: 10,
            max_consecutive_errors: 2,
            max_polls: Some(50),
        },
        ..ConsoleConfig::default()
    }
}

pub fn ok(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "success": true,
        "code": "0",
        "requestId": "req-1",
        "data": data
    }))
}

pub fn task_json(task_id: &str, run_state: i32, result_state: i32) -> Value {
    json!({
        "taskId": task_id,
        "experimentId": "e-1",
        "experimentName": "pod kill",
        "runState": run_state,
        "resultState": result_state
    })
}

pub fn experiment_page_json() -> Value {
    json!({
        "page": 1,
        "size": 10,
        "total": 1,
        "items": [{
            "experimentId": "e-1",
            "name": "pod kill",
            "taskId": "t-1",
            "runState": 4,
            "resultState": 1
        }]
    })
}

pub async fn mount_task(server: &MockServer, task_id: &str, run_state: i32, result_state: i32) {
    Mock::given(method("POST"))
        .and(path("/api/QueryExperimentTask"))
        .respond_with(ok(task_json(task_id, run_state, result_state)))
        .mount(server)
        .await;
}

/// Parsed JSON bodies of requests received for one action
pub async fn bodies_for(server: &MockServer, action: &str) -> Vec<Value> {
    let wanted = format!("/api/{action}");
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|request| request.url.path() == wanted)
        .map(|request| serde_json::from_slice(&request.body).expect("json body"))
        .collect()
}

pub fn text(out: Vec<u8>) -> String {
    String::from_utf8(out).expect("utf-8 output")
}
