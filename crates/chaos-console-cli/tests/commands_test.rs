/*
[INPUT]:  Mock experiment service, temporary session directory
[OUTPUT]: End-to-end verification of console commands
[POS]:    Integration tests - command layer
[UPDATE]: When command behavior or persisted session changes
*/

mod common;

use chaos_console::commands::{self, Command, ExperimentsCommand, ListArgs, TaskCommand};
use chaos_console::{SessionState, SessionStore};
use common::{bodies_for, config_for, experiment_page_json, mount_task, ok, task_json, text};
use serde_json::json;
use tokio_test::{assert_err, assert_ok};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn list(status: Option<i32>, all: bool) -> Command {
    Command::Experiments(ExperimentsCommand::List(ListArgs {
        status,
        all,
        name: None,
        page: 1,
        size: 10,
    }))
}

async fn session(dir: &std::path::Path) -> SessionState {
    SessionStore::new(dir).load().await.expect("load session")
}

#[tokio::test]
async fn list_with_known_filter_sends_state_pair() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    Mock::given(method("POST"))
        .and(path("/api/QueryExperimentList"))
        .respond_with(ok(experiment_page_json()))
        .expect(1)
        .mount(&server)
        .await;

    let mut out = Vec::new();
    assert_ok!(
        commands::dispatch(
            list(Some(6), false),
            config_for(&server, dir.path()),
            CancellationToken::new(),
            &mut out
        )
        .await
    );

    let bodies = bodies_for(&server, "QueryExperimentList").await;
    assert_eq!(bodies[0]["state"], json!(4));
    assert_eq!(bodies[0]["results"], json!(1));

    let output = text(out);
    assert!(output.contains("pod kill"));
    assert!(output.contains("终止失败"));

    let saved = session(dir.path()).await;
    assert_eq!(saved.filter_code, Some(6));
    assert_eq!(saved.last_listed_total, Some(1));
}

#[tokio::test]
async fn list_with_unknown_filter_continues_unfiltered() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    Mock::given(method("POST"))
        .and(path("/api/QueryExperimentList"))
        .respond_with(ok(experiment_page_json()))
        .expect(1)
        .mount(&server)
        .await;

    let mut out = Vec::new();
    assert_ok!(
        commands::dispatch(
            list(Some(99), false),
            config_for(&server, dir.path()),
            CancellationToken::new(),
            &mut out
        )
        .await
    );

    let bodies = bodies_for(&server, "QueryExperimentList").await;
    assert!(bodies[0].get("state").is_none());
    assert!(bodies[0].get("results").is_none());

    let output = text(out);
    assert!(output.contains("no task status is registered for filter code 99"));
    assert!(output.contains("pod kill"));
    assert_eq!(session(dir.path()).await.filter_code, None);
}

#[tokio::test]
async fn remembered_filter_is_reused_until_cleared() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    Mock::given(method("POST"))
        .and(path("/api/QueryExperimentList"))
        .respond_with(ok(experiment_page_json()))
        .mount(&server)
        .await;
    let config = config_for(&server, dir.path());

    for command in [list(Some(-1), false), list(None, false), list(None, true)] {
        let mut out = Vec::new();
        assert_ok!(commands::dispatch(command, config.clone(), CancellationToken::new(), &mut out).await);
    }

    let bodies = bodies_for(&server, "QueryExperimentList").await;
    assert_eq!(bodies.len(), 3);
    assert_eq!(bodies[0]["state"], json!(0));
    assert_eq!(bodies[1]["state"], json!(0));
    assert!(bodies[2].get("state").is_none());
    assert_eq!(session(dir.path()).await.filter_code, None);
}

#[tokio::test]
async fn end_refused_for_finished_task() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_task(&server, "t-1", 4, 0).await;
    Mock::given(method("POST"))
        .and(path("/api/StopExperimentTask"))
        .respond_with(ok(json!(true)))
        .expect(0)
        .mount(&server)
        .await;

    let mut out = Vec::new();
    let err = assert_err!(
        commands::dispatch(
            Command::Task(TaskCommand::End {
                id: "t-1".to_string(),
                yes: true
            }),
            config_for(&server, dir.path()),
            CancellationToken::new(),
            &mut out
        )
        .await
    );
    assert!(err.to_string().contains("cannot end task t-1"));
}

#[tokio::test]
async fn end_running_task_with_yes() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_task(&server, "t-1", 1, 0).await;
    Mock::given(method("POST"))
        .and(path("/api/StopExperimentTask"))
        .respond_with(ok(json!(true)))
        .expect(1)
        .mount(&server)
        .await;

    let mut out = Vec::new();
    assert_ok!(
        commands::dispatch(
            Command::Task(TaskCommand::End {
                id: "t-1".to_string(),
                yes: true
            }),
            config_for(&server, dir.path()),
            CancellationToken::new(),
            &mut out
        )
        .await
    );
    assert!(text(out).contains("ending"));
    assert_eq!(session(dir.path()).await.recent_tasks, vec!["t-1".to_string()]);
}

#[tokio::test]
async fn retry_failed_task_records_new_task() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_task(&server, "t-1", 4, 1).await;
    Mock::given(method("POST"))
        .and(path("/api/RetryExperimentTask"))
        .respond_with(ok(json!({"taskId": "t-2"})))
        .expect(1)
        .mount(&server)
        .await;

    let mut out = Vec::new();
    assert_ok!(
        commands::dispatch(
            Command::Task(TaskCommand::Retry {
                id: "t-1".to_string(),
                yes: true
            }),
            config_for(&server, dir.path()),
            CancellationToken::new(),
            &mut out
        )
        .await
    );

    assert!(text(out).contains("t-2"));
    assert_eq!(
        session(dir.path()).await.recent_tasks,
        vec!["t-2".to_string(), "t-1".to_string()]
    );
}

#[tokio::test]
async fn watch_prints_until_terminal_status() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    Mock::given(method("POST"))
        .and(path("/api/QueryExperimentTask"))
        .respond_with(ok(task_json("t-1", 1, -1)))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/QueryExperimentTask"))
        .respond_with(ok(task_json("t-1", 4, 0)))
        .mount(&server)
        .await;

    let mut out = Vec::new();
    assert_ok!(
        commands::dispatch(
            Command::Task(TaskCommand::Watch {
                id: "t-1".to_string(),
                logs: false
            }),
            config_for(&server, dir.path()),
            CancellationToken::new(),
            &mut out
        )
        .await
    );

    let output = text(out);
    // progress is printed once per status change
    assert!(output.matches("启动中").count() <= 1, "output: {output}");
    assert!(output.contains("finished"));
    assert!(output.contains("终止成功"));

    let saved = session(dir.path()).await;
    assert_eq!(saved.watched_task, None);
    assert_eq!(saved.recent_tasks, vec!["t-1".to_string()]);
}

#[tokio::test]
async fn watch_fails_after_consecutive_errors() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    Mock::given(method("POST"))
        .and(path("/api/QueryExperimentTask"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut config = config_for(&server, dir.path());
    // first backoff is 1s; keep the test short
    config.poll.max_consecutive_errors = 1;

    let mut out = Vec::new();
    let err = assert_err!(
        commands::dispatch(
            Command::Task(TaskCommand::Watch {
                id: "t-1".to_string(),
                logs: false
            }),
            config,
            CancellationToken::new(),
            &mut out
        )
        .await
    );
    assert!(err.to_string().contains("watch of task t-1 failed"));
}

#[tokio::test]
async fn watch_stops_on_cancellation() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_task(&server, "t-1", 1, 0).await;

    let mut config = config_for(&server, dir.path());
    config.poll.max_polls = None;
    let shutdown = CancellationToken::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let mut out = Vec::new();
    assert_ok!(
        commands::dispatch(
            Command::Task(TaskCommand::Watch {
                id: "t-1".to_string(),
                logs: false
            }),
            config,
            shutdown,
            &mut out
        )
        .await
    );
    assert!(text(out).contains("watch cancelled"));
}

#[tokio::test]
async fn logs_page_is_printed() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    Mock::given(method("POST"))
        .and(path("/api/QueryTaskLog"))
        .respond_with(ok(json!({
            "page": 1,
            "size": 50,
            "total": 2,
            "items": [
                {"id": 1, "level": "INFO", "message": "inject fault", "time": "2024-05-01T10:00:00Z"},
                {"id": 2, "level": "ERROR", "message": "pod not found", "time": "2024-05-01T10:00:03Z", "node": "node-a"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut out = Vec::new();
    assert_ok!(
        commands::dispatch(
            Command::Task(TaskCommand::Logs {
                id: "t-1".to_string(),
                page: 1,
                size: 50
            }),
            config_for(&server, dir.path()),
            CancellationToken::new(),
            &mut out
        )
        .await
    );

    let output = text(out);
    assert!(output.contains("inject fault"));
    assert!(output.contains("[node-a] pod not found"));
}
