/*
[INPUT]:  Service endpoint and task id (CHAOS_ENDPOINT, CHAOS_TOKEN, first argument)
[OUTPUT]: Task status transitions until the task ends
[POS]:    Examples - polling a task
[UPDATE]: When poller or client construction changes
*/

use std::sync::Arc;

use chaos_console_adapter::*;
use tokio_util::sync::CancellationToken;

/// Example: watch one task until it reaches a terminal status
///
/// Run with `cargo run --example watch_task -- <task-id>`.
#[tokio::main]
async fn main() {
    println!("=== Chaos Task Watch Example ===\n");

    let Some(task_id) = std::env::args().nth(1) else {
        eprintln!("usage: watch_task <task-id>");
        return;
    };
    let endpoint = std::env::var("CHAOS_ENDPOINT").unwrap_or_else(|_| "http://127.0.0.1:7001".to_string());

    let mut client = match ChaosClient::with_config_and_base_url(ClientConfig::default(), &endpoint) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to create client: {}", e);
            return;
        }
    };
    if let Ok(token) = std::env::var("CHAOS_TOKEN") {
        client.set_credentials(Credentials {
            access_token: token,
            namespace: None,
        });
    }
    println!("✓ HTTP client created for {}\n", client.base_url());

    let shutdown = CancellationToken::new();
    let ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        ctrl_c.cancel();
    });

    let handle = TaskPoller::new(Arc::new(client), task_id.clone(), PollConfig::default()).spawn(shutdown);
    let mut updates = handle.subscribe();
    while updates.changed().await.is_ok() {
        let update = updates.borrow_and_update().clone();
        if let Some(status) = update.status() {
            println!("{} -> {} (code {})", task_id, status, status.code());
        }
        if update.is_final() {
            break;
        }
    }

    match handle.join().await {
        PollUpdate::Finished { status, .. } => println!("\n✓ Task finished: {}", status),
        PollUpdate::Cancelled => println!("\n✓ Watch cancelled"),
        other => println!("\n✗ Watch ended: {:?}", other),
    }
}
