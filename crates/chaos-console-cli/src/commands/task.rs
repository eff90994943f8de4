/*
[INPUT]:  Task subcommand arguments, AppContext, shutdown token
[OUTPUT]: Task details, watch output, end/retry requests, log pages
[POS]:    Command layer - experiment tasks
[UPDATE]: When task endpoints, gating or watch behavior change
*/

use anyhow::{Context, Result, anyhow, bail};
use chaos_console_adapter::{ExperimentTask, LogTail, PollUpdate, TaskPoller, TaskStatus};
use console::style;
use dialoguer::{Confirm, theme::ColorfulTheme};
use std::io::Write;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::action::TaskAction;
use crate::context::AppContext;
use crate::render;

/// Operation gated on the task's current status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gated {
    End,
    Retry,
}

impl Gated {
    fn name(self) -> &'static str {
        match self {
            Gated::End => "end",
            Gated::Retry => "retry",
        }
    }

    fn allowed(self, status: TaskStatus) -> bool {
        let actions = status.actions();
        match self {
            Gated::End => actions.can_end,
            Gated::Retry => actions.can_retry,
        }
    }
}

fn ensure_allowed(task: &ExperimentTask, op: Gated) -> Result<()> {
    let status = task.status();
    if !op.allowed(status) {
        bail!(
            "cannot {} task {} while it is {} ({})",
            op.name(),
            task.task_id,
            status,
            status.code()
        );
    }
    Ok(())
}

fn confirm(prompt: String) -> Result<bool> {
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(false)
        .interact()
        .context("read confirmation")
}

async fn load_task(ctx: &AppContext, id: &str) -> Result<ExperimentTask> {
    ctx.client
        .query_task(id)
        .await
        .with_context(|| format!("load task {id}"))
}

pub async fn show(ctx: &mut AppContext, id: &str, out: &mut dyn Write) -> Result<()> {
    let task = load_task(ctx, id).await?;
    write!(out, "{}", render::task_detail(&task))?;
    ctx.record(TaskAction::Viewed(task.task_id)).await?;
    Ok(())
}

pub async fn watch(
    ctx: &mut AppContext,
    id: &str,
    with_logs: bool,
    shutdown: CancellationToken,
    out: &mut dyn Write,
) -> Result<()> {
    ctx.record(TaskAction::WatchStarted(id.to_string())).await?;
    info!(task_id = %id, with_logs, "watching task");

    let handle = TaskPoller::new(ctx.client.clone(), id, ctx.config.poll_config())
        .spawn(shutdown.child_token());
    let mut updates = handle.subscribe();
    let mut tail = with_logs.then(|| LogTail::new(ctx.client.clone(), id));
    let mut last_shown: Option<TaskStatus> = None;
    let mut final_shown = false;

    while updates.changed().await.is_ok() {
        let update = updates.borrow_and_update().clone();

        if let Some(tail) = tail.as_mut() {
            match tail.next_batch().await {
                Ok(entries) => {
                    for entry in &entries {
                        writeln!(out, "{}", render::log_line(entry))?;
                    }
                }
                Err(err) => warn!(task_id = %id, error = %err, "log tail failed"),
            }
        }

        // Progress repeats every interval; only print status changes
        let repeated = matches!(update, PollUpdate::Progress { status, .. } if last_shown == Some(status));
        if !repeated {
            if let Some(line) = render::poll_update(&update) {
                writeln!(out, "{line}")?;
            }
        }
        if let Some(status) = update.status() {
            last_shown = Some(status);
        }
        if update.is_final() {
            final_shown = true;
            break;
        }
    }

    let last = handle.join().await;
    if !final_shown {
        if let Some(line) = render::poll_update(&last) {
            writeln!(out, "{line}")?;
        }
    }
    ctx.record(TaskAction::WatchStopped).await?;

    match last {
        PollUpdate::Failed { error } => Err(anyhow!("watch of task {id} failed: {error}")),
        _ => Ok(()),
    }
}

pub async fn end(ctx: &mut AppContext, id: &str, yes: bool, out: &mut dyn Write) -> Result<()> {
    let task = load_task(ctx, id).await?;
    ensure_allowed(&task, Gated::End)?;

    if !yes && !confirm(format!("End task {id}?"))? {
        writeln!(out, "{}", style("Aborted.").yellow())?;
        return Ok(());
    }

    let accepted = ctx
        .client
        .stop_task(id)
        .await
        .with_context(|| format!("end task {id}"))?;
    if !accepted {
        bail!("service declined to end task {id}");
    }
    info!(task_id = %id, "task end requested");

    writeln!(out, "{} task {}", style("ending").green(), style(id).bold())?;
    ctx.record(TaskAction::Ended(id.to_string())).await?;
    Ok(())
}

pub async fn retry(ctx: &mut AppContext, id: &str, yes: bool, out: &mut dyn Write) -> Result<()> {
    let task = load_task(ctx, id).await?;
    ensure_allowed(&task, Gated::Retry)?;

    if !yes && !confirm(format!("Retry task {id}?"))? {
        writeln!(out, "{}", style("Aborted.").yellow())?;
        return Ok(());
    }

    let handle = ctx
        .client
        .retry_task(id)
        .await
        .with_context(|| format!("retry task {id}"))?;
    info!(previous = %id, next = %handle.task_id, "task retried");

    writeln!(
        out,
        "{} task {} as {}",
        style("retried").green(),
        id,
        style(&handle.task_id).bold()
    )?;
    ctx.record(TaskAction::Retried {
        previous: id.to_string(),
        next: handle.task_id,
    })
    .await?;
    Ok(())
}

pub async fn logs(
    ctx: &mut AppContext,
    id: &str,
    page: u32,
    size: u32,
    out: &mut dyn Write,
) -> Result<()> {
    let entries = ctx
        .client
        .query_task_logs(id, page.max(1), size.max(1))
        .await
        .with_context(|| format!("load logs for task {id}"))?;

    if entries.items.is_empty() {
        writeln!(out, "{}", style("No log entries.").yellow())?;
    }
    for entry in &entries.items {
        writeln!(out, "{}", render::log_line(entry))?;
    }
    writeln!(
        out,
        "{}",
        style(format!(
            "page {}/{} ({} total)",
            entries.page,
            entries.total_pages().max(1),
            entries.total
        ))
        .dim()
    )?;
    ctx.record(TaskAction::Viewed(id.to_string())).await?;
    Ok(())
}
