/*
[INPUT]:  Experiment subcommand arguments, AppContext
[OUTPUT]: Experiment listings, details, and newly started tasks
[POS]:    Command layer - experiments
[UPDATE]: When experiment endpoints or list filters change
*/

use anyhow::{Context, Result};
use chaos_console_adapter::{ExperimentQuery, LookupError, StatusFilter, parse_filter_value};
use console::style;
use std::io::Write;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::ListArgs;
use crate::action::{ExperimentAction, TaskAction};
use crate::context::AppContext;
use crate::render;
use crate::session::SessionState;

/// Filter code for this listing: the flag wins, then the remembered code, unless `--all`
fn requested_filter_code(args: &ListArgs, session: &SessionState) -> Option<i32> {
    if args.all {
        return None;
    }
    args.status.or(session.filter_code)
}

/// Expand a filter code. The caller lists unfiltered when this fails.
fn resolve_filter(code: i32) -> Result<StatusFilter, LookupError> {
    parse_filter_value(code)
        .inspect_err(|err| warn!(code, error = %err, "ignoring status filter"))
}

pub async fn list(ctx: &mut AppContext, args: &ListArgs, out: &mut dyn Write) -> Result<()> {
    let mut query = ExperimentQuery {
        page: args.page.max(1),
        size: args.size.max(1),
        name: args.name.clone(),
        ..ExperimentQuery::default()
    };

    match requested_filter_code(args, &ctx.session) {
        Some(code) => match resolve_filter(code) {
            Ok(filter) => {
                query = query.with_filter(filter);
                writeln!(out, "filter: {}", render::badge(filter.status))?;
                ctx.record(ExperimentAction::FilterSelected(code)).await?;
            }
            Err(err) => {
                writeln!(out, "{}", render::notice(format!("{err}; listing all statuses")))?;
                ctx.record(ExperimentAction::FilterCleared).await?;
            }
        },
        None if args.all => ctx.record(ExperimentAction::FilterCleared).await?,
        None => {}
    }

    let page = ctx
        .client
        .query_experiments(&query)
        .await
        .context("list experiments")?;
    info!(page = page.page, total = page.total, "experiments listed");

    write!(out, "{}", render::experiment_page(&page))?;
    ctx.record(ExperimentAction::Listed { total: page.total }).await?;
    Ok(())
}

pub async fn show(ctx: &mut AppContext, id: &str, out: &mut dyn Write) -> Result<()> {
    let experiment = ctx
        .client
        .query_experiment(id)
        .await
        .with_context(|| format!("load experiment {id}"))?;

    write!(out, "{}", render::experiment_detail(&experiment))?;
    if let Some(task_id) = experiment.summary.task_id.clone() {
        ctx.record(TaskAction::Viewed(task_id)).await?;
    }
    Ok(())
}

pub async fn run(
    ctx: &mut AppContext,
    id: &str,
    watch: bool,
    shutdown: CancellationToken,
    out: &mut dyn Write,
) -> Result<()> {
    let handle = ctx
        .client
        .run_experiment(id)
        .await
        .with_context(|| format!("run experiment {id}"))?;
    info!(experiment_id = %id, task_id = %handle.task_id, "experiment started");

    writeln!(
        out,
        "{} task {}",
        style("started").green(),
        style(&handle.task_id).bold()
    )?;
    ctx.record(TaskAction::Viewed(handle.task_id.clone())).await?;

    if watch {
        super::task::watch(ctx, &handle.task_id, false, shutdown, out).await?;
    }
    Ok(())
}
