/*
[INPUT]:  Experiments, tasks, log entries and poll updates
[OUTPUT]: Styled terminal text
[POS]:    Presentation layer - console output
[UPDATE]: When changing what commands print
*/

use chaos_console_adapter::{
    BadgeColor, Experiment, ExperimentSummary, ExperimentTask, Page, PollUpdate, TaskLogEntry,
    TaskStatus,
};
use chrono::{DateTime, Utc};
use console::style;
use std::fmt::Write as _;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn badge(status: TaskStatus) -> String {
    let badge = status.badge();
    let text = format!("[{}]", badge.label);
    let styled = match badge.color {
        BadgeColor::Gray => style(text).dim(),
        BadgeColor::Blue => style(text).blue(),
        BadgeColor::Green => style(text).green(),
        BadgeColor::Red => style(text).red(),
        BadgeColor::Yellow => style(text).yellow(),
    };
    styled.to_string()
}

fn time(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|t| t.format(TIME_FORMAT).to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub fn experiment_page(page: &Page<ExperimentSummary>) -> String {
    let mut out = String::new();
    if page.items.is_empty() {
        let _ = writeln!(out, "{}", style("No experiments found.").yellow());
        return out;
    }

    for item in &page.items {
        let _ = writeln!(
            out,
            "{:<24} {:<32} {} {}",
            item.experiment_id,
            item.name,
            badge(item.status()),
            item.task_id.as_deref().unwrap_or("-"),
        );
    }
    let _ = writeln!(
        out,
        "{}",
        style(format!(
            "page {}/{} ({} total)",
            page.page,
            page.total_pages().max(1),
            page.total
        ))
        .dim()
    );
    out
}

pub fn experiment_detail(experiment: &Experiment) -> String {
    let summary = &experiment.summary;
    let mut out = String::new();
    let _ = writeln!(out, "{}", style(&summary.name).bold());
    let _ = writeln!(out, "  id:          {}", summary.experiment_id);
    let _ = writeln!(out, "  status:      {}", badge(summary.status()));
    if let Some(task_id) = &summary.task_id {
        let _ = writeln!(out, "  latest task: {task_id}");
    }
    if !summary.tags.is_empty() {
        let _ = writeln!(out, "  tags:        {}", summary.tags.join(", "));
    }
    if let Some(description) = &experiment.description {
        let _ = writeln!(out, "  description: {description}");
    }
    let _ = writeln!(out, "  created:     {}", time(summary.created_time));
    out
}

pub fn task_detail(task: &ExperimentTask) -> String {
    let status = task.status();
    let actions = status.actions();
    let mut out = String::new();
    let _ = writeln!(out, "{} {}", style(&task.task_id).bold(), badge(status));
    let _ = writeln!(out, "  experiment: {}", task.experiment_name.as_deref().unwrap_or(&task.experiment_id));
    let _ = writeln!(out, "  started:    {}", time(task.start_time));
    let _ = writeln!(out, "  ended:      {}", time(task.end_time));
    if let Some(message) = &task.message {
        let _ = writeln!(out, "  message:    {message}");
    }

    let mut allowed = Vec::new();
    if actions.can_end {
        allowed.push("end");
    }
    if actions.can_retry {
        allowed.push("retry");
    }
    if !allowed.is_empty() {
        let _ = writeln!(out, "  actions:    {}", allowed.join(", "));
    }
    out
}

pub fn log_line(entry: &TaskLogEntry) -> String {
    let level = match entry.level.to_ascii_uppercase().as_str() {
        "ERROR" => style(format!("{:<5}", "ERROR")).red(),
        "WARN" | "WARNING" => style(format!("{:<5}", "WARN")).yellow(),
        other => style(format!("{other:<5}")).dim(),
    };
    match &entry.node {
        Some(node) => format!(
            "{} {} [{}] {}",
            entry.time.format(TIME_FORMAT),
            level,
            node,
            entry.message
        ),
        None => format!("{} {} {}", entry.time.format(TIME_FORMAT), level, entry.message),
    }
}

/// One line per poll update worth showing; `Pending` prints nothing
pub fn poll_update(update: &PollUpdate) -> Option<String> {
    match update {
        PollUpdate::Pending => None,
        PollUpdate::Progress { status, .. } => Some(format!("status {}", badge(*status))),
        PollUpdate::Retrying {
            consecutive_errors,
            backoff,
            error,
        } => Some(
            style(format!(
                "refresh failed ({consecutive_errors}), retrying in {}s: {error}",
                backoff.as_secs()
            ))
            .yellow()
            .to_string(),
        ),
        PollUpdate::Finished { status, .. } => Some(format!("finished {}", badge(*status))),
        PollUpdate::Exhausted { polls, last_status } => Some(format!(
            "stopped watching after {polls} polls, last status {}",
            last_status.map(badge).unwrap_or_else(|| "-".to_string())
        )),
        PollUpdate::Failed { error } => Some(style(format!("watch failed: {error}")).red().to_string()),
        PollUpdate::Cancelled => Some(style("watch cancelled").dim().to_string()),
    }
}

/// User-facing notice, e.g. an ignored filter
pub fn notice(message: impl std::fmt::Display) -> String {
    style(format!("! {message}")).yellow().to_string()
}
