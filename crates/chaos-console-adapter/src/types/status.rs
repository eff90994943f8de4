/*
[INPUT]:  Raw (run_state, result_state) pairs and user-selected filter codes
[OUTPUT]: Canonical task status, action gating, badges, query filters
[POS]:    Data layer - task status classification (pure, no I/O)
[UPDATE]: When a canonical status or filter option is added
*/

use serde::{Serialize, Serializer};
use std::fmt;
use thiserror::Error;

use super::enums::{ResultState, RunState};

/// Display-level status derived from a task's run and result state.
///
/// Recomputed on every read; see [`classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    Wait,
    StartRunning,
    StartSuccess,
    StartFailed,
    EndRunning,
    EndSuccess,
    EndFailed,
    Unknown,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 8] = [
        TaskStatus::Wait,
        TaskStatus::StartRunning,
        TaskStatus::StartSuccess,
        TaskStatus::StartFailed,
        TaskStatus::EndRunning,
        TaskStatus::EndSuccess,
        TaskStatus::EndFailed,
        TaskStatus::Unknown,
    ];

    /// Filter code used by list queries.
    pub const fn code(self) -> i32 {
        match self {
            TaskStatus::Wait => -1,
            TaskStatus::StartRunning => 1,
            TaskStatus::StartSuccess => 2,
            TaskStatus::StartFailed => 3,
            TaskStatus::EndRunning => 4,
            TaskStatus::EndSuccess => 5,
            TaskStatus::EndFailed => 6,
            TaskStatus::Unknown => 7,
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            TaskStatus::Wait => "待启动",
            TaskStatus::StartRunning => "启动中",
            TaskStatus::StartSuccess => "启动成功",
            TaskStatus::StartFailed => "启动失败",
            TaskStatus::EndRunning => "终止中",
            TaskStatus::EndSuccess => "终止成功",
            TaskStatus::EndFailed => "终止失败",
            TaskStatus::Unknown => "未知",
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.code() == code)
    }

    /// Polling can stop once a task reaches one of these.
    pub const fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::EndSuccess | TaskStatus::EndFailed)
    }

    pub const fn actions(self) -> TaskActions {
        TaskActions {
            can_view: !matches!(self, TaskStatus::Wait),
            can_end: matches!(
                self,
                TaskStatus::StartRunning | TaskStatus::StartSuccess | TaskStatus::StartFailed
            ),
            can_retry: matches!(self, TaskStatus::StartFailed | TaskStatus::EndFailed),
        }
    }

    pub const fn badge(self) -> StatusBadge {
        let color = match self {
            TaskStatus::Wait => BadgeColor::Gray,
            TaskStatus::StartRunning | TaskStatus::EndRunning => BadgeColor::Blue,
            TaskStatus::StartSuccess | TaskStatus::EndSuccess => BadgeColor::Green,
            TaskStatus::StartFailed | TaskStatus::EndFailed => BadgeColor::Red,
            TaskStatus::Unknown => BadgeColor::Yellow,
        };
        StatusBadge {
            label: self.description(),
            color,
        }
    }

    pub const fn classified(self) -> ClassifiedStatus {
        ClassifiedStatus {
            code: self.code(),
            description: self.description(),
        }
    }

    /// The concrete state pair a filter on this status queries for.
    const fn reverse_pair(self) -> (RunState, ResultState) {
        match self {
            TaskStatus::Wait => (RunState::Ready, ResultState::Null),
            TaskStatus::StartRunning => (RunState::Running, ResultState::Null),
            TaskStatus::StartSuccess => (RunState::Running, ResultState::Success),
            TaskStatus::StartFailed => (RunState::Running, ResultState::Failed),
            TaskStatus::EndRunning => (RunState::Stopping, ResultState::Null),
            TaskStatus::EndSuccess => (RunState::End, ResultState::Success),
            TaskStatus::EndFailed => (RunState::End, ResultState::Failed),
            TaskStatus::Unknown => (RunState::End, ResultState::Null),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

impl Serialize for TaskStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.classified().serialize(serializer)
    }
}

/// Serializable `{code, description}` view of a [`TaskStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClassifiedStatus {
    pub code: i32,
    pub description: &'static str,
}

/// Which task operations a status permits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TaskActions {
    pub can_view: bool,
    pub can_end: bool,
    pub can_retry: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeColor {
    Gray,
    Blue,
    Green,
    Red,
    Yellow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusBadge {
    pub label: &'static str,
    pub color: BadgeColor,
}

/// Classifies a raw state pair.
///
/// Total over all inputs: codes outside the documented range fall through to
/// [`TaskStatus::Unknown`]. `result_state` is ignored while the task is READY.
pub fn classify(run_state: Option<i32>, result_state: Option<i32>) -> TaskStatus {
    let Some(run) = run_state else {
        return TaskStatus::Wait;
    };
    let result = result_state.and_then(|code| ResultState::try_from(code).ok());

    match (RunState::try_from(run), result) {
        (Ok(RunState::Ready), _) => TaskStatus::Wait,
        (Ok(RunState::Running), Some(ResultState::Success)) => TaskStatus::StartSuccess,
        (Ok(RunState::Running), Some(ResultState::Failed)) => TaskStatus::StartFailed,
        (Ok(RunState::Running), _) => TaskStatus::StartRunning,
        (Ok(RunState::Stopping), _) => TaskStatus::EndRunning,
        (Ok(RunState::End), Some(ResultState::Success)) => TaskStatus::EndSuccess,
        (Ok(RunState::End), Some(ResultState::Failed)) => TaskStatus::EndFailed,
        (Ok(RunState::End), _) => TaskStatus::Unknown,
        (Ok(RunState::Stopped), _) | (Err(_), _) => TaskStatus::Unknown,
    }
}

/// Typed variant of [`classify`].
pub fn classify_states(run_state: RunState, result_state: ResultState) -> TaskStatus {
    classify(Some(run_state.code()), Some(result_state.code()))
}

/// A filter option expanded into the state pair the listing API queries by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusFilter {
    pub status: TaskStatus,
    pub run_state: RunState,
    pub result_state: ResultState,
}

impl StatusFilter {
    pub fn classify(&self) -> TaskStatus {
        classify_states(self.run_state, self.result_state)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("no task status is registered for filter code {0}")]
    UnknownFilterCode(i32),
}

/// Expands a user-selected filter code into its state pair.
///
/// `-1` selects tasks that have not started.
pub fn parse_filter_value(code: i32) -> Result<StatusFilter, LookupError> {
    let status = TaskStatus::from_code(code).ok_or(LookupError::UnknownFilterCode(code))?;
    let (run_state, result_state) = status.reverse_pair();
    Ok(StatusFilter {
        status,
        run_state,
        result_state,
    })
}
