/*
[INPUT]:  Integer state codes reported by the experiment-execution service
[OUTPUT]: Typed run/result state enums with checked conversion
[POS]:    Data layer - raw task lifecycle vocabulary
[UPDATE]: When the service adds or renumbers task states
*/

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle phase of an experiment task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum RunState {
    Ready,
    Running,
    Stopped,
    Stopping,
    End,
}

impl RunState {
    pub const fn code(self) -> i32 {
        match self {
            RunState::Ready => 0,
            RunState::Running => 1,
            RunState::Stopped => 2,
            RunState::Stopping => 3,
            RunState::End => 4,
        }
    }
}

impl TryFrom<i32> for RunState {
    type Error = UnknownStateCode;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(RunState::Ready),
            1 => Ok(RunState::Running),
            2 => Ok(RunState::Stopped),
            3 => Ok(RunState::Stopping),
            4 => Ok(RunState::End),
            other => Err(UnknownStateCode {
                kind: "run",
                code: other,
            }),
        }
    }
}

impl From<RunState> for i32 {
    fn from(state: RunState) -> Self {
        state.code()
    }
}

/// Outcome of the action a task's current phase performed.
///
/// `Null` means the phase has not reported a result yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum ResultState {
    Null,
    Success,
    Failed,
}

impl ResultState {
    pub const fn code(self) -> i32 {
        match self {
            ResultState::Null => -1,
            ResultState::Success => 0,
            ResultState::Failed => 1,
        }
    }
}

impl TryFrom<i32> for ResultState {
    type Error = UnknownStateCode;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            -1 => Ok(ResultState::Null),
            0 => Ok(ResultState::Success),
            1 => Ok(ResultState::Failed),
            other => Err(UnknownStateCode {
                kind: "result",
                code: other,
            }),
        }
    }
}

impl From<ResultState> for i32 {
    fn from(state: ResultState) -> Self {
        state.code()
    }
}

/// A state code outside the documented range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown {kind} state code {code}")]
pub struct UnknownStateCode {
    pub kind: &'static str,
    pub code: i32,
}
