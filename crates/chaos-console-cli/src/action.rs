/*
[INPUT]:  Outcomes of console commands
[OUTPUT]: Typed actions folded into session state
[POS]:    Application layer - action definitions
[UPDATE]: When commands produce new kinds of state changes
*/

/// Experiment list changes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExperimentAction {
    /// A status filter code was chosen for the list
    FilterSelected(i32),

    /// The status filter was dropped
    FilterCleared,

    /// A page of experiments was shown
    Listed { total: u64 },
}

/// Task lifecycle changes initiated from the console
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskAction {
    Viewed(String),

    /// A watch loop started on this task
    WatchStarted(String),

    WatchStopped,

    /// An end request was accepted for this task
    Ended(String),

    /// A retry replaced `previous` with the new task `next`
    Retried { previous: String, next: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Experiment(ExperimentAction),
    Task(TaskAction),
}

impl From<ExperimentAction> for Action {
    fn from(action: ExperimentAction) -> Self {
        Self::Experiment(action)
    }
}

impl From<TaskAction> for Action {
    fn from(action: TaskAction) -> Self {
        Self::Task(action)
    }
}
