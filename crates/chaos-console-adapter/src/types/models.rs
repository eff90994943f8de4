/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Typed Rust structs with serialization support
[POS]:    Data layer - experiments, tasks, task logs, pages
[UPDATE]: When API schema changes or new types added
*/

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::{ResultState, RunState, UnknownStateCode};
use super::status::{TaskStatus, classify};

/// One execution attempt of an experiment.
///
/// States are kept raw so unexpected server values still deserialize and
/// classify as [`TaskStatus::Unknown`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperimentTask {
    pub task_id: String,
    pub experiment_id: String,
    #[serde(default)]
    pub experiment_name: Option<String>,
    #[serde(default, deserialize_with = "serde_helpers::deserialize_state_code")]
    pub run_state: Option<i32>,
    #[serde(default, deserialize_with = "serde_helpers::deserialize_state_code")]
    pub result_state: Option<i32>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ExperimentTask {
    pub fn status(&self) -> TaskStatus {
        classify(self.run_state, self.result_state)
    }

    pub fn typed_run_state(&self) -> Option<Result<RunState, UnknownStateCode>> {
        self.run_state.map(RunState::try_from)
    }

    pub fn typed_result_state(&self) -> Option<Result<ResultState, UnknownStateCode>> {
        self.result_state.map(ResultState::try_from)
    }
}

/// Row of the experiment list, carrying the latest task's states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperimentSummary {
    pub experiment_id: String,
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub created_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default, deserialize_with = "serde_helpers::deserialize_state_code")]
    pub run_state: Option<i32>,
    #[serde(default, deserialize_with = "serde_helpers::deserialize_state_code")]
    pub result_state: Option<i32>,
}

impl ExperimentSummary {
    pub fn status(&self) -> TaskStatus {
        classify(self.run_state, self.result_state)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experiment {
    #[serde(flatten)]
    pub summary: ExperimentSummary,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub flow_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskLogEntry {
    pub id: i64,
    #[serde(default)]
    pub level: String,
    pub message: String,
    pub time: DateTime<Utc>,
    #[serde(default)]
    pub node: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskHandle {
    pub task_id: String,
}

/// One page of a paginated listing. Pages are 1-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub page: u32,
    pub size: u32,
    #[serde(default)]
    pub total: u64,
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> u64 {
        if self.size == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(self.size))
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.page) < self.total_pages()
    }
}

mod serde_helpers {
    use serde::{Deserialize, Deserializer};
    use serde_json::{Number, Value};

    /// Stand-in for codes that cannot be represented as `i32`; no state uses it.
    const OUT_OF_DOMAIN: i32 = i32::MIN;

    /// Accepts an integer, an integral float, a numeric string, or null.
    /// Anything else is kept as an out-of-domain code.
    pub fn deserialize_state_code<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::Null => None,
            Value::String(raw) if raw.trim().is_empty() => None,
            Value::Number(number) => Some(number_code(&number)),
            Value::String(raw) => Some(
                raw.trim()
                    .parse::<i64>()
                    .ok()
                    .and_then(|code| i32::try_from(code).ok())
                    .unwrap_or(OUT_OF_DOMAIN),
            ),
            _ => Some(OUT_OF_DOMAIN),
        })
    }

    fn number_code(number: &Number) -> i32 {
        if let Some(raw) = number.as_i64() {
            return i32::try_from(raw).unwrap_or(OUT_OF_DOMAIN);
        }
        match number.as_f64() {
            Some(raw)
                if raw.fract() == 0.0 && raw >= f64::from(i32::MIN) && raw <= f64::from(i32::MAX) =>
            {
                raw as i32
            }
            _ => OUT_OF_DOMAIN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_accepts_string_and_null_states() {
        let task: ExperimentTask = serde_json::from_str(
            r#"{
                "taskId": "t-1",
                "experimentId": "e-1",
                "runState": "4",
                "resultState": null
            }"#,
        )
        .unwrap();
        assert_eq!(task.run_state, Some(4));
        assert_eq!(task.result_state, None);
        assert_eq!(task.status(), TaskStatus::Unknown);
    }

    #[test]
    fn task_with_missing_states_waits() {
        let task: ExperimentTask =
            serde_json::from_str(r#"{"taskId": "t-1", "experimentId": "e-1"}"#).unwrap();
        assert_eq!(task.status(), TaskStatus::Wait);
        assert!(task.typed_run_state().is_none());
    }

    #[test]
    fn out_of_range_states_still_deserialize() {
        let task: ExperimentTask = serde_json::from_str(
            r#"{"taskId": "t-1", "experimentId": "e-1", "runState": 99, "resultState": 99}"#,
        )
        .unwrap();
        assert_eq!(task.status(), TaskStatus::Unknown);
        assert!(matches!(task.typed_run_state(), Some(Err(_))));
    }

    #[test]
    fn integral_float_state_is_accepted() {
        let task: ExperimentTask = serde_json::from_str(
            r#"{"taskId": "t-1", "experimentId": "e-1", "runState": 1.0, "resultState": 0.0}"#,
        )
        .unwrap();
        assert_eq!(task.run_state, Some(1));
        assert_eq!(task.status(), TaskStatus::StartSuccess);
    }

    #[test]
    fn unrepresentable_states_classify_as_unknown() {
        for body in [
            r#"{"taskId": "t-1", "experimentId": "e-1", "runState": "RUNNING", "resultState": 0}"#,
            r#"{"taskId": "t-1", "experimentId": "e-1", "runState": 1.5, "resultState": 0}"#,
            r#"{"taskId": "t-1", "experimentId": "e-1", "runState": 4294967296, "resultState": 0}"#,
            r#"{"taskId": "t-1", "experimentId": "e-1", "runState": 4, "resultState": 4294967296}"#,
            r#"{"taskId": "t-1", "experimentId": "e-1", "runState": true, "resultState": 0}"#,
        ] {
            let task: ExperimentTask = serde_json::from_str(body).unwrap();
            assert_eq!(task.status(), TaskStatus::Unknown, "body: {body}");
        }
    }

    #[test]
    fn summary_tolerates_unrepresentable_states() {
        let summary: ExperimentSummary = serde_json::from_str(
            r#"{"experimentId": "e-1", "name": "cpu burn", "runState": "END", "resultState": -2.0}"#,
        )
        .unwrap();
        assert_eq!(summary.status(), TaskStatus::Unknown);
    }

    #[test]
    fn experiment_flattens_summary() {
        let experiment: Experiment = serde_json::from_str(
            r#"{
                "experimentId": "e-1",
                "name": "cpu burn",
                "tags": ["host"],
                "runState": 1,
                "resultState": 0,
                "description": "burn one core",
                "flowId": "f-9"
            }"#,
        )
        .unwrap();
        assert_eq!(experiment.summary.name, "cpu burn");
        assert_eq!(experiment.summary.status(), TaskStatus::StartSuccess);
        assert_eq!(experiment.flow_id.as_deref(), Some("f-9"));
    }

    #[test]
    fn page_math() {
        let page: Page<u8> = Page {
            page: 2,
            size: 10,
            total: 25,
            items: Vec::new(),
        };
        assert_eq!(page.total_pages(), 3);
        assert!(page.has_next());

        let last = Page::<u8> { page: 3, ..page };
        assert!(!last.has_next());

        let empty = Page::<u8> {
            page: 1,
            size: 0,
            total: 0,
            items: Vec::new(),
        };
        assert_eq!(empty.total_pages(), 0);
    }
}
