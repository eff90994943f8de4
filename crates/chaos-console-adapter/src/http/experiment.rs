/*
[INPUT]:  Experiment queries and identifiers
[OUTPUT]: Experiment listings, details, and newly started task handles
[POS]:    HTTP layer - experiment endpoints
[UPDATE]: When adding new experiment endpoints or changing query parameters
*/

use crate::http::{ChaosClient, Result};
use crate::types::{Experiment, ExperimentIdRequest, ExperimentQuery, ExperimentSummary, Page, TaskHandle};

impl ChaosClient {
    /// List experiments, optionally filtered by the latest task's state pair
    ///
    /// POST /api/QueryExperimentList
    pub async fn query_experiments(&self, query: &ExperimentQuery) -> Result<Page<ExperimentSummary>> {
        self.call("QueryExperimentList", query).await
    }

    /// Query a single experiment
    ///
    /// POST /api/QueryExperiment
    pub async fn query_experiment(&self, experiment_id: &str) -> Result<Experiment> {
        let body = ExperimentIdRequest {
            experiment_id: experiment_id.to_string(),
        };
        self.call("QueryExperiment", &body).await
    }

    /// Start a new task for an experiment
    ///
    /// POST /api/RunExperiment
    pub async fn run_experiment(&self, experiment_id: &str) -> Result<TaskHandle> {
        let body = ExperimentIdRequest {
            experiment_id: experiment_id.to_string(),
        };
        self.call_once("RunExperiment", &body).await
    }
}
