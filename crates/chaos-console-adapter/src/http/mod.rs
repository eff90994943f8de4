/*
[INPUT]:  HTTP client configuration and API actions
[OUTPUT]: HTTP responses and typed API results
[POS]:    HTTP layer - experiment-execution API communication
[UPDATE]: When adding new endpoints or changing client behavior
*/

pub mod client;
pub mod error;
pub mod experiment;
pub mod task;

pub use error::{ConsoleError, Result};

pub use client::{ChaosClient, ClientConfig, Credentials};
