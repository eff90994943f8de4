/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public chaos console adapter crate surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod http;
pub mod poll;
pub mod types;

// Re-export commonly used types from http
pub use http::{ChaosClient, ClientConfig, ConsoleError, Credentials, Result};

// Re-export commonly used types from poll
pub use poll::{LogTail, PollConfig, PollUpdate, PollerHandle, TaskPoller, TaskSource};

// Re-export all types
pub use types::*;
