/*
[INPUT]:  Public API exports for the chaos console crate
[OUTPUT]: Module declarations and public re-exports
[POS]:    Crate root - library entry point
[UPDATE]: When adding new modules or public exports
*/

pub mod action;
pub mod commands;
pub mod config;
pub mod context;
pub mod logging;
pub mod render;
pub mod session;

// Re-export main types for convenience
pub use action::{Action, ExperimentAction, TaskAction};
pub use config::ConsoleConfig;
pub use context::AppContext;
pub use session::{SessionState, SessionStore};
