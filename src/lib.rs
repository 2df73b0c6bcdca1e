pub mod client;
pub mod config;
pub mod email;
pub mod error;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod remover;
pub mod report;
pub mod resolver;
pub mod team;
pub mod verifier;

// Re-export commonly used types for easier access
pub use client::{HttpPlatformClient, PlatformClient};
pub use config::AppConfig;
pub use email::EmailSet;
pub use error::{AppError, AppResult};
pub use pipeline::{run, RemovalRequest};
pub use report::{ExitStatus, OutcomeReporter, RunResult};
