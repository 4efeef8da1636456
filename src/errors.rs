use std::time::Duration;

use thiserror::Error;

/// Crate error type, with exit codes for the fatal startup paths
#[derive(Debug, Error)]
pub enum RelayError {
    /// Missing or invalid configuration (exit code 2)
    #[error("configuration error: {0}")]
    Config(String),

    /// A named login step exhausted its fallback chain (exit code 3)
    #[error("login step '{step}' failed: {source}")]
    Step {
        step: &'static str,
        #[source]
        source: Box<RelayError>,
    },

    /// The WebDriver rejected or failed a command (exit code 4)
    #[error("WebDriver command failed: {0}")]
    WebDriver(#[from] fantoccini::error::CmdError),

    /// A wait predicate never held (exit code 5)
    #[error("wait timed out after {0:?}")]
    Timeout(Duration),

    /// Every strategy in a locator chain was exhausted (exit code 2)
    #[error("no locator strategy matched (attempted: {})", .attempted.join(", "))]
    NotFound { attempted: Vec<String> },

    /// A script argument could not be serialized (exit code 1)
    #[error("failed to serialize script argument: {0}")]
    ScriptArg(#[from] serde_json::Error),
}

impl RelayError {
    pub fn step(step: &'static str, source: RelayError) -> Self {
        RelayError::Step {
            step,
            source: Box::new(source),
        }
    }

    /// Get the process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            RelayError::Config(_) => 2,
            RelayError::Step { .. } => 3,
            RelayError::WebDriver(_) => 4,
            RelayError::Timeout(_) => 5,
            RelayError::NotFound { .. } => 2,
            RelayError::ScriptArg(_) => 1,
        }
    }
}

#[cfg(test)]
#[path = "errors_test.rs"]
mod errors_test;
