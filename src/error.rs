//! Error taxonomy for the harness.
//!
//! Every failure is fatal for the current run and is propagated to the
//! driver unchanged. A zero reference output is not an error; see
//! [`crate::compare::ZeroReferencePolicy`].

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Harness errors
#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("executable {executable} exited with {status}: {stderr}")]
    ProcessFailure {
        executable: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("failed to start {executable}: {source}")]
    Spawn {
        executable: String,
        #[source]
        source: std::io::Error,
    },

    #[error("executable {executable} printed non-integer output {output:?}")]
    MalformedOutput { executable: String, output: String },

    #[error("cannot aggregate an empty set of results")]
    EmptyAggregation,

    #[error("malformed instance: {0}")]
    MalformedInstance(String),

    #[error("invalid generator parameters: {0}")]
    InvalidParameters(String),

    #[error("test group {name} not found under {root}")]
    GroupNotFound { name: String, root: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, HarnessError>;
