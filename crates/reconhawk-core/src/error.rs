//! Error taxonomy for the recon chain.

use std::path::PathBuf;
use std::time::Duration;

/// Failures raised by the process runner itself.
///
/// A nonzero exit status is *not* a runner error; it is returned as data in
/// [`crate::runner::StageResult`] and classified by the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("stage {stage} has an empty command")]
    EmptyCommand { stage: String },

    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("stage {stage} timed out after {}s", timeout.as_secs())]
    TimedOut { stage: String, timeout: Duration },

    #[error("stage {stage} was cancelled")]
    Cancelled { stage: String },

    #[error("io error while running {stage}: {source}")]
    Io {
        stage: String,
        #[source]
        source: std::io::Error,
    },
}

/// Classified pipeline errors. Every variant is terminal for the run.
#[derive(Debug, thiserror::Error)]
pub enum ReconError {
    #[error("{0}")]
    Input(String),

    #[error("missing tools: {}", missing.join(", "))]
    Environment { missing: Vec<String> },

    #[error("subfinder error")]
    Discovery { stderr: String },

    #[error("httpx error")]
    Liveness { stderr: String },

    #[error("run interrupted by operator")]
    Cancelled,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to write report: {0}")]
    Output(#[from] std::io::Error),

    #[error("io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ReconError {
    pub fn no_target() -> Self {
        ReconError::Input("No target given.".to_string())
    }

    pub fn invalid_target() -> Self {
        ReconError::Input("Invalid target after normalization.".to_string())
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReconError::Io {
            path: path.into(),
            source,
        }
    }

    /// Captured stderr of the failing engine, when there is one.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            ReconError::Discovery { stderr } | ReconError::Liveness { stderr } => {
                let trimmed = stderr.trim();
                (!trimmed.is_empty()).then_some(trimmed)
            }
            _ => None,
        }
    }

    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            ReconError::Cancelled => 130,
            _ => 1,
        }
    }
}

/// Result type for recon operations.
pub type Result<T> = std::result::Result<T, ReconError>;
