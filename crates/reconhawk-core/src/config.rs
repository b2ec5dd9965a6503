//! Run configuration.
//!
//! Everything the pipeline needs to know about its surroundings lives here
//! and is handed over at construction. Nothing reads globals after startup.
//! Output styling is the reporter's concern (`ReporterConfig`).

use crate::error::{ReconError, Result};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

/// Directory under `$HOME` that collects every run's artifacts.
pub const RESULTS_DIR_NAME: &str = "recon_results";

/// Configuration for one recon run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReconConfig {
    /// Directory receiving the run's artifacts.
    pub results_root: PathBuf,

    /// `PATH`-style list used to locate the engines; `None` uses the process `PATH`.
    pub search_path: Option<OsString>,

    /// Bounded wait applied to each engine invocation; `None` waits indefinitely.
    pub stage_timeout: Option<Duration>,
}

impl ReconConfig {
    pub fn new(results_root: impl Into<PathBuf>) -> Self {
        Self {
            results_root: results_root.into(),
            search_path: None,
            stage_timeout: None,
        }
    }

    /// `$HOME/recon_results`.
    pub fn default_results_root() -> Result<PathBuf> {
        match std::env::var_os("HOME") {
            Some(home) if !home.is_empty() => Ok(PathBuf::from(home).join(RESULTS_DIR_NAME)),
            _ => Err(ReconError::Config(
                "HOME is not set; pass --results-dir".to_string(),
            )),
        }
    }

    pub fn with_search_path(mut self, search_path: impl Into<OsString>) -> Self {
        self.search_path = Some(search_path.into());
        self
    }

    /// A zero duration disables the bound.
    pub fn with_stage_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.stage_timeout = timeout.filter(|t| !t.is_zero());
        self
    }
}
