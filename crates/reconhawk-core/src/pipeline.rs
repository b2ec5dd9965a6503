//! Recon pipeline orchestration.
//!
//! Drives one run through `Init → Preflighted → Discovered → Probed → Reported`,
//! falling into `Aborted` on the first classified error. The two engine stages
//! deliberately fail differently:
//!
//! - discovery is strict: any nonzero exit aborts the run;
//! - liveness is lenient: a nonzero exit is accepted whenever the alive
//!   artifact was written, since httpx exits nonzero on runs that did produce
//!   results.

use crate::config::ReconConfig;
use crate::error::{ReconError, Result, RunnerError};
use crate::preflight::{check_tools, ToolAvailability, REQUIRED_TOOLS};
use crate::reporter::Reporter;
use crate::runner::{CommandRunner, ProcessRunner, StageResult};
use crate::stage::{BuiltinStage, StageConfig};
use crate::store::{dedup_and_sort, read_lines, ArtifactKind, ResultStore, RunStamp};
use crate::target::Target;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Pipeline lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Init,
    Preflighted,
    Discovered,
    Probed,
    Reported,
    Aborted,
}

/// Result of a run that reached `Reported`.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutcome {
    pub target: Target,
    pub stamp: RunStamp,

    /// Subdomains artifact (always written once discovery succeeds).
    pub subs_path: PathBuf,

    /// Alive artifact path; only written when the liveness stage ran.
    pub alive_path: PathBuf,

    /// Distinct subdomains discovered.
    pub subdomain_count: usize,

    /// Alive hosts in artifact order.
    pub alive: Vec<String>,

    /// Whether the liveness stage ran at all.
    pub probed: bool,

    /// Every state visited, in order.
    pub transitions: Vec<PipelineState>,
}

impl PipelineOutcome {
    pub fn alive_count(&self) -> usize {
        self.alive.len()
    }
}

/// Visited states for one run.
#[derive(Debug)]
struct StateTracker {
    transitions: Vec<PipelineState>,
}

impl StateTracker {
    fn new() -> Self {
        Self {
            transitions: vec![PipelineState::Init],
        }
    }

    fn current(&self) -> PipelineState {
        *self
            .transitions
            .last()
            .unwrap_or(&PipelineState::Init)
    }

    fn advance(&mut self, next: PipelineState) {
        info!(from = ?self.current(), to = ?next, "Pipeline transition");
        self.transitions.push(next);
    }
}

/// Recon pipeline orchestrator.
pub struct ReconPipeline<R: CommandRunner = ProcessRunner> {
    config: ReconConfig,
    runner: R,
}

impl ReconPipeline<ProcessRunner> {
    pub fn new(config: ReconConfig) -> Self {
        Self::with_runner(config, ProcessRunner)
    }
}

impl<R: CommandRunner> ReconPipeline<R> {
    pub fn with_runner(config: ReconConfig, runner: R) -> Self {
        Self { config, runner }
    }

    pub fn config(&self) -> &ReconConfig {
        &self.config
    }

    /// Execute the full recon chain for `target`.
    ///
    /// On abort the classified error is printed through `reporter` before it
    /// is returned, and every artifact already written stays on disk.
    pub async fn run<W: Write>(
        &self,
        target: &Target,
        stamp: RunStamp,
        reporter: &mut Reporter<W>,
        cancel: &CancellationToken,
    ) -> Result<PipelineOutcome> {
        let mut tracker = StateTracker::new();

        match self.drive(target, stamp, reporter, cancel, &mut tracker).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                tracker.advance(PipelineState::Aborted);
                warn!(target = %target, error = %err, "Recon chain aborted");
                reporter.error(&err)?;
                Err(err)
            }
        }
    }

    async fn drive<W: Write>(
        &self,
        target: &Target,
        stamp: RunStamp,
        reporter: &mut Reporter<W>,
        cancel: &CancellationToken,
        tracker: &mut StateTracker,
    ) -> Result<PipelineOutcome> {
        let store = ResultStore::new(&self.config.results_root, target.clone(), stamp.clone());
        let subs_path = store.artifact_path(ArtifactKind::Subdomains);
        let alive_path = store.artifact_path(ArtifactKind::Alive);

        info!(target = %target, stamp = %stamp, "Starting recon chain");
        reporter.run_started(target, store.root())?;

        // Init -> Preflighted
        let tools = check_tools(&REQUIRED_TOOLS, self.config.search_path.as_deref());
        let missing = tools.missing();
        if !missing.is_empty() {
            return Err(ReconError::Environment { missing });
        }
        tracker.advance(PipelineState::Preflighted);

        store.ensure_root()?;

        // Preflighted -> Discovered
        let discovery = StageConfig::discovery(
            tool_path(&tools, BuiltinStage::Discovery),
            target.as_str(),
            &subs_path,
        )
        .with_timeout(self.config.stage_timeout);

        reporter.stage_started(BuiltinStage::Discovery)?;
        let result = match self.runner.execute(&discovery, cancel).await {
            Ok(result) => result,
            Err(RunnerError::Cancelled { .. }) => return Err(ReconError::Cancelled),
            Err(e) => {
                return Err(ReconError::Discovery {
                    stderr: e.to_string(),
                })
            }
        };
        if !result.passed() {
            return Err(ReconError::Discovery {
                stderr: result.stderr,
            });
        }

        if !subs_path.exists() {
            warn!(path = %subs_path.display(), "Discovery wrote no artifact, saving empty list");
            std::fs::write(&subs_path, b"").map_err(|e| ReconError::io(&subs_path, e))?;
        }
        dedup_and_sort(&subs_path)?;
        let subdomain_count = read_lines(&subs_path)?.len();
        info!(subdomains = subdomain_count, "Discovery finished");
        tracker.advance(PipelineState::Discovered);

        if subdomain_count == 0 {
            reporter.no_subdomains(&subs_path)?;
            tracker.advance(PipelineState::Reported);
            return Ok(PipelineOutcome {
                target: target.clone(),
                stamp,
                subs_path,
                alive_path,
                subdomain_count,
                alive: Vec::new(),
                probed: false,
                transitions: tracker.transitions.clone(),
            });
        }

        // Discovered -> Probed
        let liveness = StageConfig::liveness(
            tool_path(&tools, BuiltinStage::Liveness),
            &subs_path,
            &alive_path,
        )
        .with_timeout(self.config.stage_timeout);

        reporter.stage_started(BuiltinStage::Liveness)?;
        let result = match self.runner.execute(&liveness, cancel).await {
            Ok(result) => result,
            Err(RunnerError::Cancelled { .. }) => return Err(ReconError::Cancelled),
            Err(e) => failed_result(&liveness.name, &e),
        };

        let alive_exists = alive_path.is_file();
        if !result.passed() {
            if !alive_exists {
                return Err(ReconError::Liveness {
                    stderr: result.stderr,
                });
            }
            warn!(
                exit_code = result.exit_code,
                "httpx exited nonzero but wrote its artifact, continuing"
            );
        }

        let alive = if alive_exists {
            dedup_and_sort(&alive_path)?;
            read_lines(&alive_path)?
        } else {
            Vec::new()
        };
        info!(alive = alive.len(), "Liveness finished");
        tracker.advance(PipelineState::Probed);

        // Probed -> Reported
        reporter.alive_hosts(&alive)?;
        reporter.files_saved(&subs_path, &alive_path)?;
        tracker.advance(PipelineState::Reported);

        Ok(PipelineOutcome {
            target: target.clone(),
            stamp,
            subs_path,
            alive_path,
            subdomain_count,
            alive,
            probed: true,
            transitions: tracker.transitions.clone(),
        })
    }
}

/// Preflight has already guaranteed every required tool resolves.
fn tool_path(tools: &ToolAvailability, stage: BuiltinStage) -> &Path {
    tools
        .path_of(stage.tool())
        .unwrap_or_else(|| Path::new(stage.tool()))
}

/// A runner failure on a lenient stage counts as a nonzero exit.
fn failed_result(stage: &str, err: &RunnerError) -> StageResult {
    warn!(stage, error = %err, "Engine did not complete");
    StageResult {
        stage_name: stage.to_string(),
        exit_code: -1,
        stdout: String::new(),
        stderr: err.to_string(),
        duration_ms: 0,
        success: false,
    }
}
