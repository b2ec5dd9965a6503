//! reconhawk core - subdomain discovery and liveness recon chain
//!
//! Provides the pipeline that:
//! - Normalizes the operator's target and checks the engines are installed
//! - Runs subfinder, then feeds its deduplicated output to httpx
//! - Keeps both stages' artifacts under a timestamped name in the results root
//! - Reports only the alive hosts

pub mod config;
pub mod error;
pub mod pipeline;
pub mod preflight;
pub mod reporter;
pub mod runner;
pub mod stage;
pub mod store;
pub mod target;
pub mod telemetry;

// Re-export key types
pub use config::ReconConfig;
pub use error::{ReconError, Result, RunnerError};
pub use pipeline::{PipelineOutcome, PipelineState, ReconPipeline};
pub use preflight::{check_tools, ToolAvailability, REQUIRED_TOOLS};
pub use reporter::{Reporter, ReporterConfig};
pub use runner::{CommandRunner, ProcessRunner, StageResult};
pub use stage::{BuiltinStage, StageConfig};
pub use store::{dedup_and_sort, read_lines, ArtifactKind, ResultStore, RunStamp};
pub use target::Target;
pub use telemetry::init_tracing;
