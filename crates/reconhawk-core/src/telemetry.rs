//! Diagnostic logging for recon runs.
//!
//! Stage spawns, state transitions and artifact rewrites are logged through
//! `tracing`. Everything goes to stderr: stdout belongs to the recon report,
//! so `reconhawk example.com > report.txt` captures only the alive hosts and
//! saved paths.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the stderr subscriber for a run.
///
/// `level` is WARN for a normal run and DEBUG under `--verbose`; `RUST_LOG`
/// overrides it. `--json` switches to one JSON object per line for log
/// shipping. A second call is a no-op.
pub fn init_tracing(json: bool, level: Level) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr).json())
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
            .ok();
    }
}
