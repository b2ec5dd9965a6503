//! Recon stage definitions and their fixed engine command lines.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Concurrent probes handed to the liveness engine.
pub const LIVENESS_THREADS: u32 = 50;

/// Per-probe timeout handed to the liveness engine, in seconds.
pub const LIVENESS_PROBE_TIMEOUT_SECS: u32 = 6;

/// Builtin recon stages.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinStage {
    /// subfinder -silent -d <target> -o <subs>
    Discovery,

    /// httpx -silent -threads 50 -timeout 6 -follow-redirects -no-color -o <alive> < <subs>
    Liveness,
}

impl BuiltinStage {
    /// Get the stage name as a string.
    pub fn name(&self) -> &'static str {
        match self {
            BuiltinStage::Discovery => "discovery",
            BuiltinStage::Liveness => "liveness",
        }
    }

    /// Executable name of the engine behind this stage.
    pub fn tool(&self) -> &'static str {
        match self {
            BuiltinStage::Discovery => "subfinder",
            BuiltinStage::Liveness => "httpx",
        }
    }
}

/// Configuration for a single engine invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageConfig {
    /// Human-readable stage name.
    pub name: String,

    /// Command to execute (first element is executable). Never passed through a shell.
    pub command: Vec<String>,

    /// File streamed to the child's stdin, if any.
    pub stdin: Option<PathBuf>,

    /// Upper bound on the child's runtime. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl StageConfig {
    /// Discovery invocation writing straight into the subdomains artifact.
    pub fn discovery(program: &Path, target: &str, output: &Path) -> Self {
        Self {
            name: BuiltinStage::Discovery.name().to_string(),
            command: vec![
                program.to_string_lossy().into_owned(),
                "-silent".to_string(),
                "-d".to_string(),
                target.to_string(),
                "-o".to_string(),
                output.to_string_lossy().into_owned(),
            ],
            stdin: None,
            timeout: None,
        }
    }

    /// Liveness invocation fed from the subdomains artifact.
    pub fn liveness(program: &Path, input: &Path, output: &Path) -> Self {
        Self {
            name: BuiltinStage::Liveness.name().to_string(),
            command: vec![
                program.to_string_lossy().into_owned(),
                "-silent".to_string(),
                "-threads".to_string(),
                LIVENESS_THREADS.to_string(),
                "-timeout".to_string(),
                LIVENESS_PROBE_TIMEOUT_SECS.to_string(),
                "-follow-redirects".to_string(),
                "-no-color".to_string(),
                "-o".to_string(),
                output.to_string_lossy().into_owned(),
            ],
            stdin: Some(input.to_path_buf()),
            timeout: None,
        }
    }

    /// Create a custom stage configuration.
    pub fn custom(name: String, command: Vec<String>) -> Self {
        Self {
            name,
            command,
            stdin: None,
            timeout: None,
        }
    }

    /// Bound the stage's runtime.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Feed `path` to the child's stdin.
    pub fn with_stdin(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdin = Some(path.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_stage_names_and_tools() {
        assert_eq!(BuiltinStage::Discovery.name(), "discovery");
        assert_eq!(BuiltinStage::Liveness.name(), "liveness");
        assert_eq!(BuiltinStage::Discovery.tool(), "subfinder");
        assert_eq!(BuiltinStage::Liveness.tool(), "httpx");
    }

    #[test]
    fn test_discovery_command_keeps_target_as_one_argument() {
        let config = StageConfig::discovery(
            Path::new("/usr/bin/subfinder"),
            "example.com; rm -rf ~",
            Path::new("/tmp/out_subs.txt"),
        );
        assert_eq!(
            config.command,
            vec![
                "/usr/bin/subfinder",
                "-silent",
                "-d",
                "example.com; rm -rf ~",
                "-o",
                "/tmp/out_subs.txt"
            ]
        );
        assert!(config.stdin.is_none());
        assert!(config.timeout.is_none());
    }

    #[test]
    fn test_liveness_command_carries_fixed_policy() {
        let config = StageConfig::liveness(
            Path::new("httpx"),
            Path::new("/tmp/subs.txt"),
            Path::new("/tmp/alive.txt"),
        );
        assert_eq!(config.name, "liveness");
        assert_eq!(config.command[0], "httpx");
        let joined = config.command.join(" ");
        assert!(joined.contains("-threads 50"));
        assert!(joined.contains("-timeout 6"));
        assert!(joined.contains("-follow-redirects"));
        assert!(joined.contains("-no-color"));
        assert!(joined.ends_with("-o /tmp/alive.txt"));
        assert_eq!(config.stdin.as_deref(), Some(Path::new("/tmp/subs.txt")));
    }

    #[test]
    fn test_with_timeout() {
        let config = StageConfig::custom("echo".to_string(), vec!["echo".to_string()])
            .with_timeout(Some(Duration::from_secs(5)));
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
    }
}
