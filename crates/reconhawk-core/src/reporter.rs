//! Operator-facing output.
//!
//! The reporter only formats values the pipeline hands it. It never looks at
//! the filesystem or re-derives results.

use crate::error::ReconError;
use crate::stage::BuiltinStage;
use crate::target::Target;
use colored::{Color, Colorize};
use std::io::{self, Write};
use std::path::Path;

/// Presentation settings, fixed for the lifetime of a reporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReporterConfig {
    pub color: bool,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self { color: true }
    }
}

/// Writes progress, results and classified errors to a stream.
pub struct Reporter<W: Write = io::Stdout> {
    out: W,
    config: ReporterConfig,
}

impl Reporter<io::Stdout> {
    pub fn stdout(config: ReporterConfig) -> Self {
        Self::new(io::stdout(), config)
    }
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, config: ReporterConfig) -> Self {
        Self { out, config }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn paint(&self, text: &str, color: Color) -> String {
        if self.config.color {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn line(&mut self, text: &str, color: Color) -> io::Result<()> {
        let painted = self.paint(text, color);
        writeln!(self.out, "{painted}")
    }

    /// Question shown when no target was given on the command line.
    pub fn prompt(&mut self, question: &str) -> io::Result<()> {
        let painted = self.paint(question, Color::Cyan);
        write!(self.out, "{painted}")?;
        self.out.flush()
    }

    /// Printed once, before preflight.
    pub fn run_started(&mut self, target: &Target, results_root: &Path) -> io::Result<()> {
        self.line(
            &format!(
                "[*] Recon chain started for {target} (results: {})",
                results_root.display()
            ),
            Color::Yellow,
        )
    }

    /// Printed right before an engine is launched.
    pub fn stage_started(&mut self, stage: BuiltinStage) -> io::Result<()> {
        let text = match stage {
            BuiltinStage::Discovery => "[*] subfinder → collecting subdomains (silent)…",
            BuiltinStage::Liveness => "[*] httpx → probing for alive (silent)…",
        };
        self.line(text, Color::Cyan)
    }

    pub fn no_subdomains(&mut self, subs_path: &Path) -> io::Result<()> {
        self.line(
            &format!(
                "[!] No subdomains found. Check scope or DNS. Saved empty list at {}.",
                subs_path.display()
            ),
            Color::Red,
        )
    }

    /// Alive count followed by every alive host, one per line.
    pub fn alive_hosts(&mut self, hosts: &[String]) -> io::Result<()> {
        self.line(&format!("[+] Alive hosts ({})", hosts.len()), Color::Green)?;
        for host in hosts {
            self.line(host, Color::Green)?;
        }
        Ok(())
    }

    pub fn files_saved(&mut self, subs_path: &Path, alive_path: &Path) -> io::Result<()> {
        self.line("\n[*] Files saved:", Color::Yellow)?;
        self.line(
            &format!(" • Subs [✓]>>>   {}", subs_path.display()),
            Color::Green,
        )?;
        self.line(
            &format!(" • Alive[✓]>>>  {}", alive_path.display()),
            Color::Green,
        )
    }

    /// Classified error, with captured engine stderr when there is any.
    pub fn error(&mut self, err: &ReconError) -> io::Result<()> {
        match err {
            ReconError::Input(message) => self.line(&format!("[!] {message}"), Color::Red),
            ReconError::Environment { missing } => {
                self.line(
                    &format!("[!] Missing tools: {}", missing.join(", ")),
                    Color::Red,
                )?;
                self.line(
                    "Install them first (use subfinder, httpx). Exiting.",
                    Color::Yellow,
                )
            }
            ReconError::Discovery { .. } | ReconError::Liveness { .. } => {
                let mut text = format!("[!] {err}:");
                if let Some(stderr) = err.stderr() {
                    text.push('\n');
                    text.push_str(stderr);
                }
                self.line(&text, Color::Red)
            }
            other => self.line(&format!("[!] {other}"), Color::Red),
        }
    }
}
