//! Result store: per-run artifact paths, in-place dedup/sort, tolerant reads.

use crate::error::{ReconError, Result};
use crate::target::Target;
use chrono::{DateTime, Local, TimeZone};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Wall-clock identifier namespacing one run's artifacts (`YYYYMMDD_HHMMSS`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RunStamp(String);

impl RunStamp {
    pub const FORMAT: &'static str = "%Y%m%d_%H%M%S";

    pub fn now() -> Self {
        Self::at(&Local::now())
    }

    pub fn at<Tz: TimeZone>(time: &DateTime<Tz>) -> Self
    where
        Tz::Offset: fmt::Display,
    {
        RunStamp(time.format(Self::FORMAT).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kinds of artifact a run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Subdomains,
    Alive,
}

impl ArtifactKind {
    fn suffix(&self) -> &'static str {
        match self {
            ArtifactKind::Subdomains => "subs",
            ArtifactKind::Alive => "alive",
        }
    }
}

/// Owns the artifact layout for a single run.
#[derive(Debug, Clone)]
pub struct ResultStore {
    root: PathBuf,
    target: Target,
    stamp: RunStamp,
}

impl ResultStore {
    pub fn new(root: impl Into<PathBuf>, target: Target, stamp: RunStamp) -> Self {
        Self {
            root: root.into(),
            target,
            stamp,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn stamp(&self) -> &RunStamp {
        &self.stamp
    }

    /// `<root>/<target>_<stamp>_<kind>.txt`
    pub fn artifact_path(&self, kind: ArtifactKind) -> PathBuf {
        self.root
            .join(format!("{}_{}_{}.txt", self.target, self.stamp, kind.suffix()))
    }

    /// Create the results root if it does not exist yet.
    pub fn ensure_root(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root).map_err(|e| ReconError::io(&self.root, e))
    }
}

/// Rewrite `path` so it holds each distinct line once, in byte order.
///
/// Lines are trimmed of surrounding ASCII whitespace (including a CRLF `\r`)
/// before comparison, blank lines are dropped, and the rest are compared
/// byte-for-byte (the `LC_ALL=C sort -u` order). Returns the number of lines
/// written; every line is newline-terminated.
pub fn dedup_and_sort(path: &Path) -> Result<usize> {
    let content = std::fs::read(path).map_err(|e| ReconError::io(path, e))?;

    let lines: BTreeSet<&[u8]> = content
        .split(|&b| b == b'\n')
        .map(<[u8]>::trim_ascii)
        .filter(|line| !line.is_empty())
        .collect();

    let mut out = Vec::with_capacity(content.len());
    for line in &lines {
        out.extend_from_slice(line);
        out.push(b'\n');
    }

    std::fs::write(path, &out).map_err(|e| ReconError::io(path, e))?;
    debug!(path = %path.display(), lines = lines.len(), "Rewrote artifact");
    Ok(lines.len())
}

/// Distinct trimmed, non-empty lines of `path`, in byte order.
///
/// Bytes that are not valid UTF-8 are dropped rather than failing the read.
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read(path).map_err(|e| ReconError::io(path, e))?;
    let text = decode_lossy(&content);

    let lines: BTreeSet<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    Ok(lines.into_iter().map(str::to_string).collect())
}

fn decode_lossy(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::tempdir;

    fn store(root: &Path) -> ResultStore {
        ResultStore::new(
            root,
            Target::parse("example.com").unwrap(),
            RunStamp("20240102_030405".to_string()),
        )
    }

    #[test]
    fn test_run_stamp_format() {
        let time = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(RunStamp::at(&time).as_str(), "20240102_030405");
    }

    #[test]
    fn test_artifact_paths() {
        let store = store(Path::new("/home/op/recon_results"));
        assert_eq!(
            store.artifact_path(ArtifactKind::Subdomains),
            PathBuf::from("/home/op/recon_results/example.com_20240102_030405_subs.txt")
        );
        assert_eq!(
            store.artifact_path(ArtifactKind::Alive),
            PathBuf::from("/home/op/recon_results/example.com_20240102_030405_alive.txt")
        );
    }

    #[test]
    fn test_ensure_root_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = store(&dir.path().join("nested").join("recon_results"));
        store.ensure_root().unwrap();
        store.ensure_root().unwrap();
        assert!(store.root().is_dir());
    }

    #[test]
    fn test_dedup_and_sort() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("subs.txt");
        std::fs::write(&path, "b.example.com\na.example.com\n\nb.example.com\nB.example.com").unwrap();

        let count = dedup_and_sort(&path).unwrap();
        assert_eq!(count, 3);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "B.example.com\na.example.com\nb.example.com\n"
        );
    }

    #[test]
    fn test_dedup_and_sort_trims_crlf_and_padding() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("alive.txt");
        std::fs::write(
            &path,
            "https://a.example.com\r\nhttps://a.example.com\n https://z.example.com\nhttps://b.example.com \n",
        )
        .unwrap();

        assert_eq!(dedup_and_sort(&path).unwrap(), 3);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "https://a.example.com\nhttps://b.example.com\nhttps://z.example.com\n"
        );
        assert_eq!(
            read_lines(&path).unwrap(),
            vec![
                "https://a.example.com",
                "https://b.example.com",
                "https://z.example.com"
            ]
        );
    }

    #[test]
    fn test_dedup_and_sort_is_idempotent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("alive.txt");
        std::fs::write(&path, "https://z.io\nhttps://a.io\nhttps://z.io\n").unwrap();

        dedup_and_sort(&path).unwrap();
        let once = std::fs::read(&path).unwrap();
        dedup_and_sort(&path).unwrap();
        let twice = std::fs::read(&path).unwrap();
        assert_eq!(once, twice);
        assert_eq!(once, b"https://a.io\nhttps://z.io\n");
    }

    #[test]
    fn test_dedup_and_sort_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("alive.txt");
        std::fs::write(&path, "").unwrap();

        assert_eq!(dedup_and_sort(&path).unwrap(), 0);
        assert!(std::fs::read(&path).unwrap().is_empty());
    }

    #[test]
    fn test_read_lines_trims_and_skips_blanks() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("subs.txt");
        std::fs::write(&path, "  a.example.com \n\n\t\nb.example.com\n").unwrap();

        assert_eq!(
            read_lines(&path).unwrap(),
            vec!["a.example.com", "b.example.com"]
        );
    }

    #[test]
    fn test_read_lines_dedups_and_sorts_untouched_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("alive.txt");
        std::fs::write(&path, "https://b.io\r\n  https://a.io\nhttps://b.io\n").unwrap();

        assert_eq!(read_lines(&path).unwrap(), vec!["https://a.io", "https://b.io"]);
    }

    #[test]
    fn test_read_lines_drops_invalid_bytes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("subs.txt");
        std::fs::write(&path, b"a.exa\xffmple.com\n\xfe\nb.example.com\n").unwrap();

        assert_eq!(
            read_lines(&path).unwrap(),
            vec!["a.example.com", "b.example.com"]
        );
    }

    #[test]
    fn test_read_lines_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = read_lines(&dir.path().join("absent.txt")).unwrap_err();
        assert!(matches!(err, ReconError::Io { .. }));
    }
}
