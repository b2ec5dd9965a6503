//! Environment preflight: are the external engines installed?
//!
//! Resolution walks the search path the same way a shell would, but never
//! runs the tools. Anything found is recorded with its absolute path so the
//! pipeline later spawns exactly the binary that was checked.

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Engines the recon chain cannot run without, in the order they are reported.
pub const REQUIRED_TOOLS: [&str; 2] = ["subfinder", "httpx"];

/// Result of resolving every required tool.
#[derive(Debug, Clone, Default)]
pub struct ToolAvailability {
    order: Vec<String>,
    resolved: BTreeMap<String, Option<PathBuf>>,
}

impl ToolAvailability {
    /// Whether `name` was found.
    pub fn is_available(&self, name: &str) -> bool {
        matches!(self.resolved.get(name), Some(Some(_)))
    }

    /// Absolute path of a resolved tool.
    pub fn path_of(&self, name: &str) -> Option<&Path> {
        self.resolved.get(name).and_then(|p| p.as_deref())
    }

    /// Names that could not be resolved, in declaration order.
    pub fn missing(&self) -> Vec<String> {
        self.order
            .iter()
            .filter(|name| !self.is_available(name))
            .cloned()
            .collect()
    }

    pub fn all_available(&self) -> bool {
        self.missing().is_empty()
    }
}

/// Check each tool against `search_path` (a `PATH`-style list).
///
/// When `search_path` is `None`, the process `PATH` is used.
pub fn check_tools(tools: &[&str], search_path: Option<&OsStr>) -> ToolAvailability {
    let env_path: Option<OsString>;
    let search_path = match search_path {
        Some(p) => Some(p),
        None => {
            env_path = std::env::var_os("PATH");
            env_path.as_deref()
        }
    };

    let mut availability = ToolAvailability::default();
    for tool in tools {
        let found = search_path.and_then(|p| resolve(tool, p));
        debug!(tool, found = ?found, "Resolved tool");
        availability.order.push(tool.to_string());
        availability.resolved.insert(tool.to_string(), found);
    }
    availability
}

/// Find `name` on a `PATH`-style list. Names containing a separator are
/// taken as paths and only checked for existence.
pub fn resolve(name: &str, search_path: &OsStr) -> Option<PathBuf> {
    if name.is_empty() {
        return None;
    }

    let as_path = Path::new(name);
    if as_path.components().count() > 1 {
        return as_path.is_file().then(|| as_path.to_path_buf());
    }

    std::env::split_paths(search_path)
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, b"#!/bin/sh\n").unwrap();
        path
    }

    #[test]
    fn test_all_tools_found() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "subfinder");
        touch(dir.path(), "httpx");

        let availability = check_tools(&REQUIRED_TOOLS, Some(dir.path().as_os_str()));
        assert!(availability.all_available());
        assert_eq!(
            availability.path_of("httpx"),
            Some(dir.path().join("httpx").as_path())
        );
    }

    #[test]
    fn test_missing_tools_reported_in_order() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "httpx");

        let availability = check_tools(&REQUIRED_TOOLS, Some(dir.path().as_os_str()));
        assert!(!availability.all_available());
        assert_eq!(availability.missing(), vec!["subfinder".to_string()]);

        let empty = tempdir().unwrap();
        let availability = check_tools(&REQUIRED_TOOLS, Some(empty.path().as_os_str()));
        assert_eq!(availability.missing(), vec!["subfinder", "httpx"]);
    }

    #[test]
    fn test_first_matching_directory_wins() {
        let first = tempdir().unwrap();
        let second = tempdir().unwrap();
        touch(second.path(), "subfinder");
        let expected = touch(first.path(), "subfinder");

        let joined = std::env::join_paths([first.path(), second.path()]).unwrap();
        assert_eq!(resolve("subfinder", &joined), Some(expected));
    }

    #[test]
    fn test_directories_do_not_count_as_tools() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("httpx")).unwrap();
        assert_eq!(resolve("httpx", dir.path().as_os_str()), None);
    }

    #[test]
    fn test_explicit_path_is_checked_directly() {
        let dir = tempdir().unwrap();
        let tool = touch(dir.path(), "custom-httpx");
        let unrelated = tempdir().unwrap();

        assert_eq!(
            resolve(tool.to_str().unwrap(), unrelated.path().as_os_str()),
            Some(tool)
        );
    }

    #[test]
    fn test_empty_name_never_resolves() {
        let dir = tempdir().unwrap();
        assert_eq!(resolve("", dir.path().as_os_str()), None);
    }
}
