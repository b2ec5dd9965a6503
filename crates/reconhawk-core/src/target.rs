//! Target normalization.
//!
//! Turns whatever the operator typed (`https://WWW.Example.com/`, ` example.com `)
//! into the bare, lower-cased domain used for engine arguments and artifact names.

use crate::error::{ReconError, Result};
use serde::Serialize;
use std::fmt;

/// Prefixes stripped from the raw input, each at most once, in this order.
const STRIPPED_PREFIXES: [&str; 3] = ["http://", "https://", "www."];

/// A normalized target domain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Target(String);

impl Target {
    /// Normalize raw operator input.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ReconError::no_target());
        }

        let mut target = trimmed.to_lowercase();
        for prefix in STRIPPED_PREFIXES {
            if let Some(rest) = target.strip_prefix(prefix) {
                target = rest.to_string();
            }
        }

        let target = target.trim_end_matches('/');
        if target.is_empty() {
            return Err(ReconError::invalid_target());
        }

        Ok(Target(target.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Target {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(raw: &str) -> String {
        Target::parse(raw).unwrap().to_string()
    }

    #[test]
    fn test_scheme_www_and_case_are_stripped() {
        assert_eq!(norm("https://WWW.Example.com/"), "example.com");
        assert_eq!(norm("http://www.example.com"), "example.com");
        assert_eq!(norm("  Example.COM  "), "example.com");
    }

    #[test]
    fn test_trailing_slashes_are_stripped() {
        assert_eq!(norm("example.com///"), "example.com");
    }

    #[test]
    fn test_prefixes_are_not_stripped_recursively() {
        assert_eq!(norm("www.www.example.com"), "www.example.com");
        // `https://` is checked after `http://`, so it still applies here.
        assert_eq!(norm("http://https://example.com"), "example.com");
        // ...but `http://` is never revisited.
        assert_eq!(norm("https://http://example.com"), "http://example.com");
    }

    #[test]
    fn test_blank_input_is_rejected() {
        let err = Target::parse("   ").unwrap_err();
        assert!(matches!(err, ReconError::Input(ref m) if m.contains("No target")));
        assert!(Target::parse("").is_err());
    }

    #[test]
    fn test_empty_after_normalization_is_rejected() {
        for raw in ["http://", "https://www./", "///"] {
            let err = Target::parse(raw).unwrap_err();
            assert!(
                matches!(err, ReconError::Input(ref m) if m.contains("Invalid target")),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_normalization_is_idempotent() {
        for raw in [
            "https://WWW.Example.com/",
            "sub.example.org",
            " HTTP://api.example.io// ",
        ] {
            let once = norm(raw);
            assert_eq!(norm(&once), once);
        }
    }

    #[test]
    fn test_equivalent_inputs_converge() {
        let a = norm("https://www.example.com/");
        let b = norm("EXAMPLE.com");
        let c = norm("http://Example.com//");
        assert_eq!(a, b);
        assert_eq!(b, c);
    }
}
