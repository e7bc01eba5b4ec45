// src/version/mod.rs

//! Version handling for package feed candidates
//!
//! Feeds carry version strings that are usually, but not always, strict
//! semver. This module parses them leniently: a compliant string is used
//! as-is, short forms like "1.0" are padded, and four-part build numbers
//! like "1.2.3.4" keep their fourth component as build metadata so
//! ordering stays sane.

use crate::error::{Error, Result};
use semver::Version;
use std::cmp::Ordering;
use std::fmt;

/// A parsed package version, comparable by semantic-version precedence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageVersion {
    /// The original string as the feed reported it
    pub raw: String,
    semver: Version,
}

impl PackageVersion {
    /// Parse a feed version string
    ///
    /// Examples:
    /// - "1.2.3" → 1.2.3
    /// - "1.2" → 1.2.0
    /// - "1.2.3.4" → 1.2.3+4
    /// - "3.0.0-alpha.1" → 3.0.0-alpha.1
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(Error::ParseError("Empty version string".to_string()));
        }

        // Strict semver first
        if let Ok(v) = Version::parse(trimmed) {
            return Ok(Self {
                raw: trimmed.to_string(),
                semver: v,
            });
        }

        Self::parse_lenient(trimmed)
    }

    /// Normalize a non-compliant version string into semver form
    fn parse_lenient(s: &str) -> Result<Self> {
        // Split off pre-release ("-...") and build ("+...") suffixes
        let (numeric, pre) = match s.find('-') {
            Some(pos) => (&s[..pos], Some(&s[pos + 1..])),
            None => (s, None),
        };
        let (numeric, build) = match numeric.find('+') {
            Some(pos) => (&numeric[..pos], Some(&numeric[pos + 1..])),
            None => (numeric, None),
        };

        let mut parts = Vec::new();
        for part in numeric.split('.') {
            let n = part.parse::<u64>().map_err(|_| {
                Error::ParseError(format!("Invalid version component '{}' in '{}'", part, s))
            })?;
            parts.push(n);
        }
        if parts.is_empty() || parts.len() > 4 {
            return Err(Error::ParseError(format!("Invalid version '{}'", s)));
        }

        let major = parts.first().copied().unwrap_or(0);
        let minor = parts.get(1).copied().unwrap_or(0);
        let patch = parts.get(2).copied().unwrap_or(0);

        let mut normalized = format!("{}.{}.{}", major, minor, patch);
        if let Some(pre) = pre {
            normalized.push('-');
            normalized.push_str(pre);
        }
        match (parts.get(3), build) {
            (Some(fourth), _) => {
                normalized.push('+');
                normalized.push_str(&fourth.to_string());
            }
            (None, Some(build)) => {
                normalized.push('+');
                normalized.push_str(build);
            }
            (None, None) => {}
        }

        let semver = Version::parse(&normalized)
            .map_err(|e| Error::ParseError(format!("Invalid version '{}': {}", s, e)))?;

        Ok(Self {
            raw: s.to_string(),
            semver,
        })
    }

    /// The pre-release component, empty for a stable version
    ///
    /// "3.0.0-alpha.1" → "alpha.1", "3.0.0" → ""
    pub fn pre_release(&self) -> &str {
        self.semver.pre.as_str()
    }

    /// Whether this version satisfies a semver requirement expression
    pub fn satisfies(&self, req: &semver::VersionReq) -> bool {
        req.matches(&self.semver)
    }
}

impl Ord for PackageVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.semver.cmp(&other.semver)
    }
}

impl PartialOrd for PackageVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for PackageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}
