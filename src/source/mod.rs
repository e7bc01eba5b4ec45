// src/source/mod.rs

//! File-backed workspace source
//!
//! Backs the [`ProcessStore`] and [`FeedService`] capability traits
//! with a single JSON workspace document holding projects, feeds with
//! their package inventories, and channels. The CLI runs against this;
//! integration tests use it as a deterministic feed.
//!
//! The search implementation honors the feed contract the resolution
//! core relies on: an empty result is a normal outcome, and candidates
//! come back in descending semantic-version order.

use crate::channel::Channel;
use crate::error::{Error, Result};
use crate::feed::{CandidatePackage, Feed, FeedService, Filters};
use crate::process::{DeploymentProcess, ProcessStore, ReleaseTemplate};
use crate::version::PackageVersion;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// A feed definition plus its package inventory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedInventory {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub packages: Vec<CandidatePackage>,
}

/// The whole workspace document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonSource {
    #[serde(default)]
    pub projects: Vec<DeploymentProcess>,
    #[serde(default)]
    pub feeds: Vec<FeedInventory>,
    #[serde(default)]
    pub channels: Vec<Channel>,
}

impl JsonSource {
    /// Load a workspace document from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::IoError(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_json(&content)
    }

    /// Parse a workspace document from a JSON string
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| Error::ParseError(format!("Invalid workspace document: {}", e)))
    }

    /// Look up a channel by name
    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.channels.iter().find(|c| c.name == name)
    }

    fn matches_filters(candidate: &CandidatePackage, filters: &Filters) -> bool {
        if let Some(ref id) = filters.package_id {
            if &candidate.package_id != id {
                return false;
            }
        }

        let version = match PackageVersion::parse(&candidate.version) {
            Ok(v) => v,
            Err(e) => {
                warn!("Skipping candidate with bad version '{}': {}", candidate.version, e);
                return false;
            }
        };

        if let Some(ref range) = filters.version_range {
            if !version_in_range(&version, range) {
                return false;
            }
        }

        if let Some(ref tag) = filters.pre_release_tag {
            match regex::Regex::new(tag) {
                Ok(re) => {
                    if !re.is_match(version.pre_release()) {
                        return false;
                    }
                }
                Err(e) => {
                    warn!("Invalid pre-release tag expression '{}': {}", tag, e);
                    return false;
                }
            }
        }

        true
    }
}

/// Evaluate a version-range expression against a parsed version
///
/// Supports the `[v]` exact interval form and semver requirement
/// syntax; anything else matches nothing.
fn version_in_range(version: &PackageVersion, range: &str) -> bool {
    if let Some(exact) = range
        .strip_prefix('[')
        .and_then(|r| r.strip_suffix(']'))
        .filter(|r| !r.contains(','))
    {
        return match PackageVersion::parse(exact) {
            Ok(pinned) => pinned.cmp(version) == std::cmp::Ordering::Equal,
            Err(_) => false,
        };
    }

    match semver::VersionReq::parse(range) {
        Ok(req) => version.satisfies(&req),
        Err(e) => {
            warn!("Invalid version range '{}': {}", range, e);
            false
        }
    }
}

#[async_trait]
impl ProcessStore for JsonSource {
    async fn deployment_process(&self, project: &str) -> Result<DeploymentProcess> {
        self.projects
            .iter()
            .find(|p| p.project == project)
            .cloned()
            .ok_or_else(|| Error::ProcessError(format!("No deployment process for project '{}'", project)))
    }

    async fn release_template(
        &self,
        process: &DeploymentProcess,
        _channel: Option<&Channel>,
    ) -> Result<ReleaseTemplate> {
        Ok(ReleaseTemplate::from_process(process))
    }
}

#[async_trait]
impl FeedService for JsonSource {
    async fn feed(&self, feed_id: &str) -> Result<Option<Feed>> {
        Ok(self.feeds.iter().find(|f| f.id == feed_id).map(|f| Feed {
            id: f.id.clone(),
            name: f.name.clone(),
        }))
    }

    async fn search(&self, feed: &Feed, filters: &Filters) -> Result<Vec<CandidatePackage>> {
        let inventory = self
            .feeds
            .iter()
            .find(|f| f.id == feed.id)
            .ok_or_else(|| Error::SearchError(format!("Unknown feed '{}'", feed.id)))?;

        let mut matched: Vec<&CandidatePackage> = inventory
            .packages
            .iter()
            .filter(|candidate| Self::matches_filters(candidate, filters))
            .collect();

        // Feed contract: descending semantic version
        matched.sort_by(|a, b| {
            let va = PackageVersion::parse(&a.version);
            let vb = PackageVersion::parse(&b.version);
            match (va, vb) {
                (Ok(va), Ok(vb)) => vb.cmp(&va),
                _ => b.version.cmp(&a.version),
            }
        });

        if let Some(take) = filters.take {
            matched.truncate(take);
        }

        Ok(matched.into_iter().cloned().collect())
    }
}
