// src/feed/mod.rs

//! Package feed model and query capability
//!
//! A feed is an external source that can be searched for package
//! candidates by filter. The transport behind [`FeedService`] is opaque
//! to the resolution core: HTTP feeds, file shares, and in-memory test
//! doubles all implement the same contract.
//!
//! Two contract points matter to the core:
//! - `search` returning an empty sequence is a normal result, never an
//!   error. Transport failures are the implementation's to signal; the
//!   cascade downgrades them to "no candidates".
//! - results are ordered by descending semantic version, per the feed's
//!   own contract. The core only re-orders when publish-date selection
//!   is in effect.

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A package feed that can be queried for candidates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feed {
    pub id: String,
    pub name: String,
}

/// One package candidate returned by a feed query
///
/// Ephemeral: fetched per query and discarded after selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidatePackage {
    pub package_id: String,
    pub version: String,
    /// When the package was pushed to the feed
    pub published: DateTime<Utc>,
}

/// Search filter parameters for a feed query
///
/// Rebuilt per query, never persisted. `to_pairs` yields the parameters
/// in a fixed order for transports that serialize them positionally.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters {
    pub package_id: Option<String>,
    /// Version range expression, e.g. `[2.3.0]` for an exact match
    pub version_range: Option<String>,
    /// Pre-release tag expression; `^$` means "no pre-release allowed"
    pub pre_release_tag: Option<String>,
    /// Result-count cap, set when ordering must happen client-side
    pub take: Option<usize>,
}

impl Filters {
    /// Render as an ordered parameter list for the query transport
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(ref id) = self.package_id {
            pairs.push(("packageId", id.clone()));
        }
        if let Some(ref range) = self.version_range {
            pairs.push(("versionRange", range.clone()));
        }
        if let Some(ref tag) = self.pre_release_tag {
            pairs.push(("preReleaseTag", tag.clone()));
        }
        if let Some(take) = self.take {
            pairs.push(("take", take.to_string()));
        }
        pairs
    }
}

/// Capability contract for feed lookup and candidate search
#[async_trait]
pub trait FeedService: Send + Sync {
    /// Look up a feed by ID
    ///
    /// `None` means the feed does not exist, which the build treats as
    /// fatal configuration.
    async fn feed(&self, feed_id: &str) -> Result<Option<Feed>>;

    /// Search a feed for candidates matching the filters
    ///
    /// An empty result is normal, not an error. Results are expected in
    /// descending semantic-version order.
    async fn search(&self, feed: &Feed, filters: &Filters) -> Result<Vec<CandidatePackage>>;
}
