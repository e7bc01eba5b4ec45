// src/resolve/cascade.rs

//! Version resolution cascade
//!
//! Resolves one step's version through an ordered set of strategies,
//! stopping at the first success:
//!
//! ```text
//! resolve_step(step, base filters)
//!     |
//!     v
//! Resolvability check ──> dynamic feed/package ID ──> record unresolved
//!     |
//!     v
//! Feed lookup ──> missing ──> fatal (build aborts)
//!     |
//!     v
//! Exact-version override ──> hit ──> accept (exact-override)
//!     |  miss: discard filter
//!     v
//! Primary pre-release tag query ──> selection ──> accept
//!     |                                           (primary-tag or
//!     v                                            latest-available)
//! Fallback tag list, in order ──> selection ──> accept (fallback-tag)
//!     |
//!     v
//! Record unresolved, continue with remaining steps
//! ```
//!
//! A transport failure during search is downgraded to "no candidates":
//! retries are the transport's concern, not the cascade's.

use crate::error::{Error, Result};
use crate::feed::{CandidatePackage, Feed, FeedService, Filters};
use crate::plan::{ResolutionOutcome, StepPlan, VersionProvenance};
use tracing::{debug, info, warn};

use super::selector::{is_nontrivial_tag, select};

/// Cap on candidates fetched when ordering by publish date client-side
///
/// Feeds cannot sort by publish date server-side, so the cascade pulls a
/// large page and sorts after retrieval. An implementation against a
/// feed with server-side date ordering could drop this entirely.
pub const MAX_CLIENT_SORT_CANDIDATES: usize = 10_000;

/// Caller-supplied knobs for a build, applied to every unresolved step
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Exact version to try first, as an opt-in shortcut
    pub exact_override: Option<String>,
    /// Primary pre-release tag filter
    pub pre_release_tag: Option<String>,
    /// Comma-separated fallback tags, tried in order after the primary
    pub tag_fallbacks: Option<String>,
    /// Select by publish date instead of version order where applicable
    pub prefer_latest_by_publish: bool,
}

/// Parse a comma-separated fallback tag list
///
/// Trims whitespace, drops empty entries, de-duplicates preserving
/// first-occurrence order: `"  a, a ,b,,b "` → `["a", "b"]`.
pub fn parse_fallback_tags(list: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for entry in list.split(',') {
        let entry = entry.trim();
        if entry.is_empty() || tags.iter().any(|t| t == entry) {
            continue;
        }
        tags.push(entry.to_string());
    }
    tags
}

/// Drives the strategy cascade for unresolved steps
pub struct VersionCascade<'a> {
    feeds: &'a dyn FeedService,
    options: &'a ResolveOptions,
}

impl<'a> VersionCascade<'a> {
    pub fn new(feeds: &'a dyn FeedService, options: &'a ResolveOptions) -> Self {
        Self { feeds, options }
    }

    /// Resolve one step in place
    ///
    /// `base` carries the channel-derived filters for this step. Only a
    /// missing feed is fatal; every other failure is recorded on the
    /// step so the remaining steps still get processed.
    pub async fn resolve_step(&self, step: &mut StepPlan, base: &Filters) -> Result<()> {
        if !step.resolvable {
            warn!(
                "Step '{}' package '{}' uses a dynamic feed or package ID, cannot resolve a version at plan time",
                step.action, step.package_reference
            );
            step.outcome = Some(ResolutionOutcome::Unresolved {
                reason: format!(
                    "feed '{}' or package '{}' is computed at deployment time; no feed query is possible",
                    step.feed_id, step.package_id
                ),
            });
            return Ok(());
        }

        let feed = self.feeds.feed(&step.feed_id).await?.ok_or_else(|| {
            Error::FeedNotFound(format!(
                "feed '{}' required by step '{}' (package {})",
                step.feed_id, step.action, step.package_id
            ))
        })?;

        if let Some(candidate) = self.try_exact_override(step, base, &feed).await {
            self.accept(step, candidate, VersionProvenance::ExactOverride);
            return Ok(());
        }

        if let Some((candidate, provenance)) = self.try_primary(step, base, &feed).await {
            self.accept(step, candidate, provenance);
            return Ok(());
        }

        if let Some(candidate) = self.try_fallback_tags(step, base, &feed).await {
            self.accept(step, candidate, VersionProvenance::FallbackTag);
            return Ok(());
        }

        warn!(
            "No version of package '{}' found on feed '{}' for step '{}'",
            step.package_id, feed.name, step.action
        );
        step.outcome = Some(ResolutionOutcome::Unresolved {
            reason: format!(
                "no matching version of '{}' found on feed '{}'",
                step.package_id, feed.name
            ),
        });
        Ok(())
    }

    /// Strategy: exact-version override
    ///
    /// Queries with a `[version]` range and no pre-release filter. A
    /// miss just falls through; the override is a shortcut, not a
    /// guarantee.
    async fn try_exact_override(
        &self,
        step: &StepPlan,
        base: &Filters,
        feed: &Feed,
    ) -> Option<CandidatePackage> {
        let version = self.options.exact_override.as_ref()?;

        let mut filters = base.clone();
        filters.version_range = Some(format!("[{}]", version));
        filters.pre_release_tag = None;
        filters.take = None;

        let candidates = self.search(step, feed, &filters).await;
        match candidates.into_iter().next() {
            Some(candidate) => {
                debug!(
                    "Exact override {} hit for '{}' on feed '{}'",
                    version, step.package_id, feed.name
                );
                Some(candidate)
            }
            None => {
                debug!(
                    "Exact override {} missed for '{}', falling through",
                    version, step.package_id
                );
                None
            }
        }
    }

    /// Strategy: primary pre-release tag (or unfiltered latest)
    async fn try_primary(
        &self,
        step: &StepPlan,
        base: &Filters,
        feed: &Feed,
    ) -> Option<(CandidatePackage, VersionProvenance)> {
        let mut filters = base.clone();

        let primary_tag = self
            .options
            .pre_release_tag
            .as_deref()
            .filter(|tag| !tag.is_empty());
        if let Some(tag) = primary_tag {
            filters.pre_release_tag = Some(tag.to_string());
        }

        let nontrivial = is_nontrivial_tag(filters.pre_release_tag.as_deref());
        if self.options.prefer_latest_by_publish && nontrivial {
            filters.take = Some(MAX_CLIENT_SORT_CANDIDATES);
        }

        let candidates = self.search(step, feed, &filters).await;
        let selected = select(&candidates, self.options.prefer_latest_by_publish, nontrivial)?;

        let provenance = if primary_tag.is_some() {
            VersionProvenance::PrimaryTag
        } else {
            VersionProvenance::LatestAvailable
        };
        Some((selected.clone(), provenance))
    }

    /// Strategy: ordered fallback tag list
    ///
    /// Each tag gets a fresh query with its own non-trivial flag and
    /// page cap; the first non-empty selection wins.
    async fn try_fallback_tags(
        &self,
        step: &StepPlan,
        base: &Filters,
        feed: &Feed,
    ) -> Option<CandidatePackage> {
        let list = self.options.tag_fallbacks.as_ref()?;

        for tag in parse_fallback_tags(list) {
            debug!(
                "Trying fallback tag '{}' for '{}' on feed '{}'",
                tag, step.package_id, feed.name
            );

            let mut filters = base.clone();
            filters.take = None;
            filters.pre_release_tag = Some(tag.clone());

            let nontrivial = is_nontrivial_tag(Some(&tag));
            if self.options.prefer_latest_by_publish && nontrivial {
                filters.take = Some(MAX_CLIENT_SORT_CANDIDATES);
            }

            let candidates = self.search(step, feed, &filters).await;
            if let Some(selected) = select(&candidates, self.options.prefer_latest_by_publish, nontrivial)
            {
                return Some(selected.clone());
            }
        }
        None
    }

    /// Run one feed query, downgrading transport errors to no candidates
    async fn search(&self, step: &StepPlan, feed: &Feed, filters: &Filters) -> Vec<CandidatePackage> {
        match self.feeds.search(feed, filters).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(
                    "Feed query failed for '{}' on feed '{}' (step '{}'): {}",
                    step.package_id, feed.name, step.action, e
                );
                Vec::new()
            }
        }
    }

    fn accept(&self, step: &mut StepPlan, candidate: CandidatePackage, provenance: VersionProvenance) {
        info!(
            "Resolved step '{}' package '{}' to {} ({})",
            step.action, step.package_id, candidate.version, provenance
        );
        step.outcome = Some(ResolutionOutcome::Resolved {
            version: candidate.version,
            provenance,
        });
    }
}
