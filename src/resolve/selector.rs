// src/resolve/selector.rs

//! Candidate selection from feed query results
//!
//! Feeds return candidates in descending semantic-version order, so the
//! default selection is simply the first candidate. When the caller
//! prefers latest-by-publish-date and a non-trivial pre-release filter
//! is in effect, selection instead takes the maximum publish timestamp,
//! keeping the first occurrence on ties. The caller is responsible for
//! requesting a large enough result page in that mode, since the sort
//! happens after retrieval.

use crate::feed::CandidatePackage;
use tracing::debug;

/// Tag filter sentinel meaning "no pre-release suffix allowed"
pub const NO_PRE_RELEASE: &str = "^$";

/// Whether a tag filter actually narrows to pre-release versions
///
/// Empty and the `^$` sentinel are trivial: neither selects a
/// pre-release stream, so publish-date ordering never applies to them.
pub fn is_nontrivial_tag(tag: Option<&str>) -> bool {
    match tag {
        Some(tag) => !tag.is_empty() && tag != NO_PRE_RELEASE,
        None => false,
    }
}

/// Pick one candidate from a feed result set
///
/// Latest-by-publish-date, first-seen on tie, when both conditions
/// hold; otherwise the feed's own (version-descending) order decides.
pub fn select<'a>(
    candidates: &'a [CandidatePackage],
    prefer_latest_by_publish: bool,
    nontrivial_tag: bool,
) -> Option<&'a CandidatePackage> {
    if candidates.is_empty() {
        return None;
    }

    if prefer_latest_by_publish && nontrivial_tag {
        let selected = candidates
            .iter()
            .reduce(|best, next| if next.published > best.published { next } else { best });
        if let Some(candidate) = selected {
            debug!(
                "Selected {} {} by publish date ({})",
                candidate.package_id, candidate.version, candidate.published
            );
        }
        return selected;
    }

    candidates.first()
}
