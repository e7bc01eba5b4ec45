// src/resolve/filters.rs

//! Channel-derived feed filters
//!
//! Derives the base search filters for a step from the channel rule
//! governing it, if any. First matching rule wins here; validation is
//! stricter about multiple matches (see `validator`).

use crate::channel::Channel;
use crate::feed::Filters;
use tracing::debug;

/// Build base filters for a step from the channel, if one is in effect
///
/// Pure function of its inputs. Without a channel, or with no matching
/// rule, the step is unconstrained and the filters come back empty.
pub fn channel_filters(action: &str, package_reference: &str, channel: Option<&Channel>) -> Filters {
    let mut filters = Filters::default();

    let Some(channel) = channel else {
        return filters;
    };

    if let Some(rule) = channel.first_matching_rule(action, package_reference) {
        debug!(
            "Channel '{}' rule '{}' applies to step '{}' package '{}'",
            channel.name, rule.name, action, package_reference
        );
        if let Some(ref range) = rule.version_range {
            filters.version_range = Some(range.clone());
        }
        if let Some(ref tag) = rule.tag_expression {
            filters.pre_release_tag = Some(tag.clone());
        }
    }

    filters
}
