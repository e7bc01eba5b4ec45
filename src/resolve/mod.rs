// src/resolve/mod.rs

//! Release plan assembly and version resolution
//!
//! The builder fetches the deployment process and release template,
//! lays out the plan skeleton, runs the version cascade for each
//! unresolved step in process order, then stamps every package step
//! with a channel-rule verdict. A single step failing to resolve never
//! aborts the build; the caller gets a complete plan with that step
//! marked unresolved and decides what that means for the release.

pub mod cascade;
pub mod filters;
pub mod selector;
pub mod validator;

pub use cascade::{parse_fallback_tags, ResolveOptions, VersionCascade, MAX_CLIENT_SORT_CANDIDATES};
pub use filters::channel_filters;
pub use selector::{is_nontrivial_tag, select, NO_PRE_RELEASE};
pub use validator::validate_plan;

use crate::channel::{Channel, RuleTester};
use crate::error::Result;
use crate::feed::FeedService;
use crate::plan::ReleasePlan;
use crate::process::ProcessStore;
use tracing::info;

/// Assembles release plans for a project/channel pair
pub struct ReleasePlanBuilder<'a> {
    store: &'a dyn ProcessStore,
    feeds: &'a dyn FeedService,
    tester: &'a dyn RuleTester,
}

impl<'a> ReleasePlanBuilder<'a> {
    pub fn new(
        store: &'a dyn ProcessStore,
        feeds: &'a dyn FeedService,
        tester: &'a dyn RuleTester,
    ) -> Self {
        Self { store, feeds, tester }
    }

    /// Build the fully populated release plan
    ///
    /// Steps already carrying an explicit version pass through without
    /// a cascade run. Fatal errors (missing process or template,
    /// missing feed, ambiguous rule configuration) abort the build;
    /// per-step resolution failures are recorded on the plan instead.
    pub async fn build(
        &self,
        project: &str,
        channel: Option<&Channel>,
        options: &ResolveOptions,
    ) -> Result<ReleasePlan> {
        let process = self.store.deployment_process(project).await?;
        let template = self.store.release_template(&process, channel).await?;

        let mut plan =
            ReleasePlan::from_template(project, channel.map(|c| c.name.as_str()), &template);
        info!(
            "Building release plan for '{}': {} package steps, {} to resolve",
            project,
            plan.package_steps().len(),
            plan.unresolved_steps().count()
        );

        let cascade = VersionCascade::new(self.feeds, options);
        for step in plan.package_steps_mut() {
            if !step.is_unresolved() {
                continue;
            }
            let mut base = channel_filters(&step.action, &step.package_reference, channel);
            base.package_id = Some(step.package_id.clone());
            cascade.resolve_step(step, &base).await?;
        }

        validate_plan(&mut plan, channel, self.tester)?;
        Ok(plan)
    }
}
