// src/lib.rs

//! Capstan Release Planner
//!
//! Resolves, for a deployment release, the concrete package version each
//! deployment step will use, then validates those choices against
//! release-channel constraints.
//!
//! # Architecture
//!
//! - Capability traits at the seams: process fetch, feed search, and
//!   rule testing are abstract contracts, not baked-in transports
//! - Cascade resolution: exact override → primary pre-release tag →
//!   fallback tag list → recorded failure, first success wins
//! - Partial-failure semantics: one unresolvable step degrades the plan
//!   but never aborts the build; missing feeds and ambiguous rules do
//! - Two-pass plan: version resolution first, rule validation second,
//!   with separate tagged outcomes per step

pub mod channel;
mod error;
pub mod feed;
pub mod plan;
pub mod process;
pub mod resolve;
pub mod source;
pub mod version;

pub use channel::{Channel, RuleScope, RuleTest, RuleTester, SemverRuleTester, VersionRule};
pub use error::{Error, Result};
pub use feed::{CandidatePackage, Feed, FeedService, Filters};
pub use plan::{ReleasePlan, ResolutionOutcome, RuleVerdict, StepPlan, VersionProvenance};
pub use process::{
    DeploymentProcess, DeploymentStep, PackageReference, ProcessStore, ReleaseTemplate,
    TemplatePackage,
};
pub use resolve::{ReleasePlanBuilder, ResolveOptions, MAX_CLIENT_SORT_CANDIDATES};
pub use source::JsonSource;
pub use version::PackageVersion;
