// src/plan/mod.rs

//! Release plan data structures
//!
//! The plan owns one [`StepPlan`] per step/package-reference pair, built
//! once per invocation and mutated in place across two passes: version
//! resolution first, then channel-rule validation. Resolution and
//! validation outcomes are separate tagged variants so neither pass
//! overloads the other's absence.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::process::{ReleaseTemplate, TemplatePackage};

/// Which resolution strategy produced a step's chosen version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VersionProvenance {
    /// Pinned in the deployment process itself
    Explicit,
    /// Highest version the feed returned with no tag in effect
    LatestAvailable,
    /// Exact-version override hit
    ExactOverride,
    /// Resolved under the primary pre-release tag
    PrimaryTag,
    /// Resolved under a tag from the fallback list
    FallbackTag,
}

impl VersionProvenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Explicit => "explicit",
            Self::LatestAvailable => "latest-available",
            Self::ExactOverride => "exact-override",
            Self::PrimaryTag => "primary-tag",
            Self::FallbackTag => "fallback-tag",
        }
    }
}

impl fmt::Display for VersionProvenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of version resolution for one step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum ResolutionOutcome {
    Resolved {
        version: String,
        provenance: VersionProvenance,
    },
    Unresolved {
        reason: String,
    },
}

/// Result of channel-rule validation for one step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "kebab-case")]
pub enum RuleVerdict {
    /// The chosen version satisfies the matching rule
    Pass { rule: String },
    /// The chosen version violates the matching rule
    Fail { rule: String, detail: String },
    /// No rule in the channel governs this step
    Unconstrained,
    /// The step ended resolution without a version, nothing to test
    NotTested,
}

/// One deployment-step/package-reference pair in the plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepPlan {
    pub action: String,
    pub package_reference: String,
    pub package_id: String,
    pub feed_id: String,
    /// False when the feed or package ID is a runtime expression
    pub resolvable: bool,
    #[serde(default)]
    pub outcome: Option<ResolutionOutcome>,
    #[serde(default)]
    pub verdict: Option<RuleVerdict>,
}

impl StepPlan {
    fn from_template(pkg: &TemplatePackage) -> Self {
        let outcome = pkg.version.as_ref().map(|version| ResolutionOutcome::Resolved {
            version: version.clone(),
            provenance: VersionProvenance::Explicit,
        });
        Self {
            action: pkg.action.clone(),
            package_reference: pkg.package_reference.clone(),
            package_id: pkg.package_id.clone(),
            feed_id: pkg.feed_id.clone(),
            resolvable: pkg.resolvable,
            outcome,
            verdict: None,
        }
    }

    /// The chosen version, if resolution has produced one
    pub fn version(&self) -> Option<&str> {
        match self.outcome {
            Some(ResolutionOutcome::Resolved { ref version, .. }) => Some(version),
            _ => None,
        }
    }

    /// Whether resolution still has to run for this step
    pub fn is_unresolved(&self) -> bool {
        self.version().is_none()
    }
}

/// The assembled release plan for one project/channel pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleasePlan {
    pub project: String,
    pub channel: Option<String>,
    steps: Vec<StepPlan>,
}

impl ReleasePlan {
    /// Build the plan skeleton from a release template
    ///
    /// Steps the template already pins pass through with provenance
    /// "explicit"; the rest await the cascade.
    pub fn from_template(project: &str, channel: Option<&str>, template: &ReleaseTemplate) -> Self {
        Self {
            project: project.to_string(),
            channel: channel.map(str::to_string),
            steps: template.packages.iter().map(StepPlan::from_template).collect(),
        }
    }

    /// All package steps, in deployment-process order
    pub fn package_steps(&self) -> &[StepPlan] {
        &self.steps
    }

    /// Mutable access for the resolution and validation passes
    pub fn package_steps_mut(&mut self) -> &mut [StepPlan] {
        &mut self.steps
    }

    /// Steps still lacking a version
    pub fn unresolved_steps(&self) -> impl Iterator<Item = &StepPlan> {
        self.steps.iter().filter(|step| step.is_unresolved())
    }
}
