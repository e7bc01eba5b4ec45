// src/process/mod.rs

//! Deployment processes and release templates
//!
//! A deployment process is an ordered list of steps, some of which
//! reference packages. The release template flattens the process into
//! one entry per step/package-reference pair, carrying any version the
//! process already pins and a resolvability flag for references whose
//! feed or package ID is a runtime-computed expression (no feed query
//! is possible for those at plan-build time).

use crate::channel::Channel;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Marker for runtime-computed values in feed/package IDs
const DYNAMIC_EXPRESSION: &str = "#{";

/// An ordered deployment process for a project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentProcess {
    pub project: String,
    pub steps: Vec<DeploymentStep>,
}

/// One unit of work in a deployment process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentStep {
    pub action: String,
    /// Package references this step carries, possibly none (script steps)
    #[serde(default)]
    pub packages: Vec<PackageReference>,
}

/// A package reference within a step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageReference {
    pub name: String,
    pub package_id: String,
    pub feed_id: String,
    /// Version pinned by the process itself, if any
    #[serde(default)]
    pub version: Option<String>,
}

impl PackageReference {
    /// Whether the reference can be resolved by querying a feed
    ///
    /// False when the feed or package ID is a runtime expression that
    /// only has a value during deployment.
    pub fn is_resolvable(&self) -> bool {
        !self.feed_id.contains(DYNAMIC_EXPRESSION) && !self.package_id.contains(DYNAMIC_EXPRESSION)
    }
}

/// The flattened template a release plan is built from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseTemplate {
    pub packages: Vec<TemplatePackage>,
}

impl ReleaseTemplate {
    /// Flatten a process into template entries, in process order
    pub fn from_process(process: &DeploymentProcess) -> Self {
        let packages = process
            .steps
            .iter()
            .flat_map(|step| {
                step.packages.iter().map(|pkg| TemplatePackage {
                    action: step.action.clone(),
                    package_reference: pkg.name.clone(),
                    package_id: pkg.package_id.clone(),
                    feed_id: pkg.feed_id.clone(),
                    version: pkg.version.clone(),
                    resolvable: pkg.is_resolvable(),
                })
            })
            .collect();
        Self { packages }
    }
}

/// One step/package-reference pair in a release template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplatePackage {
    pub action: String,
    pub package_reference: String,
    pub package_id: String,
    pub feed_id: String,
    pub version: Option<String>,
    pub resolvable: bool,
}

/// Capability contract for fetching processes and templates
///
/// Failures here are fatal for the build.
#[async_trait]
pub trait ProcessStore: Send + Sync {
    async fn deployment_process(&self, project: &str) -> Result<DeploymentProcess>;

    async fn release_template(
        &self,
        process: &DeploymentProcess,
        channel: Option<&Channel>,
    ) -> Result<ReleaseTemplate>;
}
