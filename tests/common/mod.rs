// tests/common/mod.rs

//! Shared fixtures for release-planning integration tests.

use async_trait::async_trait;
use capstan::{
    CandidatePackage, DeploymentProcess, DeploymentStep, Feed, FeedService, Filters, JsonSource,
    PackageReference, Result,
};
use capstan::source::FeedInventory;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::Mutex;

/// A candidate published on the given day of January 2024
pub fn candidate(package_id: &str, version: &str, published_day: u32) -> CandidatePackage {
    CandidatePackage {
        package_id: package_id.to_string(),
        version: version.to_string(),
        published: january(published_day),
    }
}

pub fn january(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()
}

pub fn package_ref(name: &str, package_id: &str, feed_id: &str, version: Option<&str>) -> PackageReference {
    PackageReference {
        name: name.to_string(),
        package_id: package_id.to_string(),
        feed_id: feed_id.to_string(),
        version: version.map(str::to_string),
    }
}

pub fn step(action: &str, packages: Vec<PackageReference>) -> DeploymentStep {
    DeploymentStep {
        action: action.to_string(),
        packages,
    }
}

/// Workspace with one project and one feed named "F"
pub fn workspace(steps: Vec<DeploymentStep>, packages: Vec<CandidatePackage>) -> JsonSource {
    JsonSource {
        projects: vec![DeploymentProcess {
            project: "acme".to_string(),
            steps,
        }],
        feeds: vec![FeedInventory {
            id: "F".to_string(),
            name: "Feed F".to_string(),
            packages,
        }],
        channels: Vec::new(),
    }
}

/// Feed wrapper that records every search's filters
pub struct RecordingFeed {
    inner: JsonSource,
    queries: Mutex<Vec<Filters>>,
}

impl RecordingFeed {
    pub fn new(inner: JsonSource) -> Self {
        Self {
            inner,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<Filters> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl FeedService for RecordingFeed {
    async fn feed(&self, feed_id: &str) -> Result<Option<Feed>> {
        self.inner.feed(feed_id).await
    }

    async fn search(&self, feed: &Feed, filters: &Filters) -> Result<Vec<CandidatePackage>> {
        self.queries.lock().unwrap().push(filters.clone());
        self.inner.search(feed, filters).await
    }
}

/// Feed whose searches always fail at the transport level
pub struct FailingFeed;

#[async_trait]
impl FeedService for FailingFeed {
    async fn feed(&self, feed_id: &str) -> Result<Option<Feed>> {
        Ok(Some(Feed {
            id: feed_id.to_string(),
            name: "Broken".to_string(),
        }))
    }

    async fn search(&self, _feed: &Feed, _filters: &Filters) -> Result<Vec<CandidatePackage>> {
        Err(capstan::Error::SearchError("connection reset".to_string()))
    }
}
