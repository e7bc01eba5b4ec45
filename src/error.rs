// src/error.rs

//! Error types for release planning and version resolution
//!
//! Only build-aborting conditions surface as `Error` values. Per-step
//! resolution failures are recorded on the owning `StepPlan` instead,
//! so a single bad step never aborts the whole plan.

use thiserror::Error;

/// Result type alias using the crate error
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Deployment process or release template could not be fetched
    #[error("Process error: {0}")]
    ProcessError(String),

    /// A step references a feed that does not exist
    ///
    /// Fatal for the whole build: the plan cannot be completed without
    /// the feed existing.
    #[error("Feed not found: {0}")]
    FeedNotFound(String),

    /// More than one channel rule matched a single step during validation
    #[error("Ambiguous channel rules for step '{action}' package '{package_reference}': {rules:?}")]
    AmbiguousRule {
        action: String,
        package_reference: String,
        rules: Vec<String>,
    },

    /// Version string could not be parsed
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Channel rule expression was malformed
    #[error("Rule error: {0}")]
    RuleError(String),

    /// Feed query transport failure
    #[error("Search error: {0}")]
    SearchError(String),

    /// Workspace document or other input could not be read
    #[error("IO error: {0}")]
    IoError(String),
}
