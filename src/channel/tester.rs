// src/channel/tester.rs

//! Rule testing capability
//!
//! Testing a chosen version against a rule's range and tag expressions
//! is delegated behind [`RuleTester`] so the resolution core never
//! parses rule syntax itself. [`SemverRuleTester`] is the stock
//! implementation: semver requirement ranges (plus the `[v]` exact
//! interval form) and regex tag expressions.

use crate::error::{Error, Result};
use crate::version::PackageVersion;

use super::VersionRule;

/// Outcome of testing a version against a rule
#[derive(Debug, Clone, PartialEq)]
pub enum RuleTest {
    Satisfied,
    /// The version violated the rule; detail names which expression failed
    Violated { detail: String },
}

/// Capability contract for rule evaluation
///
/// Pure predicate, side-effect free.
pub trait RuleTester: Send + Sync {
    fn test(&self, rule: &VersionRule, version: &str) -> Result<RuleTest>;
}

/// Rule tester backed by semver ranges and regex tag expressions
#[derive(Debug, Default)]
pub struct SemverRuleTester;

impl SemverRuleTester {
    fn test_range(&self, range: &str, version: &PackageVersion) -> Result<bool> {
        // `[v]` is the exact-match interval form
        if let Some(exact) = range
            .strip_prefix('[')
            .and_then(|r| r.strip_suffix(']'))
            .filter(|r| !r.contains(','))
        {
            let pinned = PackageVersion::parse(exact)?;
            return Ok(pinned.cmp(version) == std::cmp::Ordering::Equal);
        }

        let req = semver::VersionReq::parse(range)
            .map_err(|e| Error::RuleError(format!("Invalid version range '{}': {}", range, e)))?;
        Ok(version.satisfies(&req))
    }

    fn test_tag(&self, expression: &str, version: &PackageVersion) -> Result<bool> {
        let re = regex::Regex::new(expression)
            .map_err(|e| Error::RuleError(format!("Invalid tag expression '{}': {}", expression, e)))?;
        Ok(re.is_match(version.pre_release()))
    }
}

impl RuleTester for SemverRuleTester {
    fn test(&self, rule: &VersionRule, version: &str) -> Result<RuleTest> {
        let parsed = PackageVersion::parse(version)?;

        if let Some(ref range) = rule.version_range {
            if !self.test_range(range, &parsed)? {
                return Ok(RuleTest::Violated {
                    detail: format!("version {} is outside range {}", version, range),
                });
            }
        }

        if let Some(ref expression) = rule.tag_expression {
            if !self.test_tag(expression, &parsed)? {
                return Ok(RuleTest::Violated {
                    detail: format!(
                        "pre-release tag '{}' does not match {}",
                        parsed.pre_release(),
                        expression
                    ),
                });
            }
        }

        Ok(RuleTest::Satisfied)
    }
}
