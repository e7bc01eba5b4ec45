// src/channel/mod.rs

//! Release channels and their version rules
//!
//! A channel is a named policy object: an ordered set of version rules,
//! each constraining which package versions are acceptable for the steps
//! it governs. Rule scoping uses simple `*` wildcard matchers over
//! (action name, package-reference name) pairs.
//!
//! Matching semantics differ between the two phases that consult rules:
//! filter building takes the first matching rule, validation requires at
//! most one match and treats two or more as a configuration error. See
//! `resolve::validator` for the latter.

pub mod tester;

use serde::{Deserialize, Serialize};

pub use tester::{RuleTest, RuleTester, SemverRuleTester};

/// A named release channel holding ordered version rules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    pub name: String,
    #[serde(default)]
    pub rules: Vec<VersionRule>,
}

impl Channel {
    /// First rule whose scope matches the step, in rule order
    pub fn first_matching_rule(&self, action: &str, package_reference: &str) -> Option<&VersionRule> {
        self.rules
            .iter()
            .find(|rule| rule.applies_to(action, package_reference))
    }

    /// All rules whose scope matches the step, in rule order
    pub fn matching_rules(&self, action: &str, package_reference: &str) -> Vec<&VersionRule> {
        self.rules
            .iter()
            .filter(|rule| rule.applies_to(action, package_reference))
            .collect()
    }
}

/// One version rule: a range/tag constraint plus the steps it governs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionRule {
    pub name: String,
    /// Version range expression, absent means unconstrained by range
    #[serde(default)]
    pub version_range: Option<String>,
    /// Pre-release tag expression; `^$` means "stable versions only"
    #[serde(default)]
    pub tag_expression: Option<String>,
    /// (action matcher, package-reference matcher) pairs
    #[serde(default)]
    pub scopes: Vec<RuleScope>,
}

impl VersionRule {
    /// Whether any scope of this rule matches the step
    pub fn applies_to(&self, action: &str, package_reference: &str) -> bool {
        self.scopes
            .iter()
            .any(|scope| scope.matches(action, package_reference))
    }
}

/// A single (action, package-reference) scope matcher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleScope {
    pub action: String,
    pub package_reference: String,
}

impl RuleScope {
    /// Both matchers must match for the scope to apply
    pub fn matches(&self, action: &str, package_reference: &str) -> bool {
        wildcard_match(&self.action, action) && wildcard_match(&self.package_reference, package_reference)
    }
}

/// Match a `*` wildcard pattern against a value
///
/// An empty pattern matches everything (an unscoped matcher).
fn wildcard_match(pattern: &str, value: &str) -> bool {
    if pattern.is_empty() {
        return true;
    }

    let segments: Vec<&str> = pattern.split('*').collect();
    if segments.len() == 1 {
        return pattern == value;
    }

    let mut rest = value;
    for (i, segment) in segments.iter().enumerate() {
        if segment.is_empty() {
            continue;
        }
        if i == 0 {
            match rest.strip_prefix(segment) {
                Some(r) => rest = r,
                None => return false,
            }
        } else if i == segments.len() - 1 {
            return rest.ends_with(segment);
        } else {
            match rest.find(segment) {
                Some(pos) => rest = &rest[pos + segment.len()..],
                None => return false,
            }
        }
    }
    true
}
