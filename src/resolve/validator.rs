// src/resolve/validator.rs

//! Channel-rule validation pass
//!
//! After resolution, every package step gets a verdict against the
//! channel's rules. Unlike filter building, which takes the first
//! matching rule, validation requires at most one match: two or more
//! matching rules is ambiguous configuration, and silently picking one
//! would hide a real correctness bug, so the build fails loudly.

use crate::channel::{Channel, RuleTest, RuleTester};
use crate::error::{Error, Result};
use crate::plan::{ReleasePlan, RuleVerdict, StepPlan};
use tracing::{debug, warn};

/// Stamp every package step in the plan with a rule verdict
///
/// Fatal only on ambiguous rule configuration or a malformed rule
/// expression; everything else lands as a per-step verdict.
pub fn validate_plan(
    plan: &mut ReleasePlan,
    channel: Option<&Channel>,
    tester: &dyn RuleTester,
) -> Result<()> {
    for step in plan.package_steps_mut() {
        let verdict = step_verdict(step, channel, tester)?;
        step.verdict = Some(verdict);
    }
    Ok(())
}

fn step_verdict(
    step: &StepPlan,
    channel: Option<&Channel>,
    tester: &dyn RuleTester,
) -> Result<RuleVerdict> {
    let Some(channel) = channel else {
        return Ok(RuleVerdict::Unconstrained);
    };

    let matching = channel.matching_rules(&step.action, &step.package_reference);
    let rule = match matching.as_slice() {
        [] => return Ok(RuleVerdict::Unconstrained),
        [rule] => *rule,
        rules => {
            return Err(Error::AmbiguousRule {
                action: step.action.clone(),
                package_reference: step.package_reference.clone(),
                rules: rules.iter().map(|r| r.name.clone()).collect(),
            });
        }
    };

    let Some(version) = step.version() else {
        debug!(
            "Step '{}' package '{}' is unresolved, skipping rule '{}'",
            step.action, step.package_reference, rule.name
        );
        return Ok(RuleVerdict::NotTested);
    };

    match tester.test(rule, version)? {
        RuleTest::Satisfied => Ok(RuleVerdict::Pass {
            rule: rule.name.clone(),
        }),
        RuleTest::Violated { detail } => {
            warn!(
                "Step '{}' package '{}' version {} violates rule '{}': {}",
                step.action, step.package_reference, version, rule.name, detail
            );
            Ok(RuleVerdict::Fail {
                rule: rule.name.clone(),
                detail,
            })
        }
    }
}
