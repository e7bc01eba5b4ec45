// tests/plan.rs

//! End-to-end release planning tests: cascade precedence, partial
//! failures, and channel-rule verdicts.

mod common;

use capstan::{
    Channel, Error, ReleasePlanBuilder, ResolutionOutcome, ResolveOptions, RuleScope, RuleVerdict,
    SemverRuleTester, VersionProvenance, VersionRule, MAX_CLIENT_SORT_CANDIDATES,
};
use common::{candidate, package_ref, step, workspace, FailingFeed, RecordingFeed};

fn rule(name: &str, range: Option<&str>, tag: Option<&str>) -> VersionRule {
    VersionRule {
        name: name.to_string(),
        version_range: range.map(str::to_string),
        tag_expression: tag.map(str::to_string),
        scopes: vec![RuleScope {
            action: "*".to_string(),
            package_reference: "*".to_string(),
        }],
    }
}

fn channel(rules: Vec<VersionRule>) -> Channel {
    Channel {
        name: "Stable".to_string(),
        rules,
    }
}

fn resolved(outcome: &Option<ResolutionOutcome>) -> (&str, VersionProvenance) {
    match outcome {
        Some(ResolutionOutcome::Resolved { version, provenance }) => (version.as_str(), *provenance),
        other => panic!("expected resolved outcome, got {:?}", other),
    }
}

#[tokio::test]
async fn test_pinned_step_passes_through_and_unpinned_gets_latest() {
    let source = workspace(
        vec![
            step("Deploy Db", vec![package_ref("db", "Acme.Db", "F", Some("1.0.0"))]),
            step("Deploy Web", vec![package_ref("web", "Foo", "F", None)]),
        ],
        vec![candidate("Foo", "2.0.0", 10), candidate("Foo", "1.9.0-beta", 12)],
    );
    let feeds = RecordingFeed::new(source.clone());
    let tester = SemverRuleTester;
    let builder = ReleasePlanBuilder::new(&source, &feeds, &tester);

    let plan = builder.build("acme", None, &ResolveOptions::default()).await.unwrap();
    let steps = plan.package_steps();
    assert_eq!(steps.len(), 2);

    let (version, provenance) = resolved(&steps[0].outcome);
    assert_eq!(version, "1.0.0");
    assert_eq!(provenance, VersionProvenance::Explicit);

    let (version, provenance) = resolved(&steps[1].outcome);
    assert_eq!(version, "2.0.0");
    assert_eq!(provenance, VersionProvenance::LatestAvailable);

    // The pinned step never reached the feed
    assert!(feeds
        .queries()
        .iter()
        .all(|f| f.package_id.as_deref() != Some("Acme.Db")));
}

#[tokio::test]
async fn test_exact_override_short_circuits() {
    let source = workspace(
        vec![step("Deploy Web", vec![package_ref("web", "Foo", "F", None)])],
        vec![candidate("Foo", "3.0.0", 10), candidate("Foo", "2.3.0", 5)],
    );
    let feeds = RecordingFeed::new(source.clone());
    let tester = SemverRuleTester;
    let builder = ReleasePlanBuilder::new(&source, &feeds, &tester);

    let options = ResolveOptions {
        exact_override: Some("2.3.0".to_string()),
        pre_release_tag: Some("beta".to_string()),
        ..Default::default()
    };
    let plan = builder.build("acme", None, &options).await.unwrap();

    let (version, provenance) = resolved(&plan.package_steps()[0].outcome);
    assert_eq!(version, "2.3.0");
    assert_eq!(provenance, VersionProvenance::ExactOverride);

    // One query total: the exact-match one, with no pre-release filter
    let queries = feeds.queries();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].version_range.as_deref(), Some("[2.3.0]"));
    assert!(queries[0].pre_release_tag.is_none());
}

#[tokio::test]
async fn test_exact_override_miss_falls_through() {
    let source = workspace(
        vec![step("Deploy Web", vec![package_ref("web", "Foo", "F", None)])],
        vec![candidate("Foo", "2.0.0", 10)],
    );
    let feeds = RecordingFeed::new(source.clone());
    let tester = SemverRuleTester;
    let builder = ReleasePlanBuilder::new(&source, &feeds, &tester);

    let options = ResolveOptions {
        exact_override: Some("9.9.9".to_string()),
        ..Default::default()
    };
    let plan = builder.build("acme", None, &options).await.unwrap();

    let (version, provenance) = resolved(&plan.package_steps()[0].outcome);
    assert_eq!(version, "2.0.0");
    assert_eq!(provenance, VersionProvenance::LatestAvailable);
}

#[tokio::test]
async fn test_primary_tag_selects_pre_release() {
    let source = workspace(
        vec![step("Deploy Web", vec![package_ref("web", "Foo", "F", None)])],
        vec![candidate("Foo", "2.0.0", 10), candidate("Foo", "2.1.0-beta.1", 12)],
    );
    let feeds = RecordingFeed::new(source.clone());
    let tester = SemverRuleTester;
    let builder = ReleasePlanBuilder::new(&source, &feeds, &tester);

    let options = ResolveOptions {
        pre_release_tag: Some("beta".to_string()),
        ..Default::default()
    };
    let plan = builder.build("acme", None, &options).await.unwrap();

    let (version, provenance) = resolved(&plan.package_steps()[0].outcome);
    assert_eq!(version, "2.1.0-beta.1");
    assert_eq!(provenance, VersionProvenance::PrimaryTag);
}

#[tokio::test]
async fn test_fallback_tag_chain() {
    let source = workspace(
        vec![step("Deploy Web", vec![package_ref("web", "Foo", "F", None)])],
        vec![candidate("Foo", "3.0.0-alpha.1", 10)],
    );
    let feeds = RecordingFeed::new(source.clone());
    let tester = SemverRuleTester;
    let builder = ReleasePlanBuilder::new(&source, &feeds, &tester);

    let options = ResolveOptions {
        pre_release_tag: Some("beta".to_string()),
        tag_fallbacks: Some("rc,alpha".to_string()),
        ..Default::default()
    };
    let plan = builder.build("acme", None, &options).await.unwrap();

    let (version, provenance) = resolved(&plan.package_steps()[0].outcome);
    assert_eq!(version, "3.0.0-alpha.1");
    assert_eq!(provenance, VersionProvenance::FallbackTag);

    // beta, then rc, then alpha
    let tags: Vec<Option<String>> = feeds.queries().iter().map(|f| f.pre_release_tag.clone()).collect();
    assert_eq!(
        tags,
        vec![
            Some("beta".to_string()),
            Some("rc".to_string()),
            Some("alpha".to_string())
        ]
    );
}

#[tokio::test]
async fn test_publish_date_ordering_needs_both_conditions() {
    let packages = vec![
        candidate("Foo", "1.0.0-beta.1", 1),
        candidate("Foo", "0.9.0-beta.2", 20),
    ];

    // Both conditions hold: newest publish date wins
    let source = workspace(
        vec![step("Deploy Web", vec![package_ref("web", "Foo", "F", None)])],
        packages.clone(),
    );
    let feeds = RecordingFeed::new(source.clone());
    let tester = SemverRuleTester;
    let builder = ReleasePlanBuilder::new(&source, &feeds, &tester);
    let options = ResolveOptions {
        pre_release_tag: Some("beta".to_string()),
        prefer_latest_by_publish: true,
        ..Default::default()
    };
    let plan = builder.build("acme", None, &options).await.unwrap();
    let (version, _) = resolved(&plan.package_steps()[0].outcome);
    assert_eq!(version, "0.9.0-beta.2");

    // Client-side sort needs the large page
    assert_eq!(feeds.queries()[0].take, Some(MAX_CLIENT_SORT_CANDIDATES));

    // Without the publish-date preference, version order wins
    let feeds = RecordingFeed::new(source.clone());
    let builder = ReleasePlanBuilder::new(&source, &feeds, &tester);
    let options = ResolveOptions {
        pre_release_tag: Some("beta".to_string()),
        ..Default::default()
    };
    let plan = builder.build("acme", None, &options).await.unwrap();
    let (version, _) = resolved(&plan.package_steps()[0].outcome);
    assert_eq!(version, "1.0.0-beta.1");
    assert_eq!(feeds.queries()[0].take, None);
}

#[tokio::test]
async fn test_dynamic_reference_never_queries() {
    let source = workspace(
        vec![step(
            "Deploy Web",
            vec![package_ref("web", "Foo", "#{Variables.Feed}", None)],
        )],
        vec![candidate("Foo", "2.0.0", 10)],
    );
    let feeds = RecordingFeed::new(source.clone());
    let tester = SemverRuleTester;
    let builder = ReleasePlanBuilder::new(&source, &feeds, &tester);

    let plan = builder.build("acme", None, &ResolveOptions::default()).await.unwrap();

    assert!(matches!(
        plan.package_steps()[0].outcome,
        Some(ResolutionOutcome::Unresolved { .. })
    ));
    assert!(feeds.queries().is_empty());
}

#[tokio::test]
async fn test_missing_feed_aborts_build() {
    let source = workspace(
        vec![step("Deploy Web", vec![package_ref("web", "Foo", "missing-feed", None)])],
        Vec::new(),
    );
    let feeds = RecordingFeed::new(source.clone());
    let tester = SemverRuleTester;
    let builder = ReleasePlanBuilder::new(&source, &feeds, &tester);

    let err = builder
        .build("acme", None, &ResolveOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::FeedNotFound(_)));
}

#[tokio::test]
async fn test_transport_failure_marks_step_unresolved() {
    let source = workspace(
        vec![
            step("Deploy Web", vec![package_ref("web", "Foo", "F", None)]),
            step("Deploy Db", vec![package_ref("db", "Acme.Db", "F", Some("1.0.0"))]),
        ],
        Vec::new(),
    );
    let feeds = FailingFeed;
    let tester = SemverRuleTester;
    let builder = ReleasePlanBuilder::new(&source, &feeds, &tester);

    let plan = builder.build("acme", None, &ResolveOptions::default()).await.unwrap();
    let steps = plan.package_steps();

    assert!(matches!(
        steps[0].outcome,
        Some(ResolutionOutcome::Unresolved { .. })
    ));
    // The pinned step still made it through
    let (version, _) = resolved(&steps[1].outcome);
    assert_eq!(version, "1.0.0");
}

#[tokio::test]
async fn test_channel_rule_constrains_query_and_passes() {
    let source = workspace(
        vec![step("Deploy Web", vec![package_ref("web", "Foo", "F", None)])],
        vec![candidate("Foo", "2.0.0", 10), candidate("Foo", "1.5.0", 5)],
    );
    let feeds = RecordingFeed::new(source.clone());
    let tester = SemverRuleTester;
    let builder = ReleasePlanBuilder::new(&source, &feeds, &tester);

    let channel = channel(vec![rule("pre-2", Some("<2.0.0"), None)]);
    let plan = builder
        .build("acme", Some(&channel), &ResolveOptions::default())
        .await
        .unwrap();

    let step = &plan.package_steps()[0];
    let (version, _) = resolved(&step.outcome);
    assert_eq!(version, "1.5.0");
    assert_eq!(step.verdict, Some(RuleVerdict::Pass { rule: "pre-2".to_string() }));
}

#[tokio::test]
async fn test_exact_override_can_violate_channel_rule() {
    let source = workspace(
        vec![step("Deploy Web", vec![package_ref("web", "Foo", "F", None)])],
        vec![candidate("Foo", "2.4.0", 10), candidate("Foo", "1.5.0", 5)],
    );
    let feeds = RecordingFeed::new(source.clone());
    let tester = SemverRuleTester;
    let builder = ReleasePlanBuilder::new(&source, &feeds, &tester);

    let channel = channel(vec![rule("pre-2", Some("<2.0.0"), None)]);
    let options = ResolveOptions {
        exact_override: Some("2.4.0".to_string()),
        ..Default::default()
    };
    let plan = builder.build("acme", Some(&channel), &options).await.unwrap();

    let step = &plan.package_steps()[0];
    let (version, provenance) = resolved(&step.outcome);
    assert_eq!(version, "2.4.0");
    assert_eq!(provenance, VersionProvenance::ExactOverride);
    assert!(matches!(
        step.verdict,
        Some(RuleVerdict::Fail { ref rule, .. }) if rule == "pre-2"
    ));
}

#[tokio::test]
async fn test_ambiguous_rules_abort_validation() {
    let source = workspace(
        vec![step("Deploy Web", vec![package_ref("web", "Foo", "F", None)])],
        vec![candidate("Foo", "2.0.0", 10)],
    );
    let feeds = RecordingFeed::new(source.clone());
    let tester = SemverRuleTester;
    let builder = ReleasePlanBuilder::new(&source, &feeds, &tester);

    let channel = channel(vec![
        rule("broad", Some(">=1.0.0"), None),
        rule("also-broad", Some(">=1.0.0"), None),
    ]);
    let err = builder
        .build("acme", Some(&channel), &ResolveOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::AmbiguousRule { .. }));
}

#[tokio::test]
async fn test_no_channel_leaves_steps_unconstrained() {
    let source = workspace(
        vec![step("Deploy Web", vec![package_ref("web", "Foo", "F", None)])],
        vec![candidate("Foo", "2.0.0", 10)],
    );
    let feeds = RecordingFeed::new(source.clone());
    let tester = SemverRuleTester;
    let builder = ReleasePlanBuilder::new(&source, &feeds, &tester);

    let plan = builder.build("acme", None, &ResolveOptions::default()).await.unwrap();
    assert_eq!(plan.package_steps()[0].verdict, Some(RuleVerdict::Unconstrained));
}

#[tokio::test]
async fn test_cascade_is_deterministic() {
    let source = workspace(
        vec![
            step("Deploy Web", vec![package_ref("web", "Foo", "F", None)]),
            step("Deploy Api", vec![package_ref("api", "Bar", "F", None)]),
        ],
        vec![
            candidate("Foo", "2.0.0", 10),
            candidate("Foo", "1.9.0", 8),
            candidate("Bar", "0.5.0-rc.1", 3),
        ],
    );
    let tester = SemverRuleTester;
    let options = ResolveOptions {
        tag_fallbacks: Some("rc".to_string()),
        ..Default::default()
    };

    let mut outcomes = Vec::new();
    for _ in 0..2 {
        let feeds = RecordingFeed::new(source.clone());
        let builder = ReleasePlanBuilder::new(&source, &feeds, &tester);
        let plan = builder.build("acme", None, &options).await.unwrap();
        outcomes.push(
            plan.package_steps()
                .iter()
                .map(|s| s.outcome.clone())
                .collect::<Vec<_>>(),
        );
    }
    assert_eq!(outcomes[0], outcomes[1]);
}
