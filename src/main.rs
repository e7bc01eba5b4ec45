// src/main.rs

use anyhow::Result;
use capstan::{JsonSource, ReleasePlanBuilder, ResolveOptions, RuleVerdict, SemverRuleTester};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "capstan")]
#[command(author, version, about = "Release planner with channel-aware package version resolution", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a release plan for a project
    Plan {
        /// Path to the workspace document (projects, feeds, channels)
        #[arg(short, long, default_value = "capstan.json")]
        workspace: PathBuf,
        /// Project to plan a release for
        project: String,
        /// Channel whose rules constrain the release
        #[arg(short, long)]
        channel: Option<String>,
        /// Primary pre-release tag filter
        #[arg(long)]
        tag: Option<String>,
        /// Comma-separated fallback tags tried after the primary
        #[arg(long)]
        tag_fallbacks: Option<String>,
        /// Exact version to try first for every unresolved step
        #[arg(long)]
        exact_version: Option<String>,
        /// Select by publish date instead of version order
        #[arg(long)]
        latest_by_publish: bool,
        /// Emit the plan as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Plan {
            workspace,
            project,
            channel,
            tag,
            tag_fallbacks,
            exact_version,
            latest_by_publish,
            json,
        } => {
            let source = JsonSource::load(&workspace)?;

            let channel = match channel {
                Some(ref name) => Some(source.channel(name).ok_or_else(|| {
                    anyhow::anyhow!("Channel '{}' not found in workspace", name)
                })?),
                None => None,
            };

            let options = ResolveOptions {
                exact_override: exact_version,
                pre_release_tag: tag,
                tag_fallbacks,
                prefer_latest_by_publish: latest_by_publish,
            };

            info!("Planning release for project '{}'", project);
            let tester = SemverRuleTester;
            let builder = ReleasePlanBuilder::new(&source, &source, &tester);
            let plan = builder.build(&project, channel, &options).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                print_plan(&plan);
            }
            Ok(())
        }
    }
}

fn print_plan(plan: &capstan::ReleasePlan) {
    println!("Release plan for project '{}'", plan.project);
    if let Some(ref channel) = plan.channel {
        println!("Channel: {}", channel);
    }

    for step in plan.package_steps() {
        let version = match step.outcome {
            Some(capstan::ResolutionOutcome::Resolved {
                ref version,
                provenance,
            }) => format!("{} ({})", version, provenance),
            Some(capstan::ResolutionOutcome::Unresolved { ref reason }) => {
                format!("UNRESOLVED: {}", reason)
            }
            None => "UNRESOLVED".to_string(),
        };
        let verdict = match step.verdict {
            Some(RuleVerdict::Pass { ref rule }) => format!("pass ({})", rule),
            Some(RuleVerdict::Fail { ref rule, ref detail }) => {
                format!("FAIL ({}): {}", rule, detail)
            }
            Some(RuleVerdict::Unconstrained) => "unconstrained".to_string(),
            Some(RuleVerdict::NotTested) => "not tested".to_string(),
            None => "-".to_string(),
        };
        println!(
            "  {} / {} [{}] -> {} | rules: {}",
            step.action, step.package_reference, step.package_id, version, verdict
        );
    }
}
