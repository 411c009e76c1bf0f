//! Command execution for the CLI.

use tracing::info;

use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::services::dispatcher::{self, AutoDispatch, DispatchReport};
use crate::services::Recommendation;
use crate::tools::{self, ToolDefinition};
use crate::{api, AppState, Result};

pub async fn run(cli: Cli, config: &Config) -> Result<()> {
    let state = AppState::new(config);
    let ctx = state.cli_context(cli.overrides());

    match &cli.command {
        Commands::Single {
            job_uid,
            preferred_date,
        } => {
            let report = state
                .dispatcher
                .dispatch_job(&ctx, job_uid, preferred_date.as_deref())
                .await?;
            print_report(&report);
        }
        Commands::Batch {
            job_uids,
            no_optimize,
        } => {
            let report = state
                .dispatcher
                .batch_dispatch(&ctx, job_uids, !no_optimize)
                .await?;
            print_report(&report);
        }
        Commands::Auto => match state.dispatcher.auto_dispatch(&ctx).await? {
            AutoDispatch::NoUnassigned { total } => {
                println!("No unassigned jobs found ({} job(s) checked)", total);
            }
            AutoDispatch::Single { job_uid, report } => {
                println!("Dispatching the only unassigned job: {}", job_uid);
                print_report(&report);
            }
            AutoDispatch::Batch { job_uids, report } => {
                println!("Dispatching {} unassigned jobs", job_uids.len());
                print_report(&report);
            }
        },
        Commands::Preferences { job_uid, .. } => {
            let prefs = cli.command.preferences().unwrap_or_default();
            let report = state
                .dispatcher
                .dispatch_with_preferences(&ctx, job_uid, &prefs)
                .await?;
            print_report(&report);
        }
        Commands::Rank { job_uid } => {
            let recommendation = dispatcher::recommend(&ctx, job_uid.as_deref()).await?;
            print_recommendation(&recommendation);
        }
        Commands::Tools { agent } => {
            let listed: Vec<&ToolDefinition> = if *agent {
                tools::agent_catalog()
            } else {
                tools::catalog().iter().collect()
            };
            print_catalog(&listed);
        }
        Commands::Serve { host, port } => {
            let host = host.clone().unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            info!(%host, port, "Starting server");
            api::serve(state, &host, port).await?;
        }
    }

    Ok(())
}

fn print_report(report: &DispatchReport) {
    println!("{}", report.text);
    println!();
    println!("Steps: {}", report.steps);
    if !report.tool_calls.is_empty() {
        println!("Tool calls: {}", report.tool_calls.join(", "));
    }
    println!("Assigned: {}", if report.assigned { "yes" } else { "no" });
}

fn print_recommendation(recommendation: &Recommendation) {
    println!("Job: {} ({})", recommendation.job.label(), recommendation.job.job_uid);
    println!(
        "Recommended: {} ({}) score {} with {} current job(s)",
        recommendation.top.user.full_name(),
        recommendation.top.user.user_uid,
        recommendation.top.score,
        recommendation.top.workload,
    );
    for alternative in &recommendation.alternatives {
        println!(
            "  Alternative: {} ({}) score {}",
            alternative.user.full_name(),
            alternative.user.user_uid,
            alternative.score,
        );
    }
}

fn print_catalog(listed: &[&ToolDefinition]) {
    let width = listed.iter().map(|t| t.name.len()).max().unwrap_or(0);
    for tool in listed {
        println!("{:<width$}  [{}] {}", tool.name, tool.category, tool.description, width = width);
    }
    println!();
    println!("{} tool(s)", listed.len());
}
