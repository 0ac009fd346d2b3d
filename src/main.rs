use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use vpcgraph::errors::{RunError, UNKNOWN_ERROR};
use vpcgraph::fetcher::{ResourceFetcher, SnapshotFetcher};
use vpcgraph::plan_execution;

#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    #[clap(short, long, global = true)]
    log_level: Option<String>,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the inventory named by a plan and write its exports
    Run {
        #[clap(short, long)]
        plan: PathBuf,
    },
    /// Write a starter plan
    Init {
        #[clap(short, long)]
        plan: PathBuf,
    },
    /// List the regions held by an inventory snapshot
    Regions {
        #[clap(short, long)]
        snapshot: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Cli::parse();
    setup_logging(&args.log_level);

    match run(args.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {}", "ERROR:".red().bold(), err);
            let code = err
                .downcast_ref::<RunError>()
                .map(RunError::exit_code)
                .unwrap_or(UNKNOWN_ERROR);
            ExitCode::from(code)
        }
    }
}

async fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Run { plan } => {
            info!("Running plan: {}", plan.display());
            let cancel = CancellationToken::new();
            let interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupt received, stopping after merged regions");
                    interrupt.cancel();
                }
            });

            let report = plan_execution::execute_plan(&plan, cancel).await?;
            for failure in &report.failed_regions {
                warn!("Region {} skipped: {}", failure.region, failure.reason);
            }
            info!(
                "{} (pairs evaluated: {}, routed: {}, permitted without route: {})",
                report.graph.stats(),
                report.stats.pairs_evaluated,
                report.stats.routed_pairs,
                report.stats.permitted_unrouted_pairs
            );
            if report.cancelled {
                return Err(RunError::Interrupted.into());
            }
        }
        Commands::Init { plan } => {
            info!("Initializing plan: {}", plan.display());
            plan_execution::init_plan(&plan).map_err(RunError::from)?;
        }
        Commands::Regions { snapshot } => {
            let fetcher = SnapshotFetcher::from_file(&snapshot).map_err(RunError::from)?;
            for region in fetcher.list_regions().await.map_err(RunError::from)? {
                let inventory = fetcher.fetch_region(&region).await.map_err(RunError::from)?;
                println!(
                    "{}\t{} VPCs, {} route tables, {} security groups",
                    region,
                    inventory.vpcs.len(),
                    inventory.route_tables.len(),
                    inventory.security_groups.len()
                );
            }
        }
    }

    Ok(())
}

fn setup_logging(log_level: &Option<String>) {
    let log_level = match log_level
        .as_ref()
        .unwrap_or(&"info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!("handlebars=off,{}", log_level)))
        .without_time()
        .init();
}
