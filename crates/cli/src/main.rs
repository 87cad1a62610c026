//! Initial Resources Estimator CLI
//!
//! A command-line tool for querying historical usage percentiles from the
//! metrics backend, the same estimates admission control consults when it
//! defaults resource requests for new workloads.

mod config;
mod output;

use anyhow::Result;
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use estimator_lib::{ResourceKind, UsageSource};
use tracing_subscriber::EnvFilter;

/// Initial Resources Estimator CLI
#[derive(Parser)]
#[command(name = "ire")]
#[command(author, version, about = "CLI for the Initial Resources Estimator", long_about = None)]
pub struct Cli {
    /// Backend endpoint URI (can also be set via IRE_BACKEND_URL env var)
    #[arg(long, env = "IRE_BACKEND_URL")]
    pub backend_url: Option<String>,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Estimate historical usage for a container image
    Estimate {
        /// Resource kind to estimate
        #[arg(long, value_enum)]
        kind: KindArg,

        /// Container image (repository[:tag])
        #[arg(long)]
        image: String,

        /// Percentile rank in (0, 100]
        #[arg(long, default_value_t = 90)]
        percentile: i64,

        /// Length of the sampling window in days, ending now
        #[arg(long, default_value_t = 7)]
        days: i64,

        /// Namespace the workload will run in
        #[arg(long, short, default_value = "default")]
        namespace: String,

        /// Require the exact image tag instead of any tag on the repository
        #[arg(long)]
        exact: bool,
    },
}

/// Resource kind argument
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindArg {
    Cpu,
    Memory,
}

impl From<KindArg> for ResourceKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Cpu => ResourceKind::Cpu,
            KindArg::Memory => ResourceKind::Memory,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let backend_url = match &cli.backend_url {
        Some(url) => url.clone(),
        None => config::Config::load()?
            .backend_url
            .unwrap_or_else(|| "http://localhost:8080".to_string()),
    };

    match cli.command {
        Commands::Estimate {
            kind,
            image,
            percentile,
            days,
            namespace,
            exact,
        } => {
            let source = UsageSource::from_uri(&backend_url)?;
            let end = Utc::now();
            let start = end - Duration::days(days);

            match source
                .get_usage_percentile(kind.into(), percentile, &image, &namespace, exact, start, end)
                .await
            {
                Ok(estimate) => {
                    output::print_estimate(kind.into(), &image, percentile, &estimate, cli.format)
                }
                Err(e) => {
                    output::print_error(&e.to_string());
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
