// Path: crates/cli/src/main.rs
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
        clippy::indexing_slicing
    )
)]

//! # Chain-Link CLI
//!
//! Deploys the chain-link application to a Kubernetes cluster, checks that it
//! came up, or renders it to YAML for review.

use anyhow::Result;
use chainlink_cli::commands::{deploy, dry_run, generate, validate};
use chainlink_cli::config::{config_path, CliConfig, ConfigOverrides};
use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[clap(
    name = "chain-link",
    version,
    about = "Deploy the chain-link application to a Kubernetes cluster."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,

    /// Number of instances to deploy.
    #[clap(long, global = true)]
    instances: Option<usize>,

    /// Namespace to deploy to.
    #[clap(long, global = true)]
    namespace: Option<String>,

    /// ChainLink image to deploy.
    #[clap(long, global = true)]
    chain_link_image: Option<String>,

    /// Time to sleep between loadgenerator requests, in seconds.
    #[clap(long, global = true)]
    sleep_time: Option<u64>,

    /// Path to the config file.
    #[clap(long, global = true)]
    config_file: Option<String>,

    /// Print lots of debugging statements.
    #[clap(short, long, global = true)]
    debug: bool,

    /// Be verbose.
    #[clap(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Deploy chain-link to Kubernetes.
    Deploy,

    /// Validate a deployed chain-link.
    Validate,

    /// Generate chain-link kubernetes yaml.
    Generate(generate::GenerateArgs),

    /// Show what would be deployed.
    DryRun,
}

impl Cli {
    fn log_level(&self) -> &'static str {
        if self.debug {
            "debug"
        } else {
            // -v and the default both log at info.
            "info"
        }
    }

    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            instances: self.instances,
            namespace: self.namespace.clone(),
            chain_link_image: self.chain_link_image.clone(),
            sleep_time: self.sleep_time,
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let path = config_path(cli.config_file.as_deref());
    let config = CliConfig::resolve(&path, &cli.overrides())?;
    config.log();

    match &cli.command {
        Commands::Deploy => deploy::run(&config).await,
        Commands::Validate => validate::run(&config).await,
        Commands::Generate(args) => generate::run(&config, args).map(drop),
        Commands::DryRun => dry_run::run(),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = chainlink_telemetry::init::init_cli_tracing(cli.log_level()) {
        eprintln!("error: failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
