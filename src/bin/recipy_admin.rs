use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use recipy_server::{
    config::AppConfig,
    db::connection,
    logging::init_tracing,
    services::{ServiceContext, demo_service::DemoWipe},
};

/// Maintenance commands for a recipy deployment.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the demo account if it does not exist yet
    CreateDemoUser,
    /// Delete every recipe owned by the demo account
    ClearDemoData,
}

/// What a command prints, and where.
#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Done(String),
    Failed(String),
}

impl Outcome {
    fn report(self) -> ExitCode {
        match self {
            Outcome::Done(message) => {
                println!("{message}");
                ExitCode::SUCCESS
            }
            Outcome::Failed(message) => {
                eprintln!("{message}");
                ExitCode::FAILURE
            }
        }
    }
}

impl From<DemoWipe> for Outcome {
    fn from(wipe: DemoWipe) -> Self {
        match wipe {
            DemoWipe::Cleared { .. } => Outcome::Done(wipe.message()),
            DemoWipe::MissingUser => Outcome::Failed(wipe.message()),
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let cfg = AppConfig::from_env()?;
    init_tracing(&cfg.logging.rust_log);

    let db_cfg = cfg
        .database
        .as_ref()
        .context("database config is required (set APP_DATABASE__URL)")?;
    let db = connection::connect(db_cfg).await?;
    let demo = ServiceContext::new(&db).demo(&cfg.demo);

    let outcome = match cli.command {
        Commands::CreateDemoUser => {
            Outcome::Done(demo.ensure_demo_user().await?.message().to_string())
        }
        Commands::ClearDemoData => demo.clear_demo_data().await?.into(),
    };
    Ok(outcome.report())
}
