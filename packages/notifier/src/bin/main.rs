use anyhow::Context;
use chrono::NaiveDate;
use clap::Parser;
use newsdesk_core::config::{database_url, NotifierConfig, TuningConfig};
use notifier_lib::send_digest;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "notifier", about = "Composes and pushes the daily digest")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Sends the digest for one edition date.
    Send {
        #[arg(long)]
        date: String,
        #[arg(long)]
        top_n: Option<i64>,
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let tuning = TuningConfig::from_env();
    newsdesk_core::telemetry::init(&tuning.log_level);

    match run(cli).await {
        Ok(()) => ExitCode::from(0),
        Err(e) => {
            error!(error = %e, "notifier run failed");
            ExitCode::from(exit_code_for(&e))
        }
    }
}

fn exit_code_for(e: &anyhow::Error) -> u8 {
    if let Some(pe) = e.downcast_ref::<newsdesk_core::PipelineError>() {
        pe.exit_code() as u8
    } else {
        1
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Send { date, top_n, force } => cmd_send(&date, top_n, force).await,
    }
}

async fn cmd_send(date: &str, top_n: Option<i64>, force: bool) -> anyhow::Result<()> {
    let edition_date = NaiveDate::parse_from_str(date, "%Y-%m-%d").context("--date must be YYYY-MM-DD")?;

    let pool = newsdesk_core::db::connect(&database_url()?).await?;
    let cfg = NotifierConfig::from_env()?;

    let outcome = send_digest(&pool, &cfg, edition_date, top_n, force).await?;

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    info!(date, posted = outcome.posted, count = outcome.count, "notifier run complete");
    Ok(())
}
