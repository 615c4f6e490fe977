use anyhow::Context;
use chrono::NaiveDate;
use clap::Parser;
use extractor_lib::process_edition;
use newsdesk_core::config::{database_url, ObjectStoreConfig, TuningConfig};
use newsdesk_core::objectstore::ObjectStore;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "extractor", about = "Converts raw edition blobs into canonical Articles")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Extracts, normalizes, and upserts Articles for one publication/date.
    Process {
        #[arg(long)]
        publication: String,
        #[arg(long)]
        date: String,
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
            error!(error = %e, "extractor run failed");
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
        Command::Process { publication, date, force } => cmd_process(&publication, &date, force).await,
    }
}

async fn cmd_process(publication_slug: &str, date: &str, force: bool) -> anyhow::Result<()> {
    let edition_date = NaiveDate::parse_from_str(date, "%Y-%m-%d").context("--date must be YYYY-MM-DD")?;

    let pool = newsdesk_core::db::connect(&database_url()?).await?;
    let object_cfg = ObjectStoreConfig::from_env()?;
    let store = ObjectStore::connect(&object_cfg).await?;

    let report = process_edition(&pool, &store, publication_slug, edition_date, force).await?;

    println!("{}", serde_json::to_string_pretty(&ReportView::from(&report))?);
    info!(
        publication = publication_slug,
        date,
        found = report.found,
        new = report.new,
        duplicate = report.duplicate,
        failed = report.failed,
        "extractor run complete"
    );
    Ok(())
}

#[derive(serde::Serialize)]
struct ReportView {
    found: i32,
    new: i32,
    duplicate: i32,
    failed: i32,
}

impl From<&newsdesk_core::models::ProcessingReport> for ReportView {
    fn from(r: &newsdesk_core::models::ProcessingReport) -> Self {
        Self {
            found: r.found,
            new: r.new,
            duplicate: r.duplicate,
            failed: r.failed,
        }
    }
}
