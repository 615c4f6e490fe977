use anyhow::Context;
use clap::Parser;
use llm_client::GatewayClient;
use newsdesk_core::config::{database_url, LlmGatewayConfig, TuningConfig};
use std::process::ExitCode;
use summarizer_lib::{build_app, run_batch, WorkerConfig};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "summarizer", about = "Summarizes extracted Articles and serves the feed API")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Runs one summarization batch and exits.
    Batch {
        #[arg(long, default_value_t = 50)]
        batch_size: i64,
        #[arg(long, default_value_t = 4)]
        max_concurrent: usize,
        #[arg(long, default_value_t = false)]
        no_embeddings: bool,
    },
    /// Starts the HTTP feed/search/analytics API.
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
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
            error!(error = %e, "summarizer run failed");
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
        Command::Batch { batch_size, max_concurrent, no_embeddings } => {
            cmd_batch(batch_size, max_concurrent, !no_embeddings).await
        }
        Command::Serve { port } => cmd_serve(port).await,
    }
}

async fn cmd_batch(batch_size: i64, max_concurrent: usize, compute_embeddings: bool) -> anyhow::Result<()> {
    let pool = newsdesk_core::db::connect(&database_url()?).await?;
    let gateway_cfg = LlmGatewayConfig::from_env()?;
    let gateway = GatewayClient::new(&gateway_cfg);

    let cfg = WorkerConfig {
        batch_size,
        max_concurrent,
        compute_embeddings,
        ..WorkerConfig::default()
    };

    let outcome = run_batch(&pool, &gateway, cfg).await?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    info!(processed = outcome.processed, failed = outcome.failed, "summarizer batch run complete");
    Ok(())
}

async fn cmd_serve(port: u16) -> anyhow::Result<()> {
    let pool = newsdesk_core::db::connect(&database_url()?).await?;
    let app = build_app(pool);

    let addr = format!("0.0.0.0:{port}");
    info!(addr = %addr, "starting summarizer API");
    let listener = tokio::net::TcpListener::bind(&addr).await.context("failed to bind address")?;
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
