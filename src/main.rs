use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use dataset_summary::domain::trigger::TriggerRecord;
use dataset_summary::infrastructure::bootstrap::build_pipeline;
use dataset_summary::infrastructure::config::AppConfig;
use dataset_summary::interfaces::http::start_server;

#[derive(Parser, Debug)]
#[command(name = "dataset-summary")]
#[command(about = "Profile tabular objects and write narrative, JSON and statistics summaries")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to ./dataset-summary.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve POST /events and GET /health
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<u16>,
    },

    /// Process a single object and exit
    Run {
        #[arg(long)]
        bucket: String,

        /// Object key, already decoded
        #[arg(long)]
        key: String,
    },
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    let pipeline = build_pipeline(&config).context("failed to initialise pipeline")?;

    match cli.command {
        Command::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            start_server(pipeline, &host, port)
                .with_context(|| format!("failed to bind {}:{}", host, port))?
                .await
                .context("HTTP server stopped with an error")?;
        }
        Command::Run { bucket, key } => {
            let report = pipeline.execute(&TriggerRecord::new(bucket, key)).await?;
            info!(outputs = ?report.output_keys, "Run finished");
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
