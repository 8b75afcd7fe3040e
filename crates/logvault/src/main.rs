mod api;
mod auth;
mod telemetry;

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use logvault_core::config::Config;
use logvault_store::Store;

#[derive(Parser, Debug)]
#[command(name = "logvault")]
#[command(about = "CSV log ingest and query service")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Run the HTTP API server")]
    Run {
        #[arg(long)]
        db_path: Option<PathBuf>,
        #[arg(long)]
        http_addr: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run { db_path, http_addr } => run(db_path, http_addr).await,
    }
}

async fn run(db_path: Option<PathBuf>, http_addr: Option<String>) -> anyhow::Result<()> {
    let mut cfg = Config::load().context("load configuration")?;
    if let Some(path) = db_path {
        cfg.db_path = path;
    }
    if let Some(addr) = http_addr {
        cfg.http_addr = addr;
    }

    let addr: SocketAddr = cfg
        .http_addr
        .parse()
        .with_context(|| format!("invalid http_addr: {}", cfg.http_addr))?;

    let store = Store::open(&cfg.db_path).context("open store")?;
    let app = api::router(store, &cfg);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("bind http listener")?;
    tracing::info!(addr = %addr, db_path = %cfg.db_path.display(), "logvault listening");

    axum::serve(listener, app).await.context("serve http")?;
    Ok(())
}
