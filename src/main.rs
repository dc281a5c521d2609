use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use firestore_dashboard_api::{
    auth, config,
    firestore::FirestoreClient,
    routes,
    services::DashboardService,
};

/// Firestore-backed JSON datasource for dashboards
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Port to listen on (overrides API_PORT / PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Address to bind (overrides BIND_ADDRESS)
    #[arg(long)]
    bind: Option<String>,

    /// Load environment from this file instead of ./.env
    #[arg(long)]
    env_file: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load .env before the config singleton reads the environment
    match &cli.env_file {
        Some(path) => {
            dotenvy::from_path(path).with_context(|| format!("failed to load {}", path.display()))?;
        }
        None => {
            let _ = dotenvy::dotenv();
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .init();

    let config = config::config();
    tracing::info!("Starting Firestore dashboard API in {:?} mode", config.environment);

    if config.firestore.project_id.is_empty() {
        bail!("PROJECT_ID must be set");
    }

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.firestore.timeout_secs.max(1)))
        .build()
        .context("failed to build HTTP client")?;

    let tokens = auth::find_default_credentials(&config.credentials, http.clone())
        .context("failed to find default credentials")?;
    let client = FirestoreClient::with_http(&config.firestore, http, tokens)?;
    tracing::info!(
        "Querying project {} database {}",
        client.project_id(),
        client.database_id()
    );

    let service = DashboardService::new(client, config.collections.clone());
    let app = routes::app(service, &config.security);

    let bind_address = cli.bind.unwrap_or_else(|| config.server.bind_address.clone());
    let port = cli.port.unwrap_or(config.server.port);
    let bind_addr = format!("{}:{}", bind_address, port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Server is running on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
