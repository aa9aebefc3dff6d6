//! Skills Pulse API server binary.
//!
//! Loads configuration from the environment (and `.env`), seeds credentials,
//! starts the idle-session sweeper and serves the HTTP API until Ctrl-C.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use pulse_api::config::ApiConfig;
use pulse_api::sweeper::spawn_session_sweeper;
use pulse_core::clock::system_clock;
use pulse_core::seed::load_seed_file;
use tracing::{info, warn};

/// CLI arguments for the API server.
#[derive(Parser, Debug)]
#[command(name = "pulse_api_server", about = "Skills Pulse API server")]
struct Args {
    /// Port to listen on; overrides the port of `BIND_ADDR`.
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// YAML credential seed file.
    #[arg(long, env = "CREDENTIALS_FILE")]
    credentials_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,pulse_api=debug,pulse_core=debug".into()),
        )
        .init();

    let args = Args::parse();

    let mut config = ApiConfig::from_env()?;
    if let Some(port) = args.port {
        let host = config
            .bind_addr
            .rsplit_once(':')
            .map_or("127.0.0.1", |(host, _)| host)
            .to_string();
        config.bind_addr = format!("{host}:{port}");
    }
    if args.credentials_file.is_some() {
        config.credentials_file = args.credentials_file;
    }

    let state = pulse_api::AppState::new(config.clone(), system_clock());

    match &config.credentials_file {
        Some(path) => {
            let records = load_seed_file(path)?;
            let count = records.len();
            for record in records {
                state.auth.upsert_credential(record)?;
            }
            info!(path = %path.display(), count, "credentials seeded");
        }
        None => warn!("no CREDENTIALS_FILE configured; only self-registered users can log in"),
    }

    let sweeper = spawn_session_sweeper(Arc::clone(&state.auth), config.sweep_interval);
    let app = pulse_api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    let local_addr = listener.local_addr()?;
    info!(addr = %local_addr, "REST API listening");

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await;

    sweeper.abort();
    result?;
    Ok(())
}
