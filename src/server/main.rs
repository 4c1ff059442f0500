//! Location map server.
//!
//! Serves the role-gated views and JSON API. Boundary and location loading
//! run in the background so the server accepts requests immediately.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use geocerca::api::{router, spawn_session_purge, AppState};
use geocerca::auth::EnvCredential;
use geocerca::chat::ChatClient;
use geocerca::config::Config;

#[derive(Parser, Debug)]
#[command(name = "server")]
#[command(about = "Role-gated location map server")]
struct Args {
    /// TOML config file; defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address (overrides the config file)
    #[arg(short, long)]
    listen: Option<String>,

    #[arg(long, env = "ADMIN_USER")]
    admin_user: Option<String>,

    #[arg(long, env = "ADMIN_PASS", hide_env_values = true)]
    admin_pass: Option<String>,

    #[arg(long, env = "SUPERUSER_USER")]
    superuser_user: Option<String>,

    #[arg(long, env = "SUPERUSER_PASS", hide_env_values = true)]
    superuser_pass: Option<String>,

    /// Key for the text-generation service behind /api/chat
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    gemini_api_key: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::default(),
    };
    if let Some(listen) = args.listen {
        config.server.listen = listen;
    }

    info!("Geocerca Server");
    info!("Boundary: {}", config.data.boundary.display());
    info!("Locations: {}", config.data.locations.display());

    let mut state = AppState::new(
        &config,
        EnvCredential::from_parts(args.admin_user, args.admin_pass),
        EnvCredential::from_parts(args.superuser_user, args.superuser_pass),
    )
    .await;
    match args.gemini_api_key {
        Some(key) => {
            let client =
                ChatClient::new(&config.chat, key).context("Failed to build chat client")?;
            state = state.with_chat(client);
            info!("Chat enabled with model {}", config.chat.model);
        }
        None => warn!("GEMINI_API_KEY is not set, /api/chat will answer with an error"),
    }
    let state = Arc::new(state);

    spawn_session_purge(
        Arc::clone(&state),
        Duration::from_secs(config.server.session_purge_seconds.max(1)),
    );

    // Boundary first, then the initial rebuild; readers fall back to a lazy reload
    let locations = Arc::clone(&state.locations);
    tokio::spawn(async move { locations.start().await });

    let app = router(state);

    info!("Starting server on http://{}", config.server.listen);

    let listener = tokio::net::TcpListener::bind(&config.server.listen)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.listen))?;
    axum::serve(listener, app).await?;

    Ok(())
}
