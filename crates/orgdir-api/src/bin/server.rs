//! orgdir API server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), builds the HTTP
//! directory client, and serves the JSON API under `/api`.
//!
//! Settings can be overridden from the environment with the `ORGDIR_`
//! prefix, e.g. `ORGDIR_DIRECTORY__ENDPOINT=https://...`.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use orgdir_api::AppState;
use orgdir_client::HttpDirectory;
use orgdir_core::{current_user::NoCurrentUser, settings::Settings};
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "orgdir organisation directory API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Debug, Clone, Deserialize)]
struct ServerConfig {
  host:      String,
  port:      u16,
  directory: Settings,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("ORGDIR").separator("__"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Build the directory client; settings are validated here, before any
  // network traffic.
  let dir = HttpDirectory::new(server_cfg.directory.clone())
    .context("failed to build directory client")?;

  let state = AppState {
    dir:         Arc::new(dir),
    user_source: Arc::new(NoCurrentUser),
  };

  let app = axum::Router::new()
    .nest("/api", orgdir_api::api_router(state))
    .layer(TraceLayer::new_for_http());

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
