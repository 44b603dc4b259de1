pub mod cli;
pub mod html;
pub mod manage;
pub mod state;
pub mod view;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use caseboard_core::config::{Config, Credentials};
use caseboard_core::rest::RestSheet;
use clap::Parser;
use tracing::{info, warn};

use crate::state::AppState;

pub fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    cli::init_tracing(cli.verbose, cli.quiet)?;

    let mut config =
        Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(listen) = cli.listen {
        config.listen = listen;
    }
    config.require_spreadsheet_id()?;

    // credentials.json lives next to an explicit config file, else in
    // the working directory.
    let creds_dir = cli
        .config
        .as_deref()
        .and_then(Path::parent)
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let credentials = Credentials::load(creds_dir)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(serve(config, credentials))
}

async fn serve(config: Config, credentials: Credentials) -> anyhow::Result<()> {
    let backend = Arc::new(RestSheet::new(
        config.base_url.clone(),
        config.spreadsheet_id.clone(),
        config.worksheet.clone(),
        credentials.token.clone(),
    ));
    let state = AppState::new(backend, config.cache_ttl(), config.logo_path.clone());

    let listener = tokio::net::TcpListener::bind(&config.listen)
        .await
        .with_context(|| format!("failed to bind {}", config.listen))?;
    info!(
        listen = %listener.local_addr().context("listener has no local addr")?,
        worksheet = %config.worksheet,
        "caseboard serving"
    );

    axum::serve(listener, router(state)).await?;
    Ok(())
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/logo", get(logo))
        .route("/clients", get(view::clients))
        .route("/manage", get(manage::manage))
        .route("/manage/update", post(manage::update))
        .route("/manage/add", post(manage::add))
        .with_state(state)
}

async fn root() -> Redirect {
    Redirect::to("/clients")
}

async fn health() -> &'static str {
    "ok"
}

async fn logo(State(state): State<AppState>) -> Response {
    match tokio::fs::read(&state.logo_path).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, "image/jpeg")], bytes).into_response(),
        Err(err) => {
            warn!(logo = %state.logo_path.display(), error = %err, "logo read failed");
            StatusCode::NOT_FOUND.into_response()
        }
    }
}
