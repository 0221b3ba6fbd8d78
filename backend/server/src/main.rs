//! Oshiome backend — entry point.
//!
//! Exposes the campaign REST API: browsing campaigns with computed
//! funding progress, registering campaigns, contributions via a hosted
//! checkout flow (one-shot verification + gateway webhook), and admin
//! moderation of the campaign lifecycle.

mod api;
mod config;
mod db;
mod errors;
mod gateway;

use std::sync::Arc;

use axum::{
    routing::{get, patch, post},
    Router,
};
use reqwest::Client;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging (RUST_LOG controls verbosity).
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Load optional .env file (ignored if missing).
    let _ = dotenvy::dotenv();

    // Load config from environment.
    let config = Config::from_env().map_err(|e| anyhow::anyhow!("{e}"))?;

    // Set up the SQLite connection pool and run migrations.
    let pool = db::init_pool(&config.database_url).await?;

    // HTTP client for outbound gateway calls.
    let client = Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()?;

    let api_port = config.api_port;
    let state = Arc::new(api::ApiState {
        pool,
        config,
        client,
    });

    let app = Router::new()
        .route("/health", get(api::health))
        .route("/campaigns", get(api::list_campaigns).post(api::create_campaign))
        .route("/campaigns/:id", get(api::get_campaign))
        .route("/campaigns/:id/status", patch(api::update_campaign_status))
        .route(
            "/campaigns/:id/contributions",
            get(api::list_contributions).post(api::create_contribution),
        )
        .route("/payments/verify", get(api::verify_payment))
        .route("/webhooks/payment", post(api::payment_webhook))
        .route("/users", post(api::create_user))
        .route("/users/:id/campaigns", get(api::my_campaigns))
        .route("/users/:id/supported", get(api::supported_campaigns))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{api_port}");
    info!("API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
