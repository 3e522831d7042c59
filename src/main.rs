use axum::http::HeaderValue;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use starknet_balance_agent::{
    api,
    config::{Config, ConfigSource, StarknetConfig},
    constants::API_VERSION,
    services::onchain::StarknetContext,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "starknet_balance_agent=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    config.validate()?;

    tracing::info!("Starting agent {} v{}", config.agent_name, config.agent_version);
    tracing::info!("API Version: {}", API_VERSION);
    if config.payments_enabled() {
        tracing::info!("Payments configuration enabled");
    }

    // Starknet settings are read per request; a missing value only fails the balance path
    if let Err(err) = StarknetConfig::from_env() {
        tracing::warn!("Starknet balance lookups unavailable until configured: {}", err);
    }

    let app_state = api::AppState::new(config.clone(), StarknetContext::new(ConfigSource::Env))?;
    let app = build_router(app_state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(state: api::AppState) -> Router {
    let cors = cors_from_config(&state.config);

    Router::new()
        .route("/health", get(api::health::health_check))
        .route(
            "/.well-known/agent.json",
            get(api::entrypoints::get_manifest),
        )
        .route("/entrypoints", get(api::entrypoints::list_entrypoints))
        .route(
            "/entrypoints/{key}/invoke",
            post(api::entrypoints::invoke_entrypoint),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_from_config(config: &Config) -> CorsLayer {
    let raw = config.cors_allowed_origins.trim();
    if raw.is_empty() || raw == "*" {
        return CorsLayer::very_permissive();
    }

    let allowed: Vec<HeaderValue> = raw
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<HeaderValue>().ok())
        .collect();

    if allowed.is_empty() {
        tracing::warn!("No valid CORS origins parsed; falling back to permissive");
        return CorsLayer::very_permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}
