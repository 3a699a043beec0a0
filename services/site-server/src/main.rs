use anyhow::Context;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use cd_api_types::DappConfig;
use serde::Serialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

#[derive(Debug, Serialize)]
struct HealthResponse {
    service: &'static str,
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct VersionResponse {
    service: &'static str,
    version: &'static str,
}

#[derive(Clone)]
struct AppState {
    dapp_config: Arc<DappConfig>,
}

/// Runtime settings, read from the environment at startup.
///
/// `SITE_ADDR` (default `0.0.0.0:3000`) and `SITE_DIST_DIR` (default
/// `ui/dapp-wasm`, the directory holding `index.html` and the wasm bundle).
#[derive(Debug, Clone, PartialEq, Eq)]
struct ServerConfig {
    addr: SocketAddr,
    dist_dir: PathBuf,
}

impl ServerConfig {
    fn from_env() -> anyhow::Result<Self> {
        Self::from_values(
            std::env::var("SITE_ADDR").ok(),
            std::env::var("SITE_DIST_DIR").ok(),
        )
    }

    fn from_values(addr: Option<String>, dist_dir: Option<String>) -> anyhow::Result<Self> {
        let addr = addr.unwrap_or_else(|| "0.0.0.0:3000".to_owned());
        let addr = addr
            .parse::<SocketAddr>()
            .with_context(|| format!("invalid SITE_ADDR `{addr}`"))?;
        let dist_dir = dist_dir
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| "ui/dapp-wasm".to_owned());

        Ok(Self {
            addr,
            dist_dir: PathBuf::from(dist_dir),
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let server = ServerConfig::from_env()?;
    let dapp_config = DappConfig::from_build_env().context("invalid build-time dapp config")?;
    info!(
        contract = %dapp_config.contract_address,
        chain = %dapp_config.chain_id,
        dist = %server.dist_dir.display(),
        "serving crypto devs mint page"
    );

    let state = AppState {
        dapp_config: Arc::new(dapp_config),
    };
    let app = router(state, &server.dist_dir);

    info!("site-server listening on {}", server.addr);
    let listener = tokio::net::TcpListener::bind(server.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn router(state: AppState, dist_dir: &std::path::Path) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/version", get(version))
        .route("/config", get(config))
        .fallback_service(ServeDir::new(dist_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for ctrl-c: {}", err);
    }
    info!("shutting down");
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        service: "site-server",
        status: "ok",
    })
}

async fn version() -> Json<VersionResponse> {
    Json(VersionResponse {
        service: "site-server",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Deployment facts baked into this build. The page uses its own copy; this
/// is for operators checking what a deployment points at.
async fn config(State(state): State<AppState>) -> (StatusCode, Json<DappConfig>) {
    (StatusCode::OK, Json(state.dapp_config.as_ref().clone()))
}
