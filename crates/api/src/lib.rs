//! Property Valuation API Server
//!
//! REST API that turns property records into model price estimates.

use anyhow::Context;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use inference_engine::{load_model, InferenceEngine};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_governor::GovernorLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

pub mod config;
pub mod error;
pub mod rate_limit;
mod routes;

pub use config::{AppConfig, FeatureConfig};
pub use error::ApiError;
pub use rate_limit::RateLimitConfig;

/// Application state shared across handlers.
///
/// Built once at start-up and never mutated, so handlers share it through an
/// `Arc` without locking.
pub struct AppState {
    /// Feature builder and loaded model
    pub engine: InferenceEngine,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
    /// Prometheus exporter handle, when metrics are enabled
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new application state
    pub fn new(engine: InferenceEngine) -> Self {
        Self {
            engine,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
            metrics: None,
        }
    }

    /// Load the model and build the engine described by `config`
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let model = load_model(&config.model).context("could not load pricing model")?;
        let builder = config.feature_builder()?;
        let engine = InferenceEngine::new(model, builder)
            .context("model feature schema does not match the feature builder")?;
        Ok(Self::new(engine))
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub model: String,
    pub feature_count: usize,
}

/// Create the application router.
///
/// `rate_limit` is applied to the valuation routes only.
pub fn create_router(
    state: Arc<AppState>,
    rate_limit: Option<Arc<rate_limit::DefaultGovernorConfig>>,
) -> Router {
    let valuation = Router::new()
        .route("/api/v1/predictions", post(routes::predictions::create_prediction))
        .route("/api/v1/features", post(routes::features::preview_features));

    let valuation = match rate_limit {
        Some(config) => valuation.layer(GovernorLayer { config }),
        None => valuation,
    };

    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/model/schema", get(routes::features::get_schema))
        .route("/metrics", get(metrics_handler))
        .merge(valuation)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        model: state.engine.model().name().to_string(),
        feature_count: state.engine.feature_schema().len(),
    })
}

/// Prometheus exposition
async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics disabled".to_string()),
    }
}

/// Initialize logging
pub fn init_logging(level: &str, json: bool) -> anyhow::Result<()> {
    let level: Level = level
        .parse()
        .with_context(|| format!("invalid log level '{level}'"))?;

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    let result = if json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };
    result.context("failed to set tracing subscriber")
}

/// Run the server
pub async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    let mut state = AppState::from_config(&config)?;

    if config.metrics_enabled {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("failed to install metrics recorder")?;
        state = state.with_metrics(handle);
    }

    let rate_limit = if config.rate_limit.enabled {
        let governor = rate_limit::create_governor_config(&config.rate_limit);
        if governor.is_none() {
            warn!("Rate limit quota is zero; rate limiting disabled");
        }
        governor
    } else {
        None
    };

    let app = create_router(Arc::new(state), rate_limit);

    info!("Starting API server on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
