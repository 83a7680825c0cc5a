//! Basalt Discrimination API Server
//!
//! HTTP service around the quantile normalizer and the tectonic setting
//! classifier boundary.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use discrimination::{Classifier, Discriminator, MockClassifier};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use quantile_table::{global, LoadError, QuantileTable};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::FmtSubscriber;

mod error;
mod routes;
mod settings;

pub use settings::{AppConfig, LoggingConfig, ModelConfig, ServerConfig};
pub use error::ApiError;

/// Classifier shared across request handlers
pub type SharedClassifier = Arc<dyn Classifier>;

/// Application state shared across handlers
pub struct AppState {
    /// Quantile table, loaded once at startup
    pub table: &'static QuantileTable,
    /// Present once a classifier is available
    pub discriminator: Option<Discriminator<'static, SharedClassifier>>,
    /// Prometheus exposition handle
    pub metrics: Option<PrometheusHandle>,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(table: &'static QuantileTable, classifier: Option<SharedClassifier>) -> Self {
        Self {
            table,
            discriminator: classifier.map(|c| Discriminator::new(table, c)),
            metrics: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
        }
    }

    /// Attach a Prometheus handle for the metrics endpoint
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
    pub components: ComponentStatus,
}

/// Component status
#[derive(Debug, Serialize)]
pub struct ComponentStatus {
    pub quantile_table: ComponentHealth,
    pub classifier: ComponentHealth,
}

/// Individual component health
#[derive(Debug, Serialize)]
pub struct ComponentHealth {
    pub status: String,
    pub detail: Option<String>,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/features", get(routes::schema::get_features))
        .route("/api/v1/settings", get(routes::schema::get_settings))
        .route("/api/v1/normalize", post(routes::normalize::post_normalize))
        .route("/api/v1/discriminate", post(routes::discriminate::post_discriminate))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let classifier = match state.discriminator {
        Some(_) => ComponentHealth {
            status: "ok".to_string(),
            detail: None,
        },
        None => ComponentHealth {
            status: "unavailable".to_string(),
            detail: Some("Model not loaded".to_string()),
        },
    };

    let response = HealthResponse {
        status: "healthy".to_string(),
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        components: ComponentStatus {
            quantile_table: ComponentHealth {
                status: "ok".to_string(),
                detail: Some(format!("{} features", state.table.len())),
            },
            classifier,
        },
    };

    Json(response)
}

/// Prometheus exposition handler
async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics exporter not installed".to_string()),
    }
}

/// Initialize logging
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let level = config.max_level()?;
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

/// Read and validate the quantile artifact without blocking the runtime
pub async fn load_table(path: impl AsRef<Path>) -> Result<QuantileTable, LoadError> {
    let path = path.as_ref();
    let json = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let table = QuantileTable::from_json_str(&json)?;
    info!("Loaded {} quantile features from {}", table.len(), path.display());
    Ok(table)
}

/// Run the server
pub async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    // No table, no predictions: a load error stops startup here
    let table = global::install(load_table(&config.model.quantiles_path).await?);

    let classifier: Option<SharedClassifier> = if config.model.mock_classifier {
        warn!("Serving predictions from the mock classifier");
        Some(Arc::new(MockClassifier::new()))
    } else {
        None
    };

    let metrics = PrometheusBuilder::new().install_recorder()?;
    let state = Arc::new(AppState::new(table, classifier).with_metrics(metrics));
    let app = create_router(state);

    info!("Starting API server on {}", config.server.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use discrimination::FEATURE_COLUMNS;
    use quantile_table::BOUNDARY_COUNT;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use tower::ServiceExt;

    fn leaked_table(features: &[&str]) -> &'static QuantileTable {
        let boundaries: Vec<f64> = (1..=BOUNDARY_COUNT).map(|i| i as f64 * 10.0).collect();
        let map: HashMap<String, Vec<f64>> = features
            .iter()
            .map(|name| (name.to_string(), boundaries.clone()))
            .collect();
        Box::leak(Box::new(QuantileTable::from_map(map).unwrap()))
    }

    fn app(features: &[&str], classifier: Option<SharedClassifier>) -> Router {
        create_router(Arc::new(AppState::new(leaked_table(features), classifier)))
    }

    async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(match body {
                Some(body) => Body::from(body.to_string()),
                None => Body::empty(),
            })
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(app(&["SIO2(WT%)"], None), "GET", "/api/v1/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["components"]["classifier"]["status"], "unavailable");
    }

    #[tokio::test]
    async fn test_normalize_with_unresolved_column() {
        let request = json!({
            "columns": ["SIO2(WT%)", "LU(PPM)", "MGO(WT%)"],
            "rows": [[15.0, 0.37, 3000.0], [5.0, null, null]]
        });
        let (status, body) = send(
            app(&["SIO2(WT%)", "MGO(WT%)"], None),
            "POST",
            "/api/v1/normalize",
            Some(request),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], json!([[2, 0.37, 255], [1, null, 0]]));
        assert_eq!(body["rows"], 2);
        assert_eq!(body["columns"], 3);
        assert_eq!(body["warnings"], json!([{ "column": 1, "name": "LU(PPM)" }]));
    }

    #[tokio::test]
    async fn test_malformed_body_returns_json_error() {
        let request = json!({ "rows": [["x"]] });
        let (status, body) = send(app(&["SIO2(WT%)"], None), "POST", "/api/v1/normalize", Some(request)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));
    }

    #[tokio::test]
    async fn test_unparseable_body_returns_json_error() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/normalize")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = app(&["SIO2(WT%)"], None).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_normalize_rejects_ragged_rows() {
        let request = json!({
            "columns": ["SIO2(WT%)", "MGO(WT%)"],
            "rows": [[15.0]]
        });
        let (status, body) = send(app(&["SIO2(WT%)"], None), "POST", "/api/v1/normalize", Some(request)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().contains("Row 0"));
    }

    #[tokio::test]
    async fn test_discriminate_without_model() {
        let request = json!({ "columns": FEATURE_COLUMNS.to_vec(), "rows": [] });
        let (status, body) = send(app(&FEATURE_COLUMNS, None), "POST", "/api/v1/discriminate", Some(request)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "Model not loaded, please try again later");
    }

    #[tokio::test]
    async fn test_discriminate_with_mock() {
        let mut row = vec![json!(50.0); FEATURE_COLUMNS.len()];
        row[7] = json!(2500.0);
        let request = json!({ "columns": FEATURE_COLUMNS.to_vec(), "rows": [row] });
        let classifier: SharedClassifier = Arc::new(MockClassifier::new());

        let (status, body) = send(
            app(&FEATURE_COLUMNS, Some(classifier)),
            "POST",
            "/api/v1/discriminate",
            Some(request),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["predictions"][0]["setting"], "OCEAN ISLAND");
        assert_eq!(body["distribution"]["total"], 1);
    }

    #[tokio::test]
    async fn test_features_coverage() {
        let (status, body) = send(app(&["NA2O(WT%)"], None), "GET", "/api/v1/features", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["columns"].as_array().unwrap().len(), FEATURE_COLUMNS.len());
        assert_eq!(body["missing"].as_array().unwrap().len(), FEATURE_COLUMNS.len() - 1);
        assert_eq!(body["table_features"], 1);
    }

    #[tokio::test]
    async fn test_settings() {
        let (status, body) = send(app(&["NA2O(WT%)"], None), "GET", "/api/v1/settings", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 9);
        assert_eq!(body[8]["label"], "Mid-Oceanic Ridge");
    }

    #[tokio::test]
    async fn test_load_table_missing_file() {
        let err = load_table("/nonexistent/saved_quantiles.json").await.unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
