//! Axum server setup
//!
//! Server skeleton with:
//! - CORS limited to a configured origin list (localhost by default)
//! - Tracing middleware
//! - Graceful shutdown on SIGTERM/Ctrl+C, then the store is closed

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::HeaderValue;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::routes;
use crate::db::ContactStore;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:4001)
    pub bind_addr: SocketAddr,

    /// Allow permissive CORS (default: false = `cors_origins` only)
    ///
    /// WARNING: Setting this to true allows any origin.
    pub cors_permissive: bool,

    /// Origins allowed when not permissive
    pub cors_origins: Vec<String>,
}

/// Port a browser frontend dev server usually runs on
pub const FRONTEND_DEV_PORT: u16 = 3000;

impl ServerConfig {
    /// Localhost origins for the frontend dev server and for `port` itself.
    pub fn local_origins(port: u16) -> Vec<String> {
        let mut origins = Vec::new();
        for p in [FRONTEND_DEV_PORT, port] {
            for host in ["localhost", "127.0.0.1"] {
                let origin = format!("http://{}:{}", host, p);
                if !origins.contains(&origin) {
                    origins.push(origin);
                }
            }
        }
        origins
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 4001)),
            cors_permissive: false,
            cors_origins: Self::local_origins(4001),
        }
    }
}

/// Shared application state
pub struct AppState {
    pub contacts: Arc<dyn ContactStore>,
}

impl AppState {
    pub fn new(contacts: Arc<dyn ContactStore>) -> Self {
        Self { contacts }
    }
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    if config.cors_permissive {
        tracing::warn!("CORS: Permissive mode enabled - all origins allowed");
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "CORS: skipping invalid origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Build the application router with all routes.
pub fn build_router(state: Arc<AppState>, config: &ServerConfig) -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::contacts::router())
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the HTTP server until a shutdown signal, then close the store.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool(&DatabaseConfig::default()).await?;
/// run_server(Arc::new(ContactRepo::new(pool)), ServerConfig::default()).await?;
/// ```
pub async fn run_server(
    contacts: Arc<dyn ContactStore>,
    config: ServerConfig,
) -> Result<(), ServerError> {
    tracing::info!(store = contacts.backend(), "contact store ready");
    let state = Arc::new(AppState::new(contacts));
    let app = build_router(state.clone(), &config);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    // Drain the pool even when serving failed
    state.contacts.close().await;
    served?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryContactRepo;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use tower::ServiceExt;

    fn app(config: &ServerConfig) -> Router {
        let state = Arc::new(AppState::new(Arc::new(MemoryContactRepo::new())));
        build_router(state, config)
    }

    async fn preflight(config: &ServerConfig, origin: &str) -> Option<HeaderValue> {
        let response = app(config)
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/contacts")
                    .header(header::ORIGIN, origin)
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .cloned()
    }

    #[test]
    fn default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr.port(), 4001);
        assert!(!config.cors_permissive);
        assert!(config
            .cors_origins
            .contains(&"http://localhost:3000".to_string()));
    }

    #[test]
    fn local_origins_dedupes_frontend_port() {
        assert_eq!(
            ServerConfig::local_origins(3000),
            vec!["http://localhost:3000", "http://127.0.0.1:3000"]
        );
        assert_eq!(ServerConfig::local_origins(4001).len(), 4);
    }

    #[tokio::test]
    async fn cors_allows_frontend_dev_origin() {
        assert_eq!(
            preflight(&ServerConfig::default(), "http://localhost:3000").await,
            Some(HeaderValue::from_static("http://localhost:3000"))
        );
    }

    #[tokio::test]
    async fn cors_allows_configured_origin() {
        let config = ServerConfig {
            cors_origins: vec!["https://contacts.example".to_string()],
            ..Default::default()
        };
        assert_eq!(
            preflight(&config, "https://contacts.example").await,
            Some(HeaderValue::from_static("https://contacts.example"))
        );
        assert_eq!(preflight(&config, "http://localhost:3000").await, None);
    }

    #[tokio::test]
    async fn health_endpoint() {
        let response = app(&ServerConfig::default())
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn cors_allows_localhost_origin() {
        assert_eq!(
            preflight(&ServerConfig::default(), "http://localhost:4001").await,
            Some(HeaderValue::from_static("http://localhost:4001"))
        );
    }

    #[tokio::test]
    async fn cors_ignores_foreign_origin() {
        assert_eq!(
            preflight(&ServerConfig::default(), "http://evil.example").await,
            None
        );
    }
}
