//! HTTP server setup and request forwarding.
//!
//! # Responsibilities
//! - Create the Axum router and wire up middleware (tracing, timeout,
//!   request ID)
//! - Ask the configured strategy for a backend on every request
//! - Forward the request and stream the response back
//! - Keep the chosen backend's connection count correct around forwarding
//!
//! # Design Decisions
//! - "No backend available" is answered with an explicit 503, never a hang
//! - A forwarding failure is a 502 for this request only: no retry against
//!   another backend, and the backend is NOT marked down — liveness is an
//!   administrative decision, not a side effect of one failed exchange

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{
        uri::{Authority, Scheme},
        Request, StatusCode, Uri,
    },
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ProxyConfig;
use crate::http::request::{RequestIdLayer, X_REQUEST_ID};
use crate::load_balancer::backend::BackendError;
use crate::load_balancer::pool::ServerPool;
use crate::load_balancer::{strategy_from_name, LoadBalancer, UnknownStrategy};
use crate::observability::metrics;

/// Errors that prevent the server from being assembled from configuration.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Strategy(#[from] UnknownStrategy),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<ServerPool>,
    pub strategy: Arc<dyn LoadBalancer>,
    pub client: Client<HttpConnector, Body>,
}

/// HTTP server front of the load balancer.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
    pool: Arc<ServerPool>,
}

impl HttpServer {
    /// Assemble the server: register every configured backend (failing fast
    /// on a malformed address) and resolve the selection strategy.
    pub fn new(config: ProxyConfig) -> Result<Self, ServerError> {
        let pool = Arc::new(ServerPool::from_config(&config.backends)?);
        let strategy: Arc<dyn LoadBalancer> = Arc::from(strategy_from_name(&config.strategy)?);

        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        let state = AppState {
            pool: pool.clone(),
            strategy,
            client,
        };

        let router = Self::build_router(&config, state);
        Ok(Self {
            router,
            config,
            pool,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http())
    }

    /// The shared backend pool. Administrative callers (and tests) use this
    /// to flip liveness via `Backend::set_alive`.
    pub fn pool(&self) -> Arc<ServerPool> {
        self.pool.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            strategy = %self.config.strategy,
            backends = self.pool.len(),
            "HTTP server starting"
        );

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main proxy handler.
/// Asks the strategy for a backend and forwards the request to it.
async fn proxy_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> impl IntoResponse {
    let start_time = Instant::now();
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let method = request.method().to_string();

    let Some(backend) = state.strategy.next_server(&state.pool) else {
        tracing::warn!(request_id = %request_id, peer = %peer, "No backend available");
        metrics::record_request(&method, 503, "none", start_time);
        return (StatusCode::SERVICE_UNAVAILABLE, "No backend available").into_response();
    };

    // Held across the forwarding await; the drop runs on every exit path,
    // so the count can never leak.
    let guard = backend.create_guard();
    let backend_authority = guard.authority();

    tracing::debug!(
        request_id = %request_id,
        backend = %backend_authority,
        active_connections = guard.active_connections(),
        "Forwarding request"
    );

    // Rewrite the URI to target the chosen backend, keeping path and query.
    let (mut parts, body) = request.into_parts();
    let original_uri = parts.uri.clone();
    let mut uri_parts = original_uri.clone().into_parts();
    uri_parts.scheme = Some(Scheme::try_from(guard.url.scheme()).unwrap_or(Scheme::HTTP));
    if let Ok(authority) = Authority::from_str(&backend_authority) {
        uri_parts.authority = Some(authority);
    }
    parts.uri = Uri::from_parts(uri_parts).unwrap_or(original_uri);

    let req = Request::from_parts(parts, body);

    match state.client.request(req).await {
        Ok(response) => {
            let status = response.status();
            metrics::record_request(&method, status.as_u16(), &backend_authority, start_time);

            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body)).into_response()
        }
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                backend = %backend_authority,
                error = %e,
                "Upstream error"
            );
            metrics::record_request(&method, 502, &backend_authority, start_time);
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}
