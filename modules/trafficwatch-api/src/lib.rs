//! HTTP boundary: parses requests, calls the core, renders JSON.

use std::future::{Future, IntoFuture};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::warn;

use trafficwatch_core::{EventQueryService, EventStore, ReportIngestor};

pub mod error;
pub mod rest;

pub use error::ApiError;

/// How long in-flight requests get to finish once shutdown starts.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

pub struct AppState {
    pub queries: EventQueryService,
    pub ingestor: ReportIngestor,
}

impl AppState {
    pub fn new(store: Arc<dyn EventStore>, scan_timeout: Duration) -> Self {
        Self {
            queries: EventQueryService::new(store.clone()).with_scan_timeout(scan_timeout),
            ingestor: ReportIngestor::new(store),
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/report", post(rest::report::api_report))
        .route("/events", get(rest::events::api_events))
        .route("/health", get(|| async { "OK" }))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        )
        // No caching of live reports
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        // Logging layer: method + path only (no query params, no coordinates)
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        )
}

/// Serve `app` until `shutdown` resolves, then drain connections for at most
/// `grace` before returning regardless.
pub async fn serve<F>(
    listener: tokio::net::TcpListener,
    app: Router,
    shutdown: F,
    grace: Duration,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let (signalled_tx, signalled_rx) = tokio::sync::oneshot::channel::<()>();
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.await;
            let _ = signalled_tx.send(());
        })
        .into_future();
    tokio::pin!(server);

    let deadline = async move {
        if signalled_rx.await.is_ok() {
            tokio::time::sleep(grace).await;
        } else {
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        result = &mut server => result,
        _ = deadline => {
            warn!(grace_ms = grace.as_millis() as u64, "Connections still open after shutdown grace, forcing exit");
            Ok(())
        }
    }
}
