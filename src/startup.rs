//! Server startup and wiring.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::Router;
use http::Request;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{Level, info};

use crate::config::Config;
use crate::routes::app_router;
use crate::upstream::UpstreamClient;

/// Inbound request timeout duration.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Application state shared across handlers.
///
/// Configuration is read-only for the process lifetime; no mutable state is
/// shared between requests.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub upstream: UpstreamClient,
    pub index_html: Arc<str>,
}

impl AppState {
    pub fn new(config: Arc<Config>, index_html: impl Into<Arc<str>>) -> Self {
        let upstream = UpstreamClient::new(config.clone());
        Self {
            config,
            upstream,
            index_html: index_html.into(),
        }
    }
}

/// Build and configure the complete application.
///
/// Fails when the static index asset is missing or the listen address does
/// not parse; both are fatal before serving begins.
pub async fn build_app(config: Config) -> anyhow::Result<(Router, SocketAddr)> {
    let addr: SocketAddr = config
        .listen_address
        .parse()
        .with_context(|| format!("Invalid listen address {}", config.listen_address))?;

    // The dashboard asset is required at startup, not lazily at request time.
    let index_html = tokio::fs::read_to_string(&config.index_path)
        .await
        .with_context(|| format!("Static asset {} not found", config.index_path))?;
    info!(path = %config.index_path, "Loaded dashboard asset");

    let cors = build_cors(config.cors_allow_origins.as_deref());
    let state = AppState::new(Arc::new(config), index_html);

    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &Request<_>| {
                    tracing::info_span!(
                        "request",
                        method = %req.method(),
                        uri = %req.uri(),
                    )
                })
                .on_response(tower_http::trace::DefaultOnResponse::new().level(Level::DEBUG)),
        )
        .layer(TimeoutLayer::new(Duration::from_secs(REQUEST_TIMEOUT_SECS)))
        .layer(cors)
        .layer(PropagateRequestIdLayer::x_request_id());

    let app = app_router(state).layer(middleware);

    Ok((app, addr))
}

fn build_cors(origins: Option<&str>) -> CorsLayer {
    let cors = match origins {
        Some(o) if o.trim() == "*" => CorsLayer::permissive(),
        Some(o) => {
            let origins: Vec<_> = o.split(',').filter_map(|s| s.trim().parse().ok()).collect();
            CorsLayer::new().allow_origin(origins)
        }
        None => CorsLayer::permissive(),
    };

    cors.allow_headers(Any)
        .allow_methods(Any)
        .max_age(Duration::from_secs(3600))
}
