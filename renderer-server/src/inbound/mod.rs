/*!
   Module `inbound` exposes the render domain over HTTP.
*/

mod api;
mod handlers;

use crate::domain::ports::MapService;

use std::sync::Arc;

use anyhow::Context;
use axum::{Router, extract::DefaultBodyLimit, routing::post};
use tokio::net;

/// Configuration for the HTTP server.
#[derive(Debug, Clone)]
pub struct HttpServerConfig<'a> {
    pub port: &'a str,
    pub default_width: u32,
    pub max_width: u32,
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct WidthLimits {
    pub default: u32,
    pub max: u32,
}

/// The global application state shared between all request handlers.
#[derive(Debug, Clone)]
pub(crate) struct AppState<MS: MapService> {
    pub map_service: Arc<MS>,
    pub widths: WidthLimits,
}

/// The application's HTTP server. The underlying HTTP package is opaque to module consumers.
pub struct HttpServer {
    router: Router,
    listener: net::TcpListener,
}

impl HttpServer {
    /// Returns a new HTTP server bound to the port specified in `config`.
    pub async fn new(
        map_service: impl MapService,
        config: HttpServerConfig<'_>,
    ) -> anyhow::Result<Self> {
        let trace_layer = tower_http::trace::TraceLayer::new_for_http().make_span_with(
            |request: &axum::extract::Request<_>| {
                let uri = request.uri().to_string();
                tracing::info_span!("http_request", method = ?request.method(), uri)
            },
        );

        let state = AppState {
            map_service: Arc::new(map_service),
            widths: WidthLimits {
                default: config.default_width,
                max: config.max_width,
            },
        };

        let router = api_routes()
            .layer(DefaultBodyLimit::max(config.max_body_bytes))
            .layer(trace_layer)
            .with_state(state);

        let listener = net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
            .await
            .with_context(|| format!("failed to listen on {}", config.port))?;

        Ok(Self { router, listener })
    }

    /// Runs the HTTP server.
    pub async fn run(self) -> anyhow::Result<()> {
        tracing::debug!("listening on {:?}", self.listener.local_addr());
        axum::serve(self.listener, self.router)
            .await
            .context("received error from running server")?;
        Ok(())
    }
}

fn api_routes<MS: MapService>() -> Router<AppState<MS>> {
    Router::new().route("/api/render", post(handlers::render_map_handler::<MS>))
}
