use std::net::SocketAddr;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::config::AppConfig;
use crate::state::AppState;
use crate::{auth, cycle};

const JSON_BODY_LIMIT: usize = 16 * 1024;

pub fn build_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);
    let static_files = ServeDir::new(&state.config.static_dir);

    Router::new()
        .nest("/api/v1",
              Router::new()
                  .nest("/users",
                        auth::user_routes().merge(cycle::cycle_routes()))
                  .route("/health", get(|| async { "ok" }))
        )
        .fallback_service(static_files)
        .with_state(state)
        .layer(DefaultBodyLimit::max(JSON_BODY_LIMIT))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        let latency_ms = latency.as_millis() as u64;
                        if status.is_server_error() {
                            tracing::error!(%status, latency_ms, "response");
                        } else {
                            tracing::info!(%status, latency_ms, "response");
                        }
                    },
                ),
        )
}

/// Credentialed CORS for the configured origin; `*` falls back to a
/// permissive layer without credentials.
fn cors_layer(config: &AppConfig) -> CorsLayer {
    if config.cors_origin == "*" {
        return CorsLayer::permissive();
    }
    match HeaderValue::from_str(&config.cors_origin) {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            .allow_credentials(true)
            .max_age(Duration::from_secs(3600)),
        Err(e) => {
            tracing::warn!(error = %e, origin = %config.cors_origin, "invalid CORS_ORIGIN; allowing any origin");
            CorsLayer::permissive()
        }
    }
}

pub async fn serve(app: Router, config: &AppConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
