use crate::nutrition;
use crate::state::AppState;
use axum::{
    http::{header, Request, Response},
    Router,
};
use std::{net::SocketAddr, time::Duration};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::Span;

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(nutrition::router())
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &Request<_>| {
                    let content_type = req
                        .headers()
                        .get(header::CONTENT_TYPE)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("-")
                        .to_string();
                    tracing::info_span!(
                        "log_request",
                        method = %req.method(),
                        path = %req.uri().path(),
                        %content_type,
                        status = tracing::field::Empty
                    )
                })
                .on_response(|res: &Response<_>, latency: Duration, span: &Span| {
                    let status = res.status();
                    span.record("status", tracing::field::display(status));
                    let latency_ms = latency.as_millis() as u64;
                    if status.is_server_error() {
                        tracing::error!(%status, latency_ms, "request failed upstream");
                    } else if status.is_client_error() {
                        tracing::warn!(%status, latency_ms, "request rejected");
                    } else {
                        tracing::info!(%status, latency_ms, "request served");
                    }
                }),
        )
}

pub async fn serve(app: Router, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "nutrilog listening");
    axum::serve(listener, app).await?;
    Ok(())
}
