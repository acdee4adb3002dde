//! HTTP surface: the single `/` route, content negotiation and the serve loop.

use axum::{
    Router,
    http::{HeaderMap, HeaderValue, header},
    response::{IntoResponse, Response},
    routing::any,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::error::{Error, Result};
use crate::extractor::{IpResolver, IpResult};
use crate::middleware::ClientIpLayer;

const APPLICATION_JSON: &str = "application/json";

/// Build the router serving every path for any method.
pub fn router(resolver: IpResolver) -> Router {
    Router::new()
        .route("/{*path}", any(ip_handler))
        .route("/", any(ip_handler))
        .layer(ClientIpLayer::with_resolver(resolver))
}

async fn ip_handler(result: IpResult, headers: HeaderMap) -> Response {
    render(&result, wants_json(&headers))
}

/// True when any `Accept` header mentions `application/json`.
fn wants_json(headers: &HeaderMap) -> bool {
    headers
        .get_all(header::ACCEPT)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(|accept| accept.contains(APPLICATION_JSON))
}

fn render(result: &IpResult, json: bool) -> Response {
    if json {
        // serializing a struct of strings cannot fail
        let mut body = serde_json::to_string(result).unwrap_or_default();
        body.push('\n');
        return (
            [(header::CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON))],
            body,
        )
            .into_response();
    }

    (
        [(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"))],
        result.to_text(),
    )
        .into_response()
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(addr: SocketAddr, resolver: IpResolver) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| Error::Bind { addr, source })?;
    let local_addr = listener.local_addr().map_err(Error::Serve)?;
    tracing::info!(address = %local_addr, "Server listening");

    let app = router(resolver).into_make_service_with_connect_info::<SocketAddr>();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(Error::Serve)?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
