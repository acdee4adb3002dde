use axum::{
    extract::{ConnectInfo, FromRequestParts, Request},
    http::{HeaderMap, request::Parts},
    response::Response,
};
use futures_util::future::BoxFuture;
use std::{
    convert::Infallible,
    net::SocketAddr,
    task::{Context, Poll},
};
use tower::{Layer, Service};

use crate::extractor::{IpResolver, IpResult};

/// Layer that resolves the client address of every request.
///
/// The resolved [`IpResult`] is stored as a request extension, where
/// handlers pick it up by taking `IpResult` as an argument.
///
/// # Examples
///
/// ```rust,no_run
/// use axum::{Router, routing::get};
/// use ipecho::{ClientIpLayer, IpResult};
///
/// async fn handler(ip: IpResult) -> String {
///     ip.to_text()
/// }
///
/// let app: Router = Router::new()
///     .route("/", get(handler))
///     .layer(ClientIpLayer::default());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ClientIpLayer {
    resolver: IpResolver,
}

impl ClientIpLayer {
    /// Create a layer with the default first-match resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a layer with a custom resolver configuration.
    pub fn with_resolver(resolver: IpResolver) -> Self {
        Self { resolver }
    }
}

impl<S> Layer<S> for ClientIpLayer {
    type Service = ClientIpService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ClientIpService {
            inner,
            resolver: self.resolver.clone(),
        }
    }
}

/// Service that resolves client addresses.
#[derive(Debug, Clone)]
pub struct ClientIpService<S> {
    inner: S,
    resolver: IpResolver,
}

impl<S> Service<Request> for ClientIpService<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        let headers = headers_to_map(req.headers());
        let remote_addr = remote_addr(req.extensions().get::<ConnectInfo<SocketAddr>>());

        let result = self.resolver.resolve(&headers, &remote_addr);
        tracing::debug!(
            method = %req.method(),
            remote_addr = %remote_addr,
            ip = %result.ip(),
            "resolved client address"
        );
        req.extensions_mut().insert(result);

        let future = self.inner.call(req);
        Box::pin(future)
    }
}

/// Convert axum headers to the lowercase map the resolver reads.
///
/// Repeated headers keep their first value. Values that are not visible
/// ASCII are skipped.
fn headers_to_map(headers: &HeaderMap) -> crate::extractor::HeaderMap {
    let mut map = crate::extractor::HeaderMap::new();

    for (name, value) in headers.iter() {
        if let Ok(value_str) = value.to_str() {
            map.entry(name.as_str().to_lowercase())
                .or_insert_with(|| value_str.to_string());
        }
    }

    map
}

/// Transport remote address as `ip:port`, or empty when unknown.
fn remote_addr(connect_info: Option<&ConnectInfo<SocketAddr>>) -> String {
    connect_info
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_default()
}

impl<S> FromRequestParts<S> for IpResult
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(result) = parts.extensions.get::<IpResult>() {
            return Ok(result.clone());
        }

        // Layer not installed: resolve with defaults
        let headers = headers_to_map(&parts.headers);
        let remote_addr = remote_addr(parts.extensions.get::<ConnectInfo<SocketAddr>>());
        Ok(IpResolver::default().resolve(&headers, &remote_addr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_headers_to_map_keeps_first_value() {
        let mut headers = HeaderMap::new();
        headers.append("X-Real-IP", HeaderValue::from_static("8.8.8.8"));
        headers.append("X-Real-IP", HeaderValue::from_static("1.1.1.1"));

        let map = headers_to_map(&headers);
        assert_eq!(map.get("x-real-ip").map(String::as_str), Some("8.8.8.8"));
    }

    #[test]
    fn test_remote_addr_rendering() {
        let v4: SocketAddr = "203.0.113.5:54321".parse().unwrap();
        let v6: SocketAddr = "[::1]:9999".parse().unwrap();

        assert_eq!(remote_addr(Some(&ConnectInfo(v4))), "203.0.113.5:54321");
        assert_eq!(remote_addr(Some(&ConnectInfo(v6))), "[::1]:9999");
        assert_eq!(remote_addr(None), "");
    }
}
