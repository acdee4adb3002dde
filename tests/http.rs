#![cfg(feature = "axum")]

use std::net::SocketAddr;

use axum::{
    Router,
    body::{Body, to_bytes},
    extract::ConnectInfo,
    http::{Method, Request, StatusCode, header},
};
use ipecho::{IpResolver, ResolvePolicy, server::router};
use tower::ServiceExt;

struct Reply {
    status: StatusCode,
    content_type: String,
    body: String,
}

async fn send(app: Router, remote: &str, headers: &[(&str, &str)]) -> Reply {
    send_with_method(app, Method::GET, remote, headers).await
}

async fn send_with_method(
    app: Router,
    method: Method,
    remote: &str,
    headers: &[(&str, &str)],
) -> Reply {
    let mut builder = Request::builder().method(method).uri("/");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let mut request = builder.body(Body::empty()).unwrap();
    let remote: SocketAddr = remote.parse().unwrap();
    request.extensions_mut().insert(ConnectInfo(remote));

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

    Reply {
        status,
        content_type,
        body: String::from_utf8(bytes.to_vec()).unwrap(),
    }
}

fn first_match() -> Router {
    router(IpResolver::new())
}

fn all_sources() -> Router {
    router(IpResolver::new().with_policy(ResolvePolicy::AllSources))
}

#[tokio::test]
async fn test_plain_text_remote_only() {
    let reply = send(first_match(), "203.0.113.5:54321", &[]).await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.content_type, "text/plain");
    assert_eq!(reply.body, "203.0.113.5\n");
    assert!(!reply.body.contains('{'));
}

#[tokio::test]
async fn test_plain_text_with_accept_text() {
    let reply = send(
        first_match(),
        "203.0.113.5:54321",
        &[("accept", "text/plain")],
    )
    .await;

    assert_eq!(reply.content_type, "text/plain");
    assert_eq!(reply.body, "203.0.113.5\n");
}

#[tokio::test]
async fn test_json_first_match_forwarded_for() {
    let reply = send(
        first_match(),
        "10.0.0.1:4000",
        &[
            ("accept", "application/json"),
            ("x-forwarded-for", "9.9.9.9, 1.1.1.1"),
        ],
    )
    .await;

    assert_eq!(reply.content_type, "application/json");
    let json: serde_json::Value = serde_json::from_str(&reply.body).unwrap();
    assert_eq!(json, serde_json::json!({ "ip": "9.9.9.9" }));
}

#[tokio::test]
async fn test_json_all_sources() {
    let reply = send(
        all_sources(),
        "10.0.0.1:4000",
        &[
            ("accept", "text/html, application/json"),
            ("x-forwarded-for", "9.9.9.9, 1.1.1.1"),
        ],
    )
    .await;

    let json: serde_json::Value = serde_json::from_str(&reply.body).unwrap();
    assert_eq!(
        json,
        serde_json::json!({ "ip": "10.0.0.1", "forwardedFor": "9.9.9.9" })
    );
    assert!(json.get("realIp").is_none());
}

#[tokio::test]
async fn test_plain_text_all_sources() {
    let reply = send(
        all_sources(),
        "[::1]:4000",
        &[("x-forwarded-for", "9.9.9.9"), ("x-real-ip", "8.8.8.8")],
    )
    .await;

    assert_eq!(
        reply.body,
        "IP: 127.0.0.1\nForwarded for: 9.9.9.9\nReal IP: 8.8.8.8\n"
    );
}

#[tokio::test]
async fn test_any_method_served() {
    let reply = send_with_method(first_match(), Method::POST, "203.0.113.5:54321", &[]).await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, "203.0.113.5\n");
}

#[tokio::test]
async fn test_untrusted_peer_headers_ignored() {
    let app = router(IpResolver::new().with_trusted_proxies(vec!["10.0.0.1".parse().unwrap()]));

    let reply = send(
        app.clone(),
        "192.0.2.1:4000",
        &[("x-forwarded-for", "9.9.9.9")],
    )
    .await;
    assert_eq!(reply.body, "192.0.2.1\n");

    let reply = send(app, "10.0.0.1:4000", &[("x-forwarded-for", "9.9.9.9")]).await;
    assert_eq!(reply.body, "9.9.9.9\n");
}

#[tokio::test]
async fn test_every_path_served() {
    for uri in ["/foo", "/foo/bar?x=1"] {
        let mut request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let remote: SocketAddr = "203.0.113.5:1".parse().unwrap();
        request.extensions_mut().insert(ConnectInfo(remote));

        let response = first_match().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"203.0.113.5\n");
    }
}
