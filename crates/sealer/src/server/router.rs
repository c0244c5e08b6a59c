//! Axum router construction.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer, trace::TraceLayer};

use super::{handlers, middleware, state::AppState};

/// Build the application [`Router`] with all routes and middleware attached.
pub fn build(state: AppState) -> Router {
    Router::new()
        .route("/seal", post(handlers::seal))
        .route("/unseal", post(handlers::unseal))
        .route("/health", get(handlers::health))
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::max(state.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(middleware::REQUEST_TIMEOUT))
        .layer(CompressionLayer::new())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::SealingKey;
    use axum::{body::Body, http::Request};
    use axum_test::TestServer;
    use bytes::Bytes;
    use tower::ServiceExt;

    fn test_state(max_body_bytes: usize) -> AppState {
        let key = SealingKey::from_base64("AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=").unwrap();
        AppState::new(key, "example-service-envelope", max_body_bytes)
    }

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let app = build(test_state(1024));
        let req = Request::builder()
            .uri("/unknown")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), 404);
    }

    #[tokio::test]
    async fn health_route_exists() {
        let server = TestServer::new(build(test_state(1024))).unwrap();
        let resp = server.get("/health").await;
        resp.assert_status_ok();
        assert_eq!(resp.text(), r#"{"status":"ok","key_loaded":true}"#);
    }

    #[tokio::test]
    async fn seal_then_unseal_round_trip() {
        let server = TestServer::new(build(test_state(1024))).unwrap();

        let sealed = server
            .post("/seal")
            .bytes(Bytes::from_static(b"hello world"))
            .await;
        sealed.assert_status_ok();
        let envelope = sealed.text();
        let (ciphertext, nonce) = envelope.split_once(':').unwrap();
        assert_eq!(nonce.len(), 24);
        assert_eq!(ciphertext.len(), (11 + 16) * 2);

        let opened = server.post("/unseal").text(envelope).await;
        opened.assert_status_ok();
        assert_eq!(opened.as_bytes().as_ref(), b"hello world");
    }

    #[tokio::test]
    async fn empty_payload_round_trips() {
        let server = TestServer::new(build(test_state(1024))).unwrap();
        let envelope = server.post("/seal").bytes(Bytes::new()).await.text();
        let opened = server.post("/unseal").text(envelope).await;
        opened.assert_status_ok();
        assert!(opened.as_bytes().is_empty());
    }

    #[tokio::test]
    async fn sealing_twice_gives_different_envelopes() {
        let server = TestServer::new(build(test_state(1024))).unwrap();
        let first = server.post("/seal").text("same").await.text();
        let second = server.post("/seal").text("same").await.text();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn body_over_limit_returns_413() {
        let server = TestServer::new(build(test_state(16))).unwrap();
        let resp = server
            .post("/seal")
            .bytes(Bytes::from(vec![b'a'; 64]))
            .await;
        assert_eq!(resp.status_code(), 413);
    }

    #[tokio::test]
    async fn bad_envelope_returns_400() {
        let server = TestServer::new(build(test_state(1024))).unwrap();
        let resp = server.post("/unseal").text("abc:def:012").await;
        assert_eq!(resp.status_code(), 400);
    }
}
