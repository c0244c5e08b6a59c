//! Axum request handlers for all service endpoints.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use common::protocol::{ErrorResponse, HealthResponse};
use common::ServiceError;
use tracing::{debug, error, warn};
use uuid::Uuid;

use super::state::AppState;
use crate::crypto::{self, EnvelopeError};

/// Caller-facing message for every malformed or unauthentic envelope.
const INVALID_ENVELOPE: &str = "invalid envelope";

/// `POST /seal` — seal the raw request body.
///
/// Responds with the envelope as `text/plain`.
pub async fn seal(State(state): State<AppState>, body: Result<Bytes, BytesRejection>) -> Response {
    let request_id = Uuid::new_v4();
    let plaintext = match read_body(body) {
        Ok(b) => b,
        Err(e) => return error_response(&e),
    };

    match crypto::seal(state.key.as_bytes(), &plaintext, &state.auth_context) {
        Ok(envelope) => {
            debug!(%request_id, bytes = plaintext.len(), "payload sealed");
            (
                StatusCode::OK,
                [(CONTENT_TYPE, "text/plain; charset=utf-8")],
                envelope.to_string(),
            )
                .into_response()
        }
        Err(e) => {
            error!(%request_id, error = %e, "seal failed");
            error_response(&ServiceError::Internal("seal failed".into()))
        }
    }
}

/// `POST /unseal` — open the envelope in the request body.
///
/// Responds with the raw plaintext. Malformed and unauthentic envelopes get
/// the same 400 response; only the server log tells them apart.
pub async fn unseal(State(state): State<AppState>, body: Result<Bytes, BytesRejection>) -> Response {
    let request_id = Uuid::new_v4();
    let body = match read_body(body) {
        Ok(b) => b,
        Err(e) => return error_response(&e),
    };

    let Ok(text) = std::str::from_utf8(&body) else {
        warn!(%request_id, reason = "body is not utf-8", "rejected malformed envelope");
        return invalid_envelope();
    };
    let text = text.trim_end_matches(|c: char| c.is_ascii_whitespace());

    match crypto::open(state.key.as_bytes(), text, &state.auth_context) {
        Ok(plaintext) => {
            debug!(%request_id, bytes = plaintext.len(), "envelope opened");
            (
                StatusCode::OK,
                [(CONTENT_TYPE, "application/octet-stream")],
                plaintext,
            )
                .into_response()
        }
        Err(EnvelopeError::Malformed(reason)) => {
            warn!(%request_id, reason, "rejected malformed envelope");
            invalid_envelope()
        }
        Err(EnvelopeError::Authentication) => {
            warn!(%request_id, "envelope failed authentication");
            invalid_envelope()
        }
        Err(e) => {
            error!(%request_id, error = %e, "unseal failed");
            error_response(&ServiceError::Internal("unseal failed".into()))
        }
    }
}

/// `GET /health` — liveness check.
///
/// The server only starts listening once the key is loaded, so any response
/// at all means ready.
pub async fn health() -> Response {
    let body = HealthResponse {
        status: "ok".into(),
        key_loaded: true,
    };
    (StatusCode::OK, Json(body)).into_response()
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let err = ErrorResponse::new("not_found", "the requested resource does not exist");
    (StatusCode::NOT_FOUND, Json(err))
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn read_body(body: Result<Bytes, BytesRejection>) -> Result<Bytes, ServiceError> {
    body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ServiceError::PayloadTooLarge("request body exceeds the configured limit".into())
        } else {
            ServiceError::BadRequest("unable to read request body".into())
        }
    })
}

fn invalid_envelope() -> Response {
    error_response(&ServiceError::BadRequest(INVALID_ENVELOPE.into()))
}

fn error_response(err: &ServiceError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ErrorResponse::from(err))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::SealingKey;
    use axum::routing::{get, post};
    use axum::{body::Body, http::Request, Router};
    use tower::ServiceExt;

    const CONTEXT: &str = "example-service-envelope";

    fn test_state() -> AppState {
        AppState::new(SealingKey::from_bytes(&[0u8; 32]).unwrap(), CONTEXT, 1024)
    }

    fn test_router(state: AppState) -> Router {
        Router::new()
            .route("/seal", post(seal))
            .route("/unseal", post(unseal))
            .route("/health", get(health))
            .with_state(state)
    }

    async fn post_body(app: Router, uri: &str, body: impl Into<Body>) -> (StatusCode, Bytes) {
        let req = Request::builder()
            .method("POST")
            .uri(uri)
            .body(body.into())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes)
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let app = test_router(test_state());
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn seal_returns_hex_envelope() {
        let (status, body) = post_body(test_router(test_state()), "/seal", "hello world").await;
        assert_eq!(status, StatusCode::OK);
        let envelope = std::str::from_utf8(&body).unwrap();
        let (_, nonce) = envelope.split_once(':').unwrap();
        assert_eq!(nonce.len(), 24);
    }

    #[tokio::test]
    async fn unseal_accepts_trailing_newline() {
        let state = test_state();
        let envelope = crypto::seal(state.key.as_bytes(), b"payload", CONTEXT.as_bytes())
            .unwrap()
            .to_string();
        let (status, body) =
            post_body(test_router(state), "/unseal", format!("{envelope}\r\n")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(&body[..], b"payload");
    }

    #[tokio::test]
    async fn malformed_and_unauthentic_envelopes_look_identical() {
        let state = test_state();
        let mut sealed = crypto::seal(state.key.as_bytes(), b"payload", CONTEXT.as_bytes()).unwrap();
        sealed.ciphertext[0] ^= 0x01;

        let (tampered_status, tampered_body) =
            post_body(test_router(state.clone()), "/unseal", sealed.to_string()).await;
        let (garbage_status, garbage_body) =
            post_body(test_router(state.clone()), "/unseal", "not-an-envelope").await;
        let (binary_status, binary_body) =
            post_body(test_router(state), "/unseal", vec![0xFFu8, 0xFE]).await;

        assert_eq!(tampered_status, StatusCode::BAD_REQUEST);
        assert_eq!(garbage_status, StatusCode::BAD_REQUEST);
        assert_eq!(binary_status, StatusCode::BAD_REQUEST);
        assert_eq!(tampered_body, garbage_body);
        assert_eq!(garbage_body, binary_body);

        let err: ErrorResponse = serde_json::from_slice(&garbage_body).unwrap();
        assert_eq!(err, ErrorResponse::new("bad_request", INVALID_ENVELOPE));
    }

    #[tokio::test]
    async fn envelope_from_other_context_is_rejected() {
        let state = test_state();
        let envelope = crypto::seal(state.key.as_bytes(), b"payload", b"another-service")
            .unwrap()
            .to_string();
        let (status, _) = post_body(test_router(state), "/unseal", envelope).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let app = test_router(test_state()).layer(axum::extract::DefaultBodyLimit::max(8));
        let (status, body) = post_body(app, "/seal", vec![0u8; 64]).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        let err: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(err.code, "payload_too_large");
    }

    #[test]
    fn internal_errors_map_to_500() {
        let resp = error_response(&ServiceError::Internal("seal failed".into()));
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
