//! Axum HTTP server, routing, and middleware.
//!
//! # Responsibilities
//! - Define the Axum router with the seal, unseal and health routes.
//! - Inject shared application state (`AppState`) into handlers.
//! - Map per-request failures to status codes without ever taking the
//!   process down.

pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;
