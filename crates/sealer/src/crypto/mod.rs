//! AES-GCM envelope sealing primitives.
//!
//! This module is intentionally free of AWS and HTTP dependencies.
//!
//! # Envelope format
//!
//! ```text
//! <hex(ciphertext+tag)>:<hex(nonce)>
//! ```
//!
//! The nonce is always 12 bytes (24 hex characters) and the tag 16 bytes.

pub mod envelope;

pub use envelope::{open, seal, EnvelopeError};
