//! Common types, protocol definitions, and errors shared across the envelope sealing service crates.

pub mod error;
pub mod protocol;

pub use error::ServiceError;
