//! The process-wide sealing key.
//!
//! # Lifecycle
//!
//! 1. At startup the base64 `secretKey` parameter is hydrated from Parameter
//!    Store and decoded with [`SealingKey::from_base64`].
//! 2. The decoded key lives only in memory, shared read-only behind an `Arc`
//!    for the life of the process. There is no rotation.
//! 3. Handlers borrow the raw bytes via [`SealingKey::as_bytes`] for a single
//!    seal or open call.
//!
//! # Security invariants
//!
//! - Key bytes are **never** written to disk, logged, or included in traces.
//! - The buffer is zeroed when the key is dropped, including the intermediate
//!   buffer of a rejected decode.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::crypto::envelope::KEY_LENS;

/// Errors produced while loading the sealing key.
#[derive(Debug, Error)]
pub enum KeyError {
    /// The configuration value holding the key was empty or absent.
    #[error("secret application key is unset")]
    Unset,

    /// The configuration value is not standard base64.
    #[error("secret application key is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    /// The decoded key material has an unsupported length.
    #[error("secret application key has invalid length: expected 16, 24 or 32 bytes, got {0}")]
    InvalidLength(usize),
}

/// AES key bytes of a supported length.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SealingKey(Vec<u8>);

impl SealingKey {
    /// Wrap raw key bytes, validating the length.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::InvalidLength`] unless `bytes` is 16, 24 or 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        if !KEY_LENS.contains(&bytes.len()) {
            return Err(KeyError::InvalidLength(bytes.len()));
        }
        Ok(Self(bytes.to_vec()))
    }

    /// Decode a standard-alphabet, padded base64 key.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::Unset`] for an empty value, [`KeyError::Encoding`]
    /// for bad base64, and [`KeyError::InvalidLength`] for a bad length.
    pub fn from_base64(encoded: &str) -> Result<Self, KeyError> {
        if encoded.is_empty() {
            return Err(KeyError::Unset);
        }
        let decoded = Zeroizing::new(STANDARD.decode(encoded)?);
        Self::from_bytes(&decoded)
    }

    /// Borrow the raw key bytes for a single cipher operation.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Key strength in bits.
    pub fn bits(&self) -> usize {
        self.0.len() * 8
    }
}

impl std::fmt::Debug for SealingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material — not even in debug builds.
        f.write_str("SealingKey([REDACTED])")
    }
}
