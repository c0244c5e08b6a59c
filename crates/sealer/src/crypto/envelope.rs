//! AES-GCM sealing and opening of opaque byte payloads.
//!
//! **Nonce handling:** every [`seal`] call draws a fresh 96-bit nonce from the
//! OS CSPRNG. GCM nonce reuse under the same key breaks both confidentiality
//! and authentication, so nonces are never derived, cached, or accepted from
//! callers.
//!
//! The caller-supplied context is bound into the tag as associated data. An
//! envelope sealed under one context will not open under another.

use std::fmt;
use std::str::FromStr;

use aes_gcm::{
    aead::{consts::U12, rand_core::RngCore, Aead, KeyInit, OsRng, Payload},
    aes::Aes192,
    Aes128Gcm, Aes256Gcm, AesGcm, Nonce,
};
use thiserror::Error;

/// Byte length of a GCM nonce (12 bytes = 96 bits).
pub const NONCE_LEN: usize = 12;

/// Byte length of the GCM authentication tag appended to every ciphertext.
pub const TAG_LEN: usize = 16;

/// Accepted AES key lengths in bytes (AES-128, AES-192, AES-256).
pub const KEY_LENS: [usize; 3] = [16, 24, 32];

/// Separator between the ciphertext and nonce fields.
const DELIMITER: char = ':';

type Aes192Gcm = AesGcm<Aes192, U12>;

/// Errors produced by the envelope layer.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// The key is not 16, 24 or 32 bytes long.
    #[error("invalid key length: expected 16, 24 or 32 bytes, got {0}")]
    InvalidKeyLength(usize),

    /// The OS entropy source could not produce a nonce.
    #[error("nonce generation failed")]
    Entropy,

    /// The cipher refused to seal the payload.
    #[error("cipher operation failed")]
    Cipher,

    /// The envelope text is structurally invalid. Detected before any
    /// cipher work.
    #[error("malformed envelope: {0}")]
    Malformed(&'static str),

    /// The tag did not verify. Wrong key, wrong context, or tampered data.
    #[error("envelope authentication failed")]
    Authentication,
}

/// A sealed payload: ciphertext (with tag) and the nonce it was sealed under.
///
/// The wire form produced by [`fmt::Display`] and consumed by [`FromStr`] is
/// `hex(ciphertext):hex(nonce)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Raw ciphertext + authentication tag bytes.
    pub ciphertext: Vec<u8>,
    /// Raw nonce bytes.
    pub nonce: [u8; NONCE_LEN],
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{DELIMITER}{}",
            hex::encode(&self.ciphertext),
            hex::encode(self.nonce)
        )
    }
}

impl FromStr for Envelope {
    type Err = EnvelopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(DELIMITER).collect();
        let [ciphertext_hex, nonce_hex] = parts.as_slice() else {
            return Err(EnvelopeError::Malformed("expected exactly two ':'-delimited fields"));
        };

        let ciphertext = hex::decode(ciphertext_hex)
            .map_err(|_| EnvelopeError::Malformed("ciphertext is not valid hex"))?;
        if ciphertext.len() < TAG_LEN {
            return Err(EnvelopeError::Malformed("ciphertext is shorter than the tag"));
        }

        let nonce: [u8; NONCE_LEN] = hex::decode(nonce_hex)
            .map_err(|_| EnvelopeError::Malformed("nonce is not valid hex"))?
            .try_into()
            .map_err(|_| EnvelopeError::Malformed("nonce must be 12 bytes"))?;

        Ok(Self { ciphertext, nonce })
    }
}

/// Seal `plaintext` under `key`, binding `context` as associated data.
///
/// # Errors
///
/// Returns [`EnvelopeError::InvalidKeyLength`] if `key` is not a valid AES key
/// length, [`EnvelopeError::Entropy`] if the OS CSPRNG fails, and
/// [`EnvelopeError::Cipher`] if the cipher rejects the payload.
pub fn seal(key: &[u8], plaintext: &[u8], context: &[u8]) -> Result<Envelope, EnvelopeError> {
    let cipher = Cipher::new(key)?;

    let mut nonce = [0u8; NONCE_LEN];
    OsRng
        .try_fill_bytes(&mut nonce)
        .map_err(|_| EnvelopeError::Entropy)?;

    let ciphertext = cipher
        .encrypt(&nonce, plaintext, context)
        // Unreachable with a valid key and a plaintext below the GCM limit.
        .map_err(|_| EnvelopeError::Cipher)?;

    Ok(Envelope { ciphertext, nonce })
}

/// Parse the envelope text and open it under `key` and `context`.
///
/// # Errors
///
/// Returns [`EnvelopeError::Malformed`] for structurally invalid input,
/// [`EnvelopeError::InvalidKeyLength`] for a bad key, and
/// [`EnvelopeError::Authentication`] if the tag does not verify.
pub fn open(key: &[u8], envelope: &str, context: &[u8]) -> Result<Vec<u8>, EnvelopeError> {
    let envelope: Envelope = envelope.parse()?;
    open_envelope(key, &envelope, context)
}

/// Open an already-parsed [`Envelope`].
///
/// # Errors
///
/// See [`open`].
pub fn open_envelope(
    key: &[u8],
    envelope: &Envelope,
    context: &[u8],
) -> Result<Vec<u8>, EnvelopeError> {
    Cipher::new(key)?
        .decrypt(&envelope.nonce, &envelope.ciphertext, context)
        .map_err(|_| EnvelopeError::Authentication)
}

/// AES-GCM instance sized to the key it was built from.
enum Cipher {
    Aes128(Box<Aes128Gcm>),
    Aes192(Box<Aes192Gcm>),
    Aes256(Box<Aes256Gcm>),
}

impl Cipher {
    fn new(key: &[u8]) -> Result<Self, EnvelopeError> {
        let invalid = |_| EnvelopeError::InvalidKeyLength(key.len());
        match key.len() {
            16 => Aes128Gcm::new_from_slice(key)
                .map(|c| Self::Aes128(Box::new(c)))
                .map_err(invalid),
            24 => Aes192Gcm::new_from_slice(key)
                .map(|c| Self::Aes192(Box::new(c)))
                .map_err(invalid),
            32 => Aes256Gcm::new_from_slice(key)
                .map(|c| Self::Aes256(Box::new(c)))
                .map_err(invalid),
            n => Err(EnvelopeError::InvalidKeyLength(n)),
        }
    }

    fn encrypt(
        &self,
        nonce: &[u8; NONCE_LEN],
        msg: &[u8],
        aad: &[u8],
    ) -> Result<Vec<u8>, aes_gcm::Error> {
        let nonce = Nonce::<U12>::from_slice(nonce);
        let payload = Payload { msg, aad };
        match self {
            Self::Aes128(c) => c.encrypt(nonce, payload),
            Self::Aes192(c) => c.encrypt(nonce, payload),
            Self::Aes256(c) => c.encrypt(nonce, payload),
        }
    }

    fn decrypt(
        &self,
        nonce: &[u8; NONCE_LEN],
        msg: &[u8],
        aad: &[u8],
    ) -> Result<Vec<u8>, aes_gcm::Error> {
        let nonce = Nonce::<U12>::from_slice(nonce);
        let payload = Payload { msg, aad };
        match self {
            Self::Aes128(c) => c.decrypt(nonce, payload),
            Self::Aes192(c) => c.decrypt(nonce, payload),
            Self::Aes256(c) => c.decrypt(nonce, payload),
        }
    }
}
