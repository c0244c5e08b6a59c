//! The remote key/value store as seen by the hydrator.
//!
//! Production code talks to SSM Parameter Store through
//! [`crate::aws::ParameterStore`]; tests substitute a mock.

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by a [`ParameterSource`].
#[derive(Debug, Error)]
pub enum SourceError {
    /// The store could not be reached or rejected the request.
    #[error("parameter store request failed: {0}")]
    Request(String),

    /// The store returned an entry missing its name or value.
    #[error("parameter store returned an incomplete entry: {0}")]
    Incomplete(String),
}

/// Query flags for a listing. Built fresh for every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    /// Include entries in nested paths below the prefix.
    pub recursive: bool,
    /// Return secret entries decrypted.
    pub with_decryption: bool,
}

impl ListOptions {
    /// Everything below the prefix, secrets decrypted.
    pub const fn recursive_decrypted() -> Self {
        Self {
            recursive: true,
            with_decryption: true,
        }
    }
}

/// One page request against the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    /// Path prefix, always ending with `/`.
    pub path: String,
    pub options: ListOptions,
    /// Continuation token returned by the previous page, if any.
    pub next_token: Option<String>,
}

/// Declared type of a stored entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    String,
    SecureString,
    StringList,
    /// A kind this service does not recognise.
    Unknown,
}

impl ParameterKind {
    /// Whether values of this kind may be assigned to a string field.
    pub fn is_string_like(self) -> bool {
        matches!(self, ParameterKind::String | ParameterKind::SecureString)
    }
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ParameterKind::String => "String",
            ParameterKind::SecureString => "SecureString",
            ParameterKind::StringList => "StringList",
            ParameterKind::Unknown => "Unknown",
        })
    }
}

/// A single entry read from the store.
#[derive(Clone, PartialEq, Eq)]
pub struct RemoteEntry {
    /// Full name, including the namespace prefix.
    pub name: String,
    pub value: String,
    pub kind: ParameterKind,
}

impl fmt::Debug for RemoteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteEntry")
            .field("name", &self.name)
            .field("value", &"[REDACTED]")
            .field("kind", &self.kind)
            .finish()
    }
}

/// One page of a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterPage {
    pub entries: Vec<RemoteEntry>,
    /// Present while more pages remain.
    pub next_token: Option<String>,
}

/// Paginated read access to a hierarchical key/value store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ParameterSource: Send + Sync {
    /// Return one page of entries at or below `request.path`.
    async fn list_under(&self, request: &ListRequest) -> Result<ParameterPage, SourceError>;
}
