//! Normalised configuration namespace.

use std::fmt;

use super::HydrateError;

/// Path separator used by the store.
pub const SEPARATOR: char = '/';

/// A namespace prefix that always ends with exactly one [`SEPARATOR`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace(String);

impl Namespace {
    /// Normalise `raw` so it ends with a single separator.
    ///
    /// `"app"`, `"app/"` and `"app//"` all become `"app/"`; a value made only
    /// of separators becomes the root `"/"`.
    ///
    /// # Errors
    ///
    /// Returns [`HydrateError::EmptyNamespace`] if `raw` is empty or blank.
    pub fn new(raw: &str) -> Result<Self, HydrateError> {
        if raw.trim().is_empty() {
            return Err(HydrateError::EmptyNamespace);
        }
        let trimmed = raw.trim_end_matches(SEPARATOR);
        Ok(Self(format!("{trimmed}{SEPARATOR}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Strip the namespace from a full entry name. Names outside the
    /// namespace are returned unchanged.
    pub fn relative<'a>(&self, name: &'a str) -> &'a str {
        name.strip_prefix(self.0.as_str()).unwrap_or(name)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
