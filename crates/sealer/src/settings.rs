//! Service settings hydrated from Parameter Store at startup.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::hydrate::{FieldTable, Hydrate};

/// Settings stored under the deployment namespace.
///
/// With a namespace of `/team/staging/example-app/2018-08-25.1` the secret key
/// is read from `/team/staging/example-app/2018-08-25.1/secretKey`.
///
/// Zeroed on drop, since `secret_key` holds the encoded key.
#[derive(Clone, Default, Zeroize, ZeroizeOnDrop)]
pub struct ServiceSettings {
    /// Base64-encoded AES key. Usually a `SecureString`.
    pub secret_key: String,
    pub favorite_color: String,
    /// Preferred locale, e.g. `en-US`.
    pub locale: String,

    /// Declared with a blank key path; never hydrated.
    pub unmodeled_value1: String,
    /// No key path at all; never hydrated.
    pub unmodeled_value2: String,
}

impl Hydrate for ServiceSettings {
    fn field_table() -> FieldTable<Self> {
        FieldTable::<Self>::new()
            .bind("secret_key", "secretKey", |s, v| s.secret_key = v)
            .bind("favorite_color", "favoriteColor", |s, v| s.favorite_color = v)
            .bind("locale", "preferences/locale", |s, v| s.locale = v)
            .bind("unmodeled_value1", "", |s, v| s.unmodeled_value1 = v)
            .unmapped("unmodeled_value2")
    }
}

impl std::fmt::Debug for ServiceSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceSettings")
            .field("secret_key", &"[REDACTED]")
            .field("favorite_color", &self.favorite_color)
            .field("locale", &self.locale)
            .field("unmodeled_value1", &self.unmodeled_value1)
            .field("unmodeled_value2", &self.unmodeled_value2)
            .finish()
    }
}
