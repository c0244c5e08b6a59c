//! Declarative field-to-key tables.
//!
//! A record opts in to hydration by implementing [`Hydrate`] and listing its
//! fields in a [`FieldTable`]. Only fields bound to a non-empty key path are
//! ever written; everything else keeps its `Default` value.
//!
//! ```ignore
//! impl Hydrate for Settings {
//!     fn field_table() -> FieldTable<Self> {
//!         FieldTable::<Self>::new()
//!             .bind("secret_key", "secretKey", |s, v| s.secret_key = v)
//!             .unmapped("build_label")
//!     }
//! }
//! ```

/// Assigns a hydrated value to one field. Only string fields can be bound.
pub type Setter<R> = fn(&mut R, String);

/// One declared field of a record.
pub enum FieldBinding<R> {
    /// Populated from the entry at `path`, relative to the namespace.
    Mapped {
        field: &'static str,
        path: &'static str,
        set: Setter<R>,
    },
    /// Declared but never populated remotely.
    Unmapped { field: &'static str },
}

impl<R> FieldBinding<R> {
    pub fn field(&self) -> &'static str {
        match self {
            FieldBinding::Mapped { field, .. } | FieldBinding::Unmapped { field } => *field,
        }
    }
}

/// Ordered list of a record's field bindings.
pub struct FieldTable<R> {
    bindings: Vec<FieldBinding<R>>,
}

impl<R> FieldTable<R> {
    pub fn new() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    /// Bind `field` to the key `path`. A blank path leaves the field unmapped.
    pub fn bind(mut self, field: &'static str, path: &'static str, set: Setter<R>) -> Self {
        let binding = if path.trim().is_empty() {
            FieldBinding::Unmapped { field }
        } else {
            FieldBinding::Mapped { field, path, set }
        };
        self.bindings.push(binding);
        self
    }

    /// Declare a field that hydration must never touch.
    pub fn unmapped(mut self, field: &'static str) -> Self {
        self.bindings.push(FieldBinding::Unmapped { field });
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldBinding<R>> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl<R> Default for FieldTable<R> {
    fn default() -> Self {
        Self::new()
    }
}

/// A record that can be populated from the parameter store.
pub trait Hydrate: Default + Sized {
    /// The record's field bindings.
    fn field_table() -> FieldTable<Self>;
}
