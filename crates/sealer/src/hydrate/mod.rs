//! One-shot hydration of typed configuration records from Parameter Store.
//!
//! # Responsibilities
//!
//! - Normalise the deployment namespace and read every parameter at or below
//!   it, following continuation tokens until the store reports no more pages.
//! - Index the parameters by name relative to the namespace.
//! - Walk the record's [`FieldTable`] and assign string values to the fields
//!   that declare a key path, skipping anything not string-typed.
//!
//! # Module invariants
//!
//! - **Whitelist only.** Fields without a declared key path are never
//!   written, even when a parameter of the same name exists.
//! - **No values in logs.** Field names, paths and kinds may be logged;
//!   parameter values never are.
//! - **All or nothing at the source.** A failed page read fails the whole
//!   hydration; nothing is mapped from a partial listing.

pub mod namespace;
pub mod source;
pub mod table;

pub use namespace::Namespace;
pub use source::{
    ListOptions, ListRequest, ParameterKind, ParameterPage, ParameterSource, RemoteEntry,
    SourceError,
};
pub use table::{FieldBinding, FieldTable, Hydrate};

use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that abort hydration.
#[derive(Debug, Error)]
pub enum HydrateError {
    /// The configured namespace is empty.
    #[error("configuration namespace must not be empty")]
    EmptyNamespace,

    /// Reading from the parameter store failed.
    #[error("failed to read configuration parameters: {0}")]
    Source(#[from] SourceError),
}

/// A mapped field whose parameter had a non-string kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedField {
    pub field: &'static str,
    pub path: &'static str,
    pub kind: ParameterKind,
}

/// What happened to each declared field during hydration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HydrationReport {
    /// Fields assigned from a parameter.
    pub applied: Vec<&'static str>,
    /// Mapped fields whose parameter was not present.
    pub missing: Vec<&'static str>,
    /// Mapped fields whose parameter was not string-typed.
    pub skipped: Vec<SkippedField>,
    /// Fields without a key path.
    pub unmapped: Vec<&'static str>,
}

/// A populated record together with its [`HydrationReport`].
#[derive(Debug)]
pub struct Hydrated<R> {
    pub record: R,
    pub report: HydrationReport,
}

/// Populate a fresh `R` from every parameter under `namespace`.
///
/// # Errors
///
/// Returns [`HydrateError::EmptyNamespace`] for a blank namespace and
/// [`HydrateError::Source`] if any page read fails. Missing or mistyped
/// parameters are not errors; they are recorded in the report.
pub async fn hydrate<R, S>(source: &S, namespace: &str) -> Result<Hydrated<R>, HydrateError>
where
    R: Hydrate,
    S: ParameterSource + ?Sized,
{
    let namespace = Namespace::new(namespace)?;
    let index = fetch_all(source, &namespace, ListOptions::recursive_decrypted()).await?;
    Ok(apply(&index))
}

/// Read every page under `namespace` and index entries by relative name.
///
/// # Errors
///
/// Returns the first [`SourceError`] raised by `source`.
pub async fn fetch_all<S>(
    source: &S,
    namespace: &Namespace,
    options: ListOptions,
) -> Result<HashMap<String, RemoteEntry>, SourceError>
where
    S: ParameterSource + ?Sized,
{
    let mut index = HashMap::new();
    let mut next_token = None;
    let mut pages = 0usize;

    loop {
        let request = ListRequest {
            path: namespace.as_str().to_owned(),
            options,
            next_token: next_token.take(),
        };
        let page = source.list_under(&request).await?;
        pages += 1;

        for entry in page.entries {
            index.insert(namespace.relative(&entry.name).to_owned(), entry);
        }

        match page.next_token {
            Some(token) if !token.is_empty() => next_token = Some(token),
            _ => break,
        }
    }

    debug!(%namespace, pages, parameters = index.len(), "configuration parameters indexed");
    Ok(index)
}

/// Map indexed parameters onto a fresh `R` using its field table.
pub fn apply<R: Hydrate>(index: &HashMap<String, RemoteEntry>) -> Hydrated<R> {
    let mut record = R::default();
    let mut report = HydrationReport::default();

    let table = R::field_table();
    if table.is_empty() {
        warn!("record declares no fields; nothing to hydrate");
    }
    debug!(fields = table.len(), parameters = index.len(), "mapping parameters onto record");

    for binding in table.iter() {
        match binding {
            FieldBinding::Unmapped { .. } => {
                debug!(field = binding.field(), "field is not mapped to a parameter");
                report.unmapped.push(binding.field());
            }
            FieldBinding::Mapped { field, path, set } => match index.get(*path) {
                None => {
                    info!(field = *field, path = *path, "parameter not present in retrieved configuration");
                    report.missing.push(*field);
                }
                Some(entry) if entry.kind.is_string_like() => {
                    set(&mut record, entry.value.clone());
                    debug!(field = *field, path = *path, kind = %entry.kind, "field hydrated");
                    report.applied.push(*field);
                }
                Some(entry) => {
                    warn!(
                        field = *field,
                        path = *path,
                        kind = %entry.kind,
                        "ignoring parameter that is not a string kind"
                    );
                    report.skipped.push(SkippedField {
                        field: *field,
                        path: *path,
                        kind: entry.kind,
                    });
                }
            },
        }
    }

    Hydrated { record, report }
}

#[cfg(test)]
mod tests {
    use super::source::MockParameterSource;
    use super::*;

    #[derive(Debug, Default)]
    struct Selective {
        a: String,
        b: String,
        c: String,
    }

    impl Hydrate for Selective {
        fn field_table() -> FieldTable<Self> {
            FieldTable::<Self>::new()
                .bind("a", "alpha", |r, v| r.a = v)
                .unmapped("b")
                .bind("c", "nested/gamma", |r, v| r.c = v)
        }
    }

    fn entry(name: &str, value: &str, kind: ParameterKind) -> RemoteEntry {
        RemoteEntry {
            name: name.into(),
            value: value.into(),
            kind,
        }
    }

    fn single_page(entries: Vec<RemoteEntry>) -> MockParameterSource {
        let mut source = MockParameterSource::new();
        source.expect_list_under().times(1).returning(move |_| {
            Ok(ParameterPage {
                entries: entries.clone(),
                next_token: None,
            })
        });
        source
    }

    #[tokio::test]
    async fn only_mapped_fields_are_hydrated() {
        let source = single_page(vec![
            entry("/app/alpha", "x", ParameterKind::String),
            entry("/app/beta", "y", ParameterKind::String),
            entry("/app/b", "z", ParameterKind::String),
        ]);
        let hydrated: Hydrated<Selective> = hydrate(&source, "/app").await.unwrap();

        assert_eq!(hydrated.record.a, "x");
        assert!(hydrated.record.b.is_empty());
        assert!(hydrated.record.c.is_empty());
        assert_eq!(hydrated.report.applied, vec!["a"]);
        assert_eq!(hydrated.report.unmapped, vec!["b"]);
        assert_eq!(hydrated.report.missing, vec!["c"]);
    }

    #[tokio::test]
    async fn secure_strings_and_nested_paths_are_hydrated() {
        let source = single_page(vec![
            entry("/app/alpha", "secret", ParameterKind::SecureString),
            entry("/app/nested/gamma", "en-US", ParameterKind::String),
        ]);
        let hydrated: Hydrated<Selective> = hydrate(&source, "/app/").await.unwrap();

        assert_eq!(hydrated.record.a, "secret");
        assert_eq!(hydrated.record.c, "en-US");
        assert!(hydrated.report.missing.is_empty());
    }

    #[tokio::test]
    async fn values_are_copied_verbatim() {
        let source = single_page(vec![entry("/app/alpha", "  padded \n", ParameterKind::String)]);
        let hydrated: Hydrated<Selective> = hydrate(&source, "/app").await.unwrap();
        assert_eq!(hydrated.record.a, "  padded \n");
    }

    #[tokio::test]
    async fn non_string_kinds_are_skipped() {
        let source = single_page(vec![
            entry("/app/alpha", "x,y,z", ParameterKind::StringList),
            entry("/app/nested/gamma", "?", ParameterKind::Unknown),
        ]);
        let hydrated: Hydrated<Selective> = hydrate(&source, "/app").await.unwrap();

        assert!(hydrated.record.a.is_empty());
        assert!(hydrated.record.c.is_empty());
        assert_eq!(
            hydrated.report.skipped,
            vec![
                SkippedField {
                    field: "a",
                    path: "alpha",
                    kind: ParameterKind::StringList,
                },
                SkippedField {
                    field: "c",
                    path: "nested/gamma",
                    kind: ParameterKind::Unknown,
                },
            ]
        );
    }

    #[tokio::test]
    async fn follows_continuation_tokens_across_pages() {
        let mut source = MockParameterSource::new();
        source
            .expect_list_under()
            .withf(|req| req.path == "/app/" && req.options == ListOptions::recursive_decrypted())
            .times(3)
            .returning(|req| {
                let page = match req.next_token.as_deref() {
                    None => ParameterPage {
                        entries: vec![entry("/app/unrelated", "1", ParameterKind::String)],
                        next_token: Some("page-2".into()),
                    },
                    Some("page-2") => ParameterPage {
                        entries: vec![entry("/app/alpha", "x", ParameterKind::String)],
                        next_token: Some("page-3".into()),
                    },
                    Some("page-3") => ParameterPage {
                        entries: vec![entry("/app/nested/gamma", "g", ParameterKind::String)],
                        next_token: None,
                    },
                    Some(other) => panic!("unexpected token {other}"),
                };
                Ok(page)
            });

        let namespace = Namespace::new("/app").unwrap();
        let index = fetch_all(&source, &namespace, ListOptions::recursive_decrypted())
            .await
            .unwrap();
        assert_eq!(index.len(), 3);
        assert!(index.contains_key("unrelated"));
        assert!(index.contains_key("alpha"));
        assert!(index.contains_key("nested/gamma"));

        let hydrated: Hydrated<Selective> = apply(&index);
        assert_eq!(hydrated.record.a, "x");
        assert_eq!(hydrated.record.c, "g");
    }

    #[derive(Debug, Default)]
    struct NoFields;

    impl Hydrate for NoFields {
        fn field_table() -> FieldTable<Self> {
            FieldTable::new()
        }
    }

    #[test]
    fn record_without_fields_hydrates_to_empty_report() {
        let mut index = HashMap::new();
        index.insert(
            "alpha".to_string(),
            entry("/app/alpha", "x", ParameterKind::String),
        );
        let hydrated: Hydrated<NoFields> = apply(&index);
        assert_eq!(hydrated.report, HydrationReport::default());
    }

    #[tokio::test]
    async fn empty_token_ends_pagination() {
        let mut source = MockParameterSource::new();
        source.expect_list_under().times(1).returning(|_| {
            Ok(ParameterPage {
                entries: vec![],
                next_token: Some(String::new()),
            })
        });
        let hydrated: Hydrated<Selective> = hydrate(&source, "/app").await.unwrap();
        assert_eq!(hydrated.report.missing, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn source_failure_aborts_hydration() {
        let mut source = MockParameterSource::new();
        source
            .expect_list_under()
            .times(1)
            .returning(|_| Err(SourceError::Request("connection refused".into())));
        let result = hydrate::<Selective, _>(&source, "/app").await;
        assert!(matches!(result, Err(HydrateError::Source(_))));
    }

    #[tokio::test]
    async fn failure_on_later_page_aborts_hydration() {
        let mut source = MockParameterSource::new();
        source.expect_list_under().times(2).returning(|req| match req.next_token {
            None => Ok(ParameterPage {
                entries: vec![entry("/app/alpha", "x", ParameterKind::String)],
                next_token: Some("more".into()),
            }),
            Some(_) => Err(SourceError::Request("throttled".into())),
        });
        let result = hydrate::<Selective, _>(&source, "/app").await;
        assert!(matches!(result, Err(HydrateError::Source(_))));
    }

    #[tokio::test]
    async fn blank_namespace_never_reaches_the_source() {
        let mut source = MockParameterSource::new();
        source.expect_list_under().never();
        let result = hydrate::<Selective, _>(&source, "").await;
        assert!(matches!(result, Err(HydrateError::EmptyNamespace)));
    }
}
