//! Store adapters: concrete sources a lookup can run against.
//!
//! This crate is allowed to do filesystem and database IO. It knows nothing
//! about configuration files or reports; callers hand it a resolved
//! [`SourceSpec`].

#![forbid(unsafe_code)]

mod error;
mod json;
pub mod sql;
mod sqlite;

pub use error::StoreError;
pub use json::{JsonSource, parse_records};
pub use sql::{SqlFilter, SqlWriter};
pub use sqlite::SqliteSource;

use fallback_domain::{Predicate, QuerySource};
use fallback_types::{Row, SourceKind, SourceSpec};

/// Fuzz-friendly entry points. These never panic on any input.
pub mod fuzz {
    use camino::Utf8Path;

    /// Decode arbitrary text as a JSON records file.
    pub fn parse_json_records(text: &str) -> Result<usize, super::StoreError> {
        super::parse_records(Utf8Path::new("fuzz.json"), text).map(|rows| rows.len())
    }
}

/// Either backend, chosen at runtime from configuration.
#[derive(Debug)]
pub enum AnySource {
    Sqlite(SqliteSource),
    Json(JsonSource),
}

impl<F> QuerySource<F> for AnySource
where
    F: SqlFilter + Predicate<Row> + ?Sized,
{
    type Item = Row;
    type Error = StoreError;

    fn fetch(&self, filter: &F) -> Result<Vec<Row>, StoreError> {
        match self {
            AnySource::Sqlite(s) => s.fetch(filter),
            AnySource::Json(s) => s.fetch(filter),
        }
    }
}

/// Open the source described by `spec`.
///
/// SQLite sources are opened (and their table checked) immediately; JSON
/// sources are only read when fetched.
pub fn open_source(spec: &SourceSpec) -> Result<AnySource, StoreError> {
    match spec.kind {
        SourceKind::Sqlite => {
            let table = spec.table.as_deref().ok_or(StoreError::NoTable)?;
            let mut source = SqliteSource::open(&spec.path, table)?;
            if let Some(col) = &spec.order_by {
                source = source.order_by(col.clone())?;
            }
            Ok(AnySource::Sqlite(source))
        }
        SourceKind::Json => Ok(AnySource::Json(JsonSource::new(spec.path.clone()))),
    }
}
