//! A JSON file of records as a queryable source.
//!
//! Accepts either one top-level array of objects or JSON Lines (one object per
//! non-blank line). The file is re-read on every fetch.

use crate::error::StoreError;
use camino::{Utf8Path, Utf8PathBuf};
use fallback_domain::{Predicate, QuerySource};
use fallback_types::Row;
use serde_json::Value as JsonValue;
use tracing::debug;

#[derive(Clone, Debug)]
pub struct JsonSource {
    path: Utf8PathBuf,
}

impl JsonSource {
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Read and decode every record, in file order.
    pub fn load(&self) -> Result<Vec<Row>, StoreError> {
        let text = std::fs::read_to_string(&self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        parse_records(&self.path, &text)
    }
}

impl<F: Predicate<Row> + ?Sized> QuerySource<F> for JsonSource {
    type Item = Row;
    type Error = StoreError;

    fn fetch(&self, filter: &F) -> Result<Vec<Row>, StoreError> {
        let mut rows = self.load()?;
        let total = rows.len();
        rows.retain(|row| filter.evaluate(row));
        debug!(path = %self.path, total, matched = rows.len(), "json fetch");
        Ok(rows)
    }
}

/// Decode `text` as records. `path` is only used in error messages.
pub fn parse_records(path: &Utf8Path, text: &str) -> Result<Vec<Row>, StoreError> {
    if text.trim_start().starts_with('[') {
        let items: Vec<JsonValue> =
            serde_json::from_str(text).map_err(|e| StoreError::Json {
                path: path.to_path_buf(),
                index: 0,
                message: e.to_string(),
            })?;
        return items
            .into_iter()
            .enumerate()
            .map(|(index, item)| to_row(path, index, item))
            .collect();
    }

    text.lines()
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(index, line)| {
            let item = serde_json::from_str(line).map_err(|e| StoreError::Json {
                path: path.to_path_buf(),
                index,
                message: e.to_string(),
            })?;
            to_row(path, index, item)
        })
        .collect()
}

fn to_row(path: &Utf8Path, index: usize, item: JsonValue) -> Result<Row, StoreError> {
    let JsonValue::Object(map) = item else {
        return Err(StoreError::NotAnObject {
            path: path.to_path_buf(),
            index,
        });
    };
    Row::from_json_object(map).map_err(|(field, source)| StoreError::UnsupportedValue {
        path: path.to_path_buf(),
        index,
        field,
        source,
    })
}
