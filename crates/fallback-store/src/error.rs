use camino::Utf8PathBuf;
use fallback_types::ValueError;

/// Failures raised by the store adapters.
///
/// These are what a lookup reports as a backend error; callers get them back
/// unchanged inside [`fallback_domain::LookupError::Backend`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("SQLite error: {message}")]
    Sqlite { message: String },

    #[error("sqlite sources need a table name")]
    NoTable,

    #[error("table not found: {table}")]
    TableNotFound { table: String },

    #[error("column not found: {table}.{column}")]
    ColumnNotFound { table: String, column: String },

    #[error("column {column} holds text that is not valid UTF-8")]
    InvalidText { column: String },

    #[error("column {column} holds a blob, which has no scalar form")]
    UnsupportedColumn { column: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path} at record {index}: {message}")]
    Json {
        path: Utf8PathBuf,
        index: usize,
        message: String,
    },

    #[error("record {index} in {path} is not a JSON object")]
    NotAnObject { path: Utf8PathBuf, index: usize },

    #[error("record {index} in {path}, field {field}: {source}")]
    UnsupportedValue {
        path: Utf8PathBuf,
        index: usize,
        field: String,
        #[source]
        source: ValueError,
    },
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Sqlite {
            message: e.to_string(),
        }
    }
}
