use crate::SourceMeta;
use camino::{Utf8Path, Utf8PathBuf};
use std::fmt;

/// Backends a lookup can run against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    /// A table in a SQLite database file.
    Sqlite,
    /// A JSON array of objects, or JSON Lines.
    Json,
}

impl SourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::Sqlite => "sqlite",
            SourceKind::Json => "json",
        }
    }

    pub fn parse(v: &str) -> Option<Self> {
        match v {
            "sqlite" => Some(SourceKind::Sqlite),
            "json" | "jsonl" => Some(SourceKind::Json),
            _ => None,
        }
    }

    /// Guess the kind from a file extension.
    pub fn infer(path: &Utf8Path) -> Option<Self> {
        match path.extension()?.to_ascii_lowercase().as_str() {
            "db" | "sqlite" | "sqlite3" => Some(SourceKind::Sqlite),
            "json" | "jsonl" | "ndjson" => Some(SourceKind::Json),
            _ => None,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully resolved description of the source to open.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceSpec {
    pub kind: SourceKind,
    pub path: Utf8PathBuf,
    /// Required for sqlite, absent for json.
    pub table: Option<String>,
    /// sqlite only.
    pub order_by: Option<String>,
}

impl SourceSpec {
    pub fn meta(&self) -> SourceMeta {
        SourceMeta {
            kind: self.kind.as_str().to_string(),
            path: self.path.as_str().replace('\\', "/"),
            table: self.table.clone(),
            order_by: self.order_by.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_is_inferred_from_extension() {
        assert_eq!(SourceKind::infer(Utf8Path::new("a/b.db")), Some(SourceKind::Sqlite));
        assert_eq!(SourceKind::infer(Utf8Path::new("x.SQLITE3")), Some(SourceKind::Sqlite));
        assert_eq!(SourceKind::infer(Utf8Path::new("rows.ndjson")), Some(SourceKind::Json));
        assert_eq!(SourceKind::infer(Utf8Path::new("rows.csv")), None);
        assert_eq!(SourceKind::infer(Utf8Path::new("noext")), None);
    }
}
