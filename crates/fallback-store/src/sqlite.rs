//! A table in a SQLite database as a queryable source.

use crate::error::StoreError;
use crate::sql::{self, SqlFilter, quote_ident};
use camino::Utf8Path;
use fallback_domain::QuerySource;
use fallback_types::{Row, Value};
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{Connection, OpenFlags, params_from_iter};
use tracing::debug;

/// Rows of one table, filtered by SQLite itself.
///
/// Each [`fetch`](QuerySource::fetch) is one `SELECT`. Without `order_by` the
/// rows come back in SQLite's natural scan order.
pub struct SqliteSource {
    conn: Connection,
    table: String,
    columns: Vec<String>,
    order_by: Option<String>,
}

impl std::fmt::Debug for SqliteSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteSource")
            .field("table", &self.table)
            .field("columns", &self.columns)
            .field("order_by", &self.order_by)
            .finish_non_exhaustive()
    }
}

impl SqliteSource {
    /// Open an existing database file read-only.
    pub fn open(path: &Utf8Path, table: &str) -> Result<Self, StoreError> {
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        Self::from_connection(conn, table)
    }

    /// Use an already-open connection (tests, in-memory databases).
    pub fn from_connection(conn: Connection, table: &str) -> Result<Self, StoreError> {
        let columns = table_columns(&conn, table)?;
        if columns.is_empty() {
            return Err(StoreError::TableNotFound {
                table: table.to_string(),
            });
        }
        debug!(table, columns = columns.len(), "opened sqlite source");
        Ok(Self {
            conn,
            table: table.to_string(),
            columns,
            order_by: None,
        })
    }

    /// Return rows sorted by `column` instead of scan order.
    ///
    /// The column must exist: SQLite reads an unknown quoted name as a string
    /// constant and would silently keep scan order.
    pub fn order_by(mut self, column: impl Into<String>) -> Result<Self, StoreError> {
        let column = column.into();
        if !self.columns.contains(&column) {
            return Err(StoreError::ColumnNotFound {
                table: self.table,
                column,
            });
        }
        self.order_by = Some(column);
        Ok(self)
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// The statement and parameters a fetch with `filter` would run.
    pub fn select_sql<F: SqlFilter + ?Sized>(&self, filter: &F) -> (String, Vec<Value>) {
        let (clause, params) = sql::render(filter, &self.columns);
        let mut stmt = format!(
            "SELECT * FROM {} WHERE {clause}",
            quote_ident(&self.table)
        );
        if let Some(col) = &self.order_by {
            stmt.push_str(" ORDER BY ");
            stmt.push_str(&quote_ident(col));
        }
        (stmt, params)
    }
}

impl<F: SqlFilter + ?Sized> QuerySource<F> for SqliteSource {
    type Item = Row;
    type Error = StoreError;

    fn fetch(&self, filter: &F) -> Result<Vec<Row>, StoreError> {
        let (sql, params) = self.select_sql(filter);
        debug!(%sql, params = params.len(), "sqlite fetch");

        let mut stmt = self.conn.prepare_cached(&sql)?;
        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let mut rows = stmt.query(params_from_iter(params.iter().map(to_sql_value)))?;

        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut record = Row::new();
            for (idx, name) in names.iter().enumerate() {
                let value = from_value_ref(name, row.get_ref(idx)?)?;
                record.insert(name.clone(), value);
            }
            out.push(record);
        }
        Ok(out)
    }
}

fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>, StoreError> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", quote_ident(table)))?;
    let names = stmt.query_map([], |row| row.get::<_, String>(1))?;
    names
        .collect::<Result<Vec<_>, _>>()
        .map_err(StoreError::from)
}

fn to_sql_value(v: &Value) -> SqlValue {
    match v {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Int(i) => SqlValue::Integer(*i),
        Value::Real(r) => SqlValue::Real(*r),
        Value::Text(s) => SqlValue::Text(s.clone()),
    }
}

fn from_value_ref(column: &str, v: ValueRef<'_>) -> Result<Value, StoreError> {
    Ok(match v {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Int(i),
        ValueRef::Real(r) => Value::Real(r),
        ValueRef::Text(bytes) => match std::str::from_utf8(bytes) {
            Ok(text) => Value::Text(text.to_string()),
            Err(_) => {
                return Err(StoreError::InvalidText {
                    column: column.to_string(),
                });
            }
        },
        ValueRef::Blob(_) => {
            return Err(StoreError::UnsupportedColumn {
                column: column.to_string(),
            });
        }
    })
}
