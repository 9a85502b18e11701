//! Translation of predicates into SQLite `WHERE` clauses.
//!
//! The generated SQL must select exactly the rows the in-process evaluation of
//! the same predicate accepts, so each comparison carries a `typeof` guard and
//! every atom collapses to 0 or 1 (never SQL `NULL`).

use fallback_domain::{CmpOp, Expr, Or};
use fallback_types::Value;

/// Accumulates bound parameters while a filter is rendered.
pub struct SqlWriter<'a> {
    columns: &'a [String],
    params: Vec<Value>,
}

impl<'a> SqlWriter<'a> {
    /// `columns` are the columns of the target table; references to any other
    /// name are treated as a missing field.
    pub fn new(columns: &'a [String]) -> Self {
        Self {
            columns,
            params: Vec::new(),
        }
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Bind `value` and return its placeholder.
    pub fn bind(&mut self, value: &Value) -> String {
        self.params.push(value.clone());
        format!("?{}", self.params.len())
    }

    pub fn into_params(self) -> Vec<Value> {
        self.params
    }
}

/// A predicate that SQLite can run as a `WHERE` clause.
pub trait SqlFilter {
    fn to_sql(&self, w: &mut SqlWriter<'_>) -> String;
}

impl<T: SqlFilter + ?Sized> SqlFilter for &T {
    fn to_sql(&self, w: &mut SqlWriter<'_>) -> String {
        (**self).to_sql(w)
    }
}

impl<A: SqlFilter, B: SqlFilter> SqlFilter for Or<A, B> {
    fn to_sql(&self, w: &mut SqlWriter<'_>) -> String {
        let left = self.left().to_sql(w);
        let right = self.right().to_sql(w);
        format!("({left} OR {right})")
    }
}

impl SqlFilter for Expr {
    fn to_sql(&self, w: &mut SqlWriter<'_>) -> String {
        match self {
            Expr::Literal(b) => if *b { "1" } else { "0" }.to_string(),
            Expr::Compare { field, op, value } => {
                if !w.has_column(field) {
                    return "0".to_string();
                }
                let guard = match value {
                    Value::Text(_) => "= 'text'",
                    Value::Null => return "0".to_string(),
                    Value::Bool(_) | Value::Int(_) | Value::Real(_) => "IN ('integer', 'real')",
                };
                let col = quote_ident(field);
                let param = w.bind(value);
                format!(
                    "COALESCE((typeof({col}) {guard} AND {col} {} {param}), 0)",
                    sql_op(*op)
                )
            }
            Expr::IsNull { field, negated } => {
                if !w.has_column(field) {
                    return if *negated { "0" } else { "1" }.to_string();
                }
                let col = quote_ident(field);
                if *negated {
                    format!("({col} IS NOT NULL)")
                } else {
                    format!("({col} IS NULL)")
                }
            }
            Expr::Not(inner) => format!("(NOT {})", inner.to_sql(w)),
            Expr::And(a, b) => {
                let a = a.to_sql(w);
                let b = b.to_sql(w);
                format!("({a} AND {b})")
            }
            Expr::Or(a, b) => {
                let a = a.to_sql(w);
                let b = b.to_sql(w);
                format!("({a} OR {b})")
            }
        }
    }
}

fn sql_op(op: CmpOp) -> &'static str {
    match op {
        CmpOp::Eq => "=",
        CmpOp::Ne => "<>",
        CmpOp::Lt => "<",
        CmpOp::Le => "<=",
        CmpOp::Gt => ">",
        CmpOp::Ge => ">=",
    }
}

/// Double-quote an identifier, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Render `filter` for a table with `columns`, returning the clause and its
/// parameters in placeholder order.
pub fn render<F: SqlFilter + ?Sized>(filter: &F, columns: &[String]) -> (String, Vec<Value>) {
    let mut w = SqlWriter::new(columns);
    let sql = filter.to_sql(&mut w);
    (sql, w.into_params())
}
