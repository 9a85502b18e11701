//! The `parse` use case: validate an expression and show how it would run.

use anyhow::Context;
use fallback_types::Value;

/// Output from the parse use case.
#[derive(Clone, Debug, PartialEq)]
pub struct ParseOutput {
    /// Canonical text; parses back to the same expression.
    pub canonical: String,
    /// Columns referenced, in first-use order.
    pub fields: Vec<String>,
    /// The SQLite `WHERE` clause and its bound parameters, when requested.
    pub sql: Option<(String, Vec<Value>)>,
}

/// Parse `text`. With `sql`, also render it for a table that has every
/// referenced column.
pub fn run_parse(text: &str, sql: bool) -> anyhow::Result<ParseOutput> {
    let expr = fallback_domain::parse(text).context("parse expression")?;
    let fields: Vec<String> = expr.fields().into_iter().map(str::to_string).collect();
    let sql = sql.then(|| fallback_store::sql::render(&expr, &fields));
    Ok(ParseOutput {
        canonical: expr.to_string(),
        fields,
        sql,
    })
}

/// Format parse output for terminal display.
pub fn format_parse(out: &ParseOutput) -> String {
    let mut s = String::new();
    s.push_str(&out.canonical);
    s.push('\n');
    if !out.fields.is_empty() {
        s.push_str(&format!("fields: {}\n", out.fields.join(", ")));
    }
    if let Some((clause, params)) = &out.sql {
        s.push_str(&format!("where: {clause}\n"));
        for (idx, value) in params.iter().enumerate() {
            s.push_str(&format!("  ?{} = {value}\n", idx + 1));
        }
    }
    s
}
