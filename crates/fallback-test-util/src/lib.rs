//! Shared test utilities for the fallback workspace.
//!
//! This crate exists because `xtask` needs `normalize_nondeterministic` at
//! runtime (not behind `#[cfg(test)]`), so a `#[cfg(test)]` module inside
//! `fallback-types` would not suffice.

use serde_json::Value;

/// Normalize non-deterministic JSON fields of a lookup report for golden-file
/// comparison.
///
/// Only the root object is touched, and only when it looks like a report
/// (`schema`, `tool`, `outcome` and `data` all present). The matched `record`
/// is user data and may legitimately hold keys such as `started_at`, so
/// nothing is rewritten below the root.
///
/// - `started_at` / `finished_at` become `"__TIMESTAMP__"`
/// - `tool.version` becomes `"__VERSION__"`
/// - `source.path` keeps only its final component (tests run in temp dirs)
pub fn normalize_nondeterministic(mut value: Value) -> Value {
    let Some(obj) = value.as_object_mut() else {
        return value;
    };
    let is_report = obj.contains_key("schema")
        && obj.contains_key("tool")
        && obj.contains_key("outcome")
        && obj.contains_key("data");
    if !is_report {
        return value;
    }

    for key in ["started_at", "finished_at"] {
        if obj.contains_key(key) {
            obj.insert(key.to_string(), Value::String("__TIMESTAMP__".to_string()));
        }
    }
    if let Some(tool) = obj.get_mut("tool").and_then(Value::as_object_mut)
        && tool.contains_key("version")
    {
        tool.insert(
            "version".to_string(),
            Value::String("__VERSION__".to_string()),
        );
    }
    if let Some(source) = obj.get_mut("source").and_then(Value::as_object_mut) {
        let file = source
            .get("path")
            .and_then(Value::as_str)
            .map(|p| p.rsplit(['/', '\\']).next().unwrap_or(p).to_string());
        if let Some(file) = file {
            source.insert("path".to_string(), Value::String(file));
        }
    }
    value
}
