use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt;

/// A single scalar cell.
///
/// The set is deliberately the intersection of what SQLite and JSON can both
/// carry without loss, so a predicate evaluated in-process agrees with the
/// same predicate translated to a backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Real(f64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Real(_) => "real",
            Value::Text(_) => "text",
        }
    }
}

/// Canonical literal form, as accepted by the expression parser.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            // Debug keeps a decimal point or exponent, so the literal re-parses as real.
            Value::Real(r) => write!(f, "{r:?}"),
            Value::Text(s) => {
                f.write_str("'")?;
                for c in s.chars() {
                    match c {
                        '\'' => f.write_str("\\'")?,
                        '\\' => f.write_str("\\\\")?,
                        '\n' => f.write_str("\\n")?,
                        '\t' => f.write_str("\\t")?,
                        other => write!(f, "{other}")?,
                    }
                }
                f.write_str("'")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// A JSON value that has no scalar counterpart.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValueError {
    pub kind: &'static str,
}

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported JSON {} (only scalars are allowed)", self.kind)
    }
}

impl std::error::Error for ValueError {}

impl TryFrom<JsonValue> for Value {
    type Error = ValueError;

    fn try_from(value: JsonValue) -> Result<Self, Self::Error> {
        match value {
            JsonValue::Null => Ok(Value::Null),
            JsonValue::Bool(b) => Ok(Value::Bool(b)),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Ok(Value::Int(i)),
                None => n
                    .as_f64()
                    .map(Value::Real)
                    .ok_or(ValueError { kind: "number" }),
            },
            JsonValue::String(s) => Ok(Value::Text(s)),
            JsonValue::Array(_) => Err(ValueError { kind: "array" }),
            JsonValue::Object(_) => Err(ValueError { kind: "object" }),
        }
    }
}

/// One record: column name -> value. Serialized as a flat JSON object.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct Row(BTreeMap<String, Value>);

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, handy for fixtures.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(column.into(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Convert a JSON object into a row, rejecting nested arrays and objects.
    pub fn from_json_object(
        object: serde_json::Map<String, JsonValue>,
    ) -> Result<Self, (String, ValueError)> {
        let mut row = Row::new();
        for (column, value) in object {
            match Value::try_from(value) {
                Ok(v) => row.insert(column, v),
                Err(e) => return Err((column, e)),
            }
        }
        Ok(row)
    }
}

impl From<BTreeMap<String, Value>> for Row {
    fn from(value: BTreeMap<String, Value>) -> Self {
        Self(value)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn display_produces_parseable_literals() {
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Int(-4).to_string(), "-4");
        assert_eq!(Value::Real(3.0).to_string(), "3.0");
        assert_eq!(Value::from("it's").to_string(), "'it\\'s'");
    }

    #[test]
    fn json_numbers_keep_integer_precision() {
        assert_eq!(Value::try_from(json!(7)).unwrap(), Value::Int(7));
        assert_eq!(Value::try_from(json!(7.5)).unwrap(), Value::Real(7.5));
        assert_eq!(
            Value::try_from(json!(u64::MAX)).unwrap(),
            Value::Real(u64::MAX as f64)
        );
    }

    #[test]
    fn nested_json_is_rejected_with_column_name() {
        let JsonValue::Object(obj) = json!({"id": 1, "tags": ["a"]}) else {
            unreachable!()
        };
        let (column, err) = Row::from_json_object(obj).unwrap_err();
        assert_eq!(column, "tags");
        assert_eq!(err.kind, "array");
    }

    #[test]
    fn row_serializes_as_flat_object() {
        let row = Row::new().with("id", 2).with("active", true).with("note", None::<&str>);
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json, json!({"active": true, "id": 2, "note": null}));

        let back: Row = serde_json::from_value(json).unwrap();
        assert_eq!(back, row);
    }
}
