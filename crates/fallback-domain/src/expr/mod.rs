//! Predicate language over rows.
//!
//! An [`Expr`] is evaluated in-process through [`Predicate`] and is also plain
//! data, so backend adapters can translate it into their own filter syntax.
//!
//! Evaluation is two-valued: a comparison involving `null`, a missing field,
//! or values of incompatible types is simply false. `bool`, `int` and `real`
//! form one numeric domain (`true` is 1); `text` compares only with `text`,
//! byte-wise.

mod parse;

pub use parse::{ParseError, parse};

use crate::model::Record;
use crate::predicate::Predicate;
use fallback_types::Value;
use std::cmp::Ordering;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    pub fn symbol(self) -> &'static str {
        match self {
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        }
    }

    fn holds(self, ord: Ordering) -> bool {
        match self {
            CmpOp::Eq => ord == Ordering::Equal,
            CmpOp::Ne => ord != Ordering::Equal,
            CmpOp::Lt => ord == Ordering::Less,
            CmpOp::Le => ord != Ordering::Greater,
            CmpOp::Gt => ord == Ordering::Greater,
            CmpOp::Ge => ord != Ordering::Less,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Literal(bool),
    /// `value` is never [`Value::Null`]; see [`Expr::compare`].
    Compare {
        field: String,
        op: CmpOp,
        value: Value,
    },
    IsNull {
        field: String,
        negated: bool,
    },
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Build a comparison, folding `null` operands the way the parser does:
    /// `== null` and `!= null` become null checks, anything else is false.
    pub fn compare(field: impl Into<String>, op: CmpOp, value: impl Into<Value>) -> Expr {
        let field = field.into();
        match (value.into(), op) {
            (Value::Null, CmpOp::Eq) => Expr::IsNull {
                field,
                negated: false,
            },
            (Value::Null, CmpOp::Ne) => Expr::IsNull {
                field,
                negated: true,
            },
            (Value::Null, _) => Expr::Literal(false),
            (value, op) => Expr::Compare { field, op, value },
        }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Expr {
        Expr::compare(field, CmpOp::Eq, value)
    }

    pub fn and(self, other: Expr) -> Expr {
        Expr::And(Box::new(self), Box::new(other))
    }

    /// Expression-level disjunction; the result is a single `Expr`.
    pub fn or(self, other: Expr) -> Expr {
        Expr::Or(Box::new(self), Box::new(other))
    }

    /// Column names referenced by this expression, in first-use order.
    pub fn fields(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_fields(&mut out);
        out
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::Literal(_) => {}
            Expr::Compare { field, .. } | Expr::IsNull { field, .. } => {
                if !out.contains(&field.as_str()) {
                    out.push(field);
                }
            }
            Expr::Not(inner) => inner.collect_fields(out),
            Expr::And(a, b) | Expr::Or(a, b) => {
                a.collect_fields(out);
                b.collect_fields(out);
            }
        }
    }

    pub fn matches<R: Record + ?Sized>(&self, record: &R) -> bool {
        match self {
            Expr::Literal(b) => *b,
            Expr::Compare { field, op, value } => match record.field(field) {
                Some(actual) => compare_values(&actual, value).is_some_and(|ord| op.holds(ord)),
                None => false,
            },
            Expr::IsNull { field, negated } => {
                let is_null = record.field(field).is_none_or(|v| v.is_null());
                is_null != *negated
            }
            Expr::Not(inner) => !inner.matches(record),
            Expr::And(a, b) => a.matches(record) && b.matches(record),
            Expr::Or(a, b) => a.matches(record) || b.matches(record),
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::Or(..) => 1,
            Expr::And(..) => 2,
            Expr::Not(_) => 3,
            _ => 4,
        }
    }

    fn fmt_at(&self, f: &mut fmt::Formatter<'_>, min: u8) -> fmt::Result {
        let wrap = self.precedence() < min;
        if wrap {
            f.write_str("(")?;
        }
        match self {
            Expr::Literal(b) => write!(f, "{b}")?,
            Expr::Compare { field, op, value } => {
                write_field(f, field)?;
                write!(f, " {} {value}", op.symbol())?;
            }
            Expr::IsNull { field, negated } => {
                write_field(f, field)?;
                f.write_str(if *negated { " != null" } else { " == null" })?;
            }
            Expr::Not(inner) => {
                f.write_str("!(")?;
                inner.fmt_at(f, 0)?;
                f.write_str(")")?;
            }
            // Both operators parse left-associative, so a right operand of the
            // same kind needs parentheses.
            Expr::And(a, b) => {
                a.fmt_at(f, 2)?;
                f.write_str(" && ")?;
                b.fmt_at(f, 3)?;
            }
            Expr::Or(a, b) => {
                a.fmt_at(f, 1)?;
                f.write_str(" || ")?;
                b.fmt_at(f, 2)?;
            }
        }
        if wrap {
            f.write_str(")")?;
        }
        Ok(())
    }
}

impl std::ops::Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        Expr::Not(Box::new(self))
    }
}

/// Canonical text; parses back to an equal `Expr`.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_at(f, 0)
    }
}

impl<R: Record + ?Sized> Predicate<R> for Expr {
    fn evaluate(&self, item: &R) -> bool {
        self.matches(item)
    }
}

/// Whether `name` can be written bare (otherwise it is backtick-quoted).
pub fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !matches!(name, "true" | "false" | "null")
}

fn write_field(f: &mut fmt::Formatter<'_>, field: &str) -> fmt::Result {
    if is_plain_identifier(field) {
        f.write_str(field)
    } else {
        write!(f, "`{field}`")
    }
}

enum Numeric {
    Int(i64),
    Real(f64),
}

fn numeric(v: &Value) -> Option<Numeric> {
    match v {
        Value::Bool(b) => Some(Numeric::Int(i64::from(*b))),
        Value::Int(i) => Some(Numeric::Int(*i)),
        Value::Real(r) => Some(Numeric::Real(*r)),
        Value::Null | Value::Text(_) => None,
    }
}

/// Ordering between two values, or `None` when they are not comparable.
pub fn compare_values(left: &Value, right: &Value) -> Option<Ordering> {
    if let (Some(a), Some(b)) = (numeric(left), numeric(right)) {
        return match (a, b) {
            (Numeric::Int(a), Numeric::Int(b)) => Some(a.cmp(&b)),
            (Numeric::Int(a), Numeric::Real(b)) => cmp_int_real(a, b),
            (Numeric::Real(a), Numeric::Int(b)) => cmp_int_real(b, a).map(Ordering::reverse),
            (Numeric::Real(a), Numeric::Real(b)) => a.partial_cmp(&b),
        };
    }
    match (left, right) {
        (Value::Text(a), Value::Text(b)) => Some(a.as_bytes().cmp(b.as_bytes())),
        _ => None,
    }
}

/// Exact integer/real ordering, as SQLite does it; casting `i` to `f64` would
/// lose precision above 2^53.
fn cmp_int_real(i: i64, r: f64) -> Option<Ordering> {
    // 2^63, the first real past i64::MAX.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if r.is_nan() {
        return None;
    }
    if r >= LIMIT {
        return Some(Ordering::Less);
    }
    if r < -LIMIT {
        return Some(Ordering::Greater);
    }
    let whole = r.trunc();
    match i.cmp(&(whole as i64)) {
        Ordering::Equal => 0.0_f64.partial_cmp(&(r - whole)),
        other => Some(other),
    }
}
