//! Pure lookup logic (no IO).
//!
//! Input: a queryable source and two predicates.
//! Output: the first primary match, else the first fallback match, from a single fetch.

#![forbid(unsafe_code)]

pub mod error;
pub mod expr;
pub mod model;
pub mod predicate;
pub mod source;

mod lookup;

#[cfg(test)]
mod proptest;
#[cfg(test)]
mod test_support;

pub use error::LookupError;
pub use expr::{CmpOp, Expr, ParseError, parse};
pub use lookup::{Match, find_first_or_fallback, find_match, lookup};
pub use model::Record;
pub use predicate::{Or, Predicate};
pub use source::{CountingSource, MemorySource, QuerySource};
