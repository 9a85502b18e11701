//! Find the first element matching a primary predicate, or else the first
//! matching a fallback predicate, with a single fetch from the source.
//!
//! ```
//! use fallback::{MemorySource, Row, find_first_or_fallback, parse};
//!
//! let source = MemorySource::new(vec![
//!     Row::new().with("id", 1).with("active", false),
//!     Row::new().with("id", 2).with("active", true),
//! ]);
//! let found = find_first_or_fallback(
//!     &source,
//!     parse("active == true").unwrap(),
//!     parse("id == 1").unwrap(),
//! )
//! .unwrap();
//! assert_eq!(found.and_then(|r| r.get("id").cloned()), Some(2.into()));
//! ```
//!
//! With the default `store` feature, [`store`] adds SQLite and JSON sources.

#![forbid(unsafe_code)]

pub use fallback_domain::{
    CmpOp, CountingSource, Expr, LookupError, Match, MemorySource, Or, ParseError, Predicate,
    QuerySource, Record, find_first_or_fallback, find_match, lookup, parse,
};
pub use fallback_types::{Row, Value};

#[cfg(feature = "store")]
pub mod store {
    pub use fallback_store::{
        AnySource, JsonSource, SqlFilter, SqliteSource, StoreError, open_source,
    };
    pub use fallback_types::{SourceKind, SourceSpec};
}
