//! Stable DTOs and IDs used across the fallback workspace.
//!
//! This crate is intentionally boring:
//! - scalar values and rows shared by every source
//! - source descriptions produced by config resolution
//! - the emitted lookup report
//! - stable string codes for reported errors
//! - explain registry for those codes

#![forbid(unsafe_code)]

pub mod explain;
pub mod ids;
pub mod receipt;
pub mod source;
pub mod value;

pub use explain::{Explanation, lookup_explanation};
pub use receipt::{
    ErrorInfo, LookupData, LookupReport, Outcome, SCHEMA_LOOKUP_REPORT_V1, SourceMeta, ToolMeta,
};
pub use source::{SourceKind, SourceSpec};
pub use value::{Row, Value, ValueError};
