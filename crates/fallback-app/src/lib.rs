//! Use case orchestration for fallback.
//!
//! This crate provides the application layer: use cases that coordinate the settings, domain,
//! and store layers and turn every outcome into a [`LookupReport`](fallback_types::LookupReport).
//!
//! The CLI crate depends on this; it only handles argument parsing and I/O.

#![forbid(unsafe_code)]

mod explain;
mod lookup;
mod parse;
mod render;

pub use explain::{ExplainOutput, format_explanation, format_not_found, run_explain};
pub use lookup::{LookupInput, LookupOutput, error_report, exit_code, run_lookup};
pub use parse::{ParseOutput, format_parse, run_parse};
pub use render::{render_json, render_text, write_report};
