//! Stable identifiers for reported error codes.
//!
//! Codes are short snake_case discriminators; they appear in `LookupReport.error.code`
//! and are accepted by `fallback explain`.

/// A required argument (source, primary or fallback predicate) was absent.
pub const CODE_INVALID_ARGUMENT: &str = "invalid_argument";

/// A predicate expression did not parse.
pub const CODE_PARSE_ERROR: &str = "parse_error";

/// The backing source failed while opening, translating, or fetching.
pub const CODE_BACKEND_ERROR: &str = "backend_error";

/// The configuration file or overrides could not be resolved.
pub const CODE_CONFIG_ERROR: &str = "config_error";

pub const ALL_CODES: &[&str] = &[
    CODE_INVALID_ARGUMENT,
    CODE_PARSE_ERROR,
    CODE_BACKEND_ERROR,
    CODE_CONFIG_ERROR,
];
