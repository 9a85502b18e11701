//! Explain registry for reported error codes.
//!
//! Maps codes to human-readable explanations with remediation guidance.

use crate::ids;

/// Explanation entry for an error code.
#[derive(Debug, Clone)]
pub struct Explanation {
    /// Short description of the code.
    pub title: &'static str,
    /// When the code is produced.
    pub description: &'static str,
    /// How to fix it.
    pub remediation: &'static str,
    /// A command line that triggers the code.
    pub example: &'static str,
}

/// Look up an explanation by code.
///
/// Returns `None` if the identifier is not recognized.
pub fn lookup_explanation(identifier: &str) -> Option<Explanation> {
    match identifier {
        ids::CODE_INVALID_ARGUMENT => Some(Explanation {
            title: "Missing lookup argument",
            description: "\
The lookup needs a source, a primary predicate and a fallback predicate. One of \
them was absent or blank, so the lookup was rejected before any fetch was issued.",
            remediation: "\
Pass both --primary and --fallback with a non-empty expression, and configure a \
source either in fallback.toml ([source] path) or with --source.",
            example: "fallback --source data.db --table users find --primary 'active == true'",
        }),
        ids::CODE_PARSE_ERROR => Some(Explanation {
            title: "Predicate did not parse",
            description: "\
A predicate expression is not valid. Expressions compare a column to a literal \
(`id == 3`, `name != 'x'`, `score >= 1.5`, `deleted == null`) and combine them \
with `&&`, `||`, `!` and parentheses.",
            remediation: "\
Check the reported offset. Quote text literals with single or double quotes. \
Use `fallback parse '<expr>'` to validate an expression on its own.",
            example: "fallback parse 'active = true'",
        }),
        ids::CODE_BACKEND_ERROR => Some(Explanation {
            title: "Source failed",
            description: "\
The backing source could not be opened, the combined predicate could not be \
translated, or the single fetch failed. The backend's own message is reported \
unchanged.",
            remediation: "\
Verify the source path, table and column names. For JSON sources make sure the \
file holds an array of flat objects or one flat object per line.",
            example: "fallback --source missing.db --table users find --primary 'id == 1' --fallback 'id == 2'",
        }),
        ids::CODE_CONFIG_ERROR => Some(Explanation {
            title: "Configuration could not be resolved",
            description: "\
fallback.toml did not parse, or the resolved settings are inconsistent (for \
example a sqlite source without a table, or an unknown source kind).",
            remediation: "\
Fix the reported key. Source kind is inferred from the file extension when it \
is not given; sqlite sources always need `table`.",
            example: "fallback --source data.db find --primary 'id == 1' --fallback 'id == 2'",
        }),
        _ => None,
    }
}
