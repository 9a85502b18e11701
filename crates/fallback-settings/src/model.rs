use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// `fallback.toml` schema v1.
///
/// This is a *user-facing* config model: it is intentionally permissive so forward-compat is easy.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FallbackConfigV1 {
    /// Optional schema string for tooling (`fallback.config.v1`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// `tracing` filter directive, e.g. `info` or `fallback_store=debug`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log: Option<String>,

    #[serde(default)]
    pub source: SourceConfig,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SourceConfig {
    /// `sqlite` or `json`. Inferred from the path extension when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Database or data file, relative to the config file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Table to query (sqlite only, required there).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,

    /// Column that fixes the fetch order (sqlite only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,
}
