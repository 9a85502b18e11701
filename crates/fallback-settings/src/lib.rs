//! Config parsing and source resolution.
//!
//! This crate is intentionally IO-free: it parses and resolves configuration provided as strings.

#![forbid(unsafe_code)]

mod model;
mod resolve;

pub use model::{FallbackConfigV1, SourceConfig};
pub use resolve::{DEFAULT_LOG_FILTER, Overrides, ResolvedConfig};

use camino::Utf8Path;

/// Parse `fallback.toml` (or equivalent) into a typed model.
pub fn parse_config_toml(input: &str) -> anyhow::Result<FallbackConfigV1> {
    let cfg: FallbackConfigV1 = toml::from_str(input)?;
    Ok(cfg)
}

/// Resolve the effective settings (config file + overrides).
///
/// Relative paths coming from the config file are anchored at `config_dir`;
/// paths from overrides are used as given.
pub fn resolve_config(
    cfg: FallbackConfigV1,
    overrides: Overrides,
    config_dir: Option<&Utf8Path>,
) -> anyhow::Result<ResolvedConfig> {
    resolve::resolve_config(cfg, overrides, config_dir)
}
