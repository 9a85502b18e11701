use crate::model::FallbackConfigV1;
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fallback_types::{SourceKind, SourceSpec};

pub const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub source: Option<Utf8PathBuf>,
    pub kind: Option<String>,
    pub table: Option<String>,
    pub order_by: Option<String>,
    pub log: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedConfig {
    /// `None` when neither the config nor the overrides name a source.
    pub source: Option<SourceSpec>,
    pub log: String,
}

pub fn resolve_config(
    cfg: FallbackConfigV1,
    overrides: Overrides,
    config_dir: Option<&Utf8Path>,
) -> anyhow::Result<ResolvedConfig> {
    let log = overrides
        .log
        .clone()
        .or(cfg.log.clone())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

    let path = match (overrides.source.clone(), cfg.source.path.as_deref()) {
        (Some(p), _) => Some(p),
        (None, Some(p)) => Some(anchor(Utf8Path::new(p), config_dir)),
        (None, None) => None,
    };

    let Some(path) = path else {
        return Ok(ResolvedConfig { source: None, log });
    };

    let kind = match overrides.kind.as_deref().or(cfg.source.kind.as_deref()) {
        Some(k) => parse_kind(k)?,
        None => SourceKind::infer(&path).with_context(|| {
            format!("cannot infer source kind from '{path}'; set source.kind to sqlite or json")
        })?,
    };

    let table = overrides.table.clone().or(cfg.source.table.clone());
    let order_by = overrides.order_by.clone().or(cfg.source.order_by.clone());

    match kind {
        SourceKind::Sqlite => {
            let t = table
                .as_deref()
                .context("sqlite sources require source.table")?;
            validate_identifier("source.table", t)?;
            if let Some(col) = order_by.as_deref() {
                validate_identifier("source.order_by", col)?;
            }
        }
        SourceKind::Json => {
            if table.is_some() {
                anyhow::bail!("source.table only applies to sqlite sources");
            }
            if order_by.is_some() {
                anyhow::bail!("source.order_by only applies to sqlite sources");
            }
        }
    }

    Ok(ResolvedConfig {
        source: Some(SourceSpec {
            kind,
            path,
            table,
            order_by,
        }),
        log,
    })
}

fn anchor(path: &Utf8Path, config_dir: Option<&Utf8Path>) -> Utf8PathBuf {
    match config_dir {
        Some(dir) if path.is_relative() => dir.join(path),
        _ => path.to_path_buf(),
    }
}

fn parse_kind(v: &str) -> anyhow::Result<SourceKind> {
    SourceKind::parse(v)
        .with_context(|| format!("unknown source kind: {v} (expected 'sqlite' or 'json')"))
}

/// Table and column names must be plain SQL identifiers.
fn validate_identifier(key: &str, v: &str) -> anyhow::Result<()> {
    let mut chars = v.chars();
    let ok = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !ok {
        anyhow::bail!("invalid {key}: '{v}' (expected [A-Za-z_][A-Za-z0-9_]*)");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_config_toml;

    fn resolve(toml: &str, overrides: Overrides) -> anyhow::Result<ResolvedConfig> {
        let cfg = parse_config_toml(toml).expect("valid toml");
        resolve_config(cfg, overrides, Some(Utf8Path::new("conf")))
    }

    #[test]
    fn empty_config_has_no_source_and_default_log() {
        let resolved = resolve("", Overrides::default()).unwrap();
        assert_eq!(resolved.source, None);
        assert_eq!(resolved.log, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn config_paths_are_anchored_and_kind_inferred() {
        let resolved = resolve(
            r#"
            log = "debug"
            [source]
            path = "data/records.db"
            table = "records"
            order_by = "id"
            "#,
            Overrides::default(),
        )
        .unwrap();

        let source = resolved.source.unwrap();
        assert_eq!(source.kind, SourceKind::Sqlite);
        assert_eq!(source.path, Utf8PathBuf::from("conf/data/records.db"));
        assert_eq!(source.table.as_deref(), Some("records"));
        assert_eq!(source.order_by.as_deref(), Some("id"));
        assert_eq!(resolved.log, "debug");
    }

    #[test]
    fn overrides_win_and_are_not_anchored() {
        let resolved = resolve(
            r#"
            [source]
            path = "data/records.db"
            table = "records"
            "#,
            Overrides {
                source: Some(Utf8PathBuf::from("other.json")),
                table: None,
                log: Some("trace".to_string()),
                ..Overrides::default()
            },
        );
        // The file's table still applies, and json sources reject it.
        let err = resolved.unwrap_err();
        assert!(err.to_string().contains("only applies to sqlite"), "{err}");

        let resolved = resolve(
            "[source]\npath = \"data/records.db\"\n",
            Overrides {
                source: Some(Utf8PathBuf::from("other.json")),
                log: Some("trace".to_string()),
                ..Overrides::default()
            },
        )
        .unwrap();
        let source = resolved.source.unwrap();
        assert_eq!(source.kind, SourceKind::Json);
        assert_eq!(source.path, Utf8PathBuf::from("other.json"));
        assert_eq!(resolved.log, "trace");
    }

    #[test]
    fn explicit_kind_beats_extension() {
        let resolved = resolve(
            "[source]\nkind = \"json\"\npath = \"rows.txt\"\n",
            Overrides::default(),
        )
        .unwrap();
        assert_eq!(resolved.source.unwrap().kind, SourceKind::Json);
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let cases = [
            ("[source]\npath = \"rows.txt\"\n", "cannot infer source kind"),
            ("[source]\nkind = \"csv\"\npath = \"a.db\"\n", "unknown source kind"),
            ("[source]\npath = \"a.db\"\n", "require source.table"),
            (
                "[source]\npath = \"a.db\"\ntable = \"users; drop\"\n",
                "invalid source.table",
            ),
            (
                "[source]\npath = \"a.db\"\ntable = \"users\"\norder_by = \"1id\"\n",
                "invalid source.order_by",
            ),
            ("[source]\npath = \"a.json\"\norder_by = \"id\"\n", "order_by only applies"),
        ];
        for (toml, expected) in cases {
            let err = resolve(toml, Overrides::default()).unwrap_err();
            assert!(err.to_string().contains(expected), "{toml}: {err}");
        }
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(parse_config_toml("[source\npath = 1").is_err());
    }
}
