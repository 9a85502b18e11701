//! The `find` use case: resolve the source, run one lookup, and produce a report.

use camino::Utf8Path;
use fallback_domain::{CountingSource, Expr, LookupError, Match, find_match};
use fallback_settings::{FallbackConfigV1, Overrides, ResolvedConfig};
use fallback_store::StoreError;
use fallback_types::{
    ErrorInfo, LookupData, LookupReport, Outcome, SCHEMA_LOOKUP_REPORT_V1, ToolMeta, ids,
};
use time::OffsetDateTime;
use tracing::{debug, info};

/// Input for the find use case.
#[derive(Clone, Debug)]
pub struct LookupInput<'a> {
    /// Config file contents (empty string if not found).
    pub config_text: &'a str,
    /// Directory relative config paths are anchored at.
    pub config_dir: Option<&'a Utf8Path>,
    /// CLI overrides.
    pub overrides: Overrides,
    pub primary: Option<&'a str>,
    pub fallback: Option<&'a str>,
}

/// Output from the find use case.
#[derive(Clone, Debug)]
pub struct LookupOutput {
    /// The generated report; failures are recorded in it, never returned.
    pub report: LookupReport,
    /// The resolved configuration, when resolution succeeded.
    pub resolved_config: Option<ResolvedConfig>,
}

struct Failure {
    code: &'static str,
    message: String,
}

impl Failure {
    fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    fn invalid(argument: &'static str) -> Self {
        let err = LookupError::<StoreError>::InvalidArgument { argument };
        Self::new(ids::CODE_INVALID_ARGUMENT, err.to_string())
    }
}

/// Run the find use case.
///
/// Checks happen in this order, and the first failure ends the run: config,
/// source presence, predicate presence, predicate syntax, opening the source,
/// the fetch. Only the last of these touches the backend's data.
pub fn run_lookup(input: LookupInput<'_>) -> LookupOutput {
    let mut report = base_report(OffsetDateTime::now_utc());

    let resolved = resolve(&input);
    let result = match &resolved {
        Ok(config) => execute(&input, config, &mut report),
        Err(failure) => Err(Failure::new(failure.code, failure.message.clone())),
    };

    if let Err(failure) = result {
        debug!(code = failure.code, message = %failure.message, "lookup failed");
        report.outcome = Outcome::Error;
        report.error = Some(ErrorInfo {
            code: failure.code.to_string(),
            message: failure.message,
        });
    }

    report.finished_at = OffsetDateTime::now_utc();
    info!(
        outcome = report.outcome.as_str(),
        fetches = report.data.fetches,
        rows = report.data.rows_fetched,
        "lookup finished"
    );

    LookupOutput {
        report,
        resolved_config: resolved.ok(),
    }
}

fn base_report(started_at: OffsetDateTime) -> LookupReport {
    LookupReport {
        schema: SCHEMA_LOOKUP_REPORT_V1.to_string(),
        tool: ToolMeta {
            name: "fallback".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        started_at,
        finished_at: started_at,
        source: None,
        primary: None,
        fallback: None,
        outcome: Outcome::None,
        record: None,
        data: LookupData::default(),
        error: None,
    }
}

/// A report for a run that failed before the use case could start (for
/// example an unreadable config file).
pub fn error_report(code: &str, message: &str) -> LookupReport {
    let mut report = base_report(OffsetDateTime::now_utc());
    report.outcome = Outcome::Error;
    report.error = Some(ErrorInfo {
        code: code.to_string(),
        message: message.to_string(),
    });
    report
}

fn resolve(input: &LookupInput<'_>) -> Result<ResolvedConfig, Failure> {
    let cfg = if input.config_text.trim().is_empty() {
        FallbackConfigV1::default()
    } else {
        fallback_settings::parse_config_toml(input.config_text)
            .map_err(|e| Failure::new(ids::CODE_CONFIG_ERROR, format!("parse config: {e:#}")))?
    };
    fallback_settings::resolve_config(cfg, input.overrides.clone(), input.config_dir)
        .map_err(|e| Failure::new(ids::CODE_CONFIG_ERROR, format!("resolve config: {e:#}")))
}

fn execute(
    input: &LookupInput<'_>,
    config: &ResolvedConfig,
    report: &mut LookupReport,
) -> Result<(), Failure> {
    let spec = config.source.as_ref().ok_or_else(|| Failure::invalid("source"))?;
    report.source = Some(spec.meta());

    let primary_text = present(input.primary).ok_or_else(|| Failure::invalid("primary"))?;
    let fallback_text = present(input.fallback).ok_or_else(|| Failure::invalid("fallback"))?;

    let primary = parse_predicate("primary", primary_text)?;
    let fallback = parse_predicate("fallback", fallback_text)?;
    report.primary = Some(primary.to_string());
    report.fallback = Some(fallback.to_string());

    let source = fallback_store::open_source(spec)
        .map_err(|e| Failure::new(ids::CODE_BACKEND_ERROR, e.to_string()))?;
    let source = CountingSource::new(source);

    let found = find_match(&source, primary, fallback);
    report.data = LookupData {
        fetches: saturating_u32(source.fetches()),
        rows_fetched: saturating_u32(source.rows_fetched()),
    };

    match found {
        Ok(Some(Match::Primary(row))) => {
            report.outcome = Outcome::Primary;
            report.record = Some(row);
        }
        Ok(Some(Match::Fallback(row))) => {
            report.outcome = Outcome::Fallback;
            report.record = Some(row);
        }
        Ok(None) => report.outcome = Outcome::None,
        Err(LookupError::InvalidArgument { argument }) => return Err(Failure::invalid(argument)),
        Err(LookupError::Backend(e)) => {
            return Err(Failure::new(ids::CODE_BACKEND_ERROR, e.to_string()));
        }
    }
    Ok(())
}

fn present(text: Option<&str>) -> Option<&str> {
    text.filter(|t| !t.trim().is_empty())
}

fn parse_predicate(argument: &str, text: &str) -> Result<Expr, Failure> {
    fallback_domain::parse(text)
        .map_err(|e| Failure::new(ids::CODE_PARSE_ERROR, format!("{argument}: {e}")))
}

fn saturating_u32(n: u64) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Map a report to a process exit code: 0 = match (or no match when not
/// required), 2 = no match with `require_match`, 1 = error.
pub fn exit_code(report: &LookupReport, require_match: bool) -> i32 {
    match report.outcome {
        Outcome::Primary | Outcome::Fallback => 0,
        Outcome::None if require_match => 2,
        Outcome::None => 0,
        Outcome::Error => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use fallback_types::{Row, Value};

    struct Fixture {
        _dir: tempfile::TempDir,
        root: Utf8PathBuf,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().expect("create temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 path");
        std::fs::write(
            root.join("records.json"),
            r#"[{"id": 1, "active": false}, {"id": 2, "active": true}, {"id": 3, "active": false}]"#,
        )
        .expect("write records");
        let conn = rusqlite::Connection::open(root.join("records.db")).expect("open db");
        conn.execute_batch(
            "CREATE TABLE records (id INTEGER, active INTEGER);
             INSERT INTO records VALUES (1, 0), (2, 1), (3, 0);",
        )
        .expect("seed db");
        Fixture { _dir: dir, root }
    }

    fn input<'a>(
        config_text: &'a str,
        root: &'a Utf8Path,
        primary: Option<&'a str>,
        fallback: Option<&'a str>,
    ) -> LookupInput<'a> {
        LookupInput {
            config_text,
            config_dir: Some(root),
            overrides: Overrides::default(),
            primary,
            fallback,
        }
    }

    const JSON_CONFIG: &str = "[source]\npath = \"records.json\"\n";
    const SQLITE_CONFIG: &str = "[source]\npath = \"records.db\"\ntable = \"records\"\n";

    #[test]
    fn primary_match_is_reported_with_one_fetch() {
        let fx = fixture();
        for config in [JSON_CONFIG, SQLITE_CONFIG] {
            let out = run_lookup(input(config, &fx.root, Some("active == true"), Some("id == 1")));
            let report = out.report;
            assert_eq!(report.outcome, Outcome::Primary, "{config}");
            assert_eq!(report.data.fetches, 1);
            assert_eq!(report.data.rows_fetched, 2);
            assert_eq!(
                report.record.as_ref().and_then(|r| r.get("id")),
                Some(&Value::Int(2))
            );
            assert_eq!(report.primary.as_deref(), Some("active == true"));
            assert_eq!(exit_code(&report, true), 0);
        }
    }

    #[test]
    fn fallback_and_none_outcomes() {
        let fx = fixture();
        let out = run_lookup(input(
            JSON_CONFIG,
            &fx.root,
            Some("active == true && id == 99"),
            Some("id == 3"),
        ));
        assert_eq!(out.report.outcome, Outcome::Fallback);
        assert_eq!(
            out.report.record,
            Some(Row::new().with("id", 3).with("active", false))
        );

        let out = run_lookup(input(JSON_CONFIG, &fx.root, Some("id == 100"), Some("id == 200")));
        assert_eq!(out.report.outcome, Outcome::None);
        assert_eq!(out.report.record, None);
        assert_eq!(out.report.data.fetches, 1);
        assert_eq!(exit_code(&out.report, false), 0);
        assert_eq!(exit_code(&out.report, true), 2);
    }

    #[test]
    fn missing_source_is_invalid_argument_with_no_fetch() {
        let fx = fixture();
        let out = run_lookup(input("", &fx.root, Some("id == 1"), Some("id == 2")));
        let err = out.report.error.as_ref().expect("error recorded");
        assert_eq!(err.code, ids::CODE_INVALID_ARGUMENT);
        assert!(err.message.contains("source"), "{}", err.message);
        assert_eq!(out.report.outcome, Outcome::Error);
        assert_eq!(out.report.data.fetches, 0);
        assert_eq!(exit_code(&out.report, false), 1);
    }

    #[test]
    fn blank_predicates_are_invalid_arguments() {
        let fx = fixture();
        for (primary, fallback, argument) in [
            (None, Some("id == 1"), "primary"),
            (Some("   "), Some("id == 1"), "primary"),
            (Some("id == 1"), None, "fallback"),
        ] {
            let out = run_lookup(input(JSON_CONFIG, &fx.root, primary, fallback));
            let err = out.report.error.expect("error recorded");
            assert_eq!(err.code, ids::CODE_INVALID_ARGUMENT);
            assert!(err.message.contains(argument), "{}", err.message);
            assert_eq!(out.report.data.fetches, 0);
        }
    }

    #[test]
    fn parse_errors_name_the_argument() {
        let fx = fixture();
        let out = run_lookup(input(JSON_CONFIG, &fx.root, Some("id == 1"), Some("id = 2")));
        let err = out.report.error.expect("error recorded");
        assert_eq!(err.code, ids::CODE_PARSE_ERROR);
        assert!(err.message.starts_with("fallback: "), "{}", err.message);
        assert_eq!(out.report.data.fetches, 0);
    }

    #[test]
    fn backend_failures_keep_their_message() {
        let fx = fixture();
        std::fs::write(fx.root.join("bad.json"), "[{\"id\": [1]}]").expect("write");
        let out = run_lookup(input(
            "[source]\npath = \"bad.json\"\n",
            &fx.root,
            Some("id == 1"),
            Some("id == 2"),
        ));
        let err = out.report.error.expect("error recorded");
        assert_eq!(err.code, ids::CODE_BACKEND_ERROR);
        assert!(err.message.contains("field id"), "{}", err.message);
        assert_eq!(out.report.data.fetches, 1);
    }

    #[test]
    fn config_errors_are_reported() {
        let fx = fixture();
        let out = run_lookup(input(
            "[source]\npath = \"records.db\"\n",
            &fx.root,
            Some("id == 1"),
            Some("id == 2"),
        ));
        let err = out.report.error.expect("error recorded");
        assert_eq!(err.code, ids::CODE_CONFIG_ERROR);
        assert!(out.resolved_config.is_none());
    }

    #[test]
    fn error_report_has_no_fetches() {
        let report = error_report(ids::CODE_CONFIG_ERROR, "read config: missing.toml");
        assert_eq!(report.outcome, Outcome::Error);
        assert_eq!(report.data, LookupData::default());
        assert_eq!(exit_code(&report, false), 1);
    }

    #[test]
    fn overrides_replace_the_configured_source() {
        let fx = fixture();
        let mut inp = input(SQLITE_CONFIG, &fx.root, Some("id == 3"), Some("id == 1"));
        let json = fx.root.join("records.json");
        inp.overrides = Overrides {
            source: Some(json),
            ..Overrides::default()
        };
        // The file's table would be rejected for a json source.
        let out = run_lookup(inp.clone());
        assert_eq!(
            out.report.error.map(|e| e.code),
            Some(ids::CODE_CONFIG_ERROR.to_string())
        );

        inp.config_text = "";
        let out = run_lookup(inp);
        assert_eq!(out.report.outcome, Outcome::Primary);
        assert_eq!(out.report.source.map(|s| s.kind), Some("json".to_string()));
    }
}
