//! Report rendering: pretty JSON for machines, one short block for people.

use anyhow::Context;
use camino::Utf8Path;
use fallback_types::{LookupReport, Outcome, Row};

/// Pretty JSON with a trailing newline.
pub fn render_json(report: &LookupReport) -> anyhow::Result<String> {
    let mut text = serde_json::to_string_pretty(report).context("serialize report")?;
    text.push('\n');
    Ok(text)
}

pub fn render_text(report: &LookupReport) -> String {
    let mut out = match (report.outcome, &report.record) {
        (Outcome::Primary, Some(row)) => format!("primary: {}\n", render_row(row)),
        (Outcome::Fallback, Some(row)) => format!("fallback: {}\n", render_row(row)),
        (Outcome::Error, _) => match &report.error {
            Some(err) => format!("error[{}]: {}\n", err.code, err.message),
            None => "error\n".to_string(),
        },
        _ => "none\n".to_string(),
    };
    if let Some(source) = &report.source {
        out.push_str(&format!(
            "source: {} {}{} (fetches: {}, rows: {})\n",
            source.kind,
            source.path,
            source
                .table
                .as_deref()
                .map(|t| format!(" table {t}"))
                .unwrap_or_default(),
            report.data.fetches,
            report.data.rows_fetched
        ));
    }
    out
}

fn render_row(row: &Row) -> String {
    row.iter()
        .map(|(col, value)| format!("{col}={value}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Write the JSON report to `path`, creating parent directories.
pub fn write_report(path: &Utf8Path, report: &LookupReport) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_str().is_empty()) {
        std::fs::create_dir_all(parent).with_context(|| format!("create directory: {parent}"))?;
    }
    let data = render_json(report)?;
    std::fs::write(path, data).with_context(|| format!("write report: {path}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fallback_types::{
        ErrorInfo, LookupData, SCHEMA_LOOKUP_REPORT_V1, SourceMeta, ToolMeta,
    };
    use time::macros::datetime;

    fn sample(outcome: Outcome) -> LookupReport {
        LookupReport {
            schema: SCHEMA_LOOKUP_REPORT_V1.to_string(),
            tool: ToolMeta {
                name: "fallback".to_string(),
                version: "0.1.0".to_string(),
            },
            started_at: datetime!(2026-01-02 03:04:05 UTC),
            finished_at: datetime!(2026-01-02 03:04:05 UTC),
            source: Some(SourceMeta {
                kind: "sqlite".to_string(),
                path: "records.db".to_string(),
                table: Some("records".to_string()),
                order_by: None,
            }),
            primary: Some("active == true".to_string()),
            fallback: Some("id == 1".to_string()),
            outcome,
            record: Some(Row::new().with("id", 2).with("name", "bob")),
            data: LookupData {
                fetches: 1,
                rows_fetched: 2,
            },
            error: None,
        }
    }

    #[test]
    fn json_ends_with_newline_and_round_trips() {
        let report = sample(Outcome::Primary);
        let json = render_json(&report).expect("render");
        assert!(json.ends_with("}\n"));
        let back: LookupReport = serde_json::from_str(&json).expect("parse");
        assert_eq!(back, report);
    }

    #[test]
    fn text_for_a_match() {
        let text = render_text(&sample(Outcome::Fallback));
        assert_eq!(
            text,
            "fallback: id=2 name='bob'\nsource: sqlite records.db table records (fetches: 1, rows: 2)\n"
        );
    }

    #[test]
    fn text_for_an_error() {
        let mut report = sample(Outcome::Error);
        report.record = None;
        report.source = None;
        report.error = Some(ErrorInfo {
            code: "invalid_argument".to_string(),
            message: "invalid argument: source is required".to_string(),
        });
        assert_eq!(
            render_text(&report),
            "error[invalid_argument]: invalid argument: source is required\n"
        );
    }

    #[test]
    fn write_report_creates_parent_dirs() {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let root = Utf8Path::from_path(tmp.path()).expect("utf8 path");
        let path = root.join("out/nested/report.json");
        write_report(&path, &sample(Outcome::None)).expect("write");
        let text = std::fs::read_to_string(&path).expect("read back");
        assert!(text.contains("\"outcome\": \"none\""));
    }
}
