//! Developer tasks (schema generation, fixture conformance).
//!
//! Keeping this separate avoids bloating the end-user CLI.

use anyhow::{Context, bail};
use fallback_types::{SCHEMA_LOOKUP_REPORT_V1, ids};
use schemars::schema_for;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the project root (parent of xtask directory).
fn project_root() -> anyhow::Result<PathBuf> {
    let manifest_dir = match std::env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => std::env::current_dir().context("determine current directory")?,
    };

    if manifest_dir.ends_with("xtask") {
        manifest_dir
            .parent()
            .map(Path::to_path_buf)
            .context("xtask has no parent directory")
    } else {
        Ok(manifest_dir)
    }
}

fn schemas_dir() -> anyhow::Result<PathBuf> {
    Ok(project_root()?.join("schemas"))
}

fn contracts_fixtures_dir() -> anyhow::Result<PathBuf> {
    Ok(project_root()?.join("contracts").join("fixtures"))
}

/// Schema definition with its target filename.
struct SchemaSpec {
    filename: &'static str,
    generate: fn() -> schemars::Schema,
}

fn generate_report_schema() -> schemars::Schema {
    schema_for!(fallback_types::LookupReport)
}

fn generate_config_schema() -> schemars::Schema {
    schema_for!(fallback_settings::FallbackConfigV1)
}

fn schema_specs() -> Vec<SchemaSpec> {
    vec![
        SchemaSpec {
            filename: "fallback.lookup.v1.json",
            generate: generate_report_schema,
        },
        SchemaSpec {
            filename: "fallback.config.v1.json",
            generate: generate_config_schema,
        },
    ]
}

/// Serialize a schema to pretty-printed JSON with trailing newline.
fn serialize_schema(schema: &schemars::Schema) -> anyhow::Result<String> {
    let mut json = serde_json::to_string_pretty(schema).context("Failed to serialize schema")?;
    json.push('\n');
    Ok(json)
}

fn emit_schemas() -> anyhow::Result<()> {
    let dir = schemas_dir()?;
    fs::create_dir_all(&dir).context("Failed to create schemas directory")?;

    for spec in schema_specs() {
        let json = serialize_schema(&(spec.generate)())?;
        let path = dir.join(spec.filename);
        fs::write(&path, &json)
            .with_context(|| format!("Failed to write schema to {}", path.display()))?;
        println!("Wrote {}", path.display());
    }

    println!("\nSchemas emitted successfully.");
    Ok(())
}

/// Check that schemas/ matches what would be generated (for CI).
fn validate_schemas() -> anyhow::Result<()> {
    let dir = schemas_dir()?;
    let mut missing = Vec::new();
    let mut mismatched = Vec::new();

    for spec in schema_specs() {
        let path = dir.join(spec.filename);
        if !path.exists() {
            missing.push(spec.filename);
            continue;
        }
        let expected = serialize_schema(&(spec.generate)())?;
        let actual = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if expected != actual {
            mismatched.push(spec.filename);
        }
    }

    if missing.is_empty() && mismatched.is_empty() {
        println!("All schemas are up to date.");
        return Ok(());
    }
    for name in &missing {
        eprintln!("Missing schema: {name}");
    }
    for name in &mismatched {
        eprintln!("Schema out of date: {name}");
    }
    eprintln!("\nRun `cargo xtask emit-schemas` to regenerate.");
    bail!("Schema validation failed")
}

fn report_validator() -> anyhow::Result<jsonschema::Validator> {
    let schema = serde_json::to_value(generate_report_schema()).context("schema to JSON")?;
    jsonschema::draft202012::new(&schema)
        .map_err(|e| anyhow::anyhow!("Failed to compile report schema: {e}"))
}

/// Invariants a report must satisfy beyond its JSON shape.
fn contract_errors(report: &Value) -> Vec<String> {
    let mut errors = Vec::new();

    if report.get("schema").and_then(Value::as_str) != Some(SCHEMA_LOOKUP_REPORT_V1) {
        errors.push(format!("schema must be {SCHEMA_LOOKUP_REPORT_V1}"));
    }

    let outcome = report.get("outcome").and_then(Value::as_str).unwrap_or("");
    let has_record = report.get("record").is_some_and(|r| !r.is_null());
    let error_code = report
        .get("error")
        .and_then(|e| e.get("code"))
        .and_then(Value::as_str);
    let fetches = report
        .get("data")
        .and_then(|d| d.get("fetches"))
        .and_then(Value::as_u64)
        .unwrap_or(0);
    let rows = report
        .get("data")
        .and_then(|d| d.get("rows_fetched"))
        .and_then(Value::as_u64)
        .unwrap_or(0);

    let is_match = matches!(outcome, "primary" | "fallback");
    if is_match != has_record {
        errors.push(format!("outcome '{outcome}' and record presence disagree"));
    }
    if (outcome == "error") != error_code.is_some() {
        errors.push(format!("outcome '{outcome}' and error presence disagree"));
    }
    if let Some(code) = error_code
        && !ids::ALL_CODES.contains(&code)
    {
        errors.push(format!("unknown error code '{code}'"));
    }
    if fetches > 1 {
        errors.push(format!("a lookup fetches at most once, got {fetches}"));
    }
    if fetches == 0 && rows > 0 {
        errors.push("rows_fetched without a fetch".to_string());
    }
    if outcome != "error" && fetches != 1 {
        errors.push(format!("outcome '{outcome}' requires exactly one fetch"));
    }
    if matches!(
        error_code,
        Some(ids::CODE_INVALID_ARGUMENT | ids::CODE_PARSE_ERROR | ids::CODE_CONFIG_ERROR)
    ) && fetches != 0
    {
        errors.push("argument, parse and config errors must not fetch".to_string());
    }
    if is_match && rows == 0 {
        errors.push("a match needs at least one fetched row".to_string());
    }

    errors
}

fn read_json(path: &Path) -> anyhow::Result<Value> {
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {} as JSON", path.display()))
}

/// Validate contract fixtures: report schema plus report invariants.
fn conform() -> anyhow::Result<()> {
    let validator = report_validator()?;
    println!("✓ fallback.lookup.v1 schema compiles");

    let fixtures_dir = contracts_fixtures_dir()?;
    if !fixtures_dir.exists() {
        bail!("contracts/fixtures/ not found at {}", fixtures_dir.display());
    }

    let mut fixture_count = 0;
    let mut errors = Vec::new();

    let mut paths: Vec<PathBuf> = fs::read_dir(&fixtures_dir)
        .context("Failed to read contracts/fixtures/")?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    for path in paths {
        let filename = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        let value = read_json(&path)?;

        for err in validator.iter_errors(&value) {
            errors.push(format!("{filename}: schema validation: {err}"));
        }
        for err in contract_errors(&value) {
            errors.push(format!("{filename}: {err}"));
        }

        fixture_count += 1;
        println!("  ✓ {filename} checked");
    }

    if fixture_count == 0 {
        bail!("No JSON fixtures found in {}", fixtures_dir.display());
    }
    if !errors.is_empty() {
        eprintln!("\nConformance errors:");
        for err in &errors {
            eprintln!("  - {err}");
        }
        bail!("Conformance validation failed with {} errors", errors.len());
    }

    println!("\n✓ All {fixture_count} contract fixtures pass conformance checks!");
    Ok(())
}

/// Full conformance: contract fixtures plus the built binary's output on
/// every `tests/fixtures/` case, compared with its golden report.
fn conform_full() -> anyhow::Result<()> {
    conform()?;

    println!("\n--- Full conformance: fallback binary output ---\n");

    let root = project_root()?;
    let validator = report_validator()?;
    let bin = root.join("target").join("debug").join("fallback");
    #[cfg(target_os = "windows")]
    let bin = bin.with_extension("exe");

    if !bin.exists() {
        bail!(
            "fallback binary not found at {}.\nRun `cargo build -p fallback-cli` first.",
            bin.display()
        );
    }

    let mut errors = Vec::new();
    let mut dirs: Vec<PathBuf> = fs::read_dir(root.join("tests").join("fixtures"))
        .context("Failed to read tests/fixtures/")?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.join("case.json").exists())
        .collect();
    dirs.sort();

    for dir in dirs {
        let name = dir.file_name().unwrap_or_default().to_string_lossy().to_string();
        let case = read_json(&dir.join("case.json"))?;
        let args: Vec<&str> = case["args"]
            .as_array()
            .map(|a| a.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        let temp_dir = tempfile::tempdir().context("Failed to create temp dir")?;
        let report_out = temp_dir.path().join("report.json");

        let output = std::process::Command::new(&bin)
            .env_remove("FALLBACK_LOG")
            .arg("--config")
            .arg(dir.join("fallback.toml"))
            .args(&args)
            .arg("--report-out")
            .arg(&report_out)
            .output()
            .with_context(|| format!("Failed to run fallback on fixture '{name}'"))?;

        let expected_code = case["exit_code"].as_i64();
        if output.status.code().map(i64::from) != expected_code {
            errors.push(format!(
                "fixture '{name}': exit code {:?}, expected {expected_code:?}",
                output.status.code()
            ));
        }

        if !report_out.exists() {
            errors.push(format!("fixture '{name}': no report output generated"));
            continue;
        }
        let report = read_json(&report_out)?;
        for err in validator.iter_errors(&report) {
            errors.push(format!("fixture '{name}': schema validation: {err}"));
        }
        for err in contract_errors(&report) {
            errors.push(format!("fixture '{name}': {err}"));
        }

        let golden_path = dir.join("expected.report.json");
        if golden_path.exists() {
            let golden = read_json(&golden_path)?;
            if fallback_test_util::normalize_nondeterministic(report) != golden {
                errors.push(format!(
                    "fixture '{name}': output differs from expected.report.json"
                ));
            } else {
                println!("  ✓ fixture '{name}' matches golden report");
            }
        } else {
            println!("  ✓ fixture '{name}' produces a valid report (no golden file)");
        }
    }

    if !errors.is_empty() {
        eprintln!("\nFull conformance errors:");
        for err in &errors {
            eprintln!("  - {err}");
        }
        bail!("Full conformance validation failed with {} errors", errors.len());
    }

    println!("\n✓ Full conformance checks passed!");
    Ok(())
}

/// Validate that every error code has a complete explanation.
fn explain_coverage() -> anyhow::Result<()> {
    let mut errors = Vec::new();

    for code in ids::ALL_CODES {
        match fallback_types::lookup_explanation(code) {
            Some(exp) => {
                for (field, text) in [
                    ("title", exp.title),
                    ("description", exp.description),
                    ("remediation", exp.remediation),
                    ("example", exp.example),
                ] {
                    if text.trim().is_empty() {
                        errors.push(format!("Code '{code}' has empty {field}"));
                    }
                }
            }
            None => errors.push(format!("Code '{code}' has no explanation")),
        }
    }

    if errors.is_empty() {
        println!("✓ {} codes have explanations", ids::ALL_CODES.len());
        Ok(())
    } else {
        for error in &errors {
            eprintln!("  - {error}");
        }
        bail!("Explain coverage validation failed with {} errors", errors.len())
    }
}

fn print_help() {
    eprintln!("xtask commands:");
    eprintln!("  help              Show this message");
    eprintln!("  emit-schemas      Generate JSON schemas from Rust types to schemas/");
    eprintln!("  validate-schemas  Check if schemas/ matches generated output (for CI)");
    eprintln!("  print-schema-ids  Print known schema IDs");
    eprintln!("  conform           Validate contract fixtures against the report schema");
    eprintln!("  conform-full      Contract fixtures + fallback binary output on tests/fixtures");
    eprintln!("  explain-coverage  Validate all error codes have explanations");
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let cmd = args.get(1).map(|s| s.as_str()).unwrap_or("help");

    match cmd {
        "help" | "--help" | "-h" => {
            print_help();
            Ok(())
        }
        "emit-schemas" => emit_schemas(),
        "validate-schemas" => validate_schemas(),
        "conform" => conform(),
        "conform-full" => conform_full(),
        "explain-coverage" => explain_coverage(),
        "print-schema-ids" => {
            for spec in schema_specs() {
                println!("{}", spec.filename.trim_end_matches(".json"));
            }
            Ok(())
        }
        other => bail!("unknown xtask command: {other}\n\nRun `cargo xtask help` for usage."),
    }
    .context("xtask failed")
}
