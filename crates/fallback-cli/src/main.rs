//! CLI entry point for fallback.
//!
//! This module is intentionally thin: it handles argument parsing, I/O, and exit codes.
//! All business logic lives in the `fallback-app` crate.

mod logging;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand, ValueEnum};
use fallback_app::{
    ExplainOutput, LookupInput, error_report, exit_code, format_explanation, format_not_found,
    format_parse, render_json, render_text, run_explain, run_lookup, run_parse, write_report,
};
use fallback_settings::{DEFAULT_LOG_FILTER, Overrides};
use fallback_types::{LookupReport, ids};

const DEFAULT_CONFIG: &str = "fallback.toml";

#[derive(Parser, Debug)]
#[command(
    name = "fallback",
    version,
    about = "Find the first record matching a primary predicate, or else a fallback, in one fetch"
)]
struct Cli {
    /// Path to the config TOML (default: ./fallback.toml if it exists).
    #[arg(long, global = true)]
    config: Option<Utf8PathBuf>,

    /// Override the source file (sqlite database or JSON records).
    #[arg(long, global = true)]
    source: Option<Utf8PathBuf>,

    /// Override the source kind (sqlite|json).
    #[arg(long, global = true)]
    kind: Option<String>,

    /// Override the sqlite table.
    #[arg(long, global = true)]
    table: Option<String>,

    /// Override the sqlite ordering column.
    #[arg(long, global = true)]
    order_by: Option<String>,

    /// Log filter directive (FALLBACK_LOG takes precedence).
    #[arg(long, global = true)]
    log: Option<String>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Text,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch `primary || fallback` once; print the primary match, else the fallback match.
    Find {
        /// Preferred predicate, e.g. "active == true".
        #[arg(long)]
        primary: Option<String>,

        /// Predicate used when nothing matches the primary one.
        #[arg(long)]
        fallback: Option<String>,

        /// Output format on stdout.
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,

        /// Also write the JSON report to this path.
        #[arg(long)]
        report_out: Option<Utf8PathBuf>,

        /// Exit with 2 when neither predicate matches.
        #[arg(long)]
        require_match: bool,
    },

    /// Validate an expression and print its canonical form.
    Parse {
        /// The expression to parse.
        expr: String,

        /// Also print the SQLite WHERE clause and its parameters.
        #[arg(long)]
        sql: bool,
    },

    /// Explain a report error code with remediation guidance.
    Explain {
        /// The code (e.g. "invalid_argument") to explain.
        code: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.cmd {
        Commands::Find {
            ref primary,
            ref fallback,
            format,
            ref report_out,
            require_match,
        } => cmd_find(
            &cli,
            primary.as_deref(),
            fallback.as_deref(),
            format,
            report_out.as_deref(),
            require_match,
        ),
        Commands::Parse { ref expr, sql } => {
            logging::init_tracing(cli.log.as_deref().unwrap_or(DEFAULT_LOG_FILTER));
            cmd_parse(expr, sql)
        }
        Commands::Explain { ref code } => cmd_explain(code),
    }
}

/// Read the config file. A missing default file is fine; a missing explicit
/// one is an error.
fn load_config(cli: &Cli) -> anyhow::Result<(String, Option<Utf8PathBuf>)> {
    let (path, explicit) = match &cli.config {
        Some(p) => (p.clone(), true),
        None => (Utf8PathBuf::from(DEFAULT_CONFIG), false),
    };
    match std::fs::read_to_string(&path) {
        Ok(text) => {
            let dir = path.parent().map(Utf8Path::to_path_buf);
            Ok((text, dir))
        }
        Err(e) if !explicit && e.kind() == std::io::ErrorKind::NotFound => Ok((String::new(), None)),
        Err(e) => Err(e).with_context(|| format!("read config: {path}")),
    }
}

fn log_directive(cli: &Cli, config_text: &str) -> String {
    cli.log
        .clone()
        .or_else(|| {
            fallback_settings::parse_config_toml(config_text)
                .ok()
                .and_then(|cfg| cfg.log)
        })
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string())
}

fn cmd_find(
    cli: &Cli,
    primary: Option<&str>,
    fallback: Option<&str>,
    format: Format,
    report_out: Option<&Utf8Path>,
    require_match: bool,
) -> anyhow::Result<()> {
    let report = match load_config(cli) {
        Ok((config_text, config_dir)) => {
            logging::init_tracing(&log_directive(cli, &config_text));
            let input = LookupInput {
                config_text: &config_text,
                config_dir: config_dir.as_deref(),
                overrides: Overrides {
                    source: cli.source.clone(),
                    kind: cli.kind.clone(),
                    table: cli.table.clone(),
                    order_by: cli.order_by.clone(),
                    log: cli.log.clone(),
                },
                primary,
                fallback,
            };
            run_lookup(input).report
        }
        Err(err) => {
            logging::init_tracing(cli.log.as_deref().unwrap_or(DEFAULT_LOG_FILTER));
            error_report(ids::CODE_CONFIG_ERROR, &format!("{err:#}"))
        }
    };

    emit(&report, format, report_out)?;

    if let Some(err) = &report.error {
        eprintln!("fallback error[{}]: {}", err.code, err.message);
    }
    let code = exit_code(&report, require_match);
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

fn emit(report: &LookupReport, format: Format, report_out: Option<&Utf8Path>) -> anyhow::Result<()> {
    if let Some(path) = report_out {
        write_report(path, report).context("write report json")?;
    }
    match format {
        Format::Json => print!("{}", render_json(report)?),
        Format::Text => print!("{}", render_text(report)),
    }
    Ok(())
}

fn cmd_parse(expr: &str, sql: bool) -> anyhow::Result<()> {
    match run_parse(expr, sql) {
        Ok(out) => {
            print!("{}", format_parse(&out));
            Ok(())
        }
        Err(err) => {
            eprintln!("fallback error[{}]: {err:#}", ids::CODE_PARSE_ERROR);
            std::process::exit(1);
        }
    }
}

fn cmd_explain(code: &str) -> anyhow::Result<()> {
    match run_explain(code) {
        ExplainOutput::Found(exp) => {
            print!("{}", format_explanation(&exp));
            Ok(())
        }
        ExplainOutput::NotFound {
            identifier,
            available_codes,
        } => {
            eprint!("{}", format_not_found(&identifier, available_codes));
            std::process::exit(1);
        }
    }
}
