//! callmatch CLI — score benchmark case files from the command line.
//!
//! Subcommands:
//! - `check <case>...` — score every case, exit 1 if any fails
//! - `explain <case>` — print how each expected call was paired
//! - `report <case>... [--output <path>]` — write an aggregated JSON report
//!
//! Case files are JSON (`.json`) or YAML (anything else). A file holds one case or
//! a list of cases; YAML files may also separate cases with `---`.
//!
//! Logging goes to stderr and is controlled by `RUST_LOG` (default `warn`).

use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;

use callmatch::{BenchmarkCase, BenchmarkReport, CaseResult};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "check" => cmd_check(&args[2..]),
        "explain" => cmd_explain(&args[2..]),
        "report" => cmd_report(&args[2..]),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(true)
        }
        other => {
            eprintln!("error: unknown command \"{other}\"");
            print_usage();
            process::exit(1);
        }
    };

    match result {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

// ═══════════════════════════════════════════════════════════════════════════════
// Commands
// ═══════════════════════════════════════════════════════════════════════════════

/// Returns `Ok(false)` when at least one case failed.
fn cmd_check(args: &[String]) -> Result<bool, String> {
    if args.is_empty() {
        return Err("check requires at least one case file".into());
    }

    let results = score_files(args)?;
    for result in &results {
        let verdict = if result.outcome.success { "PASS" } else { "FAIL" };
        println!("{verdict} {}: {}", result.name, result.outcome.reason);
    }

    let report = BenchmarkReport::compile(results);
    println!(
        "\n{} passed, {} failed ({:.1}%)",
        report.passed, report.failed, report.pass_rate
    );
    Ok(report.all_passed())
}

fn cmd_explain(args: &[String]) -> Result<bool, String> {
    let [path] = args else {
        return Err("explain requires exactly one case file".into());
    };

    let mut all_passed = true;
    for case in load_cases(path)? {
        let trace = case
            .evaluate_with_trace()
            .map_err(|e| format!("case \"{}\": {e}", case.name))?;
        all_passed &= trace.outcome.success;

        println!("== {}", case.name);
        if let Some(description) = &case.description {
            println!("   {description}");
        }
        println!("{trace}");
    }
    Ok(all_passed)
}

/// A report is written even when cases fail; only I/O and parse errors are errors.
fn cmd_report(args: &[String]) -> Result<bool, String> {
    let opts = parse_report_args(args)?;
    let report = BenchmarkReport::compile(score_files(&opts.files)?);

    let json = serde_json::to_string_pretty(&report)
        .map_err(|e| format!("failed to serialize report: {e}"))?;

    match &opts.output {
        Some(path) => {
            std::fs::write(path, json)
                .map_err(|e| format!("failed to write \"{}\": {e}", path.display()))?;
            info!(path = %path.display(), total = report.total, "report written");
        }
        None => println!("{json}"),
    }
    Ok(true)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Scoring
// ═══════════════════════════════════════════════════════════════════════════════

fn score_files(paths: &[String]) -> Result<Vec<CaseResult>, String> {
    let mut results = Vec::new();
    for path in paths {
        let cases = load_cases(path)?;
        info!(path = %path, cases = cases.len(), "loaded case file");
        for case in &cases {
            results.push(score_case(case)?);
        }
    }
    Ok(results)
}

/// Score one case. The recorded run duration is preferred; cases without one are
/// attributed the time the matcher took.
fn score_case(case: &BenchmarkCase) -> Result<CaseResult, String> {
    let started = Instant::now();
    let outcome = case
        .evaluate()
        .map_err(|e| format!("case \"{}\": {e}", case.name))?;
    let elapsed = started.elapsed().as_secs_f64();

    if !outcome.success {
        warn!(case = %case.name, reason = %outcome.reason, "case failed");
    }

    Ok(CaseResult::new(
        case.name.clone(),
        outcome,
        case.duration_seconds.unwrap_or(elapsed),
    ))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Case loading
// ═══════════════════════════════════════════════════════════════════════════════

fn load_cases(path: &str) -> Result<Vec<BenchmarkCase>, String> {
    let content =
        std::fs::read_to_string(path).map_err(|e| format!("failed to read \"{path}\": {e}"))?;

    let is_json = Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        parse_json_cases(&content).map_err(|e| format!("{path}: JSON parse error: {e}"))
    } else {
        // Default to YAML (handles .yaml and .yml)
        parse_yaml_cases(&content).map_err(|e| format!("{path}: YAML parse error: {e}"))
    }
}

/// A JSON document holding either one case or an array of cases.
fn parse_json_cases(content: &str) -> Result<Vec<BenchmarkCase>, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_str(content)?;
    match value {
        serde_json::Value::Array(items) => items.into_iter().map(serde_json::from_value).collect(),
        other => Ok(vec![serde_json::from_value(other)?]),
    }
}

/// One or more YAML documents, each holding one case or a sequence of cases.
fn parse_yaml_cases(content: &str) -> Result<Vec<BenchmarkCase>, serde_yaml::Error> {
    use serde::Deserialize;

    let mut cases = Vec::new();
    for doc in serde_yaml::Deserializer::from_str(content) {
        match serde_yaml::Value::deserialize(doc)? {
            serde_yaml::Value::Null => {}
            serde_yaml::Value::Sequence(items) => {
                for item in items {
                    cases.push(serde_yaml::from_value(item)?);
                }
            }
            other => cases.push(serde_yaml::from_value(other)?),
        }
    }
    Ok(cases)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Argument parsing
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, PartialEq)]
struct ReportOptions {
    files: Vec<String>,
    output: Option<PathBuf>,
}

fn parse_report_args(args: &[String]) -> Result<ReportOptions, String> {
    let mut files = Vec::new();
    let mut output = None;
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            "--output" | "-o" => {
                i += 1;
                let path = args
                    .get(i)
                    .ok_or_else(|| "--output requires a path".to_owned())?;
                output = Some(PathBuf::from(path));
            }
            flag if flag.starts_with('-') => {
                return Err(format!("unexpected argument \"{flag}\""));
            }
            file => files.push(file.to_owned()),
        }
        i += 1;
    }

    if files.is_empty() {
        return Err("report requires at least one case file".into());
    }
    Ok(ReportOptions { files, output })
}

fn print_usage() {
    eprintln!(
        "Usage: callmatch <command> [options]

Commands:
  check <case>...                        Score cases, exit 1 if any fails
  explain <case>                         Show how each expected call was paired
  report <case>... [--output <path>]     Write an aggregated JSON report
  help                                   Show this help

Case files are JSON (.json) or YAML. Set RUST_LOG=debug to trace pairing."
    );
}
