//! nudge-audit: runs the nudge autonomy audit end to end.
//!
//! Usage:
//!   nudge-audit
//!   nudge-audit --rows 100 --seed 42 --chart tradeoff.svg
//!   nudge-audit --config data/audit_config.json --metric absolute --json
//!   nudge-audit --treatment-share 0.3 --no-chart

mod svg_chart;

use anyhow::Result;
use nudge_audit_core::{
    chart::ChartRenderer,
    config::{AuditConfig, ChartMetric},
    engine::{AuditEngine, AuditOutcome},
    error::AuditError,
    reporter::AuditReport,
};
use std::env;
use std::process::ExitCode;
use std::str::FromStr;
use svg_chart::{SvgChartRenderer, DEFAULT_CHART_PATH};

const USAGE: &str = "\
usage: nudge-audit [--rows N] [--seed S] [--config PATH] [--treatment-share F]
                   [--metric relative|absolute] [--chart PATH | --no-chart] [--json]";

#[derive(serde::Serialize)]
struct JsonSummary<'a> {
    seed: u64,
    rows: usize,
    chart: Option<String>,
    report: &'a AuditReport,
}

fn main() -> ExitCode {
    env_logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            let code = e.downcast_ref::<AuditError>().map_or(1, AuditError::exit_code);
            ExitCode::from(code)
        }
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        println!("{USAGE}");
        return Ok(());
    }

    let json_mode = args.iter().any(|a| a == "--json");
    let no_chart = args.iter().any(|a| a == "--no-chart");

    let config = config_from_args(&args)?;
    let (seed, seed_source) = match parse_flag::<u64>(&args, "--seed")? {
        Some(seed) => (seed, "flag"),
        None => (clock_seed(), "clock"),
    };
    let renderer = (!no_chart)
        .then(|| SvgChartRenderer::new(flag_value(&args, "--chart").unwrap_or(DEFAULT_CHART_PATH)));

    if !json_mode {
        println!("Nudge Autonomy Audit");
        println!("  seed:      {seed} ({seed_source})");
        println!("  rows:      {}", config.rows);
        println!("  split:     {:.0}% treatment ({:?})", config.treatment_share * 100.0, config.assignment);
        println!(
            "  weights:   opt_out={} urgency={} comprehension={}",
            config.weights.opt_out_difficulty,
            config.weights.urgency_messaging,
            config.weights.comprehension
        );
        println!();
    }

    let mut engine = AuditEngine::new(config, seed);
    let outcome = engine.run(renderer.as_ref().map(|r| r as &dyn ChartRenderer))?;
    let chart_path = renderer.as_ref().map(|r| r.path().display().to_string());

    if json_mode {
        print_json(&outcome, chart_path)?;
    } else {
        print_summary(&outcome, chart_path.as_deref());
    }
    Ok(())
}

/// Start from `--config` (or the defaults) and apply flag overrides.
fn config_from_args(args: &[String]) -> Result<AuditConfig> {
    let mut config = match flag_value(args, "--config") {
        Some(path) => AuditConfig::load(path)?,
        None => AuditConfig::default(),
    };
    if let Some(rows) = parse_flag::<i64>(args, "--rows")? {
        config.rows = usize::try_from(rows).map_err(|_| {
            AuditError::invalid_config("cli", format!("row count must be positive, got {rows}"))
        })?;
    }
    if let Some(share) = parse_flag::<f64>(args, "--treatment-share")? {
        config.treatment_share = share;
    }
    if let Some(metric) = flag_value(args, "--metric") {
        config.chart_metric = ChartMetric::from_str(metric)?;
    }
    Ok(config)
}

fn print_summary(outcome: &AuditOutcome, chart_path: Option<&str>) {
    println!("{}", outcome.report);
    println!();
    match chart_path {
        Some(path) => println!("Chart written to {path}"),
        None => println!("Chart skipped (--no-chart)"),
    }
    println!("Audit complete.");
}

fn print_json(outcome: &AuditOutcome, chart: Option<String>) -> Result<()> {
    let summary = JsonSummary {
        seed: outcome.seed,
        rows: outcome.records.len(),
        chart,
        report: &outcome.report,
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_flag<T: FromStr>(args: &[String], flag: &str) -> Result<Option<T>, AuditError> {
    flag_value(args, flag)
        .map(|raw| {
            raw.parse().map_err(|_| {
                AuditError::invalid_config("cli", format!("cannot parse {flag} value '{raw}'"))
            })
        })
        .transpose()
}

fn clock_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("nudge-audit")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    fn audit_error(err: &anyhow::Error) -> &AuditError {
        err.downcast_ref::<AuditError>()
            .unwrap_or_else(|| panic!("expected an AuditError, got {err:#}"))
    }

    #[test]
    fn flags_override_defaults() {
        let config = config_from_args(&args(&[
            "--rows", "120", "--treatment-share", "0.3", "--metric", "absolute",
        ]))
        .unwrap();
        assert_eq!(config.rows, 120);
        assert_eq!(config.treatment_share, 0.3);
        assert_eq!(config.chart_metric, ChartMetric::Absolute);
    }

    #[test]
    fn no_flags_means_default_config() {
        assert_eq!(config_from_args(&args(&[])).unwrap(), AuditConfig::default());
    }

    #[test]
    fn negative_rows_is_a_configuration_error() {
        let err = config_from_args(&args(&["--rows", "-5"])).unwrap_err();
        let audit = audit_error(&err);
        assert!(
            matches!(audit, AuditError::InvalidConfiguration { stage: "cli", .. }),
            "{audit:?}"
        );
        assert!(audit.to_string().contains("-5"), "{audit}");
        assert_eq!(audit.exit_code(), 2);
    }

    #[test]
    fn unknown_metric_is_a_configuration_error() {
        let err = config_from_args(&args(&["--metric", "bars"])).unwrap_err();
        let audit = audit_error(&err);
        assert!(audit.to_string().contains("bars"), "{audit}");
        assert_eq!(audit.exit_code(), 2);
    }

    #[test]
    fn missing_config_file_keeps_its_exit_code() {
        let err = config_from_args(&args(&["--config", "/nonexistent/audit.json"])).unwrap_err();
        assert_eq!(audit_error(&err).exit_code(), 2);
    }

    #[test]
    fn parse_flag_reads_the_following_value() {
        let a = args(&["--seed", "42", "--rows", "7"]);
        assert_eq!(parse_flag::<u64>(&a, "--seed").unwrap(), Some(42));
        assert_eq!(parse_flag::<i64>(&a, "--rows").unwrap(), Some(7));
        assert_eq!(parse_flag::<f64>(&a, "--treatment-share").unwrap(), None);
    }

    #[test]
    fn parse_flag_rejects_unparseable_values() {
        let a = args(&["--seed", "-1", "--treatment-share", "half"]);
        let err = parse_flag::<u64>(&a, "--seed").unwrap_err();
        assert!(err.to_string().contains("--seed"), "{err}");
        assert_eq!(err.exit_code(), 2);
        assert!(parse_flag::<f64>(&a, "--treatment-share").is_err());
    }

    #[test]
    fn flag_without_value_is_absent() {
        assert_eq!(flag_value(&args(&["--chart"]), "--chart"), None);
    }
}
