//! Building-code compliance CLI
//!
//! Lists, lints and tests rule files, and checks a building design against a
//! regulation catalog. JSON goes to stdout; logs go to stderr.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use compliance_engine::{
    validate_rule_definition, BuildingCodeValidator, DuplicatePolicy, InMemoryRegulationStore,
    RuleEngine, RuleStore, RuleType,
};
use serde_json::Value;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "compliance-cli")]
#[command(version, about = "Check building designs against building-code rules")]
struct Cli {
    /// How to handle a rule name that is loaded twice
    #[arg(long, value_enum, default_value = "replace", global = true)]
    duplicate_policy: PolicyArg,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the rules found in a directory
    List {
        #[arg(long)]
        rules_dir: PathBuf,

        /// File-name glob
        #[arg(long, default_value = "*.json")]
        pattern: String,

        /// Only rules of this type
        #[arg(long, value_parser = parse_rule_type)]
        rule_type: Option<RuleType>,

        /// Include disabled rules
        #[arg(long)]
        all: bool,
    },

    /// Check a rule file's definitions without loading them
    Lint { file: PathBuf },

    /// Run rules against sample data and print per-condition results
    Test {
        #[arg(long)]
        rules_dir: PathBuf,

        #[arg(long, default_value = "*.json")]
        pattern: String,

        /// Building data (JSON)
        #[arg(long)]
        data: PathBuf,

        /// Only this rule
        #[arg(long)]
        rule: Option<String>,
    },

    /// Validate a design against a regulation catalog and print the report
    Check {
        #[arg(long)]
        catalog: PathBuf,

        #[arg(long)]
        design: PathBuf,

        /// Defaults to the design's `building_id`
        #[arg(long)]
        building_id: Option<String>,

        /// Restrict to these regulation types (repeatable)
        #[arg(long)]
        regulation_type: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyArg {
    Replace,
    Reject,
}

impl From<PolicyArg> for DuplicatePolicy {
    fn from(policy: PolicyArg) -> Self {
        match policy {
            PolicyArg::Replace => DuplicatePolicy::Replace,
            PolicyArg::Reject => DuplicatePolicy::Reject,
        }
    }
}

fn parse_rule_type(s: &str) -> Result<RuleType, String> {
    RuleType::parse(s).ok_or_else(|| format!("unknown rule type '{}'; expected one of {}", s, RuleType::listing()))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting compliance-cli v{}", env!("CARGO_PKG_VERSION"));

    let stdout = std::io::stdout();
    match run(cli, &mut stdout.lock()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

/// Returns `false` when the command found problems (lint errors)
fn run(cli: Cli, out: &mut impl Write) -> Result<bool> {
    let policy = DuplicatePolicy::from(cli.duplicate_policy);

    match cli.command {
        Command::List {
            rules_dir,
            pattern,
            rule_type,
            all,
        } => {
            let store = load_store(&rules_dir, &pattern, policy)?;
            write_json(out, &store.list_rules(rule_type, !all))?;
            Ok(true)
        }
        Command::Lint { file } => lint(&file, out),
        Command::Test {
            rules_dir,
            pattern,
            data,
            rule,
        } => {
            let store = load_store(&rules_dir, &pattern, policy)?;
            let data = read_json(&data)?;
            let rules = match rule {
                Some(name) => match store.get_rule(&name) {
                    Some(rule) => vec![rule],
                    None => bail!("Rule '{}' not found in {}", name, rules_dir.display()),
                },
                None => store.enabled_rules(),
            };

            let engine = RuleEngine::new();
            let reports: Vec<_> = rules.into_iter().map(|rule| engine.test_rule(rule, &data)).collect();
            write_json(out, &reports)?;
            Ok(true)
        }
        Command::Check {
            catalog,
            design,
            building_id,
            regulation_type,
        } => {
            let store = InMemoryRegulationStore::from_catalog_file(&catalog)
                .with_context(|| format!("Failed to load catalog {}", catalog.display()))?;
            let design = read_json(&design)?;
            let building_id = building_id
                .or_else(|| design.get("building_id").and_then(Value::as_str).map(str::to_string))
                .unwrap_or_else(|| "unknown".to_string());

            let validator = BuildingCodeValidator::new(store);
            tracing::info!(
                regulations = validator.store().regulation_count(),
                building_id = %building_id,
                "Checking design"
            );
            let results = validator
                .validate_design(&design, Some(regulation_type.as_slice()))
                .context("Validation aborted")?;
            write_json(out, &validator.get_compliance_report(&building_id, &results))?;
            Ok(true)
        }
    }
}

fn load_store(rules_dir: &Path, pattern: &str, policy: DuplicatePolicy) -> Result<RuleStore> {
    let mut store = RuleStore::with_policy(policy);
    store
        .load_rules_from_directory(rules_dir, pattern)
        .with_context(|| format!("Failed to load rules from {}", rules_dir.display()))?;
    tracing::info!(rules = store.len(), policy = ?store.policy(), "Rule store ready");
    Ok(store)
}

/// Print schema errors for every definition in `file`; exit code 1 if any
fn lint(file: &Path, out: &mut impl Write) -> Result<bool> {
    let data = read_json(file)?;
    let definitions: Vec<&Value> = match &data {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };

    let mut error_count = 0;
    for (index, definition) in definitions.iter().enumerate() {
        let name = definition
            .get("rule_name")
            .and_then(Value::as_str)
            .unwrap_or("<unnamed>");
        for error in validate_rule_definition(definition) {
            writeln!(out, "{}: rule {} ({}): {}", file.display(), index, name, error)?;
            error_count += 1;
        }
    }

    if error_count > 0 {
        writeln!(out, "{} error(s) in {} definition(s)", error_count, definitions.len())?;
        Ok(false)
    } else {
        writeln!(out, "{}: {} definition(s) OK", file.display(), definitions.len())?;
        Ok(true)
    }
}

fn read_json(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

fn write_json(out: &mut impl Write, value: &impl serde::Serialize) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn run_args(args: &[&str]) -> (Result<bool>, String) {
        let cli = Cli::try_parse_from(std::iter::once("compliance-cli").chain(args.iter().copied())).unwrap();
        let mut out = Vec::new();
        let result = run(cli, &mut out);
        (result, String::from_utf8(out).unwrap())
    }

    fn rules_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("accessibility.json"),
            r#"{ "rule_name": "clear_width", "rule_type": "accessibility", "priority": 3, "clear_width": 36 }"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("general.json"),
            r#"[{ "rule_name": "occupancy", "rule_type": "general", "enabled": false,
                  "conditions": [{ "field": "occupancy.group", "operator": "==", "value": "B" }] }]"#,
        )
        .unwrap();
        dir
    }

    #[test]
    fn test_list_hides_disabled_rules() {
        let dir = rules_dir();
        let path = dir.path().to_str().unwrap();

        let (result, out) = run_args(&["list", "--rules-dir", path]);
        assert!(result.unwrap());
        let listed: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(listed.as_array().unwrap().len(), 1);
        assert_eq!(listed[0]["rule_name"], "clear_width");

        let (_, out) = run_args(&["list", "--rules-dir", path, "--all"]);
        let listed: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(listed.as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_lint_reports_errors() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("bad.json");
        fs::write(&file, r#"[{ "rule_name": "x", "rule_type": "seismic" }]"#).unwrap();

        let (result, out) = run_args(&["lint", file.to_str().unwrap()]);
        assert!(!result.unwrap());
        assert!(out.contains("rule 0 (x): Invalid rule_type: seismic"));
    }

    #[test]
    fn test_single_rule() {
        let dir = rules_dir();
        let data = dir.path().join("data.txt");
        fs::write(&data, r#"{ "accessibility": { "clear_width": 30 } }"#).unwrap();

        let (result, out) = run_args(&[
            "test",
            "--rules-dir",
            dir.path().to_str().unwrap(),
            "--data",
            data.to_str().unwrap(),
            "--rule",
            "clear_width",
        ]);
        assert!(result.unwrap());
        let reports: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(reports[0]["passed"], false);
        assert_eq!(reports[0]["message"], "Insufficient clear width: 30 < 36");
    }

    #[test]
    fn test_check_prints_report() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = dir.path().join("catalog.json");
        fs::write(
            &catalog,
            r#"{ "regulations": [{ "id": 1, "code": "ADA-403", "title": "Walking Surfaces",
                                   "regulation_type": "accessibility" }],
                 "rules": [{ "id": 1, "regulation_id": 1, "rule_name": "clear_width",
                             "rule_type": "accessibility", "rule_logic": { "clear_width": 36 } }] }"#,
        )
        .unwrap();
        let design = dir.path().join("design.json");
        fs::write(&design, r#"{ "building_id": "bldg-9", "accessibility": { "clear_width": 42 } }"#).unwrap();

        let (result, out) = run_args(&[
            "check",
            "--catalog",
            catalog.to_str().unwrap(),
            "--design",
            design.to_str().unwrap(),
        ]);
        assert!(result.unwrap());
        let report: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(report["building_id"], "bldg-9");
        assert_eq!(report["overall_status"], "passed");
        assert_eq!(report["total_regulations"], 1);
    }

    #[test]
    fn test_reject_policy_fails_on_duplicates() {
        let dir = rules_dir();
        fs::write(
            dir.path().join("zz_copy.json"),
            r#"{ "rule_name": "clear_width", "rule_type": "accessibility", "clear_width": 40 }"#,
        )
        .unwrap();

        let (result, _) = run_args(&[
            "--duplicate-policy",
            "reject",
            "list",
            "--rules-dir",
            dir.path().to_str().unwrap(),
        ]);
        let err = result.unwrap_err();
        assert!(format!("{:#}", err).contains("Duplicate rule name: clear_width"));
    }
}
