use super::{exit_code, load_snapshot};
use clap::Args;
use eyre::WrapErr;
use sealcheck_config::{AnalysisMode, ConfigLoader, ConfigOverrides};
use sealcheck_core::{Conclusion, IntegrityReport};
use sealcheck_integrity::{derive_conclusion, IntegrityScorer};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Args)]
pub struct ScoreArgs {
    /// Directory to score
    #[arg(default_value = ".")]
    pub dir: PathBuf,

    /// Config file (defaults to sealcheck.json in the directory)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Regular expression of paths to skip (repeatable)
    #[arg(long = "exclude", value_name = "PATTERN")]
    pub exclude: Vec<String>,

    /// Skip Merkle validation
    #[arg(long)]
    pub no_merkle: bool,

    /// Skip the signature file check
    #[arg(long)]
    pub no_signatures: bool,

    /// Request deep analysis
    #[arg(long)]
    pub deep: bool,

    /// Grant the deep analysis entitlement
    #[arg(long)]
    pub deep_entitled: bool,

    /// Fail the run when any warning is reported
    #[arg(long)]
    pub fail_on_warning: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

impl ScoreArgs {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            mode: self.deep.then_some(AnalysisMode::Deep),
            signature_verify: self.no_signatures.then_some(false),
            merkle_validate: self.no_merkle.then_some(false),
            fail_on_warning: self.fail_on_warning.then_some(true),
            deep_analysis: self.deep_entitled.then_some(true),
            exclude_patterns: self.exclude.clone(),
        }
    }
}

#[derive(Serialize)]
struct ScoreOutput<'a> {
    #[serde(flatten)]
    report: &'a IntegrityReport,
    conclusion: Conclusion,
}

pub fn execute(args: ScoreArgs) -> eyre::Result<ExitCode> {
    let mut loader = ConfigLoader::new()
        .directory(args.dir.clone())
        .overrides(args.overrides());
    if let Some(file) = &args.config {
        loader = loader.file(file.clone());
    }
    let loaded = loader.load().wrap_err("failed to load configuration")?;
    tracing::debug!(source = ?loaded.source, "configuration loaded");

    let files = load_snapshot(&args.dir, &loaded)?;

    let config = loaded.config;
    let report = IntegrityScorer::from_app_config(&config).score(files);
    let conclusion = derive_conclusion(&report, config.scoring.fail_on_warning);

    if args.json {
        let output = ScoreOutput {
            report: &report,
            conclusion,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_report(&report, conclusion);
    }

    Ok(exit_code(conclusion != Conclusion::Failure))
}

fn print_report(report: &IntegrityReport, conclusion: Conclusion) {
    println!("Integrity score: {}/100 ({conclusion})", report.score);
    println!("Files analyzed: {}", report.files_analyzed);
    println!(
        "Merkle root: {}",
        report.merkle_root.as_deref().unwrap_or("none")
    );
    println!("Signatures: {}", report.signature_status);
    println!("Policy violations: {}", report.policy_violations);

    if !report.warnings.is_empty() {
        println!("Warnings:");
        for warning in &report.warnings {
            println!("  - {warning}");
        }
    }
    if !report.errors.is_empty() {
        println!("Errors:");
        for error in &report.errors {
            println!("  - {error}");
        }
    }
}
