use super::load_snapshot;
use clap::Args;
use eyre::{eyre, WrapErr};
use sealcheck_config::{ConfigLoader, ConfigOverrides};
use sealcheck_integrity::IntegrityScorer;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Args)]
pub struct ProofArgs {
    /// Directory to snapshot
    pub dir: PathBuf,

    /// Path of the file, relative to the directory
    pub path: String,

    /// Config file (defaults to sealcheck.json in the directory)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Regular expression of paths to skip (repeatable)
    #[arg(long = "exclude", value_name = "PATTERN")]
    pub exclude: Vec<String>,
}

/// Build the proof over the same leaves `score` uses, so the proof root
/// equals the reported Merkle root under the same configuration
pub fn execute(args: ProofArgs) -> eyre::Result<ExitCode> {
    let mut loader = ConfigLoader::new()
        .directory(args.dir.clone())
        .overrides(ConfigOverrides {
            exclude_patterns: args.exclude.clone(),
            ..ConfigOverrides::default()
        });
    if let Some(file) = &args.config {
        loader = loader.file(file.clone());
    }
    let loaded = loader.load().wrap_err("failed to load configuration")?;

    let files = load_snapshot(&args.dir, &loaded)?;
    let scorer = IntegrityScorer::from_app_config(&loaded.config);
    let snapshot = scorer.hashed_snapshot(files);
    let path = args.path.as_str();

    if snapshot.failed.iter().any(|failed| failed == path) {
        return Err(eyre!("'{path}' could not be hashed"));
    }

    let leaves: Vec<(&str, &str)> = snapshot
        .hashed
        .iter()
        .filter_map(|file| file.valid_digest().map(|digest| (file.path.as_str(), digest)))
        .collect();
    let index = leaves
        .iter()
        .position(|(leaf_path, _)| *leaf_path == path)
        .ok_or_else(|| eyre!("'{path}' is not part of the snapshot of {}", args.dir.display()))?;
    let digests: Vec<&str> = leaves.iter().map(|(_, digest)| *digest).collect();

    let proof = scorer
        .tree()
        .build_proof(&digests, index)
        .ok_or_else(|| eyre!("no proof could be built for '{path}'"))?;
    tracing::debug!(root = %proof.root, siblings = %proof.siblings.len(), "proof built");

    println!("{}", serde_json::to_string_pretty(&proof)?);
    Ok(ExitCode::SUCCESS)
}
