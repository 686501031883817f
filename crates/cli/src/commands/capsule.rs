use super::exit_code;
use clap::Subcommand;
use eyre::WrapErr;
use sealcheck_capsule::{CapsuleStore, CapsuleVerifier, MemoryCapsuleRepository};
use sealcheck_config::{ConfigLoader, LoadedConfig};
use sealcheck_core::Capsule;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Subcommand)]
pub enum CapsuleCommands {
    /// Verify one capsule JSON file
    Verify {
        /// Capsule file
        file: PathBuf,

        /// File hash the capsule must attest to
        #[arg(long, value_name = "HASH")]
        expected_hash: Option<String>,

        /// Config file with trust anchors
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Verify and store capsules in an in-memory repository
    Store {
        /// Files holding a capsule or an array of capsules
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Config file with trust anchors
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

impl CapsuleCommands {
    pub async fn execute(self) -> eyre::Result<ExitCode> {
        match self {
            CapsuleCommands::Verify {
                file,
                expected_hash,
                config,
            } => verify(&file, expected_hash.as_deref(), config),
            CapsuleCommands::Store { files, config } => store(&files, config).await,
        }
    }
}

fn load_config(file: Option<PathBuf>) -> eyre::Result<LoadedConfig> {
    let mut loader = ConfigLoader::new();
    match file {
        Some(file) => loader = loader.file(file),
        None => {
            if let Ok(dir) = std::env::current_dir() {
                loader = loader.directory(dir);
            }
        }
    }
    loader.load().wrap_err("failed to load configuration")
}

/// A file holds either one capsule or an array of them.
///
/// Array members are returned as submitted so that one malformed member is
/// reported on its own instead of failing the whole file.
fn read_capsules(path: &Path) -> eyre::Result<Vec<serde_json::Value>> {
    let raw = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&raw)
        .wrap_err_with(|| format!("{} is not valid JSON", path.display()))?;

    Ok(match value {
        serde_json::Value::Array(members) => members,
        single => vec![single],
    })
}

fn verify(file: &Path, expected_hash: Option<&str>, config: Option<PathBuf>) -> eyre::Result<ExitCode> {
    let config = load_config(config)?.config;
    let mut payloads = read_capsules(file)?;
    if payloads.len() != 1 {
        eyre::bail!("{} must hold exactly one capsule", file.display());
    }
    let capsule = Capsule::deserialize(payloads.remove(0))
        .wrap_err_with(|| format!("{} does not hold a capsule", file.display()))?;

    let verification = CapsuleVerifier::new(config.trust).verify(&capsule, expected_hash);
    println!("{}", serde_json::to_string_pretty(&verification)?);

    Ok(exit_code(verification.valid))
}

async fn store(files: &[PathBuf], config: Option<PathBuf>) -> eyre::Result<ExitCode> {
    let config = load_config(config)?.config;

    let mut payloads = Vec::new();
    for file in files {
        payloads.extend(read_capsules(file)?);
    }

    let repository = Arc::new(MemoryCapsuleRepository::new());
    let store = CapsuleStore::new(repository, CapsuleVerifier::new(config.trust));
    let outcome = store.batch_store_raw(payloads).await;

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(exit_code(outcome.failed_count == 0))
}
