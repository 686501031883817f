use clap::Subcommand;
use eyre::WrapErr;
use sealcheck_config::LoadedConfig;
use sealcheck_core::FileRecord;
use sealcheck_integrity::load_directory;
use std::path::Path;
use std::process::ExitCode;

pub mod capsule;
pub mod proof;
pub mod score;

use self::capsule::CapsuleCommands;
use self::proof::ProofArgs;
use self::score::ScoreArgs;

#[derive(Subcommand)]
pub enum Commands {
    /// Score a source tree for tamper evidence
    Score(ScoreArgs),

    /// Print the Merkle inclusion proof of one file
    Proof(ProofArgs),

    /// Verify or store provenance capsules
    Capsule {
        #[command(subcommand)]
        command: CapsuleCommands,
    },
}

impl Commands {
    pub async fn execute(self) -> eyre::Result<ExitCode> {
        match self {
            Commands::Score(args) => score::execute(args),
            Commands::Proof(args) => proof::execute(args),
            Commands::Capsule { command } => command.execute().await,
        }
    }
}

/// Exit code for a boolean outcome
pub(crate) fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Load the files of `dir`, leaving out the config file that was read
/// when it lives inside the tree
pub(crate) fn load_snapshot(dir: &Path, loaded: &LoadedConfig) -> eyre::Result<Vec<FileRecord>> {
    let mut files =
        load_directory(dir).wrap_err_with(|| format!("failed to read {}", dir.display()))?;

    if let Some(config_path) = loaded.file.as_deref().and_then(|file| path_within(dir, file)) {
        tracing::debug!(path = %config_path, "config file left out of the snapshot");
        files.retain(|file| file.path != config_path);
    }
    Ok(files)
}

/// `file` relative to `dir` with `/` separators, if it lies below `dir`
fn path_within(dir: &Path, file: &Path) -> Option<String> {
    let dir = dir.canonicalize().ok()?;
    let file = file.canonicalize().ok()?;
    let relative = file.strip_prefix(&dir).ok()?;

    let parts: Vec<String> = relative
        .components()
        .map(|part| part.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sealcheck_config::{AppConfig, ConfigSource};
    use std::path::PathBuf;

    fn loaded(file: Option<PathBuf>) -> LoadedConfig {
        LoadedConfig {
            config: AppConfig::default(),
            source: ConfigSource::Default,
            file,
        }
    }

    #[test]
    fn test_snapshot_leaves_out_config_inside_tree() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("conf")).unwrap();
        std::fs::write(dir.path().join("conf/sealcheck.json"), "{}").unwrap();
        std::fs::write(dir.path().join("sealcheck.json"), "{}").unwrap();
        std::fs::write(dir.path().join("lib.rs"), "fn main() {}").unwrap();

        let files = load_snapshot(dir.path(), &loaded(Some(dir.path().join("conf/sealcheck.json"))))
            .unwrap();
        let paths: Vec<&str> = files.iter().map(|file| file.path.as_str()).collect();
        assert_eq!(paths, vec!["lib.rs", "sealcheck.json"]);

        let files = load_snapshot(dir.path(), &loaded(None)).unwrap();
        assert_eq!(files.len(), 3);
    }

    #[test]
    fn test_config_outside_tree_is_ignored() {
        let tree = tempfile::TempDir::new().unwrap();
        let elsewhere = tempfile::TempDir::new().unwrap();
        std::fs::write(tree.path().join("sealcheck.json"), "{}").unwrap();
        std::fs::write(elsewhere.path().join("sealcheck.json"), "{}").unwrap();

        assert_eq!(path_within(tree.path(), &elsewhere.path().join("sealcheck.json")), None);
        let files =
            load_snapshot(tree.path(), &loaded(Some(elsewhere.path().join("sealcheck.json"))))
                .unwrap();
        assert_eq!(files.len(), 1);
    }
}
