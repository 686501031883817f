//! Configuration loader for sealcheck
//!
//! Layers are applied in order: defaults, JSON config file, environment
//! variables, then explicit overrides (usually command line flags). Exclude
//! patterns accumulate across layers; every other field is replaced by the
//! last layer that sets it.

use crate::config::{AnalysisMode, AppConfig};
use sealcheck_core::{
    constants::{
        DEFAULT_CONFIG_FILENAME, SEALCHECK_CONFIG_VAR, SEALCHECK_DEEP_ANALYSIS_VAR,
        SEALCHECK_EXCLUDE_VAR, SEALCHECK_FAIL_ON_WARNING_VAR, SEALCHECK_MERKLE_VALIDATE_VAR,
        SEALCHECK_MODE_VAR, SEALCHECK_SIGNATURE_VERIFY_VAR,
    },
    Error, Result,
};
use std::path::{Path, PathBuf};

/// Source of the last configuration layer applied, for diagnostics
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Default configuration
    Default,
    /// Configuration file
    ConfigFile(PathBuf),
    /// Environment variable
    EnvironmentVariable(String),
    /// Command line argument
    CommandLine,
}

/// Explicit overrides, applied last
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub mode: Option<AnalysisMode>,
    pub signature_verify: Option<bool>,
    pub merkle_validate: Option<bool>,
    pub fail_on_warning: Option<bool>,
    pub deep_analysis: Option<bool>,
    pub exclude_patterns: Vec<String>,
}

impl ConfigOverrides {
    fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Result of a load: the configuration and where its last layer came from
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: AppConfig,
    pub source: ConfigSource,
    /// The config file that was read, even when later layers override it
    pub file: Option<PathBuf>,
}

/// Configuration loader that handles all startup configuration
pub struct ConfigLoader {
    /// Explicit config file; takes priority over directory discovery
    file: Option<PathBuf>,
    /// Directory searched for `sealcheck.json`
    directory: Option<PathBuf>,
    /// Whether environment variables are consulted
    read_env: bool,
    overrides: ConfigOverrides,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self {
            file: None,
            directory: None,
            read_env: true,
            overrides: ConfigOverrides::default(),
        }
    }

    /// Use this config file instead of discovering one
    pub fn file(mut self, path: PathBuf) -> Self {
        self.file = Some(path);
        self
    }

    /// Set the directory searched for a config file
    pub fn directory(mut self, dir: PathBuf) -> Self {
        self.directory = Some(dir);
        self
    }

    /// Set whether to read `SEALCHECK_*` environment variables
    pub fn read_env(mut self, read_env: bool) -> Self {
        self.read_env = read_env;
        self
    }

    /// Set explicit overrides
    pub fn overrides(mut self, overrides: ConfigOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Load the configuration from the process environment
    pub fn load(self) -> Result<LoadedConfig> {
        self.load_with_env(|key| std::env::var(key).ok())
    }

    /// Load the configuration with a custom environment lookup
    pub fn load_with_env<F>(self, env: F) -> Result<LoadedConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = AppConfig::default();
        let mut source = ConfigSource::Default;

        let file = self.file.clone().or_else(|| {
            if self.read_env {
                env(SEALCHECK_CONFIG_VAR).map(PathBuf::from)
            } else {
                None
            }
        });
        let file = match file {
            Some(path) => Some(path),
            None => self.discover_file(),
        };

        if let Some(path) = &file {
            config = read_config_file(path)?;
            tracing::debug!(path = %path.display(), "loaded config file");
            source = ConfigSource::ConfigFile(path.clone());
        }

        if self.read_env {
            if let Some(var) = apply_env(&mut config, &env)? {
                source = ConfigSource::EnvironmentVariable(var);
            }
        }

        if !self.overrides.is_empty() {
            apply_overrides(&mut config, self.overrides);
            source = ConfigSource::CommandLine;
        }

        config.scoring.validate()?;

        Ok(LoadedConfig {
            config,
            source,
            file,
        })
    }

    fn discover_file(&self) -> Option<PathBuf> {
        let dir = self.directory.as_ref()?;
        let candidate = dir.join(DEFAULT_CONFIG_FILENAME);
        candidate.is_file().then_some(candidate)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Read an `AppConfig` from a JSON file
pub fn read_config_file(path: &Path) -> Result<AppConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| Error::file_system(path, "read config file", e))?;
    serde_json::from_str(&raw)
        .map_err(|e| Error::json(format!("invalid config file '{}'", path.display()), e))
}

/// Apply `SEALCHECK_*` variables, returning the last variable that was set
fn apply_env<F>(config: &mut AppConfig, env: &F) -> Result<Option<String>>
where
    F: Fn(&str) -> Option<String>,
{
    let mut last = None;

    if let Some(value) = env(SEALCHECK_MODE_VAR) {
        config.scoring.mode = value.parse().map_err(|_| {
            Error::configuration(format!(
                "{SEALCHECK_MODE_VAR} must be 'standard' or 'deep', got '{}'",
                value.trim()
            ))
        })?;
        last = Some(SEALCHECK_MODE_VAR.to_string());
    }
    if let Some(value) = env(SEALCHECK_SIGNATURE_VERIFY_VAR) {
        config.scoring.signature_verify = parse_bool(SEALCHECK_SIGNATURE_VERIFY_VAR, &value)?;
        last = Some(SEALCHECK_SIGNATURE_VERIFY_VAR.to_string());
    }
    if let Some(value) = env(SEALCHECK_MERKLE_VALIDATE_VAR) {
        config.scoring.merkle_validate = parse_bool(SEALCHECK_MERKLE_VALIDATE_VAR, &value)?;
        last = Some(SEALCHECK_MERKLE_VALIDATE_VAR.to_string());
    }
    if let Some(value) = env(SEALCHECK_FAIL_ON_WARNING_VAR) {
        config.scoring.fail_on_warning = parse_bool(SEALCHECK_FAIL_ON_WARNING_VAR, &value)?;
        last = Some(SEALCHECK_FAIL_ON_WARNING_VAR.to_string());
    }
    if let Some(value) = env(SEALCHECK_DEEP_ANALYSIS_VAR) {
        config.entitlements.deep_analysis = parse_bool(SEALCHECK_DEEP_ANALYSIS_VAR, &value)?;
        last = Some(SEALCHECK_DEEP_ANALYSIS_VAR.to_string());
    }
    if let Some(value) = env(SEALCHECK_EXCLUDE_VAR) {
        config.scoring.exclude_patterns.extend(
            value
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(String::from),
        );
        last = Some(SEALCHECK_EXCLUDE_VAR.to_string());
    }

    Ok(last)
}

fn apply_overrides(config: &mut AppConfig, overrides: ConfigOverrides) {
    if let Some(mode) = overrides.mode {
        config.scoring.mode = mode;
    }
    if let Some(verify) = overrides.signature_verify {
        config.scoring.signature_verify = verify;
    }
    if let Some(validate) = overrides.merkle_validate {
        config.scoring.merkle_validate = validate;
    }
    if let Some(fail) = overrides.fail_on_warning {
        config.scoring.fail_on_warning = fail;
    }
    if let Some(deep) = overrides.deep_analysis {
        config.entitlements.deep_analysis = deep;
    }
    config
        .scoring
        .exclude_patterns
        .extend(overrides.exclude_patterns);
}

fn parse_bool(variable: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(Error::configuration(format!(
            "{variable} must be a boolean, got '{other}'"
        ))),
    }
}
