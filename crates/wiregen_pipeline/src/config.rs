//! Parsing and validation of `wiregen.toml` generator configuration.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use wiregen_cache::BuildCache;

use crate::checker::{NullChecker, PhpLintChecker, SyntaxChecker};
use crate::placement::OutputPlacement;

/// Errors that can occur when loading or validating a `wiregen.toml`
/// configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An I/O error occurred while reading the configuration file.
    #[error("failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// The TOML content could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// A required field is missing from the configuration.
    #[error("missing required field: {0}")]
    MissingField(String),
}

/// How cache entries are laid out on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CacheStorageKind {
    /// One shared file holding all keys.
    #[default]
    SharedFile,
    /// One file per key inside a directory.
    FilePerKey,
}

/// The `[cache]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Backing file path (shared-file mode) or directory (file-per-key).
    pub path: PathBuf,
    /// Storage layout.
    #[serde(default)]
    pub storage: CacheStorageKind,
}

/// The `[output]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Root directory all generated services are placed under.
    pub root: PathBuf,
    /// Dedicated root for the core package.
    pub core_root: PathBuf,
    /// Name of the service treated as the core package.
    #[serde(default = "default_core_package")]
    pub core_package: String,
}

fn default_core_package() -> String {
    "Core".to_string()
}

/// The `[checker]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckerConfig {
    /// PHP binary used for `php -l`; syntax checking is skipped if unset.
    pub php_binary: Option<String>,
}

/// Top-level generator configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratorConfig {
    /// Build cache settings.
    pub cache: CacheConfig,
    /// Output placement settings.
    pub output: OutputConfig,
    /// Syntax checker settings.
    #[serde(default)]
    pub checker: CheckerConfig,
}

impl GeneratorConfig {
    /// Loads and validates a `wiregen.toml` from a project directory.
    pub fn load(project_dir: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(project_dir.join("wiregen.toml"))?;
        Self::from_str_content(&content)
    }

    /// Parses and validates a configuration from a string.
    ///
    /// Useful for testing without filesystem dependencies.
    pub fn from_str_content(content: &str) -> Result<Self, ConfigError> {
        let config: GeneratorConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.path.as_os_str().is_empty() {
            return Err(ConfigError::MissingField("cache.path".to_string()));
        }
        if self.output.root.as_os_str().is_empty() {
            return Err(ConfigError::MissingField("output.root".to_string()));
        }
        if self.output.core_root.as_os_str().is_empty() {
            return Err(ConfigError::MissingField("output.core_root".to_string()));
        }
        Ok(())
    }

    /// Builds the cache handle this configuration describes.
    pub fn build_cache(&self) -> BuildCache {
        match self.cache.storage {
            CacheStorageKind::SharedFile => BuildCache::shared_file(&self.cache.path),
            CacheStorageKind::FilePerKey => BuildCache::file_per_key(&self.cache.path),
        }
    }

    /// Builds the output placement this configuration describes.
    pub fn placement(&self) -> OutputPlacement {
        OutputPlacement::new(
            &self.output.root,
            &self.output.core_root,
            &self.output.core_package,
        )
    }

    /// Builds the syntax checker this configuration describes.
    pub fn syntax_checker(&self) -> Box<dyn SyntaxChecker> {
        match &self.checker.php_binary {
            Some(binary) => Box::new(PhpLintChecker::new(binary.clone())),
            None => Box::new(NullChecker),
        }
    }
}
