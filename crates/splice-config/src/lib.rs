//! Configuration management for Splice.
//!
//! Parses `splice.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `docs.source_dir`
//! - `logging.filter`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override vault source directory.
    pub source_dir: Option<PathBuf>,
    /// Override nested embed depth bound.
    pub max_depth: Option<usize>,
    /// Override default prefix group order.
    pub sort: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "splice.toml";

/// Keywords accepted by `embed.default_sort`.
pub const SORT_KEYWORDS: &[&str] = &["natural", "name", "created", "modified", "reverse"];

/// Largest accepted `embed.max_depth`.
pub const MAX_DEPTH_LIMIT: usize = 64;

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Vault configuration (paths are relative strings from TOML).
    docs: DocsConfigRaw,
    /// Embed engine configuration.
    pub embed: EmbedSettings,
    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Resolved docs configuration (set after loading).
    #[serde(skip)]
    pub docs_resolved: DocsConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw docs configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DocsConfigRaw {
    source_dir: Option<String>,
    extensions: Option<Vec<String>>,
}

/// Resolved vault configuration with absolute paths.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct DocsConfig {
    /// Root directory of the note vault.
    pub source_dir: PathBuf,
    /// Extensions (without dot) of embeddable text documents.
    pub extensions: Vec<String>,
}

fn default_extensions() -> Vec<String> {
    vec!["md".to_owned()]
}

/// Embed engine configuration.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EmbedSettings {
    /// Label of the fenced blocks that `render` rewrites.
    pub keyword: String,
    /// Label of nested embed regions inside embedded documents.
    pub nested_label: String,
    /// Deepest nesting level that is still resolved.
    pub max_depth: usize,
    /// Order of prefix groups without a `sort:` line.
    pub default_sort: String,
    /// Drop leading YAML front matter from documents.
    pub strip_front_matter: bool,
}

impl Default for EmbedSettings {
    fn default() -> Self {
        Self {
            keyword: "embed".to_owned(),
            nested_label: "embed".to_owned(),
            max_depth: 5,
            default_sort: "natural".to_owned(),
            strip_front_matter: true,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "warn".to_owned(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`docs.source_dir`").
        field: String,
        /// Error message (e.g., "${`VAULT_DIR`} not set").
        message: String,
    },
}

/// Require a label to be a single non-empty word.
fn require_label(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(ConfigError::Validation(format!(
            "{field} cannot contain whitespace"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `splice.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values. The merged result
    /// is validated.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the merged configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(source_dir) = &settings.source_dir {
            self.docs_resolved.source_dir.clone_from(source_dir);
        }
        if let Some(max_depth) = settings.max_depth {
            self.embed.max_depth = max_depth;
        }
        if let Some(sort) = &settings.sort {
            self.embed.default_sort.clone_from(sort);
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            docs: DocsConfigRaw::default(),
            embed: EmbedSettings::default(),
            logging: LoggingConfig::default(),
            docs_resolved: DocsConfig {
                source_dir: base.join("docs"),
                extensions: default_extensions(),
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_docs()?;
        self.validate_embed()?;
        Ok(())
    }

    fn validate_docs(&self) -> Result<(), ConfigError> {
        let extensions = &self.docs_resolved.extensions;
        if extensions.is_empty() {
            return Err(ConfigError::Validation(
                "docs.extensions cannot be empty".to_owned(),
            ));
        }
        if extensions.iter().any(|e| e.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "docs.extensions cannot contain empty entries".to_owned(),
            ));
        }
        Ok(())
    }

    fn validate_embed(&self) -> Result<(), ConfigError> {
        require_label(&self.embed.keyword, "embed.keyword")?;
        require_label(&self.embed.nested_label, "embed.nested_label")?;

        let max_depth = self.embed.max_depth;
        if max_depth == 0 {
            return Err(ConfigError::Validation(
                "embed.max_depth must be greater than 0".to_owned(),
            ));
        }
        if max_depth > MAX_DEPTH_LIMIT {
            return Err(ConfigError::Validation(format!(
                "embed.max_depth cannot exceed {MAX_DEPTH_LIMIT}"
            )));
        }

        let sort = self.embed.default_sort.trim().to_lowercase();
        if !SORT_KEYWORDS.contains(&sort.as_str()) {
            return Err(ConfigError::Validation(format!(
                "embed.default_sort must be one of: {}",
                SORT_KEYWORDS.join(", ")
            )));
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref source_dir) = self.docs.source_dir {
            self.docs.source_dir = Some(expand::expand_env(source_dir, "docs.source_dir")?);
        }
        self.logging.filter = expand::expand_env(&self.logging.filter, "logging.filter")?;
        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.docs_resolved = DocsConfig {
            source_dir: config_dir.join(self.docs.source_dir.as_deref().unwrap_or("docs")),
            extensions: self
                .docs
                .extensions
                .clone()
                .unwrap_or_else(default_extensions),
        };
    }
}
