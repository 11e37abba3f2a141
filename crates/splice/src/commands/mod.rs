//! CLI command implementations.

pub(crate) mod render;
pub(crate) mod resolve;

pub(crate) use render::RenderArgs;
pub(crate) use resolve::ResolveArgs;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Args;
use splice_config::{CliSettings, Config};
use splice_embed::{EmbedConfig, EmbedEngine};
use splice_storage_fs::FsStorage;

use crate::error::CliError;

/// Options shared by every command that resolves embeds.
#[derive(Args)]
pub(crate) struct EngineArgs {
    /// Path to configuration file (default: auto-discover splice.toml).
    #[arg(short, long, env = "SPLICE_CONFIG")]
    config: Option<PathBuf>,

    /// Vault directory holding the notes (overrides config).
    #[arg(short, long, env = "SPLICE_SOURCE_DIR")]
    source_dir: Option<PathBuf>,

    /// Maximum nested embed depth (overrides config).
    #[arg(long)]
    max_depth: Option<usize>,

    /// Default order of prefix groups: natural, name, created, modified or
    /// reverse (overrides config).
    #[arg(long)]
    sort: Option<String>,

    /// Enable verbose output (debug logs on stderr).
    #[arg(short, long)]
    verbose: bool,
}

impl EngineArgs {
    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            source_dir: self.source_dir.clone(),
            max_depth: self.max_depth,
            sort: self.sort.clone(),
        }
    }

    /// Load configuration, set up logging and build the engine.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the vault
    /// directory does not exist.
    pub(crate) fn build_engine(&self) -> Result<(Config, EmbedEngine), CliError> {
        let config = Config::load(self.config.as_deref(), Some(&self.cli_settings()))?;
        crate::init_tracing(self.verbose, &config.logging.filter);

        tracing::debug!(
            config_path = ?config.config_path,
            source_dir = %config.docs_resolved.source_dir.display(),
            "Loaded configuration"
        );

        let engine = engine_from_config(&config)?;
        Ok((config, engine))
    }
}

/// Build an engine over the filesystem vault described by `config`.
pub(crate) fn engine_from_config(config: &Config) -> Result<EmbedEngine, CliError> {
    let source_dir = &config.docs_resolved.source_dir;
    if !source_dir.is_dir() {
        return Err(CliError::Validation(format!(
            "Source directory not found: {}",
            source_dir.display()
        )));
    }

    let storage = FsStorage::with_extensions(
        source_dir.clone(),
        config.docs_resolved.extensions.clone(),
    );
    let embed = EmbedConfig {
        keyword: config.embed.keyword.clone(),
        nested_label: config.embed.nested_label.clone(),
        max_depth: config.embed.max_depth,
        default_sort: config.embed.default_sort.parse()?,
        strip_front_matter: config.embed.strip_front_matter,
    };

    Ok(EmbedEngine::new(Arc::new(storage), embed))
}

/// Read a UTF-8 file, naming it in the error.
pub(crate) fn read_file(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;
    use splice_embed::SortOrder;

    /// Vault with a config file next to it.
    pub(crate) fn vault(files: &[(&str, &str)], config: &str) -> (TempDir, Config) {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("vault")).unwrap();
        for (path, content) in files {
            let full = temp.path().join("vault").join(path);
            std::fs::create_dir_all(full.parent().unwrap()).unwrap();
            std::fs::write(full, content).unwrap();
        }
        let config_path = temp.path().join("splice.toml");
        std::fs::write(&config_path, format!("[docs]\nsource_dir = \"vault\"\n{config}")).unwrap();

        let config = Config::load(Some(&config_path), None).unwrap();
        (temp, config)
    }

    #[test]
    fn test_config_sort_keywords_match_sort_orders() {
        assert_eq!(splice_config::SORT_KEYWORDS, SortOrder::KEYWORDS);
    }

    #[test]
    fn test_cli_settings_mapping() {
        let args = EngineArgs {
            config: None,
            source_dir: Some(PathBuf::from("notes")),
            max_depth: Some(2),
            sort: Some("name".to_owned()),
            verbose: false,
        };

        let settings = args.cli_settings();

        assert_eq!(settings.source_dir, Some(PathBuf::from("notes")));
        assert_eq!(settings.max_depth, Some(2));
        assert_eq!(settings.sort.as_deref(), Some("name"));
    }

    #[test]
    fn test_engine_from_config() {
        let (_temp, config) = vault(
            &[("NoteA.md", "---\ntitle: A\n---\nhello")],
            "[embed]\nmax_depth = 3\ndefault_sort = \"Modified\"\n",
        );

        let engine = engine_from_config(&config).unwrap();

        assert_eq!(engine.config().max_depth, 3);
        assert_eq!(engine.config().default_sort, SortOrder::Modified);
        assert_eq!(engine.render_block("[[NoteA]]"), "\n\nhello\n\n---\n\n");
    }

    #[test]
    fn test_engine_from_config_missing_vault() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("splice.toml");
        std::fs::write(&config_path, "[docs]\nsource_dir = \"nowhere\"\n").unwrap();
        let config = Config::load(Some(&config_path), None).unwrap();

        let err = engine_from_config(&config).err().unwrap();

        assert!(err.to_string().starts_with("Source directory not found"));
    }

    #[test]
    fn test_read_file_names_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing.md");

        let err = read_file(&path).unwrap_err();

        assert!(err.to_string().contains("missing.md"));
    }
}
