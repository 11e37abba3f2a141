//! `splice render` command implementation.

use std::path::{Path, PathBuf};

use clap::Args;
use console::Term;
use splice_embed::EmbedEngine;

use super::{EngineArgs, read_file};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Markdown document containing embed blocks.
    input: PathBuf,

    /// Write the rendered document here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    engine: EngineArgs,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or a file cannot be read or
    /// written.
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let (config, engine) = self.engine.build_engine()?;
        let rendered = render_file(&engine, &self.input)?;

        match &self.output {
            Some(path) => {
                std::fs::write(path, rendered).map_err(|source| CliError::Write {
                    path: path.clone(),
                    source,
                })?;
                output.info(&format!(
                    "Source directory: {}",
                    config.docs_resolved.source_dir.display()
                ));
                output.success(&format!(
                    "Rendered {} -> {}",
                    self.input.display(),
                    path.display()
                ));
            }
            None => Term::stdout().write_str(&rendered)?,
        }

        Ok(())
    }
}

/// Read a markdown document and replace its embed blocks.
fn render_file(engine: &EmbedEngine, input: &Path) -> Result<String, CliError> {
    let markdown = read_file(input)?;
    Ok(engine.process_document(&markdown))
}
