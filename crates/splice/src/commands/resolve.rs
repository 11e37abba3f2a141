//! `splice resolve` command implementation.

use std::io::Read;
use std::path::PathBuf;

use clap::Args;
use console::Term;
use splice_embed::EmbedEngine;

use super::{EngineArgs, read_file};
use crate::error::CliError;

/// Arguments for the resolve command.
#[derive(Args)]
pub(crate) struct ResolveArgs {
    /// Directive block, e.g. "[[NoteA]] [[NoteB#Intro]]" (default: read stdin).
    #[arg(conflicts_with = "file")]
    block: Option<String>,

    /// Read the directive block from a file.
    #[arg(short, long)]
    file: Option<PathBuf>,

    #[command(flatten)]
    engine: EngineArgs,
}

impl ResolveArgs {
    /// Execute the resolve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, the block cannot be read, or
    /// the block resolves to nothing.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let (_, engine) = self.engine.build_engine()?;
        let block = self.read_block()?;

        let text = resolve_block(&engine, &block)?;
        Term::stdout().write_str(&text)?;
        Ok(())
    }

    fn read_block(&self) -> Result<String, CliError> {
        if let Some(block) = &self.block {
            return Ok(block.clone());
        }
        if let Some(path) = &self.file {
            return read_file(path);
        }

        let mut block = String::new();
        std::io::stdin().read_to_string(&mut block)?;
        Ok(block)
    }
}

/// Resolve a block to its aggregate text.
fn resolve_block(engine: &EmbedEngine, block: &str) -> Result<String, CliError> {
    let result = engine.resolve(block)?;
    Ok(result.text)
}
