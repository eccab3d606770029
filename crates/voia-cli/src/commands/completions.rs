//! Shell completion scripts for `voia`.

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::{generate, generate_to, Shell};

use crate::cli::Cli;
use crate::error::CliError;

const BIN_NAME: &str = "voia";

/// Write the completion script for `shell` to stdout, to a file, or into a
/// directory under the name the shell looks for (`_voia` for zsh).
///
/// Returns the written path, if any.
pub fn run_completions(shell: Shell, output: Option<&Path>) -> Result<Option<PathBuf>, CliError> {
    let mut command = Cli::command();
    let written = match output {
        None => {
            generate(shell, &mut command, BIN_NAME, &mut io::stdout());
            return Ok(None);
        }
        Some(dir) if dir.is_dir() => generate_to(shell, &mut command, BIN_NAME, dir)?,
        Some(file) => {
            let mut script = Vec::new();
            generate(shell, &mut command, BIN_NAME, &mut script);
            std::fs::write(file, script)?;
            file.to_path_buf()
        }
    };
    tracing::debug!(%shell, path = %written.display(), "Wrote completion script");
    println!("{}", written.display());
    Ok(Some(written))
}
