use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// File name used in the home directory when no path is given.
pub const DEFAULT_FILE_NAME: &str = ".pwds.csv";

/// credfile — keep credentials in a local CSV file.
#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// Path to the credential file. Defaults to `~/.pwds.csv`.
    #[arg(long, global = true, env = "CREDFILE_PATH")]
    pub file: Option<PathBuf>,

    /// Print results as JSON instead of text lines.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Print every stored credential with its index.
    All,

    /// Store a new credential.
    Create {
        #[arg(long)]
        name: String,

        #[arg(long)]
        username: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,
    },

    /// Delete the credential at an index printed by `all` or `search`.
    Delete {
        #[arg(long, allow_negative_numbers = true)]
        index: i64,
    },

    /// Print credentials with any field containing the query (case-insensitive).
    Search {
        #[arg(long)]
        query: String,
    },

    /// Remove the credential file entirely.
    Purge {
        /// Confirm that every stored credential should be destroyed.
        #[arg(long)]
        yes: bool,
    },
}

impl Cli {
    /// The credential file: `--file`, then `CREDFILE_PATH`, then
    /// `~/.pwds.csv`.
    pub fn store_path(&self) -> eyre::Result<PathBuf> {
        if let Some(path) = &self.file {
            return Ok(path.clone());
        }
        let home = dirs::home_dir()
            .ok_or_else(|| eyre::eyre!("unable to determine home directory; pass --file"))?;
        Ok(home.join(DEFAULT_FILE_NAME))
    }
}
