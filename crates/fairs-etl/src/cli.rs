//! Command-line interface

use clap::{Args, Parser, Subcommand};
use std::io::IsTerminal;
use std::path::PathBuf;

use crate::config::{SourceConfig, DEFAULT_ARCHIVE_URL};
use crate::error::{EtlError, Result};
use crate::supported::SupportedFile;

/// ETL for the São Paulo open-air fairs dataset
#[derive(Parser, Debug)]
#[command(name = "fairs-etl")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download a supported file and load it into the database
    Import(ImportArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ImportArgs {
    /// File to import (prompted for when omitted on a terminal)
    #[arg(short, long, value_enum)]
    pub file: Option<SupportedFile>,

    /// Archive URL
    #[arg(long, env = "FAIRS_ARCHIVE_URL", default_value = DEFAULT_ARCHIVE_URL)]
    pub url: String,

    /// Read the archive from a local zip instead of downloading it; takes
    /// precedence over --url
    #[arg(long)]
    pub archive: Option<PathBuf>,

    /// HTTP timeout in seconds
    #[arg(long, default_value_t = 120)]
    pub timeout: u64,

    /// Load into memory and report counts without touching the database
    #[arg(long)]
    pub dry_run: bool,
}

impl ImportArgs {
    pub fn source_config(&self) -> SourceConfig {
        let config = SourceConfig::new()
            .with_url(self.url.clone())
            .with_timeout(self.timeout);
        match &self.archive {
            Some(path) => config.with_local_archive(path),
            None => config,
        }
    }

    /// The file to import: the flag, an interactive choice, or the only one
    /// available
    pub fn resolve_file(&self) -> Result<SupportedFile> {
        if let Some(file) = self.file {
            return Ok(file);
        }

        if SupportedFile::ALL.len() > 1 && std::io::stdin().is_terminal() {
            let options = SupportedFile::ALL.to_vec();
            return inquire::Select::new("Which file do you want to import?", options)
                .prompt()
                .map_err(|e| EtlError::Prompt(e.to_string()));
        }

        match SupportedFile::ALL.first() {
            Some(file) => Ok(*file),
            None => Err(EtlError::UnsupportedFile(String::new())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_defaults() {
        let cli = Cli::try_parse_from(["fairs-etl", "import"]).unwrap();

        let Commands::Import(args) = cli.command;
        assert!(!cli.verbose);
        assert!(args.file.is_none());
        assert!(!args.dry_run);
        assert_eq!(args.timeout, 120);
        assert_eq!(args.resolve_file().unwrap(), SupportedFile::Fairs2014);
    }

    #[test]
    fn test_import_flags() {
        let cli = Cli::try_parse_from([
            "fairs-etl",
            "import",
            "--file",
            "fairs-2014",
            "--archive",
            "/tmp/feiras.zip",
            "--dry-run",
            "-v",
        ])
        .unwrap();

        let Commands::Import(args) = cli.command;
        assert!(cli.verbose);
        assert!(args.dry_run);
        assert_eq!(args.file, Some(SupportedFile::Fairs2014));

        let config = args.source_config();
        assert_eq!(config.local_archive_path, Some(PathBuf::from("/tmp/feiras.zip")));
    }

    #[test]
    fn test_unknown_file_is_rejected() {
        let result = Cli::try_parse_from(["fairs-etl", "import", "--file", "feiras-2015"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
