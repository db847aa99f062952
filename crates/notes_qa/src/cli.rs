//! Command-line surface.

use crate::docs::CheckKind;
use crate::runtime::config::QaConfig;
use crate::runtime::error::QaResult;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "notes-qa")]
#[command(version, about = "Quality checks for a markdown knowledge base", long_about = None)]
pub struct Cli {
    /// Checks to run (default: all)
    #[arg(value_enum)]
    pub checks: Vec<CheckKind>,

    /// Content root scanned for markdown notes
    #[arg(short, long, default_value = ".")]
    pub root: PathBuf,

    /// Directory holding glossary.md and references.md (default: the content root)
    #[arg(long)]
    pub canonical_dir: Option<PathBuf>,

    /// TOML file overriding the built-in vocabularies and limits
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Also write a JSON audit report to this path
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Sample issues printed per check
    #[arg(long)]
    pub sample_limit: Option<usize>,
}

impl Cli {
    /// Resolve flags and the optional config file into a run configuration.
    ///
    /// Precedence: built-in defaults, then the config file, then flags.
    pub fn to_config(&self) -> QaResult<QaConfig> {
        let mut config = QaConfig::new(&self.root);
        if let Some(dir) = &self.canonical_dir {
            config = config.with_canonical_dir(dir);
        }
        if let Some(path) = &self.config {
            config.apply_file(path)?;
        }
        if let Some(limit) = self.sample_limit {
            config.sample_limit = limit;
        }
        Ok(config)
    }
}
