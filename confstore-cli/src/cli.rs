//! Command-line interface definitions for `confstore`.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand, ValueEnum};
use confstore::Format;

/// Formats for printing a single looked-up value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ValueFormat {
    /// Pretty-printed JSON.
    Json,
    /// YAML.
    Yaml,
}

/// Formats for exporting the whole tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// Pretty-printed JSON.
    Json,
    /// YAML.
    Yaml,
    /// INI; the tree may nest at most two levels below each section.
    Ini,
    /// The registry's binary framing, readable by `--source`.
    Binary,
}

impl From<ExportFormat> for Format {
    fn from(format: ExportFormat) -> Self {
        match format {
            ExportFormat::Json => Self::Json,
            ExportFormat::Yaml => Self::Yaml,
            ExportFormat::Ini => Self::Ini,
            ExportFormat::Binary => Self::Binary,
        }
    }
}

/// Parsed CLI arguments for `confstore`.
#[derive(Debug, Parser)]
#[command(name = "confstore")]
#[command(about = "Merge configuration sources and query the result")]
#[command(version)]
pub struct Args {
    /// Configuration source: a file, a glob pattern or inline text (repeat
    /// to layer sources; later ones win).
    #[arg(long, short = 's', value_name = "SRC")]
    pub source: Vec<String>,
    /// Source whose keys may not be overwritten by any `--source`.
    #[arg(long, value_name = "SRC")]
    pub protect: Vec<String>,
    /// Discard every source when any of them fails.
    #[arg(long)]
    pub strict: bool,
    /// Log each ingested source.
    #[arg(long, short = 'v')]
    pub verbose: bool,
    /// What to do with the merged configuration.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the value at a `/`-separated path; exits with status 1 when
    /// nothing is found.
    Get {
        /// Path such as `console/timeZone`.
        path: String,
        /// Output format.
        #[arg(long, value_enum, default_value_t = ValueFormat::Json)]
        format: ValueFormat,
    },
    /// Print or write the merged tree.
    Export {
        /// Output format.
        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
        /// Write to this file instead of standard output.
        #[arg(long, value_name = "FILE")]
        out: Option<Utf8PathBuf>,
    },
    /// List sources that could not be ingested; exits with status 1 when
    /// any failed.
    Check,
}
