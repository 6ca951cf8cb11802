//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use tmm_cli::commands::MapRequest;

#[derive(Parser)]
#[command(
    name = "tmm",
    version,
    about = "Match legacy source fields onto SAP migration target fields",
    long_about = "Match legacy source fields onto SAP migration target fields.\n\n\
                  Phases run in order: central-memory rules, exact, synonym, fuzzy,\n\
                  then an audit pass against targets that are already taken."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Match one batch of source and target fields.
    Map(MapArgs),

    /// Show the synonyms known for a term.
    Synonyms(SynonymArgs),
}

#[derive(Parser)]
pub struct MapArgs {
    /// TOML file with `[[sources]]` and `[[targets]]`.
    #[arg(value_name = "BATCH")]
    pub batch: PathBuf,

    /// Central-memory rule file.
    #[arg(long = "rules", value_name = "PATH")]
    pub rules: Option<PathBuf>,

    /// Matching options file.
    #[arg(long = "config", value_name = "PATH", default_value = "tmm.toml")]
    pub config: PathBuf,

    /// Table key for table-scoped rules (default: from the batch file).
    #[arg(long = "table", value_name = "OBJECT_VARIANT")]
    pub table: Option<String>,

    /// Minimum fuzzy score, 0.0 to 1.0.
    #[arg(long = "threshold")]
    pub threshold: Option<f64>,

    /// Ranked alternatives and audit records kept per source.
    #[arg(long = "max-suggestions")]
    pub max_suggestions: Option<usize>,

    /// Skip the fuzzy and audit phases.
    #[arg(long = "disable-fuzzy")]
    pub disable_fuzzy: bool,

    /// Print the decisions and statistics as JSON instead of tables.
    #[arg(long = "json")]
    pub json: bool,
}

impl MapArgs {
    pub fn to_request(&self) -> MapRequest {
        MapRequest {
            batch: self.batch.clone(),
            rules: self.rules.clone(),
            config: Some(self.config.clone()),
            table: self.table.clone(),
            threshold: self.threshold,
            max_suggestions: self.max_suggestions,
            disable_fuzzy: self.disable_fuzzy,
        }
    }
}

#[derive(Parser)]
pub struct SynonymArgs {
    #[arg(value_name = "TERM")]
    pub term: String,

    /// Central-memory rule file with custom synonyms.
    #[arg(long = "rules", value_name = "PATH")]
    pub rules: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
