//! CLI argument definitions for the dq tool.

use std::path::PathBuf;

use clap::{ArgGroup, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "dq",
    version,
    about = "AI-assisted data quality checks for files and databases",
    long_about = "Describe a data quality check in plain language, have it\n\
                  translated into a structured rule, and run it against a\n\
                  CSV source or a PostgreSQL table. Results are persisted\n\
                  as per-source suites with rendered HTML data docs."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
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
    /// Translate a description into a check and run it against a source.
    Check(CheckArgs),

    /// Print the first rows of a source.
    Preview(PreviewArgs),

    /// List available file and database sources.
    Sources(SourcesArgs),

    /// List supported check kinds and their required parameters.
    Kinds,
}

#[derive(Parser)]
#[command(group(ArgGroup::new("source").required(true).args(["file", "table"])))]
#[command(group(ArgGroup::new("input").required(true).args(["describe", "rule_json"])))]
pub struct CheckArgs {
    /// CSV source name from the data directory.
    #[arg(long = "file", value_name = "NAME")]
    pub file: Option<String>,

    /// PostgreSQL table name.
    #[arg(long = "table", value_name = "NAME")]
    pub table: Option<String>,

    /// Natural-language description of the check to run.
    #[arg(long = "describe", value_name = "TEXT")]
    pub describe: Option<String>,

    /// Pre-built rule JSON, bypassing generation.
    #[arg(long = "rule-json", value_name = "JSON")]
    pub rule_json: Option<String>,

    /// Directory holding CSV sources.
    #[arg(long = "data-dir", value_name = "DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Artifact store directory (suites, validation results, data docs).
    #[arg(long = "store-dir", value_name = "DIR", default_value = "dq_store")]
    pub store_dir: PathBuf,

    /// PostgreSQL connection string (defaults to DATABASE_URL).
    #[arg(long = "database-url", value_name = "URL")]
    pub database_url: Option<String>,

    /// Chat provider: ollama or openai (defaults to DQ_LLM_PROVIDER).
    #[arg(long = "llm-provider", value_name = "NAME")]
    pub llm_provider: Option<String>,

    /// Chat endpoint base URL (defaults to DQ_LLM_BASE_URL).
    #[arg(long = "llm-base-url", value_name = "URL")]
    pub llm_base_url: Option<String>,

    /// Model name (defaults to DQ_LLM_MODEL).
    #[arg(long = "llm-model", value_name = "NAME")]
    pub llm_model: Option<String>,

    /// Echo the raw model reply even when it validates.
    #[arg(long = "show-reply")]
    pub show_reply: bool,
}

#[derive(Parser)]
#[command(group(ArgGroup::new("source").required(true).args(["file", "table"])))]
pub struct PreviewArgs {
    /// CSV source name from the data directory.
    #[arg(long = "file", value_name = "NAME")]
    pub file: Option<String>,

    /// PostgreSQL table name.
    #[arg(long = "table", value_name = "NAME")]
    pub table: Option<String>,

    /// Directory holding CSV sources.
    #[arg(long = "data-dir", value_name = "DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// PostgreSQL connection string (defaults to DATABASE_URL).
    #[arg(long = "database-url", value_name = "URL")]
    pub database_url: Option<String>,

    /// Number of rows to show.
    #[arg(long = "limit", value_name = "N", default_value_t = 10)]
    pub limit: usize,
}

#[derive(Parser)]
pub struct SourcesArgs {
    /// Directory holding CSV sources.
    #[arg(long = "data-dir", value_name = "DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// PostgreSQL connection string (defaults to DATABASE_URL).
    #[arg(long = "database-url", value_name = "URL")]
    pub database_url: Option<String>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
