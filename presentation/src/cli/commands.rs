//! CLI command definitions

use clap::{Parser, Subcommand, ValueEnum};
use member_qa_domain::OutputFormat;
use std::path::PathBuf;

/// Output format for answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputArg {
    /// Answer text followed by the supporting message
    Text,
    /// The raw `{answer, message}` JSON payload
    Json,
}

impl From<OutputArg> for OutputFormat {
    fn from(arg: OutputArg) -> Self {
        match arg {
            OutputArg::Text => OutputFormat::Text,
            OutputArg::Json => OutputFormat::Json,
        }
    }
}

/// CLI arguments for member-qa
#[derive(Parser, Debug)]
#[command(name = "member-qa")]
#[command(author, version, about = "Answer questions about member messages")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = r#"
member-qa answers natural-language questions about member messages.

Messages are read from the local cache first, then paged from the messages
API. Likely candidates are picked with cheap lexical filters and confirmed by
a language model, which must quote the message it answers from.

Configuration files are loaded from (in priority order):
1. MEMBER_QA_* env     e.g. MEMBER_QA_SOURCE__PAGE_SIZE=50
2. --config <path>     Explicit config file
3. ./member-qa.toml    Project-level config
4. ~/.config/member-qa/config.toml   Global config

Example:
  member-qa "When is Layla planning her trip to London?"
  member-qa --output json "How many cars does Vikram Desai have?"
  member-qa sync --pages 5
  member-qa --chat
"#)]
pub struct Cli {
    /// The question to answer (not required in chat mode)
    pub question: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,

    /// Start interactive chat mode
    #[arg(short, long)]
    pub chat: bool,

    /// Output format (overrides `output.format` from config)
    #[arg(short, long, value_enum)]
    pub output: Option<OutputArg>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Page the messages API into the local cache without asking anything
    Sync {
        /// Stop after this many pages (default: until the source is exhausted)
        #[arg(long, value_name = "N")]
        pages: Option<usize>,
    },
    /// Print the effective configuration as TOML
    Config,
}
