//! CLI commands and argument parsing

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Twilio paginated collection reader
#[derive(Parser, Debug)]
#[command(name = "twilio-paging")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Client configuration file (YAML); `TWILIO_*` variables otherwise
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read every record of a collection
    List {
        #[command(flatten)]
        resource: ResourceArgs,

        #[command(flatten)]
        query: ListArgs,

        /// Maximum records to read
        #[arg(long)]
        limit: Option<u64>,
    },

    /// Read a single page
    Page {
        #[command(flatten)]
        resource: ResourceArgs,

        #[command(flatten)]
        query: ListArgs,

        /// Server-provided next page URL
        #[arg(long, conflicts_with_all = ["page_size", "filters"])]
        url: Option<String>,
    },

    /// Fetch one record
    Fetch {
        #[command(flatten)]
        resource: ResourceArgs,

        /// Record SID
        #[arg(long)]
        sid: String,
    },
}

/// Which collection to address
#[derive(Args, Debug, Clone)]
pub struct ResourceArgs {
    /// Collection
    #[arg(short, long, value_enum)]
    pub resource: ResourceKind,

    /// Chat service SID, for channels and members
    #[arg(long)]
    pub service: Option<String>,

    /// Channel SID, for members
    #[arg(long)]
    pub channel: Option<String>,
}

/// Paging and filter options
#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// Records per page (1-1000)
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Filter as KEY=VALUE, repeatable
    #[arg(long = "filter", value_parser = parse_filter)]
    pub filters: Vec<(String, String)>,
}

/// Shipped collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ResourceKind {
    /// Account messages (2010 API)
    Messages,
    /// Chat services
    Services,
    /// Channels of a Chat service
    Channels,
    /// Members of a channel
    Members,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one record per line)
    Json,
    /// Human-readable output
    Pretty,
}

fn parse_filter(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}
