use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// watchpost: stateful threshold checks for Nagios-compatible monitoring
///
/// Prints exactly one status line and exits 0 (OK), 1 (WARNING),
/// 2 (CRITICAL) or 3 (UNKNOWN).
#[derive(Parser, Debug)]
#[command(name = "watchpost")]
#[command(version, about, long_about)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to custom config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory for file-backed baselines (overrides config)
    #[arg(long, global = true)]
    pub state_dir: Option<String>,

    /// State backend: file or sqlite (overrides config)
    #[arg(long, global = true)]
    pub backend: Option<String>,

    /// Print the report as JSON instead of a status line
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Alert on how much a counter grew since the previous run
    Delta {
        /// Name of the persisted baseline
        #[arg(short, long)]
        key: String,

        /// Label shown on the status line (defaults to the key)
        #[arg(long)]
        name: Option<String>,

        /// File holding a single integer counter
        #[arg(long, conflicts_with = "keyed_file", required_unless_present = "keyed_file")]
        counter_file: Option<String>,

        /// File of `name value` lines, e.g. /proc/vmstat
        #[arg(long, requires = "field")]
        keyed_file: Option<String>,

        /// Field to read from --keyed-file, e.g. pswpout
        #[arg(long, requires = "keyed_file")]
        field: Option<String>,

        /// Warn when the increase exceeds this value
        #[arg(short, long)]
        warning: Option<u64>,

        /// Go critical when the increase exceeds this value
        #[arg(short, long)]
        critical: Option<u64>,
    },

    /// Alert on how long ago something last reported progress
    Age {
        /// File holding a Unix timestamp
        #[arg(long, conflicts_with = "mtime", required_unless_present = "mtime")]
        epoch_file: Option<String>,

        /// Use the modification time of this file
        #[arg(long)]
        mtime: Option<String>,

        /// Label shown on the status line
        #[arg(long)]
        name: Option<String>,

        /// Warn when older than this many seconds
        #[arg(short, long)]
        warning: Option<u64>,

        /// Go critical when older than this many seconds
        #[arg(short, long)]
        critical: Option<u64>,

        /// Report OK without evaluating while this file exists
        #[arg(long)]
        disable_marker: Option<String>,
    },

    /// Evaluate the checks defined in the config file
    #[command(alias = "r")]
    Run {
        /// Only run these checks (default: all)
        names: Vec<String>,
    },

    /// Show or initialize configuration
    #[command(alias = "c")]
    Config {
        /// Write a default config file
        #[arg(long)]
        init: bool,

        /// Overwrite an existing file with --init
        #[arg(long, requires = "init")]
        force: bool,
    },
}
