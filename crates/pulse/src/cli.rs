use clap::{Parser, Subcommand, ValueEnum};
use pulse_common::{DEFAULT_INTERVAL, DEFAULT_RANGE};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Base url of the pulse-web proxy
    #[arg(long, env = "PULSE_API_URL", default_value = "http://127.0.0.1:8080")]
    pub api: String,

    /// File holding the saved watchlist
    #[arg(long, env = "PULSE_STORE", default_value = "./pulse-store.json")]
    pub store: PathBuf,

    /// Sets the level of logging (ignored when RUST_LOG is set)
    #[arg(long, value_enum, ignore_case = true, default_value = "warn")]
    pub trace: TraceLevel,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Live dashboard; type `+SYM` to track, `-SYM` to drop, `SYM` to select, `q` to quit.
    Watch,

    /// Print the latest quotes (for the watchlist, unless symbols are given).
    Quotes { symbols: Vec<String> },

    /// Print the intraday chart of one symbol.
    Chart {
        symbol: String,

        #[arg(long, default_value = DEFAULT_RANGE)]
        range: String,

        #[arg(long, default_value = DEFAULT_INTERVAL)]
        interval: String,
    },

    /// Show the watchlist.
    List,

    /// Track a symbol.
    Add { symbol: String },

    /// Stop tracking a symbol.
    Remove { symbol: String },
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum TraceLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl TraceLevel {
    pub fn filter(self) -> &'static str {
        match self {
            TraceLevel::Debug => "debug",
            TraceLevel::Info => "info",
            TraceLevel::Warn => "warn",
            TraceLevel::Error => "error",
        }
    }
}
