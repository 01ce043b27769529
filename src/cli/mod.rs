//! CLI definitions.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "portfolio")]
#[command(author, version, about = "Signal-driven portfolio manager with trailing stop-loss and take-profit")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Log level (overrides the configured level)
    #[arg(short, long)]
    pub log_level: Option<LogLevel>,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run ticks on the configured interval until Ctrl-C
    Run,
    /// Run a single tick and print the result
    Tick(TickArgs),
    /// Show the persisted portfolio
    Status(StatusArgs),
    /// Validate configuration
    ValidateConfig,
}

#[derive(clap::Args)]
pub struct TickArgs {
    /// Evaluate against persisted state without writing it back
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(clap::Args)]
pub struct StatusArgs {
    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Number of recent settlements to show
    #[arg(long, default_value = "5")]
    pub recent: usize,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
