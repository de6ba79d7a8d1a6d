//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing.

use clap::{Parser, ValueEnum};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Command-line options.
///
/// Policy and service endpoints come from the environment (see
/// [`GateSettings`](crate::config::GateSettings)); the flags here only control
/// how the binary runs and reports.
///
/// # Examples
///
/// ```bash
/// # One-shot check, exit code 0 when safe and 2 when not
/// egress_gate
///
/// # Print the verdict as JSON
/// egress_gate --json
///
/// # Re-check every minute until Ctrl-C
/// egress_gate --watch --interval-seconds 60
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "egress_gate",
    about = "Checks whether the current network egress point is safe to operate from."
)]
pub struct Opt {
    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Print the verdict as a JSON object instead of a status line
    #[arg(long)]
    pub json: bool,

    /// Keep re-evaluating at a fixed interval until interrupted
    #[arg(long)]
    pub watch: bool,

    /// Interval between evaluations in watch mode (overrides IP_CHECK_INTERVAL_SEC)
    #[arg(long)]
    pub interval_seconds: Option<u64>,

    /// Skip all checks and report the environment as safe
    #[arg(long)]
    pub disable: bool,
}
