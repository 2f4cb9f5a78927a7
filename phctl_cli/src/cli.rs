//! CLI argument definitions and logging setup.

use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "phctl", version, about = "pH dosing controller")]
pub struct Cli {
    /// Path to config TOML
    #[arg(long, value_name = "FILE", default_value = "etc/phctl.toml")]
    pub config: PathBuf,

    /// Log as JSON lines instead of pretty
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a recorded history CSV through the control engine
    Replay {
        /// History CSV to replay (same format the logger writes)
        #[arg(long, value_name = "FILE")]
        file: PathBuf,
        /// Time compression for pacing; 0 runs as fast as possible
        #[arg(long, default_value_t = 0.0)]
        speedup: f64,
    },
    /// Drive the engine with synthetic readings
    Simulate {
        /// Simulated duration in seconds
        #[arg(long, value_name = "SECS")]
        duration_secs: u64,
        /// Baseline reading value; small deterministic noise is added
        #[arg(long, default_value_t = 5.0)]
        value: f64,
        /// Seconds between synthetic readings
        #[arg(long, default_value_t = 10)]
        interval_secs: u64,
        /// Time compression for pacing; 0 runs as fast as possible
        #[arg(long, default_value_t = 0.0)]
        speedup: f64,
    },
    /// Validate the configuration and print the effective channel set
    Check,
}

/// Install the tracing subscriber. Events go to stderr (stdout carries the
/// JSONL command/telemetry stream); an optional log file from config takes
/// precedence, with rotation per the `[logging]` block.
pub fn init_tracing(json: bool, default_level: &str, logging: &phctl_config::Logging) {
    let level = logging
        .level
        .clone()
        .unwrap_or_else(|| default_level.to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if let Some(file) = &logging.file {
        let path = Path::new(file);
        let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("phctl.log");
        let appender = match logging.rotation.as_deref() {
            Some("daily") => tracing_appender::rolling::daily(dir, name),
            Some("hourly") => tracing_appender::rolling::hourly(dir, name),
            _ => tracing_appender::rolling::never(dir, name),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_ansi(false);
        if json {
            builder.json().init();
        } else {
            builder.init();
        }
    } else {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr);
        if json {
            builder.json().init();
        } else {
            builder.init();
        }
    }
}
