mod cli;
mod sim;
mod sinks;

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Parser;
use eyre::{Result, WrapErr};
use serde_json::json;

use phctl_core::{
    ChannelSet, ControlCfg, Controller, RecoveredState, SharedClock, SharedCommandSink,
    SharedTelemetrySink, recovery,
};
use phctl_traits::{Clock, WallClock};

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = cli::Cli::parse();

    let raw = std::fs::read_to_string(&args.config)
        .wrap_err_with(|| format!("read config file {}", args.config.display()))?;
    let cfg = phctl_config::load_toml(&raw).wrap_err("parse config TOML")?;
    cfg.validate().wrap_err("validate config")?;
    cli::init_tracing(args.json, &args.log_level, &cfg.logging);

    if matches!(args.cmd, cli::Commands::Check) {
        println!(
            "{}",
            json!({ "event": "config", "channels": cfg.channels, "window_secs": cfg.window.secs, "cooldown_secs": cfg.cooldown.secs })
        );
        return Ok(());
    }

    let set = ChannelSet::new(&cfg.channels)?;
    let control = ControlCfg::from(&cfg);
    let clock: SharedClock = Arc::new(WallClock::new());

    // Startup recovery from the newest history artifact, when configured.
    let recovered = match &cfg.history.dir {
        Some(dir) => {
            let mut log = phctl_bus::CsvHistoryLog::new(dir, &cfg.history.pattern)
                .wrap_err("open history log")?;
            recovery::load(&mut log, &set, control.window_secs, clock.now_secs())
        }
        None => RecoveredState::cold(set.len()),
    };

    let sink: SharedCommandSink = Arc::new(Mutex::new(sinks::JsonlCommandSink::stdout()));
    let telemetry: SharedTelemetrySink = Arc::new(Mutex::new(sinks::JsonlTelemetrySink::stdout()));
    let controller = Controller::spawn(control, set, recovered, sink, telemetry, clock)?;

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = Arc::clone(&stop);
        ctrlc::set_handler(move || stop.store(true, Ordering::SeqCst))
            .wrap_err("install signal handler")?;
    }

    match args.cmd {
        cli::Commands::Replay { ref file, speedup } => {
            run_replay(&controller, file, speedup, &stop)?;
        }
        cli::Commands::Simulate {
            duration_secs,
            value,
            interval_secs,
            speedup,
        } => {
            sim::run(&controller, value, interval_secs, duration_secs, speedup, &stop);
        }
        cli::Commands::Check => unreachable!("handled above"),
    }

    let final_counters = controller.shutdown();
    sinks::emit_summary(&final_counters);
    Ok(())
}

/// Push a recorded log's readings through the engine in timestamp order,
/// optionally compressed in time.
fn run_replay(
    controller: &Controller,
    file: &Path,
    speedup: f64,
    stop: &AtomicBool,
) -> Result<()> {
    let rows = phctl_bus::history::read_file(file)
        .wrap_err_with(|| format!("read replay file {}", file.display()))?;
    let events = phctl_bus::readings_from_rows(&rows);
    tracing::info!(events = events.len(), file = %file.display(), "replay start");

    let mut prev: Option<u64> = None;
    let mut accepted = 0usize;
    for event in events {
        if stop.load(Ordering::SeqCst) {
            tracing::info!("interrupted; stopping replay");
            break;
        }
        if speedup > 0.0
            && let Some(p) = prev
            && event.at_secs > p
        {
            let gap = (event.at_secs - p) as f64 / speedup;
            std::thread::sleep(Duration::from_secs_f64(gap.min(60.0)));
        }
        prev = Some(event.at_secs);
        if controller.ingest(&event.channel, event.value, event.at_secs) {
            accepted += 1;
        }
    }
    tracing::info!(accepted, "replay finished");
    Ok(())
}
