#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the dosing controller.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - Every regulator parameter (band, window, cooldown, pulse step, sequence
//!   delays) is configuration; observed deployments disagree on the values,
//!   so nothing here is hard-coded beyond the defaults.
use serde::Deserialize;

/// Target band and proportional step for the dose decision.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct BandCfg {
    /// Lower acceptable bound for the windowed average.
    pub low: f64,
    /// Upper acceptable bound for the windowed average.
    pub high: f64,
    /// Deviation that maps to one dose pulse; pulses = ceil(delta / pulse_step).
    pub pulse_step: f64,
}

impl Default for BandCfg {
    fn default() -> Self {
        Self {
            low: 5.5,
            high: 6.0,
            pulse_step: 0.3,
        }
    }
}

/// Trailing averaging window over sensor readings.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct WindowCfg {
    pub secs: u64,
}

impl Default for WindowCfg {
    fn default() -> Self {
        Self { secs: 10 * 60 }
    }
}

/// Quiet period enforced per channel after an actuation.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct CooldownCfg {
    pub secs: u64,
}

impl Default for CooldownCfg {
    fn default() -> Self {
        Self { secs: 60 * 60 }
    }
}

/// Fixed inter-step delays of the actuation sequence.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct SequenceCfg {
    /// Wait after the valve-open command before the first dose pulse.
    pub open_settle_secs: u64,
    /// Wait after each dose pulse.
    pub pulse_secs: u64,
    /// Wait after the flush/water command before closing the valve.
    pub flush_secs: u64,
}

impl Default for SequenceCfg {
    fn default() -> Self {
        Self {
            open_settle_secs: 5,
            pulse_secs: 5,
            flush_secs: 15,
        }
    }
}

/// Per-channel inbound reading queue.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct QueueCfg {
    /// Bounded queue depth; readings beyond it are dropped and re-coalesced.
    pub depth: usize,
}

impl Default for QueueCfg {
    fn default() -> Self {
        Self { depth: 64 }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

/// Where the persisted history log lives and how its files are named.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HistoryCfg {
    /// Directory holding the log files; None disables startup recovery.
    pub dir: Option<String>,
    /// File name pattern with a single `*` wildcard, e.g. "mqtt_log_*.csv".
    pub pattern: String,
}

impl Default for HistoryCfg {
    fn default() -> Self {
        Self {
            dir: None,
            pattern: "mqtt_log_*.csv".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Config {
    /// Closed set of channel identifiers, e.g. ["V1", "V2", "V3", "V4"].
    pub channels: Vec<String>,
    #[serde(default)]
    pub band: BandCfg,
    #[serde(default)]
    pub window: WindowCfg,
    #[serde(default)]
    pub cooldown: CooldownCfg,
    #[serde(default)]
    pub sequence: SequenceCfg,
    #[serde(default)]
    pub queue: QueueCfg,
    #[serde(default)]
    pub logging: Logging,
    #[serde(default)]
    pub history: HistoryCfg,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Channels
        if self.channels.is_empty() {
            eyre::bail!("channels must list at least one identifier");
        }
        for (i, ch) in self.channels.iter().enumerate() {
            if ch.trim().is_empty() {
                eyre::bail!("channels[{i}] must not be empty");
            }
            if self.channels[..i].contains(ch) {
                eyre::bail!("channels contains duplicate identifier {ch:?}");
            }
        }

        // Band
        if !self.band.low.is_finite() || !self.band.high.is_finite() {
            eyre::bail!("band.low and band.high must be finite");
        }
        if self.band.low > self.band.high {
            eyre::bail!("band.low must be <= band.high");
        }
        if !(self.band.pulse_step.is_finite() && self.band.pulse_step > 0.0) {
            eyre::bail!("band.pulse_step must be > 0");
        }

        // Window / cooldown
        if self.window.secs == 0 {
            eyre::bail!("window.secs must be >= 1");
        }
        if self.window.secs > 24 * 60 * 60 {
            eyre::bail!("window.secs is unreasonably large (>24h)");
        }
        if self.cooldown.secs > 7 * 24 * 60 * 60 {
            eyre::bail!("cooldown.secs is unreasonably large (>7d)");
        }

        // Sequence delays
        let seq = &self.sequence;
        for (name, secs) in [
            ("sequence.open_settle_secs", seq.open_settle_secs),
            ("sequence.pulse_secs", seq.pulse_secs),
            ("sequence.flush_secs", seq.flush_secs),
        ] {
            if secs > 10 * 60 {
                eyre::bail!("{name} is unreasonably large (>10min)");
            }
        }

        // Queue
        if self.queue.depth == 0 {
            eyre::bail!("queue.depth must be >= 1");
        }

        // History
        let wildcards = self.history.pattern.matches('*').count();
        if wildcards != 1 {
            eyre::bail!("history.pattern must contain exactly one '*' wildcard");
        }

        Ok(())
    }
}
