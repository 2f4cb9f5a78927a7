//! Core runtime configuration and mappings from the `phctl_config` schema.

use std::time::Duration;

use crate::decider::DoseBand;
use crate::error::BuildError;
use crate::sequencer::SequenceDelays;

/// Everything the controller needs, in core types.
#[derive(Debug, Clone)]
pub struct ControlCfg {
    pub band: DoseBand,
    /// Trailing averaging window span.
    pub window_secs: u64,
    /// Quiet period after an actuation, per channel.
    pub cooldown_secs: u64,
    pub delays: SequenceDelays,
    /// Bounded depth of each channel's inbound reading queue.
    pub queue_depth: usize,
}

impl Default for ControlCfg {
    fn default() -> Self {
        Self {
            band: DoseBand::default(),
            window_secs: 10 * 60,
            cooldown_secs: 60 * 60,
            delays: SequenceDelays::default(),
            queue_depth: 64,
        }
    }
}

impl ControlCfg {
    pub(crate) fn validate(&self) -> Result<(), BuildError> {
        if !(self.band.low.is_finite() && self.band.high.is_finite()) {
            return Err(BuildError::InvalidConfig("band bounds must be finite"));
        }
        if self.band.low > self.band.high {
            return Err(BuildError::InvalidConfig("band.low must be <= band.high"));
        }
        if !(self.band.pulse_step.is_finite() && self.band.pulse_step > 0.0) {
            return Err(BuildError::InvalidConfig("pulse_step must be > 0"));
        }
        if self.window_secs == 0 {
            return Err(BuildError::InvalidConfig("window_secs must be >= 1"));
        }
        if self.queue_depth == 0 {
            return Err(BuildError::InvalidConfig("queue_depth must be >= 1"));
        }
        Ok(())
    }
}

impl From<&phctl_config::BandCfg> for DoseBand {
    fn from(b: &phctl_config::BandCfg) -> Self {
        Self {
            low: b.low,
            high: b.high,
            pulse_step: b.pulse_step,
        }
    }
}

impl From<&phctl_config::SequenceCfg> for SequenceDelays {
    fn from(s: &phctl_config::SequenceCfg) -> Self {
        Self {
            open_settle: Duration::from_secs(s.open_settle_secs),
            inter_pulse: Duration::from_secs(s.pulse_secs),
            flush: Duration::from_secs(s.flush_secs),
        }
    }
}

impl From<&phctl_config::Config> for ControlCfg {
    fn from(cfg: &phctl_config::Config) -> Self {
        Self {
            band: DoseBand::from(&cfg.band),
            window_secs: cfg.window.secs,
            cooldown_secs: cfg.cooldown.secs,
            delays: SequenceDelays::from(&cfg.sequence),
            queue_depth: cfg.queue.depth,
        }
    }
}
