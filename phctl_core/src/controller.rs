//! Per-channel control-loop workers and the inbound reading dispatch.
//!
//! Channels represent physically separate vessels: each one gets its own
//! worker thread and bounded queue, so a blocking actuation sequence on one
//! channel never stalls another channel's ingestion or decisions. Within a
//! channel everything is serialized, which guarantees at most one sequence
//! in flight per channel; readings arriving mid-sequence queue up and drain
//! into the window afterwards.

use crossbeam_channel as xch;

use crate::SharedClock;
use crate::SharedCommandSink;
use crate::SharedTelemetrySink;
use crate::channel::{ChannelId, ChannelSet};
use crate::config::ControlCfg;
use crate::cooldown::CooldownGate;
use crate::decider::{Decision, Direction, DoseBand};
use crate::error::{BuildError, Result};
use crate::ledger::{AdjustmentCounters, AdjustmentLedger};
use crate::recovery::RecoveredState;
use crate::sequencer::ActuationSequencer;
use crate::window::{Sample, SampleWindow};
use std::sync::Arc;

/// One parsed inbound reading; the channel is resolved at ingest.
#[derive(Debug, Clone, Copy)]
pub struct Reading {
    pub value: f64,
    /// Receive time, seconds since the Unix epoch. Drives window and
    /// cooldown decisions for this channel.
    pub at_secs: u64,
}

struct ChannelWorker {
    channel: ChannelId,
    idx: usize,
    window: SampleWindow,
    gate: CooldownGate,
    band: DoseBand,
    sequencer: ActuationSequencer,
    ledger: Arc<AdjustmentLedger>,
    telemetry: SharedTelemetrySink,
}

impl ChannelWorker {
    fn run(mut self, rx: xch::Receiver<Reading>) {
        while let Ok(reading) = rx.recv() {
            self.on_reading(reading);
        }
        tracing::debug!(channel = %self.channel, "channel worker exiting");
    }

    fn on_reading(&mut self, reading: Reading) {
        let now = reading.at_secs;
        self.window.append(Sample {
            at_secs: now,
            value: reading.value,
        });

        if !self.window.is_ready(now) {
            tracing::trace!(channel = %self.channel, "window coverage incomplete");
            return;
        }
        if !self.gate.allow(now) {
            tracing::trace!(channel = %self.channel, "cooldown active; action suppressed");
            return;
        }
        let Some(average) = self.window.average(now) else {
            return;
        };
        match self.band.evaluate(average) {
            Decision::Hold => {
                tracing::trace!(channel = %self.channel, average, "average in band");
            }
            Decision::Act { direction, pulses } => {
                self.gate.record(now);
                tracing::info!(
                    channel = %self.channel,
                    average,
                    direction = direction.as_str(),
                    pulses,
                    "dose decision"
                );
                let record = self.sequencer.run(&self.channel, direction, pulses);
                let counters = self.ledger.record(self.idx, record.direction, record.pulses);
                publish_counter(&self.telemetry, &self.channel, direction, counters);
            }
        }
    }
}

fn publish_counter(
    telemetry: &SharedTelemetrySink,
    channel: &ChannelId,
    direction: Direction,
    counters: AdjustmentCounters,
) {
    let topic = format!("{channel}/{}", direction.counter_key());
    let value = counters.for_direction(direction);
    match telemetry.lock() {
        Ok(mut sink) => {
            if let Err(e) = sink.publish(&topic, value) {
                tracing::warn!(error = %e, topic, "counter publish failed");
            }
        }
        Err(_) => {
            tracing::warn!(topic, "telemetry sink lock poisoned; publish skipped");
        }
    }
}

/// Owns the per-channel workers and routes inbound readings to them.
///
/// Dropping the controller closes all queues and joins the workers; a
/// mid-flight sequence runs to completion first (there is no cancellation).
#[derive(Debug)]
pub struct Controller {
    set: ChannelSet,
    senders: Vec<xch::Sender<Reading>>,
    ledger: Arc<AdjustmentLedger>,
    handles: Vec<std::thread::JoinHandle<()>>,
}

impl Controller {
    /// Validate the configuration, seed the ledger and windows from
    /// `recovered`, announce the recovered counters, and spawn one worker
    /// per channel.
    pub fn spawn(
        cfg: ControlCfg,
        set: ChannelSet,
        recovered: RecoveredState,
        sink: SharedCommandSink,
        telemetry: SharedTelemetrySink,
        clock: SharedClock,
    ) -> Result<Self> {
        cfg.validate().map_err(eyre::Report::new)?;
        if recovered.channels() != set.len() || recovered.samples.len() != set.len() {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "recovered state does not match channel set",
            )));
        }

        let ledger = Arc::new(AdjustmentLedger::new(set.len()));
        for (idx, counters) in recovered.counters.iter().enumerate() {
            ledger.seed(idx, *counters);
        }

        // Announce recovered counters before the loop starts.
        for (idx, channel) in set.iter().enumerate() {
            let counters = ledger.snapshot(idx);
            publish_counter(&telemetry, channel, Direction::Up, counters);
            publish_counter(&telemetry, channel, Direction::Down, counters);
        }

        let mut senders = Vec::with_capacity(set.len());
        let mut handles = Vec::with_capacity(set.len());
        for (idx, (channel, history)) in set.iter().zip(recovered.samples).enumerate() {
            let (tx, rx) = xch::bounded(cfg.queue_depth);
            let mut window = SampleWindow::new(cfg.window_secs);
            for sample in history {
                window.append(sample);
            }
            let worker = ChannelWorker {
                channel: channel.clone(),
                idx,
                window,
                gate: CooldownGate::new(cfg.cooldown_secs),
                band: cfg.band,
                sequencer: ActuationSequencer::new(
                    Arc::clone(&sink),
                    cfg.delays,
                    Arc::clone(&clock),
                ),
                ledger: Arc::clone(&ledger),
                telemetry: Arc::clone(&telemetry),
            };
            senders.push(tx);
            handles.push(std::thread::spawn(move || worker.run(rx)));
        }

        tracing::info!(channels = set.len(), "controller started");
        Ok(Self {
            set,
            senders,
            ledger,
            handles,
        })
    }

    /// Route one parsed reading to its channel's queue. Returns false when
    /// the reading was dropped: unknown channel, full queue (the window
    /// re-coalesces from later readings), or a gone worker.
    pub fn ingest(&self, channel: &str, value: f64, at_secs: u64) -> bool {
        let Some(idx) = self.set.position(channel) else {
            tracing::trace!(channel, "reading for unknown channel dropped");
            return false;
        };
        match self.senders[idx].try_send(Reading { value, at_secs }) {
            Ok(()) => true,
            Err(xch::TrySendError::Full(_)) => {
                tracing::trace!(channel, "reading queue full; dropped");
                false
            }
            Err(xch::TrySendError::Disconnected(_)) => {
                tracing::warn!(channel, "channel worker gone; reading dropped");
                false
            }
        }
    }

    /// Current counters for one channel, if it is in the set.
    pub fn counters(&self, channel: &str) -> Option<AdjustmentCounters> {
        self.set.position(channel).map(|idx| self.ledger.snapshot(idx))
    }

    pub fn channels(&self) -> &ChannelSet {
        &self.set
    }

    /// Close the queues, join the workers (draining anything still queued),
    /// and return each channel's final counters.
    pub fn shutdown(mut self) -> Vec<(ChannelId, AdjustmentCounters)> {
        self.senders.clear();
        for handle in self.handles.drain(..) {
            match handle.join() {
                Ok(()) => {
                    tracing::trace!("channel worker joined");
                }
                Err(e) => {
                    tracing::warn!(?e, "channel worker panicked during shutdown");
                }
            }
        }
        self.set
            .iter()
            .enumerate()
            .map(|(idx, channel)| (channel.clone(), self.ledger.snapshot(idx)))
            .collect()
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        // Closing the queues lets each worker drain what it has and exit.
        self.senders.clear();
        for handle in self.handles.drain(..) {
            match handle.join() {
                Ok(()) => {
                    tracing::trace!("channel worker joined");
                }
                Err(e) => {
                    tracing::warn!(?e, "channel worker panicked during shutdown");
                }
            }
        }
    }
}
