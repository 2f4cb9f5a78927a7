//! Timed actuation sequence against the shared command sink.

use std::time::Duration;

use phctl_traits::Clock;

use crate::SharedClock;
use crate::SharedCommandSink;
use crate::channel::ChannelId;
use crate::decider::Direction;

/// Fixed inter-step delays of one sequence.
#[derive(Debug, Clone, Copy)]
pub struct SequenceDelays {
    /// After the valve-open command, before the first dose pulse.
    pub open_settle: Duration,
    /// After every dose pulse, including the last.
    pub inter_pulse: Duration,
    /// After the flush command, before the valve-close command.
    pub flush: Duration,
}

impl Default for SequenceDelays {
    fn default() -> Self {
        Self {
            open_settle: Duration::from_secs(5),
            inter_pulse: Duration::from_secs(5),
            flush: Duration::from_secs(15),
        }
    }
}

/// Produced once per completed sequence; drives the ledger update and the
/// published telemetry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRecord {
    pub channel: ChannelId,
    pub direction: Direction,
    pub pulses: u32,
    pub at_secs: u64,
}

/// Executes the ordered command sequence for one actuation decision:
/// open valve, N dose pulses, flush, close valve, with blocking waits
/// between steps.
///
/// The sequence is fire-and-continue: a transient sink fault on any step is
/// logged and the remaining steps (and their delays) still run. Skipping
/// steps on a physical valve/pump line is unsafe; retry semantics belong to
/// the transport. The returned record reflects what was issued regardless of
/// delivery confirmation.
pub struct ActuationSequencer {
    sink: SharedCommandSink,
    delays: SequenceDelays,
    clock: SharedClock,
}

impl ActuationSequencer {
    pub fn new(sink: SharedCommandSink, delays: SequenceDelays, clock: SharedClock) -> Self {
        Self {
            sink,
            delays,
            clock,
        }
    }

    /// Run the full sequence, blocking the calling worker for its duration.
    pub fn run(&self, channel: &ChannelId, direction: Direction, pulses: u32) -> ActionRecord {
        let vessel = channel.as_str().to_lowercase();
        tracing::info!(
            channel = %channel,
            direction = direction.as_str(),
            pulses,
            "actuation sequence start"
        );

        self.publish(&format!("{vessel}valveopen"));
        self.clock.sleep(self.delays.open_settle);
        for _ in 0..pulses {
            self.publish(direction.command_token());
            self.clock.sleep(self.delays.inter_pulse);
        }
        self.publish("water");
        self.clock.sleep(self.delays.flush);
        self.publish(&format!("{vessel}valveclose"));

        tracing::debug!(channel = %channel, pulses, "actuation sequence complete");
        ActionRecord {
            channel: channel.clone(),
            direction,
            pulses,
            at_secs: self.clock.now_secs(),
        }
    }

    fn publish(&self, command: &str) {
        match self.sink.lock() {
            Ok(mut sink) => {
                if let Err(e) = sink.publish(command) {
                    tracing::warn!(error = %e, command, "command publish failed; continuing sequence");
                }
            }
            Err(_) => {
                tracing::warn!(command, "command sink lock poisoned; step skipped");
            }
        }
    }
}
