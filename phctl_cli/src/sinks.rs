//! JSONL event output on stdout for commands, telemetry, and the run summary.

use std::io::Write;

use phctl_core::{AdjustmentCounters, ChannelId};
use serde_json::json;

/// Command sink that prints one JSON object per published token.
pub struct JsonlCommandSink<W: Write + Send> {
    out: W,
}

impl JsonlCommandSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self {
            out: std::io::stdout(),
        }
    }
}

impl<W: Write + Send> phctl_traits::CommandSink for JsonlCommandSink<W> {
    fn publish(
        &mut self,
        command: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let line = json!({ "event": "command", "command": command });
        writeln!(self.out, "{line}")?;
        self.out.flush()?;
        Ok(())
    }
}

/// Telemetry sink that prints one JSON object per counter update.
pub struct JsonlTelemetrySink<W: Write + Send> {
    out: W,
}

impl JsonlTelemetrySink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self {
            out: std::io::stdout(),
        }
    }
}

impl<W: Write + Send> phctl_traits::TelemetrySink for JsonlTelemetrySink<W> {
    fn publish(
        &mut self,
        topic: &str,
        value: u64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let line = json!({ "event": "counter", "topic": topic, "value": value });
        writeln!(self.out, "{line}")?;
        self.out.flush()?;
        Ok(())
    }
}

/// Final per-channel counters, printed once after the drive mode finishes.
pub fn emit_summary(counters: &[(ChannelId, AdjustmentCounters)]) {
    let mut channels = serde_json::Map::new();
    for (channel, c) in counters {
        channels.insert(
            channel.to_string(),
            json!({ "phup": c.dose_up, "phdown": c.dose_down }),
        );
    }
    println!("{}", json!({ "event": "summary", "channels": channels }));
}
