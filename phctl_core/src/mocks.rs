//! Test and helper mocks for phctl_core.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use phctl_traits::{Clock, CommandSink, HistoryLog, HistoryRow, TelemetrySink};

/// Deterministic clock whose time can be advanced manually.
///
/// `sleep(d)` advances internal time by `d` without actually sleeping, so
/// sequencer delays run instantly under test while remaining observable.
#[derive(Debug, Clone)]
pub struct ManualClock {
    secs: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start_secs: u64) -> Self {
        Self {
            secs: Arc::new(AtomicU64::new(start_secs)),
        }
    }

    pub fn advance(&self, secs: u64) {
        self.secs.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_secs(&self) -> u64 {
        self.secs.load(Ordering::SeqCst)
    }

    fn sleep(&self, d: Duration) {
        self.secs.fetch_add(d.as_secs(), Ordering::SeqCst);
    }
}

/// Command sink that records every published token, shared across threads.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    log: Arc<Mutex<Vec<String>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all commands published so far, in publish order.
    pub fn commands(&self) -> Vec<String> {
        self.log.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl CommandSink for RecordingSink {
    fn publish(
        &mut self,
        command: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if let Ok(mut log) = self.log.lock() {
            log.push(command.to_string());
        }
        Ok(())
    }
}

/// Command sink that fails every publish; for fire-and-continue tests.
#[derive(Debug, Default)]
pub struct FailingSink;

impl CommandSink for FailingSink {
    fn publish(
        &mut self,
        _command: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Err(Box::new(std::io::Error::other("sink offline")))
    }
}

/// Telemetry sink that records (topic, value) pairs.
#[derive(Debug, Clone, Default)]
pub struct VecTelemetry {
    log: Arc<Mutex<Vec<(String, u64)>>>,
}

impl VecTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published(&self) -> Vec<(String, u64)> {
        self.log.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl TelemetrySink for VecTelemetry {
    fn publish(
        &mut self,
        topic: &str,
        value: u64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if let Ok(mut log) = self.log.lock() {
            log.push((topic.to_string(), value));
        }
        Ok(())
    }
}

/// History log backed by a fixed set of rows.
#[derive(Debug, Clone, Default)]
pub struct StaticHistory {
    pub rows: Vec<HistoryRow>,
}

impl StaticHistory {
    pub fn new(rows: Vec<HistoryRow>) -> Self {
        Self { rows }
    }
}

impl HistoryLog for StaticHistory {
    fn latest_rows(
        &mut self,
    ) -> Result<Vec<HistoryRow>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.rows.clone())
    }
}

/// History log that always errors; recovery must degrade to a cold start.
#[derive(Debug, Default)]
pub struct ErrHistory;

impl HistoryLog for ErrHistory {
    fn latest_rows(
        &mut self,
    ) -> Result<Vec<HistoryRow>, Box<dyn std::error::Error + Send + Sync>> {
        Err(Box::new(std::io::Error::other("log unreadable")))
    }
}
