//! Startup recovery from the persisted history log.
//!
//! Reconstructs the adjustment counters from the most recent row and
//! pre-populates the averaging windows with recent samples, so the loop does
//! not have to warm up after a restart. Loading is forgiving by design: a
//! missing artifact yields a cold start, and an unparsable field is treated
//! as zero/absent rather than failing the whole load.

use phctl_traits::{HistoryLog, HistoryRow};

use crate::channel::ChannelSet;
use crate::decider::Direction;
use crate::ledger::AdjustmentCounters;
use crate::window::Sample;

/// Column suffix carrying the sensor reading, e.g. "V1/pH".
const READING_METRIC: &str = "pH";

/// Everything recovery hands to the controller, indexed like the channel set.
#[derive(Debug, Clone)]
pub struct RecoveredState {
    pub counters: Vec<AdjustmentCounters>,
    pub samples: Vec<Vec<Sample>>,
}

impl RecoveredState {
    /// Zero counters, empty windows: the cold-start state.
    pub fn cold(channels: usize) -> Self {
        Self {
            counters: vec![AdjustmentCounters::default(); channels],
            samples: vec![Vec::new(); channels],
        }
    }

    pub fn channels(&self) -> usize {
        self.counters.len()
    }
}

/// Load counters and recent samples from the most recent log artifact.
/// Never fatal: an unreadable log degrades to a cold start with a warning.
pub fn load(
    log: &mut dyn HistoryLog,
    channels: &ChannelSet,
    window_secs: u64,
    now_secs: u64,
) -> RecoveredState {
    let rows = match log.latest_rows() {
        Ok(rows) => rows,
        Err(e) => {
            tracing::warn!(error = %e, "history log unavailable; starting cold");
            return RecoveredState::cold(channels.len());
        }
    };
    if rows.is_empty() {
        tracing::info!("no history rows; starting cold");
        return RecoveredState::cold(channels.len());
    }
    let state = RecoveredState {
        counters: load_counters(&rows, channels),
        samples: load_recent_samples(&rows, channels, window_secs, now_secs),
    };
    tracing::info!(
        rows = rows.len(),
        recovered_samples = state.samples.iter().map(Vec::len).sum::<usize>(),
        "history recovered"
    );
    state
}

/// Counters from the last row: `"<ch>/phdown"` / `"<ch>/phup"` fields,
/// unparsable or absent fields read as zero.
pub fn load_counters(rows: &[HistoryRow], channels: &ChannelSet) -> Vec<AdjustmentCounters> {
    let mut out = vec![AdjustmentCounters::default(); channels.len()];
    if let Some(last) = rows.last() {
        for (idx, ch) in channels.iter().enumerate() {
            out[idx] = AdjustmentCounters {
                dose_up: parse_count(last, &format!("{ch}/{}", Direction::Up.counter_key())),
                dose_down: parse_count(last, &format!("{ch}/{}", Direction::Down.counter_key())),
            };
        }
    }
    out
}

/// Recent samples per channel: every row within the window span contributes
/// its `"<ch>/pH"` field when that field parses as a finite number.
pub fn load_recent_samples(
    rows: &[HistoryRow],
    channels: &ChannelSet,
    window_secs: u64,
    now_secs: u64,
) -> Vec<Vec<Sample>> {
    let mut out = vec![Vec::new(); channels.len()];
    for row in rows {
        if now_secs.saturating_sub(row.at_secs) > window_secs {
            continue;
        }
        for (idx, ch) in channels.iter().enumerate() {
            let key = format!("{ch}/{READING_METRIC}");
            if let Some(value) = row.fields.get(&key).and_then(|v| v.trim().parse::<f64>().ok())
                && value.is_finite()
            {
                out[idx].push(Sample {
                    at_secs: row.at_secs,
                    value,
                });
            }
        }
    }
    out
}

fn parse_count(row: &HistoryRow, key: &str) -> u64 {
    row.fields
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(0)
}
