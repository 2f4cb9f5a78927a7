//! Turn recorded history rows back into a reading stream.
//!
//! Lets the CLI drive the engine from a real log file with no broker
//! attached. Non-numeric payloads are discarded here, before they reach the
//! engine, matching the transport's contract.

use phctl_traits::HistoryRow;

const READING_SUFFIX: &str = "/pH";

/// One reading reconstructed from a recorded log row.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayEvent {
    pub at_secs: u64,
    pub channel: String,
    pub value: f64,
}

/// Flatten rows into a time-ordered reading stream.
pub fn readings_from_rows(rows: &[HistoryRow]) -> Vec<ReplayEvent> {
    let mut out = Vec::new();
    for row in rows {
        for (key, value) in &row.fields {
            let Some(channel) = key.strip_suffix(READING_SUFFIX) else {
                continue;
            };
            let Ok(parsed) = value.trim().parse::<f64>() else {
                continue;
            };
            if !parsed.is_finite() {
                continue;
            }
            out.push(ReplayEvent {
                at_secs: row.at_secs,
                channel: channel.to_string(),
                value: parsed,
            });
        }
    }
    out.sort_by_key(|e| e.at_secs);
    out
}
