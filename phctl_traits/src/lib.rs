pub mod clock;

pub use clock::{Clock, WallClock};

use std::collections::HashMap;

/// Outbound actuator commands, published as plain tokens on a single shared
/// command channel. Delivery guarantees belong to the transport behind this
/// trait, not to the caller.
pub trait CommandSink {
    fn publish(&mut self, command: &str)
    -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Counter/telemetry announcements, one value per topic.
pub trait TelemetrySink {
    fn publish(
        &mut self,
        topic: &str,
        value: u64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// One row of a persisted record set: a coarse timestamp plus string fields
/// keyed by `"<channel>/<metric>"` column names.
#[derive(Debug, Clone)]
pub struct HistoryRow {
    pub at_secs: u64,
    pub fields: HashMap<String, String>,
}

/// Read-only access to the most recent persisted record set.
///
/// Implementations return the rows of the newest artifact, oldest first.
/// No artifact at all is represented as an empty vector, not an error.
pub trait HistoryLog {
    fn latest_rows(&mut self)
    -> Result<Vec<HistoryRow>, Box<dyn std::error::Error + Send + Sync>>;
}
