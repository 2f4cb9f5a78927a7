//! CSV history log reader.
//!
//! The logger collaborator writes one CSV per day, named with a `YYYYMMDD`
//! stamp (e.g. `mqtt_log_20260807.csv`). Each row carries a coarse `id`
//! timestamp of the form `MM-DD-HH-MM` (year implied by the file name) plus
//! per-channel/per-metric columns. Recovery only ever needs the
//! most-recently-modified file.
//!
//! Parsing is forgiving: a malformed row or an undated file name degrades to
//! partial data, never to a startup failure.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{Datelike, NaiveDate};
use phctl_traits::{HistoryLog, HistoryRow};

use crate::error::{BusError, Result};

/// `HistoryLog` backed by a directory of CSV files matching a single-`*`
/// pattern.
#[derive(Debug, Clone)]
pub struct CsvHistoryLog {
    dir: PathBuf,
    prefix: String,
    suffix: String,
}

impl CsvHistoryLog {
    pub fn new(dir: impl Into<PathBuf>, pattern: &str) -> Result<Self> {
        let mut parts = pattern.splitn(2, '*');
        let prefix = parts.next().unwrap_or_default().to_string();
        let suffix = match parts.next() {
            Some(s) if !s.contains('*') => s.to_string(),
            _ => return Err(BusError::Pattern(pattern.to_string())),
        };
        Ok(Self {
            dir: dir.into(),
            prefix,
            suffix,
        })
    }

    /// Most-recently-modified file matching the pattern, if any.
    fn latest_file(&self) -> Option<PathBuf> {
        let entries = fs::read_dir(&self.dir).ok()?;
        let mut best: Option<(SystemTime, PathBuf)> = None;
        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if name.len() < self.prefix.len() + self.suffix.len()
                || !name.starts_with(&self.prefix)
                || !name.ends_with(&self.suffix)
            {
                continue;
            }
            let Ok(meta) = entry.metadata() else { continue };
            let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            if best.as_ref().is_none_or(|(t, _)| modified > *t) {
                best = Some((modified, entry.path()));
            }
        }
        best.map(|(_, path)| path)
    }
}

/// Read one history CSV into rows, oldest first.
pub fn read_file(path: &Path) -> Result<Vec<HistoryRow>> {
    let base = path
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(base_date_from_name);
    if base.is_none() {
        tracing::warn!(path = %path.display(), "history file name carries no date stamp");
    }

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    let headers = rdr.headers()?.clone();

    let mut rows = Vec::new();
    for record in rdr.records() {
        let Ok(record) = record else {
            // Torn or malformed row: skip it, keep the rest.
            continue;
        };
        let mut at_secs = 0;
        let mut fields = HashMap::new();
        for (key, value) in headers.iter().zip(record.iter()) {
            if key == "id" {
                at_secs = row_at_secs(base, value);
            } else {
                fields.insert(key.to_string(), value.to_string());
            }
        }
        rows.push(HistoryRow { at_secs, fields });
    }
    tracing::debug!(path = %path.display(), rows = rows.len(), "history file read");
    Ok(rows)
}

// Last run of >= 8 consecutive digits in the file name, read as YYYYMMDD.
fn base_date_from_name(name: &str) -> Option<NaiveDate> {
    let bytes = name.as_bytes();
    let mut best: Option<&str> = None;
    let mut run_start = None;
    for i in 0..=bytes.len() {
        let is_digit = i < bytes.len() && bytes[i].is_ascii_digit();
        match (run_start, is_digit) {
            (None, true) => run_start = Some(i),
            (Some(start), false) => {
                if i - start >= 8 {
                    best = Some(&name[start..start + 8]);
                }
                run_start = None;
            }
            _ => {}
        }
    }
    NaiveDate::parse_from_str(best?, "%Y%m%d").ok()
}

// Row id `MM-DD-HH-MM` with the year taken from the file name; anything that
// does not parse reads as 0, which recovery then treats as out-of-window.
fn row_at_secs(base: Option<NaiveDate>, id: &str) -> u64 {
    let Some(base) = base else { return 0 };
    let mut nums = [0u32; 4];
    let mut count = 0;
    for part in id.split('-') {
        if count == 4 {
            return 0;
        }
        match part.parse::<u32>() {
            Ok(n) => {
                nums[count] = n;
                count += 1;
            }
            Err(_) => return 0,
        }
    }
    if count != 4 {
        return 0;
    }
    let [month, day, hour, minute] = nums;
    let Some(date) = NaiveDate::from_ymd_opt(base.year(), month, day) else {
        return 0;
    };
    let Some(dt) = date.and_hms_opt(hour, minute, 0) else {
        return 0;
    };
    u64::try_from(dt.and_utc().timestamp()).unwrap_or(0)
}

impl HistoryLog for CsvHistoryLog {
    fn latest_rows(
        &mut self,
    ) -> std::result::Result<Vec<HistoryRow>, Box<dyn std::error::Error + Send + Sync>> {
        let Some(path) = self.latest_file() else {
            tracing::info!(dir = %self.dir.display(), "no history artifact found");
            return Ok(Vec::new());
        };
        Ok(read_file(&path)?)
    }
}
