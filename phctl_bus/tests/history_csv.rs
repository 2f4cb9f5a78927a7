use std::fs;
use std::fs::File;
use std::time::{Duration, SystemTime};

use phctl_bus::CsvHistoryLog;
use phctl_traits::HistoryLog;

const LOG_BODY: &str = "\
id,V1/pH,V2/pH,V1/phup,V1/phdown,V2/phup,V2/phdown
08-07-10-00,5.81,6.02,0,0,1,4
08-07-10-01,5.79,6.01,0,0,1,4
08-07-10-02,bad,6.00,0,,1,4
";

#[test]
fn reads_rows_with_timestamps_from_latest_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("mqtt_log_20260807.csv"), LOG_BODY).unwrap();

    let mut log = CsvHistoryLog::new(dir.path(), "mqtt_log_*.csv").unwrap();
    let rows = log.latest_rows().unwrap();

    assert_eq!(rows.len(), 3);
    // Consecutive ids one minute apart.
    assert_eq!(rows[1].at_secs - rows[0].at_secs, 60);
    assert_eq!(rows[0].fields.get("V1/pH").map(String::as_str), Some("5.81"));
    assert_eq!(rows[2].fields.get("V1/phdown").map(String::as_str), Some(""));
    // The `id` column is consumed into at_secs, not kept as a field.
    assert!(!rows[0].fields.contains_key("id"));
}

#[test]
fn picks_the_most_recently_modified_file() {
    let dir = tempfile::tempdir().unwrap();
    let old = dir.path().join("mqtt_log_20260806.csv");
    let new = dir.path().join("mqtt_log_20260807.csv");
    fs::write(&old, "id,V1/pH\n08-06-09-00,5.5\n").unwrap();
    fs::write(&new, "id,V1/pH\n08-07-09-00,6.5\n").unwrap();
    // Force the date-older file to look newer on disk: selection goes by
    // mtime, not by the name stamp.
    let future = SystemTime::now() + Duration::from_secs(60);
    File::options()
        .append(true)
        .open(&old)
        .unwrap()
        .set_modified(future)
        .unwrap();

    let mut log = CsvHistoryLog::new(dir.path(), "mqtt_log_*.csv").unwrap();
    let rows = log.latest_rows().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].fields.get("V1/pH").map(String::as_str), Some("5.5"));
}

#[test]
fn missing_directory_yields_no_rows() {
    let mut log = CsvHistoryLog::new("/nonexistent/phctl-history", "mqtt_log_*.csv").unwrap();
    assert!(log.latest_rows().unwrap().is_empty());
}

#[test]
fn no_matching_file_yields_no_rows() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("unrelated.txt"), "hello").unwrap();
    let mut log = CsvHistoryLog::new(dir.path(), "mqtt_log_*.csv").unwrap();
    assert!(log.latest_rows().unwrap().is_empty());
}

#[test]
fn undated_file_name_reads_rows_at_time_zero() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("mqtt_log_latest.csv"),
        "id,V1/pH\n08-07-09-00,5.5\n",
    )
    .unwrap();
    let mut log = CsvHistoryLog::new(dir.path(), "mqtt_log_*.csv").unwrap();
    let rows = log.latest_rows().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].at_secs, 0);
}

#[test]
fn short_rows_are_tolerated() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("mqtt_log_20260807.csv"),
        "id,V1/pH,V2/pH\n08-07-09-00,5.5\n08-07-09-01,5.6,6.0\n",
    )
    .unwrap();
    let mut log = CsvHistoryLog::new(dir.path(), "mqtt_log_*.csv").unwrap();
    let rows = log.latest_rows().unwrap();
    assert_eq!(rows.len(), 2);
    // The short row simply has fewer fields.
    assert!(!rows[0].fields.contains_key("V2/pH"));
    assert!(rows[1].fields.contains_key("V2/pH"));
}
