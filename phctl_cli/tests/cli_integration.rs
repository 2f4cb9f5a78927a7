use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;

const TEST_CONFIG: &str = r#"
channels = ["V1", "V2"]

[band]
low = 5.5
high = 6.0
pulse_step = 0.3

[window]
secs = 600

[cooldown]
secs = 3600

# Zero delays keep offline runs instant.
[sequence]
open_settle_secs = 0
pulse_secs = 0
flush_secs = 0
"#;

// Eleven rows one minute apart: full window coverage on the last row.
// V1 sits below the band, V2 inside it.
const REPLAY_LOG: &str = "\
id,V1/pH,V2/pH
08-07-10-00,5.0,5.8
08-07-10-01,5.0,5.8
08-07-10-02,5.0,5.8
08-07-10-03,5.0,5.8
08-07-10-04,5.0,5.8
08-07-10-05,5.0,5.8
08-07-10-06,5.0,5.8
08-07-10-07,5.0,5.8
08-07-10-08,5.0,5.8
08-07-10-09,5.0,5.8
08-07-10-10,5.0,5.8
";

fn write_fixtures(dir: &std::path::Path) -> (PathBuf, PathBuf) {
    let config = dir.join("phctl.toml");
    fs::write(&config, TEST_CONFIG).unwrap();
    let replay = dir.join("mqtt_log_20260807.csv");
    fs::write(&replay, REPLAY_LOG).unwrap();
    (config, replay)
}

#[test]
fn replay_triggers_one_sequence_for_the_low_channel() {
    let dir = tempfile::tempdir().unwrap();
    let (config, replay) = write_fixtures(dir.path());

    let mut cmd = Command::cargo_bin("phctl_cli").unwrap();
    cmd.args([
        "--config",
        config.to_str().unwrap(),
        "replay",
        "--file",
        replay.to_str().unwrap(),
    ]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("v1valveopen"))
        .stdout(predicate::str::contains("v1valveclose"))
        .stdout(predicate::str::contains("water"))
        // V2 stayed in band: no valve traffic for it.
        .stdout(predicate::str::contains("v2valveopen").not())
        // ceil(0.5 / 0.3) = 2 pulses land in the counters and the summary.
        .stdout(predicate::str::contains(r#""topic":"V1/phup","value":2"#))
        .stdout(predicate::str::contains(r#""phup":2"#));
}

#[test]
fn simulate_doses_every_channel_below_band() {
    let dir = tempfile::tempdir().unwrap();
    let (config, _) = write_fixtures(dir.path());

    let mut cmd = Command::cargo_bin("phctl_cli").unwrap();
    cmd.args([
        "--config",
        config.to_str().unwrap(),
        "simulate",
        "--duration-secs",
        "700",
        "--value",
        "5.0",
    ]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("v1valveopen"))
        .stdout(predicate::str::contains("v2valveopen"))
        .stdout(predicate::str::contains(r#""event":"summary""#));
}

#[test]
fn check_prints_the_effective_channel_set() {
    let dir = tempfile::tempdir().unwrap();
    let (config, _) = write_fixtures(dir.path());

    let mut cmd = Command::cargo_bin("phctl_cli").unwrap();
    cmd.args(["--config", config.to_str().unwrap(), "check"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(r#""event":"config""#))
        .stdout(predicate::str::contains("V1"));
}

#[test]
fn invalid_config_fails_with_the_offending_key() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("bad.toml");
    fs::write(
        &config,
        "channels = [\"V1\"]\n[band]\nlow = 7.0\nhigh = 6.0\n",
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("phctl_cli").unwrap();
    cmd.args(["--config", config.to_str().unwrap(), "check"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("band.low"));
}

#[test]
fn missing_config_file_fails() {
    let mut cmd = Command::cargo_bin("phctl_cli").unwrap();
    cmd.args(["--config", "/nonexistent/phctl.toml", "check"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("read config file"));
}
