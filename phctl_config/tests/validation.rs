use phctl_config::load_toml;
use rstest::rstest;

fn base_toml() -> String {
    r#"
channels = ["V1", "V2", "V3", "V4"]

[band]
low = 5.5
high = 6.0
pulse_step = 0.3

[window]
secs = 600

[cooldown]
secs = 3600

[sequence]
open_settle_secs = 5
pulse_secs = 5
flush_secs = 15
"#
    .to_string()
}

#[test]
fn parses_and_validates_full_config() {
    let cfg = load_toml(&base_toml()).expect("parse");
    cfg.validate().expect("valid");
    assert_eq!(cfg.channels, vec!["V1", "V2", "V3", "V4"]);
    assert_eq!(cfg.window.secs, 600);
    assert_eq!(cfg.cooldown.secs, 3600);
    assert!((cfg.band.pulse_step - 0.3).abs() < 1e-12);
}

#[test]
fn minimal_config_gets_defaults() {
    let cfg = load_toml(r#"channels = ["V1"]"#).expect("parse");
    cfg.validate().expect("valid");
    assert_eq!(cfg.window.secs, 600);
    assert_eq!(cfg.cooldown.secs, 3600);
    assert_eq!(cfg.sequence.open_settle_secs, 5);
    assert_eq!(cfg.sequence.pulse_secs, 5);
    assert_eq!(cfg.sequence.flush_secs, 15);
    assert_eq!(cfg.queue.depth, 64);
    assert!((cfg.band.low - 5.5).abs() < 1e-12);
    assert!((cfg.band.high - 6.0).abs() < 1e-12);
    assert_eq!(cfg.history.pattern, "mqtt_log_*.csv");
    assert!(cfg.history.dir.is_none());
}

#[rstest]
#[case::no_channels(r#"channels = []"#, "at least one")]
#[case::empty_channel(r#"channels = ["V1", " "]"#, "must not be empty")]
#[case::dup_channel(r#"channels = ["V1", "V1"]"#, "duplicate")]
#[case::band_inverted(
    "channels = [\"V1\"]\n[band]\nlow = 7.0\nhigh = 6.0",
    "band.low must be <= band.high"
)]
#[case::zero_step(
    "channels = [\"V1\"]\n[band]\npulse_step = 0.0",
    "pulse_step must be > 0"
)]
#[case::zero_window("channels = [\"V1\"]\n[window]\nsecs = 0", "window.secs")]
#[case::huge_window(
    "channels = [\"V1\"]\n[window]\nsecs = 90000",
    "unreasonably large"
)]
#[case::huge_flush(
    "channels = [\"V1\"]\n[sequence]\nflush_secs = 601",
    "unreasonably large"
)]
#[case::zero_queue("channels = [\"V1\"]\n[queue]\ndepth = 0", "queue.depth")]
#[case::bad_pattern(
    "channels = [\"V1\"]\n[history]\npattern = \"log.csv\"",
    "wildcard"
)]
fn rejects_invalid_config(#[case] toml_text: &str, #[case] needle: &str) {
    let cfg = load_toml(toml_text).expect("parse");
    let err = cfg.validate().expect_err("should be rejected");
    let msg = format!("{err}");
    assert!(msg.contains(needle), "unexpected message: {msg}");
}

#[test]
fn negative_pulse_step_rejected() {
    let cfg = load_toml("channels = [\"V1\"]\n[band]\npulse_step = -0.1").expect("parse");
    assert!(cfg.validate().is_err());
}

#[test]
fn nan_band_rejected() {
    let cfg = load_toml("channels = [\"V1\"]\n[band]\nlow = nan").expect("parse");
    assert!(cfg.validate().is_err());
}
