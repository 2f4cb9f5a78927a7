use std::sync::{Arc, Mutex};
use std::time::Duration;

use phctl_core::mocks::{FailingSink, ManualClock, RecordingSink};
use phctl_traits::Clock;
use phctl_core::{
    ActuationSequencer, ChannelId, Direction, SequenceDelays, SharedClock, SharedCommandSink,
};

fn delays(open: u64, pulse: u64, flush: u64) -> SequenceDelays {
    SequenceDelays {
        open_settle: Duration::from_secs(open),
        inter_pulse: Duration::from_secs(pulse),
        flush: Duration::from_secs(flush),
    }
}

#[test]
fn emits_full_sequence_in_order() {
    let sink = RecordingSink::new();
    let shared: SharedCommandSink = Arc::new(Mutex::new(sink.clone()));
    let clock = ManualClock::new(0);
    let seq = ActuationSequencer::new(shared, delays(5, 5, 15), Arc::new(clock));

    let record = seq.run(&ChannelId::from("V1"), Direction::Up, 2);

    assert_eq!(
        sink.commands(),
        vec!["v1valveopen", "phup", "phup", "water", "v1valveclose"]
    );
    assert_eq!(record.direction, Direction::Up);
    assert_eq!(record.pulses, 2);
    assert_eq!(record.channel.as_str(), "V1");
}

#[test]
fn waits_cover_every_step() {
    let shared: SharedCommandSink = Arc::new(Mutex::new(RecordingSink::new()));
    let clock = ManualClock::new(100);
    let shared_clock: SharedClock = Arc::new(clock.clone());
    let seq = ActuationSequencer::new(shared, delays(5, 5, 15), shared_clock);

    let record = seq.run(&ChannelId::from("V2"), Direction::Down, 3);

    // open settle 5 + 3 pulses * 5 (after every pulse, last included) + flush 15
    assert_eq!(clock.now_secs(), 100 + 5 + 15 + 15);
    assert_eq!(record.at_secs, 135);
}

#[test]
fn down_direction_uses_phdown_token() {
    let sink = RecordingSink::new();
    let shared: SharedCommandSink = Arc::new(Mutex::new(sink.clone()));
    let seq = ActuationSequencer::new(shared, delays(0, 0, 0), Arc::new(ManualClock::new(0)));

    seq.run(&ChannelId::from("V4"), Direction::Down, 1);

    assert_eq!(
        sink.commands(),
        vec!["v4valveopen", "phdown", "water", "v4valveclose"]
    );
}

#[test]
fn sink_faults_do_not_abort_the_sequence() {
    let shared: SharedCommandSink = Arc::new(Mutex::new(FailingSink));
    let clock = ManualClock::new(0);
    let seq = ActuationSequencer::new(shared, delays(5, 5, 15), Arc::new(clock.clone()));

    let record = seq.run(&ChannelId::from("V1"), Direction::Up, 2);

    // Every delay still ran and the record reflects what was issued.
    assert_eq!(clock.now_secs(), 5 + 10 + 15);
    assert_eq!(record.pulses, 2);
    assert_eq!(record.direction, Direction::Up);
}

#[test]
fn zero_delays_run_instantly() {
    let sink = RecordingSink::new();
    let shared: SharedCommandSink = Arc::new(Mutex::new(sink.clone()));
    let clock = ManualClock::new(42);
    let seq = ActuationSequencer::new(shared, delays(0, 0, 0), Arc::new(clock.clone()));

    let record = seq.run(&ChannelId::from("V3"), Direction::Up, 1);

    assert_eq!(clock.now_secs(), 42);
    assert_eq!(record.at_secs, 42);
    assert_eq!(sink.commands().len(), 4);
}
