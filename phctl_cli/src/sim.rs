//! Synthetic reading generator for offline runs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use phctl_core::Controller;

// tiny PRNG
struct XorShift(u32);

impl XorShift {
    fn new(seed: u32) -> Self {
        Self(seed.max(1))
    }

    fn next_f64(&mut self) -> f64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.0 = x;
        f64::from(x) / (f64::from(u32::MAX) + 1.0)
    }
}

/// Feed every channel a noisy constant reading each interval until the
/// simulated duration elapses or the stop flag is raised.
pub fn run(
    controller: &Controller,
    value: f64,
    interval_secs: u64,
    duration_secs: u64,
    speedup: f64,
    stop: &AtomicBool,
) {
    let interval = interval_secs.max(1);
    let channels: Vec<String> = controller
        .channels()
        .iter()
        .map(ToString::to_string)
        .collect();
    let mut rngs: Vec<XorShift> = (0..channels.len())
        .map(|i| XorShift::new(0x9E37_79B9 ^ (i as u32)))
        .collect();

    tracing::info!(
        channels = channels.len(),
        duration_secs,
        interval_secs = interval,
        "simulation start"
    );
    let mut t = 0u64;
    while t <= duration_secs {
        if stop.load(Ordering::SeqCst) {
            tracing::info!(t, "interrupted; stopping simulation");
            break;
        }
        for (i, channel) in channels.iter().enumerate() {
            let noise = (rngs[i].next_f64() * 2.0 - 1.0) * 0.02;
            controller.ingest(channel, value + noise, t);
        }
        if speedup > 0.0 {
            std::thread::sleep(Duration::from_secs_f64(interval as f64 / speedup));
        }
        t += interval;
    }
    tracing::info!("simulation finished");
}
