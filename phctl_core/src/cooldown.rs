//! Post-actuation quiet period per channel.

/// Vetoes actions that fall inside the configured quiet period after the
/// previous action on the same channel. A channel with no recorded action
/// allows immediately.
#[derive(Debug)]
pub struct CooldownGate {
    quiet_secs: u64,
    last_action_secs: Option<u64>,
}

impl CooldownGate {
    pub fn new(quiet_secs: u64) -> Self {
        Self {
            quiet_secs,
            last_action_secs: None,
        }
    }

    pub fn allow(&self, now_secs: u64) -> bool {
        match self.last_action_secs {
            None => true,
            Some(last) => now_secs.saturating_sub(last) >= self.quiet_secs,
        }
    }

    pub fn record(&mut self, now_secs: u64) {
        self.last_action_secs = Some(now_secs);
    }

    pub fn last_action_secs(&self) -> Option<u64> {
        self.last_action_secs
    }
}
