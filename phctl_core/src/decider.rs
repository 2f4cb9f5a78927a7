//! Proportional dose decision from a windowed average.

/// Dosing direction. The wire tokens and counter keys are fixed by the
/// actuator protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Actuator command token for one dose pulse.
    pub fn command_token(self) -> &'static str {
        match self {
            Self::Up => "phup",
            Self::Down => "phdown",
        }
    }

    /// Counter column/topic suffix, as persisted and published.
    pub fn counter_key(self) -> &'static str {
        self.command_token()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

/// Outcome of evaluating one windowed average against the target band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Average inside the band (or not evaluable); nothing to do.
    Hold,
    Act { direction: Direction, pulses: u32 },
}

/// Target band and proportional step.
///
/// This is a proportional controller, not a PID: the pulse count is the
/// band deviation divided by `pulse_step`, rounded up, minimum 1. Plain IEEE
/// `ceil` — a delta that is an exact multiple of the step yields exactly that
/// multiple.
#[derive(Debug, Clone, Copy)]
pub struct DoseBand {
    pub low: f64,
    pub high: f64,
    pub pulse_step: f64,
}

impl DoseBand {
    pub fn evaluate(&self, average: f64) -> Decision {
        if !average.is_finite() {
            return Decision::Hold;
        }
        if average >= self.low && average <= self.high {
            return Decision::Hold;
        }
        let (direction, delta) = if average < self.low {
            (Direction::Up, self.low - average)
        } else {
            (Direction::Down, average - self.high)
        };
        let pulses = ((delta / self.pulse_step).ceil() as u32).max(1);
        Decision::Act { direction, pulses }
    }
}

impl Default for DoseBand {
    fn default() -> Self {
        Self {
            low: 5.5,
            high: 6.0,
            pulse_step: 0.3,
        }
    }
}
