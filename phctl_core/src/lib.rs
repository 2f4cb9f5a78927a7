#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core dosing control loop (transport-agnostic).
//!
//! This crate provides the regulator engine for a set of independent process
//! vessels. All peripheral interactions go through the `phctl_traits`
//! collaborator traits (`CommandSink`, `TelemetrySink`, `HistoryLog`, `Clock`).
//!
//! ## Architecture
//!
//! - **Windowing**: per-channel trailing-window average (`window` module)
//! - **Gating**: post-actuation cooldown per channel (`cooldown` module)
//! - **Decision**: proportional pulse count from band deviation (`decider`)
//! - **Actuation**: timed open/dose/flush/close sequence (`sequencer`)
//! - **Accounting**: lifetime dose counters (`ledger`), recovered at startup
//!   from the persisted history log (`recovery`)
//! - **Orchestration**: one worker thread and bounded reading queue per
//!   channel (`controller`)
//!
//! Decisions are driven by reading receive-times, so the engine is
//! deterministic under test; the `Clock` paces actuation waits.

// Module declarations
pub mod channel;
pub mod config;
pub mod controller;
pub mod cooldown;
pub mod decider;
pub mod error;
pub mod ledger;
pub mod mocks;
pub mod recovery;
pub mod sequencer;
pub mod window;

use std::sync::{Arc, Mutex};

pub use channel::{ChannelId, ChannelSet};
pub use config::ControlCfg;
pub use controller::{Controller, Reading};
pub use cooldown::CooldownGate;
pub use decider::{Decision, Direction, DoseBand};
pub use error::BuildError;
pub use ledger::{AdjustmentCounters, AdjustmentLedger};
pub use recovery::RecoveredState;
pub use sequencer::{ActionRecord, ActuationSequencer, SequenceDelays};
pub use window::{Sample, SampleWindow};

/// The command channel is shared by all vessels; per-command locking lets
/// concurrent sequences interleave without tearing a single token.
pub type SharedCommandSink = Arc<Mutex<dyn phctl_traits::CommandSink + Send>>;
/// Counter/telemetry sink shared by all channel workers.
pub type SharedTelemetrySink = Arc<Mutex<dyn phctl_traits::TelemetrySink + Send>>;
/// Unified clock for deterministic time in tests.
pub type SharedClock = Arc<dyn phctl_traits::Clock + Send + Sync>;
