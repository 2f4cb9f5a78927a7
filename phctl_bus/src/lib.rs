#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Peripheral collaborator implementations for the dosing controller.
//!
//! The core consumes abstract `phctl_traits` interfaces; this crate provides
//! the concrete ones that touch the filesystem: the CSV history log used for
//! startup recovery, and a replay reader that turns a recorded log back into
//! a reading stream for offline runs.

pub mod error;
pub mod history;
pub mod replay;

pub use error::BusError;
pub use history::CsvHistoryLog;
pub use replay::{ReplayEvent, readings_from_rows};
