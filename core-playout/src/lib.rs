//! # Live Playout Module
//!
//! Drives unattended, wall-clock-synchronized playout of a scheduled
//! playlist on a remote playback device.
//!
//! ## Overview
//!
//! This module handles:
//! - The reconciliation loop that keeps the device aligned with the clock
//! - Operator overrides (skip to next, jump to entry) while live
//! - Filler fallback for gaps in the schedule
//! - Live schedule edits under broadcast, without interrupting the on-air
//!   item
//! - Device failure tracking; adapter errors are never fatal to the loop

pub mod config;
pub mod controller;
pub mod error;
pub mod filler;
pub mod state;

pub use config::PlayoutConfig;
pub use controller::{ControlCommand, PlayoutController};
pub use error::{PlayoutError, Result};
pub use filler::{FillerCycler, FillerOutcome};
pub use state::{BroadcastState, OnAir};
