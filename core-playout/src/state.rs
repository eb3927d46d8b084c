//! # Broadcast State
//!
//! Live state owned by the reconciliation loop, plus the cloneable
//! projections exposed to callers.

use core_schedule::ItemId;
use serde::{Deserialize, Serialize};

/// What the engine believes is on air.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OnAir {
    /// Broadcast is not running.
    Off,
    /// A scheduled playlist item is on air.
    Item { index: usize, display_name: String },
    /// The filler pool is cycling.
    Filler,
    /// No scheduled item covers the current time and the filler pool is
    /// empty. The device has been left alone.
    Nothing,
    /// Broadcasting, but device calls are currently failing.
    Unreachable,
}

/// Cloneable snapshot of the live broadcast state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastState {
    /// Whether the reconciliation loop is running.
    pub broadcasting: bool,
    /// Index of the on-air playlist item, if any.
    pub active_index: Option<usize>,
    /// Whether the filler cycle is on air.
    pub filler_active: bool,
    /// True when no item matched the clock and the filler pool was empty.
    pub nothing_playing: bool,
    /// Consecutive ticks whose device calls failed.
    pub failed_ticks: u64,
    /// False while the device is failing calls.
    pub device_ok: bool,
}

/// The on-air playlist item, tracked by id so a reorder that keeps the same
/// media on air only re-labels the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ActiveItem {
    pub(crate) id: ItemId,
    pub(crate) index: usize,
    pub(crate) display_name: String,
}

/// An operator override in force.
///
/// The held item stays on air until the wall clock enters its own interval
/// or passes `expires_at`, whichever comes first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Hold {
    pub(crate) item_id: ItemId,
    pub(crate) expires_at: u32,
}

/// Full live state. The reconciliation loop is the only writer; everyone
/// else sees it through [`BroadcastState`] and [`OnAir`] projections.
#[derive(Debug, Default)]
pub(crate) struct LiveState {
    pub(crate) broadcasting: bool,
    pub(crate) active: Option<ActiveItem>,
    pub(crate) filler_active: bool,
    pub(crate) nothing_playing: bool,
    pub(crate) hold: Option<Hold>,
    pub(crate) failed_ticks: u64,
    pub(crate) device_ok: bool,
}

impl LiveState {
    /// Reset to the idle state, keeping nothing from the previous run.
    pub(crate) fn reset(&mut self) {
        *self = Self {
            device_ok: self.device_ok,
            ..Self::default()
        };
    }

    /// Forget the on-air source without touching device health tracking.
    pub(crate) fn clear_playing(&mut self) {
        self.active = None;
        self.filler_active = false;
        self.nothing_playing = false;
    }

    pub(crate) fn as_broadcast_state(&self) -> BroadcastState {
        BroadcastState {
            broadcasting: self.broadcasting,
            active_index: self.active.as_ref().map(|a| a.index),
            filler_active: self.filler_active,
            nothing_playing: self.nothing_playing,
            failed_ticks: self.failed_ticks,
            device_ok: self.device_ok,
        }
    }

    pub(crate) fn on_air(&self) -> OnAir {
        if !self.broadcasting {
            return OnAir::Off;
        }
        if !self.device_ok {
            return OnAir::Unreachable;
        }
        if let Some(active) = &self.active {
            return OnAir::Item {
                index: active.index,
                display_name: active.display_name.clone(),
            };
        }
        if self.filler_active {
            return OnAir::Filler;
        }
        if self.nothing_playing {
            return OnAir::Nothing;
        }
        OnAir::Off
    }
}
