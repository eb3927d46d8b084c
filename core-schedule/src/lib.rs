//! # Core Schedule
//!
//! Schedule data model and wall-clock time resolution for the playout
//! engine.
//!
//! ## Overview
//!
//! - [`ScheduleModel`](model::ScheduleModel) - the editable playlist, filler
//!   pool, and default start time, with the full set of editing operations
//!   (insert/remove, multi-select moves, copy/paste, pin/unpin)
//! - [`Timeline`](resolve::Timeline) - pure resolution of the playlist into
//!   absolute `[start, end)` intervals in seconds since local midnight, plus
//!   the interval queries the live controller runs every tick
//! - [`ScheduleSnapshot`](snapshot::ScheduleSnapshot) - serializable export
//!   of the resolved schedule for collaborators
//! - [`timecode`] - `HH:MM:SS` parsing and formatting
//!
//! Everything in this crate is synchronous and side-effect free; ownership
//! of locks, clocks, and devices lives in `core-playout`.

pub mod error;
pub mod item;
pub mod model;
pub mod resolve;
pub mod snapshot;
pub mod timecode;

pub use error::ScheduleError;

// Re-export commonly used types
pub use item::{ItemId, PlaylistItem};
pub use model::ScheduleModel;
pub use resolve::{ScheduleEntry, Timeline};
pub use snapshot::{ScheduleSnapshot, SnapshotItem};
