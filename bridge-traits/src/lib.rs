//! # Device Bridge Traits
//!
//! Abstraction boundary between the playout core and the thing that actually
//! renders media. The core decides *what* should be on air and *when*; the
//! device decides how to make that happen on the wire.
//!
//! ## Traits
//!
//! - [`PlaybackDevice`](device::PlaybackDevice) - Async control primitives for
//!   a remote playback device: media selection, program switching, restart,
//!   status, filler cycle installation, readiness probing
//! - [`Clock`](clock::Clock) - Local time-of-day source for deterministic
//!   testing
//!
//! ## Error Handling
//!
//! All device operations return [`DeviceError`](error::DeviceError).
//! Implementations should:
//!
//! - Convert protocol-specific failures to the matching variant
//! - Provide actionable error messages (resource names, peer addresses)
//! - Leave retry policy to the caller; the core treats device failures as
//!   transient and keeps its reconciliation loop alive
//!
//! ## Thread Safety
//!
//! All traits require `Send + Sync` so implementations can be shared across
//! async tasks behind an `Arc`.

pub mod clock;
pub mod device;
pub mod error;

pub use error::DeviceError;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use device::{MediaPlayState, MediaStatus, PlaybackDevice};
