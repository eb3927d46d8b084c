//! Workspace umbrella crate.
//!
//! Host applications can depend on `playout-workspace` alone and reach every
//! layer of the engine through the re-exported member crates instead of
//! wiring each crate individually.

pub use bridge_traits;
pub use core_playout;
pub use core_runtime;
pub use core_schedule;
