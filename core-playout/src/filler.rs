//! # Filler Cycler
//!
//! Gap filling layered on the playback adapter. When no scheduled item
//! covers the current time, the device is pointed at a looping cycle of
//! filler media instead of going to black.

use crate::config::PlayoutConfig;
use crate::error::{PlayoutError, Result};
use bridge_traits::device::PlaybackDevice;
use bridge_traits::error::DeviceError;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Outcome of a filler activation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillerOutcome {
    /// The device is now cycling the filler pool.
    Cycling,
    /// The pool is empty; no device command was issued.
    Nothing,
}

/// Drives the device's looping filler playlist.
///
/// The cycler only (re)starts the cycle; intra-cycle transitions are the
/// device's business. A single-item pool loops that one item at the device
/// level, a larger pool becomes an ordered, non-shuffled cycle.
pub struct FillerCycler {
    device: Arc<dyn PlaybackDevice>,
    scene: String,
    input: String,
    call_timeout: Duration,
}

impl FillerCycler {
    pub fn new(device: Arc<dyn PlaybackDevice>, config: &PlayoutConfig) -> Self {
        Self {
            device,
            scene: config.filler_scene.clone(),
            input: config.filler_input.clone(),
            call_timeout: config.device_call_timeout,
        }
    }

    /// Install the pool on the device and restart the cycle from the top.
    ///
    /// An empty pool issues no device command at all and reports
    /// [`FillerOutcome::Nothing`]; the caller surfaces that state.
    pub async fn activate(&self, pool: &[PathBuf]) -> Result<FillerOutcome> {
        if pool.is_empty() {
            debug!("filler pool is empty, leaving the device alone");
            return Ok(FillerOutcome::Nothing);
        }

        self.timed(self.device.install_filler_cycle(pool)).await?;
        self.timed(self.device.switch_to_program(&self.scene)).await?;
        self.timed(self.device.restart_playback(&self.input)).await?;

        info!(pool_size = pool.len(), "filler cycle activated");
        Ok(FillerOutcome::Cycling)
    }

    async fn timed<T, F>(&self, call: F) -> Result<T>
    where
        F: Future<Output = bridge_traits::error::Result<T>>,
    {
        match tokio::time::timeout(self.call_timeout, call).await {
            Ok(result) => result.map_err(PlayoutError::from),
            Err(_) => Err(DeviceError::Timeout(self.call_timeout).into()),
        }
    }
}
