//! # Playout Configuration
//!
//! Configuration types for the broadcast controller.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Broadcast controller configuration.
///
/// Controls the reconciliation cadence, device call timeouts, and the scene
/// and input names the playback device exposes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayoutConfig {
    /// Interval between reconciliation ticks.
    ///
    /// Each tick compares the wall clock against the resolved timeline and
    /// corrects the device when they disagree.
    ///
    /// Default: 500 ms.
    #[serde(default = "default_tick_interval")]
    pub tick_interval: Duration,

    /// Maximum duration to wait for a single device call before treating it
    /// as failed.
    ///
    /// Default: 4 seconds.
    #[serde(default = "default_device_call_timeout")]
    pub device_call_timeout: Duration,

    /// How long `stop` waits for the broadcast loop to finish its current
    /// tick before aborting it.
    ///
    /// Default: 3 seconds.
    #[serde(default = "default_stop_grace")]
    pub stop_grace: Duration,

    /// Program scene that frames scheduled playback.
    ///
    /// Default: `Scheduler_Player`.
    #[serde(default = "default_player_scene")]
    pub player_scene: String,

    /// Media input inside the player scene.
    ///
    /// Default: `Scheduler_Player_Input`.
    #[serde(default = "default_player_input")]
    pub player_input: String,

    /// Program scene that frames filler playback.
    ///
    /// Default: `Fillers_Scene`.
    #[serde(default = "default_filler_scene")]
    pub filler_scene: String,

    /// Playlist input inside the filler scene.
    ///
    /// Default: `Fillers_Playlist`.
    #[serde(default = "default_filler_input")]
    pub filler_input: String,

    /// Poll the device for end-of-media and advance to the next entry when a
    /// source runs short of its declared duration.
    ///
    /// Default: true.
    #[serde(default = "default_detect_early_end")]
    pub detect_early_end: bool,
}

impl Default for PlayoutConfig {
    fn default() -> Self {
        Self {
            tick_interval: default_tick_interval(),
            device_call_timeout: default_device_call_timeout(),
            stop_grace: default_stop_grace(),
            player_scene: default_player_scene(),
            player_input: default_player_input(),
            filler_scene: default_filler_scene(),
            filler_input: default_filler_input(),
            detect_early_end: default_detect_early_end(),
        }
    }
}

impl PlayoutConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.tick_interval.is_zero() {
            return Err("tick_interval must be > 0".to_string());
        }

        if self.device_call_timeout.is_zero() {
            return Err("device_call_timeout must be > 0".to_string());
        }

        if self.player_scene.is_empty() || self.player_input.is_empty() {
            return Err("player scene and input names must not be empty".to_string());
        }

        if self.filler_scene.is_empty() || self.filler_input.is_empty() {
            return Err("filler scene and input names must not be empty".to_string());
        }

        Ok(())
    }
}

// ============================================================================
// Default Functions (for serde)
// ============================================================================

fn default_tick_interval() -> Duration {
    Duration::from_millis(500)
}

fn default_device_call_timeout() -> Duration {
    Duration::from_secs(4)
}

fn default_stop_grace() -> Duration {
    Duration::from_secs(3)
}

fn default_player_scene() -> String {
    "Scheduler_Player".to_string()
}

fn default_player_input() -> String {
    "Scheduler_Player_Input".to_string()
}

fn default_filler_scene() -> String {
    "Fillers_Scene".to_string()
}

fn default_filler_input() -> String {
    "Fillers_Playlist".to_string()
}

fn default_detect_early_end() -> bool {
    true
}
