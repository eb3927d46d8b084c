//! Playback device bridge trait and supporting status types.
//!
//! The playout core never speaks a concrete control protocol itself. It
//! drives whatever is actually rendering media (an OBS instance, a media
//! server, an in-memory fake in tests) through [`PlaybackDevice`], a small
//! set of async primitives with no scheduling logic of their own.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Device-reported playback state for a media input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaPlayState {
    Playing,
    Paused,
    Stopped,
    /// The input reached the end of its media and is no longer advancing.
    Ended,
    /// The device could not report a state (input missing, protocol quirk).
    Unknown,
}

/// Snapshot of a media input's playback position, as reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaStatus {
    /// Playback position in milliseconds from the start of the media.
    pub cursor_ms: u64,
    /// Total media duration in milliseconds; 0 when the device does not know.
    pub duration_ms: u64,
    /// Device-reported playback state.
    pub state: MediaPlayState,
}

impl MediaStatus {
    pub fn new(cursor_ms: u64, duration_ms: u64, state: MediaPlayState) -> Self {
        Self {
            cursor_ms,
            duration_ms,
            state,
        }
    }

    /// Whether the media has played through to its end.
    ///
    /// Devices are inconsistent about the terminal state they report, so a
    /// cursor that caught up with a known duration counts as ended too.
    pub fn has_ended(&self) -> bool {
        match self.state {
            MediaPlayState::Ended => true,
            MediaPlayState::Stopped => true,
            _ => self.duration_ms > 0 && self.cursor_ms >= self.duration_ms,
        }
    }

    /// Milliseconds of media left to play, when the duration is known.
    pub fn remaining_ms(&self) -> Option<u64> {
        if self.duration_ms == 0 {
            None
        } else {
            Some(self.duration_ms.saturating_sub(self.cursor_ms))
        }
    }
}

/// Remote playback device contract.
///
/// Implementations translate these primitives into whatever wire protocol the
/// actual device speaks. The scene and input parameters are device-side
/// resource names; the core treats them as opaque and takes them from its
/// configuration.
///
/// Implementations expose primitives only: which media should be on air, and
/// when, is decided entirely by the caller.
#[async_trait::async_trait]
pub trait PlaybackDevice: Send + Sync {
    /// Point the player input at a new media file.
    ///
    /// Must not switch program output by itself; the caller sequences media
    /// selection, program switch, and restart explicitly.
    async fn set_active_media(&self, path: &Path) -> Result<()>;

    /// Make the named scene the device's program output.
    async fn switch_to_program(&self, scene: &str) -> Result<()>;

    /// Restart playback of the named input from the top.
    async fn restart_playback(&self, input: &str) -> Result<()>;

    /// Report the named input's playback position and state.
    async fn playback_status(&self, input: &str) -> Result<MediaStatus>;

    /// Install the filler pool on the device's filler input.
    ///
    /// Contract: a single path loops that one item at the device level;
    /// several paths become an ordered, looping, non-shuffled cycle. An empty
    /// slice is never passed; the caller handles that case without touching
    /// the device.
    async fn install_filler_cycle(&self, paths: &[PathBuf]) -> Result<()>;

    /// Cheap readiness probe.
    ///
    /// Returns `false` both when the device answers negatively and when the
    /// probe itself fails; callers use this as a go/no-go check, not as a
    /// diagnostic.
    async fn is_ready(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DeviceError;
    use mockall::mock;
    use mockall::predicate::eq;

    mock! {
        pub Device {}

        #[async_trait::async_trait]
        impl PlaybackDevice for Device {
            async fn set_active_media(&self, path: &Path) -> Result<()>;
            async fn switch_to_program(&self, scene: &str) -> Result<()>;
            async fn restart_playback(&self, input: &str) -> Result<()>;
            async fn playback_status(&self, input: &str) -> Result<MediaStatus>;
            async fn install_filler_cycle(&self, paths: &[PathBuf]) -> Result<()>;
            async fn is_ready(&self) -> bool;
        }
    }

    #[test]
    fn test_has_ended_terminal_states() {
        let ended = MediaStatus::new(5_000, 60_000, MediaPlayState::Ended);
        assert!(ended.has_ended());

        let stopped = MediaStatus::new(0, 60_000, MediaPlayState::Stopped);
        assert!(stopped.has_ended());

        let playing = MediaStatus::new(5_000, 60_000, MediaPlayState::Playing);
        assert!(!playing.has_ended());
    }

    #[test]
    fn test_has_ended_cursor_caught_duration() {
        let status = MediaStatus::new(60_000, 60_000, MediaPlayState::Playing);
        assert!(status.has_ended());

        // Unknown duration never triggers the cursor heuristic.
        let status = MediaStatus::new(60_000, 0, MediaPlayState::Playing);
        assert!(!status.has_ended());
    }

    #[test]
    fn test_remaining_ms() {
        let status = MediaStatus::new(10_000, 60_000, MediaPlayState::Playing);
        assert_eq!(status.remaining_ms(), Some(50_000));

        let status = MediaStatus::new(70_000, 60_000, MediaPlayState::Playing);
        assert_eq!(status.remaining_ms(), Some(0));

        let status = MediaStatus::new(10_000, 0, MediaPlayState::Unknown);
        assert_eq!(status.remaining_ms(), None);
    }

    #[tokio::test]
    async fn test_trait_is_mockable() {
        let mut device = MockDevice::new();
        device
            .expect_switch_to_program()
            .with(eq("Program"))
            .times(1)
            .returning(|_| Ok(()));
        device
            .expect_playback_status()
            .with(eq("Player"))
            .returning(|_| Ok(MediaStatus::new(1_000, 2_000, MediaPlayState::Playing)));
        device.expect_is_ready().returning(|| true);

        assert!(device.is_ready().await);
        device.switch_to_program("Program").await.unwrap();
        let status = device.playback_status("Player").await.unwrap();
        assert_eq!(status.remaining_ms(), Some(1_000));
    }

    #[tokio::test]
    async fn test_mock_error_paths() {
        let mut device = MockDevice::new();
        device
            .expect_restart_playback()
            .returning(|_| Err(DeviceError::Rejected("no such input".into())));

        let err = device.restart_playback("Ghost").await.unwrap_err();
        assert!(!err.is_transient());
    }
}
