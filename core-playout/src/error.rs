use bridge_traits::error::DeviceError;
use core_schedule::error::ScheduleError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlayoutError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Broadcast already running")]
    AlreadyBroadcasting,

    #[error("Broadcast is not running")]
    NotBroadcasting,

    #[error("Playback device is not ready")]
    DeviceUnavailable,

    #[error("Nothing to play: playlist and filler pool are both empty")]
    NothingToPlay,

    #[error("No playlist item at index {index} (playlist has {len} items)")]
    NoSuchItem { index: usize, len: usize },

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error(transparent)]
    Device(#[from] DeviceError),
}

pub type Result<T> = std::result::Result<T, PlayoutError>;
