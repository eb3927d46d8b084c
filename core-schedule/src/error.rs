use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("invalid time of day {input:?}: {reason}")]
    InvalidTimeOfDay { input: String, reason: String },

    #[error("index {index} out of bounds for playlist of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
