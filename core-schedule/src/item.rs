//! Playlist item data model.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Unique identifier for a playlist item.
///
/// Survives reorders, so live state can follow an item around the playlist
/// instead of trusting a positional index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(Uuid);

impl ItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single playlist entry: locally resolvable media with a known duration.
///
/// Durations are probed by whoever builds the playlist; the engine treats
/// them as ground truth and never mutates them. The pinned start is plain
/// data here; only the time resolver interprets it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistItem {
    id: ItemId,
    source_path: PathBuf,
    display_name: String,
    duration_secs: f64,
    pinned_start: Option<u32>,
}

impl PlaylistItem {
    pub fn new(
        source_path: impl Into<PathBuf>,
        display_name: impl Into<String>,
        duration_secs: f64,
    ) -> Self {
        Self {
            id: ItemId::new(),
            source_path: source_path.into(),
            display_name: display_name.into(),
            duration_secs: duration_secs.max(0.0),
            pinned_start: None,
        }
    }

    /// Builder-style pin, mostly for tests and fixtures.
    pub fn with_pinned_start(mut self, seconds_since_midnight: u32) -> Self {
        self.pinned_start = Some(seconds_since_midnight);
        self
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    /// Duration in whole seconds as used for interval arithmetic.
    pub fn duration_whole_secs(&self) -> u32 {
        self.duration_secs as u32
    }

    pub fn pinned_start(&self) -> Option<u32> {
        self.pinned_start
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned_start.is_some()
    }

    /// Clone with a fresh id, for paste operations.
    pub fn duplicate(&self) -> Self {
        Self {
            id: ItemId::new(),
            ..self.clone()
        }
    }

    pub(crate) fn set_pinned_start(&mut self, seconds_since_midnight: Option<u32>) {
        self.pinned_start = seconds_since_midnight;
    }
}
