//! Mutable schedule state: playlist, filler pool, default start time.

use crate::error::{Result, ScheduleError};
use crate::item::PlaylistItem;
use crate::resolve::Timeline;
use crate::timecode;
use std::path::PathBuf;
use tracing::warn;

/// Editable schedule: an ordered playlist, a filler pool, and the default
/// start time floating items pack from.
///
/// The model is plain data behind whatever synchronization boundary the
/// caller provides; it performs no time resolution on its own. Callers
/// resolve a fresh [`Timeline`] from a snapshot whenever the schedule
/// changes.
///
/// Multi-select operations (`remove`, `move_up`, `move_down`, `copy`) take
/// a set of playlist indices in any order, with duplicates tolerated.
#[derive(Debug, Clone, Default)]
pub struct ScheduleModel {
    items: Vec<PlaylistItem>,
    fillers: Vec<PathBuf>,
    default_start: u32,
}

impl ScheduleModel {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Access
    // ========================================================================

    pub fn items(&self) -> &[PlaylistItem] {
        &self.items
    }

    pub fn item(&self, index: usize) -> Result<&PlaylistItem> {
        self.items
            .get(index)
            .ok_or(ScheduleError::IndexOutOfBounds {
                index,
                len: self.items.len(),
            })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn default_start(&self) -> u32 {
        self.default_start
    }

    pub fn fillers(&self) -> &[PathBuf] {
        &self.fillers
    }

    /// Resolve the current playlist into absolute intervals.
    pub fn resolve(&self) -> Timeline {
        Timeline::resolve(&self.items, self.default_start)
    }

    // ========================================================================
    // Playlist mutation
    // ========================================================================

    pub fn push(&mut self, item: PlaylistItem) {
        self.items.push(item);
    }

    pub fn insert(&mut self, index: usize, item: PlaylistItem) -> Result<()> {
        self.insert_many(index, vec![item])
    }

    /// Insert a batch at `index` (`index == len` appends), preserving the
    /// batch's order.
    pub fn insert_many(&mut self, index: usize, items: Vec<PlaylistItem>) -> Result<()> {
        if index > self.items.len() {
            return Err(ScheduleError::IndexOutOfBounds {
                index,
                len: self.items.len(),
            });
        }
        for (offset, item) in items.into_iter().enumerate() {
            self.items.insert(index + offset, item);
        }
        Ok(())
    }

    /// Remove the selected indices; returns how many items were removed.
    pub fn remove(&mut self, indices: &[usize]) -> Result<usize> {
        let selection = self.validated_selection(indices)?;
        for &index in selection.iter().rev() {
            self.items.remove(index);
        }
        Ok(selection.len())
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Move each selected item up one slot. The whole move is refused when
    /// the selection touches the top of the playlist, so a block selection
    /// keeps its internal order instead of rotating. Returns whether
    /// anything moved.
    pub fn move_up(&mut self, indices: &[usize]) -> Result<bool> {
        let selection = self.validated_selection(indices)?;
        match selection.first() {
            None | Some(0) => return Ok(false),
            Some(_) => {}
        }
        for &index in &selection {
            self.items.swap(index - 1, index);
        }
        Ok(true)
    }

    /// Mirror of [`move_up`](Self::move_up): refused when the selection
    /// touches the bottom of the playlist.
    pub fn move_down(&mut self, indices: &[usize]) -> Result<bool> {
        let selection = self.validated_selection(indices)?;
        match selection.last() {
            None => return Ok(false),
            Some(&last) if last + 1 == self.items.len() => return Ok(false),
            Some(_) => {}
        }
        for &index in selection.iter().rev() {
            self.items.swap(index, index + 1);
        }
        Ok(true)
    }

    /// Clone the selected items, in playlist order, for a later paste.
    pub fn copy(&self, indices: &[usize]) -> Result<Vec<PlaylistItem>> {
        let selection = self.validated_selection(indices)?;
        Ok(selection
            .iter()
            .filter_map(|&index| self.items.get(index).cloned())
            .collect())
    }

    /// Insert duplicates of a copied block at `index` (`index == len`
    /// appends). Every pasted item gets a fresh id; pins and the rest of the
    /// content are carried over.
    pub fn paste_at(&mut self, index: usize, block: &[PlaylistItem]) -> Result<()> {
        let duplicates = block.iter().map(PlaylistItem::duplicate).collect();
        self.insert_many(index, duplicates)
    }

    // ========================================================================
    // Pins
    // ========================================================================

    /// Pin an item to an absolute start. The time must be a valid time of
    /// day; out-of-range values are rejected, never silently applied.
    pub fn pin(&mut self, index: usize, seconds_since_midnight: u32) -> Result<()> {
        if seconds_since_midnight >= timecode::SECONDS_PER_DAY {
            return Err(ScheduleError::InvalidTimeOfDay {
                input: timecode::format_hms(seconds_since_midnight),
                reason: "time of day must be below 24:00:00".to_string(),
            });
        }
        let len = self.items.len();
        let item = self
            .items
            .get_mut(index)
            .ok_or(ScheduleError::IndexOutOfBounds { index, len })?;
        item.set_pinned_start(Some(seconds_since_midnight));
        Ok(())
    }

    /// Pin from an `HH:MM:SS` string.
    pub fn pin_hms(&mut self, index: usize, hms: &str) -> Result<()> {
        let seconds = timecode::parse_hms(hms)?;
        self.pin(index, seconds)
    }

    /// Unpin an item. Idempotent: clearing an unpinned item succeeds and
    /// changes nothing.
    pub fn clear_pin(&mut self, index: usize) -> Result<()> {
        let len = self.items.len();
        let item = self
            .items
            .get_mut(index)
            .ok_or(ScheduleError::IndexOutOfBounds { index, len })?;
        item.set_pinned_start(None);
        Ok(())
    }

    // ========================================================================
    // Default start & fillers
    // ========================================================================

    pub fn set_default_start(&mut self, seconds_since_midnight: u32) {
        self.default_start = seconds_since_midnight % timecode::SECONDS_PER_DAY;
    }

    /// Set the default start from an `HH:MM:SS` string. A malformed string
    /// falls back to midnight rather than failing the operation; returns the
    /// value actually applied.
    pub fn set_default_start_hms(&mut self, hms: &str) -> u32 {
        let seconds = match timecode::parse_hms(hms) {
            Ok(seconds) => seconds,
            Err(err) => {
                warn!(input = hms, %err, "invalid default start, falling back to midnight");
                0
            }
        };
        self.default_start = seconds;
        seconds
    }

    pub fn set_fillers(&mut self, paths: Vec<PathBuf>) {
        self.fillers = paths;
    }

    pub fn clear_fillers(&mut self) {
        self.fillers.clear();
    }

    /// Sorted, deduplicated selection with every index validated.
    fn validated_selection(&self, indices: &[usize]) -> Result<Vec<usize>> {
        let mut selection: Vec<usize> = indices.to_vec();
        selection.sort_unstable();
        selection.dedup();
        if let Some(&out_of_bounds) = selection.iter().find(|&&i| i >= self.items.len()) {
            return Err(ScheduleError::IndexOutOfBounds {
                index: out_of_bounds,
                len: self.items.len(),
            });
        }
        Ok(selection)
    }
}
