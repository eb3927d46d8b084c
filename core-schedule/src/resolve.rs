//! Wall-clock time resolution.
//!
//! Turns a playlist and a default start time into absolute `[start, end)`
//! intervals in seconds since local midnight. Resolution is pure: no clock,
//! no I/O, the same inputs always produce the same [`Timeline`].
//!
//! Packing rule: items are walked in playlist order with a cursor that
//! starts at the default start. A pinned item is anchored exactly at its
//! pin and raises the cursor to the latest fixed point seen so far; a
//! floating item packs at the cursor. Floating items before the first pin
//! therefore keep their early slots, and floating items after a pin resume
//! after it. Overlapping pins are anchored as requested, never reflowed;
//! [`Timeline::overlapping_pins`] makes them detectable.

use crate::item::{ItemId, PlaylistItem};
use serde::{Deserialize, Serialize};

/// One resolved playlist entry. Derived data, regenerated on every
/// recomputation and never mutated in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub item_id: ItemId,
    /// Position in the playlist this entry was resolved from.
    pub index: usize,
    /// Absolute start, seconds since midnight.
    pub start: u32,
    /// Absolute exclusive end, seconds since midnight.
    pub end: u32,
    /// Whether the start was anchored by a pin rather than packed.
    pub pinned: bool,
}

impl ScheduleEntry {
    /// Whole-second duration of the resolved interval.
    pub fn duration(&self) -> u32 {
        self.end - self.start
    }

    /// Whether `now` falls inside the half-open `[start, end)` interval.
    pub fn contains(&self, now: u32) -> bool {
        self.start <= now && now < self.end
    }
}

/// Resolved schedule: entries in playlist order plus the covered span.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    entries: Vec<ScheduleEntry>,
    total_span: u32,
}

impl Timeline {
    /// Resolve a playlist against a default start time.
    pub fn resolve(items: &[PlaylistItem], default_start: u32) -> Timeline {
        let mut entries = Vec::with_capacity(items.len());
        let mut cursor = default_start;

        for (index, item) in items.iter().enumerate() {
            let start = item.pinned_start().unwrap_or(cursor);
            let end = start.saturating_add(item.duration_whole_secs());
            cursor = cursor.max(end);
            entries.push(ScheduleEntry {
                item_id: item.id(),
                index,
                start,
                end,
                pinned: item.is_pinned(),
            });
        }

        let first = entries.iter().map(|e| e.start).min();
        let last = entries.iter().map(|e| e.end).max();
        let total_span = match (first, last) {
            (Some(first), Some(last)) => last - first,
            _ => 0,
        };

        Timeline {
            entries,
            total_span,
        }
    }

    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    pub fn entry(&self, index: usize) -> Option<&ScheduleEntry> {
        self.entries.get(index)
    }

    pub fn entry_by_id(&self, id: ItemId) -> Option<&ScheduleEntry> {
        self.entries.iter().find(|e| e.item_id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `max(ends) - min(starts)`; 0 for an empty playlist.
    pub fn total_span(&self) -> u32 {
        self.total_span
    }

    /// First entry in playlist order whose interval covers `now`.
    ///
    /// Floating entries cannot overlap, so at most one of them matches; when
    /// overlapping pins put several intervals over `now`, the lowest playlist
    /// index wins.
    pub fn index_for_time(&self, now: u32) -> Option<usize> {
        self.entries.iter().find(|e| e.contains(now)).map(|e| e.index)
    }

    /// Entry with the smallest start strictly after `now` (ties go to the
    /// lower playlist index).
    pub fn next_start_after(&self, now: u32) -> Option<usize> {
        self.entries
            .iter()
            .filter(|e| e.start > now)
            .min_by_key(|e| (e.start, e.index))
            .map(|e| e.index)
    }

    pub fn first_start(&self) -> Option<u32> {
        self.entries.iter().map(|e| e.start).min()
    }

    pub fn last_end(&self) -> Option<u32> {
        self.entries.iter().map(|e| e.end).max()
    }

    /// Index pairs whose intervals intersect, where at least one side is
    /// pinned. Empty for any playlist without pins.
    pub fn overlapping_pins(&self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for (i, a) in self.entries.iter().enumerate() {
            for b in &self.entries[i + 1..] {
                if !(a.pinned || b.pinned) {
                    continue;
                }
                if a.start < b.end && b.start < a.end {
                    pairs.push((a.index, b.index));
                }
            }
        }
        pairs
    }
}
