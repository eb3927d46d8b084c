//! Serializable export of a resolved schedule.
//!
//! Derivable purely from a [`ScheduleModel`] and the [`Timeline`] resolved
//! from it; carries no live broadcast state. Collaborators serialize this
//! however they like (the engine itself persists nothing).

use crate::model::ScheduleModel;
use crate::resolve::Timeline;
use crate::timecode::format_hms;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One exported playlist row with its resolved interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotItem {
    pub index: usize,
    pub display_name: String,
    pub source_path: PathBuf,
    pub duration_secs: f64,
    pub pinned: bool,
    pub pinned_start: Option<u32>,
    pub absolute_start: u32,
    pub absolute_end: u32,
    pub start_hms: String,
    pub end_hms: String,
}

/// Full schedule export: playlist rows with resolved times, the default
/// start, the covered span, and the filler pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSnapshot {
    pub items: Vec<SnapshotItem>,
    pub default_start: u32,
    pub default_start_hms: String,
    pub total_span: u32,
    pub total_span_hms: String,
    pub fillers: Vec<PathBuf>,
}

impl ScheduleSnapshot {
    /// Build an export from a model and the timeline resolved from it.
    /// Rows are matched by playlist index.
    pub fn build(model: &ScheduleModel, timeline: &Timeline) -> Self {
        let items = model
            .items()
            .iter()
            .enumerate()
            .filter_map(|(index, item)| {
                let entry = timeline.entry(index)?;
                Some(SnapshotItem {
                    index,
                    display_name: item.display_name().to_string(),
                    source_path: item.source_path().to_path_buf(),
                    duration_secs: item.duration_secs(),
                    pinned: item.is_pinned(),
                    pinned_start: item.pinned_start(),
                    absolute_start: entry.start,
                    absolute_end: entry.end,
                    start_hms: format_hms(entry.start),
                    end_hms: format_hms(entry.end),
                })
            })
            .collect();

        Self {
            items,
            default_start: model.default_start(),
            default_start_hms: format_hms(model.default_start()),
            total_span: timeline.total_span(),
            total_span_hms: format_hms(timeline.total_span()),
            fillers: model.fillers().to_vec(),
        }
    }
}
