//! # Event Bus System
//!
//! Event-driven status surface for the playout engine using
//! `tokio::sync::broadcast`. The live controller and the editing operations
//! publish here; presentation layers, log sinks, and tests subscribe without
//! coupling to the controller itself.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐    emit      ┌───────────┐
//! │ Live Controller  ├─────────────>│           │   subscribe   ┌────────────┐
//! └──────────────────┘              │ EventBus  ├──────────────>│ Status UI  │
//! ┌──────────────────┐    emit      │ (broadcast│               └────────────┘
//! │ Editing ops      ├─────────────>│  channel) │   subscribe   ┌────────────┐
//! └──────────────────┘              │           ├──────────────>│ Log sink   │
//!                                   └───────────┘               └────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{EventBus, PlayoutEvent, BroadcastEvent};
//!
//! let event_bus = EventBus::new(100);
//! let event = PlayoutEvent::Broadcast(BroadcastEvent::ItemChanged {
//!     index: 2,
//!     display_name: "evening-news".to_string(),
//! });
//! event_bus.emit(event).ok();
//! ```
//!
//! ## Error Handling
//!
//! `tokio::sync::broadcast` produces two receive errors:
//!
//! - **`RecvError::Lagged(n)`**: the subscriber missed `n` events. Non-fatal;
//!   later events still arrive.
//! - **`RecvError::Closed`**: every sender is gone; treat as shutdown.
//!
//! Emission with no subscribers is not an error worth handling at call
//! sites; publishers use `.ok()`.
//!
//! ## Thread Safety
//!
//! The bus is `Send + Sync` and cheap to clone; every clone publishes into
//! the same channel.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

// Re-export commonly used types
pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
///
/// Subscribers that fall further behind than this receive
/// `RecvError::Lagged` instead of blocking publishers.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum encompassing all event categories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum PlayoutEvent {
    /// Live broadcast lifecycle and on-air changes
    Broadcast(BroadcastEvent),
    /// Schedule mutations and recomputations
    Schedule(ScheduleEvent),
}

impl PlayoutEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            PlayoutEvent::Broadcast(e) => e.description(),
            PlayoutEvent::Schedule(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            PlayoutEvent::Broadcast(BroadcastEvent::DeviceUnreachable { .. }) => {
                EventSeverity::Warning
            }
            PlayoutEvent::Broadcast(BroadcastEvent::NothingPlaying) => EventSeverity::Warning,
            PlayoutEvent::Schedule(ScheduleEvent::PinOverlap { .. }) => EventSeverity::Warning,
            PlayoutEvent::Broadcast(BroadcastEvent::Started { .. })
            | PlayoutEvent::Broadcast(BroadcastEvent::Stopped)
            | PlayoutEvent::Broadcast(BroadcastEvent::ItemChanged { .. })
            | PlayoutEvent::Broadcast(BroadcastEvent::FillerActivated { .. })
            | PlayoutEvent::Broadcast(BroadcastEvent::DeviceRecovered) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    /// Debug-level events (verbose)
    Debug,
    /// Informational events
    Info,
    /// Warning events
    Warning,
    /// Error events
    Error,
}

// ============================================================================
// Broadcast Events
// ============================================================================

/// Events emitted by the live controller while (or about) broadcasting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum BroadcastEvent {
    /// Broadcasting started.
    Started {
        /// Playlist size at start.
        item_count: usize,
        /// Resolved timeline span in seconds.
        total_span_secs: u32,
    },
    /// Broadcasting stopped by an explicit operator request.
    Stopped,
    /// A different playlist item went on air.
    ItemChanged {
        /// Playlist index of the item now on air.
        index: usize,
        /// Display name of the item now on air.
        display_name: String,
    },
    /// The filler cycle took over because no playlist item covers "now".
    FillerActivated {
        /// Number of items in the filler pool.
        pool_size: usize,
    },
    /// No playlist item covers "now" and the filler pool is empty.
    NothingPlaying,
    /// A device call failed; the controller keeps reconciling.
    DeviceUnreachable {
        /// Human-readable failure description.
        message: String,
    },
    /// Device calls are succeeding again after a failure.
    DeviceRecovered,
}

impl BroadcastEvent {
    fn description(&self) -> &str {
        match self {
            BroadcastEvent::Started { .. } => "Broadcast started",
            BroadcastEvent::Stopped => "Broadcast stopped",
            BroadcastEvent::ItemChanged { .. } => "On-air item changed",
            BroadcastEvent::FillerActivated { .. } => "Filler cycle activated",
            BroadcastEvent::NothingPlaying => "Nothing is playing",
            BroadcastEvent::DeviceUnreachable { .. } => "Playback device unreachable",
            BroadcastEvent::DeviceRecovered => "Playback device recovered",
        }
    }
}

// ============================================================================
// Schedule Events
// ============================================================================

/// Events emitted when the schedule changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum ScheduleEvent {
    /// The playlist content changed (insert, remove, move, paste, clear).
    PlaylistChanged {
        /// Playlist size after the change.
        item_count: usize,
    },
    /// A fresh timeline was resolved and swapped in.
    TimelineRecomputed {
        /// Number of resolved entries.
        item_count: usize,
        /// `max(ends) - min(starts)` of the new timeline, in seconds.
        total_span_secs: u32,
    },
    /// Two resolved intervals overlap and at least one of them is pinned.
    ///
    /// Overlaps are accepted, never reordered away; this event is how they
    /// get surfaced to an operator.
    PinOverlap {
        /// Lower playlist index of the overlapping pair.
        first_index: usize,
        /// Higher playlist index of the overlapping pair.
        second_index: usize,
    },
}

impl ScheduleEvent {
    fn description(&self) -> &str {
        match self {
            ScheduleEvent::PlaylistChanged { .. } => "Playlist changed",
            ScheduleEvent::TimelineRecomputed { .. } => "Timeline recomputed",
            ScheduleEvent::PinOverlap { .. } => "Overlapping pinned items",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to playout events.
///
/// Uses `tokio::sync::broadcast` internally, which provides:
/// - Multiple producers (clone the `EventBus`)
/// - Multiple consumers (each `subscribe()` creates a new receiver)
/// - Non-blocking sends (events are cloned for each subscriber)
/// - Lagging detection (slow subscribers get `RecvError::Lagged`)
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<PlayoutEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Creates a new event bus with the default buffer size.
    #[allow(clippy::should_implement_trait)]
    pub fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an
    /// error when there are none. Publishers normally ignore the result.
    pub fn emit(&self, event: PlayoutEvent) -> Result<usize, SendError<PlayoutEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber to receive events.
    ///
    /// Each call creates an independent receiver that sees all future
    /// events; past events are not replayed.
    pub fn subscribe(&self) -> Receiver<PlayoutEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

/// Type alias for event filter functions.
type EventFilter = Box<dyn Fn(&PlayoutEvent) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with optional filtering.
///
/// # Example
///
/// ```rust
/// use core_runtime::events::{EventBus, EventStream, PlayoutEvent};
///
/// let event_bus = EventBus::new(100);
/// let mut broadcast_only = EventStream::new(event_bus.subscribe())
///     .filter(|event| matches!(event, PlayoutEvent::Broadcast(_)));
/// ```
pub struct EventStream {
    receiver: Receiver<PlayoutEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    /// Creates a new event stream from a receiver.
    pub fn new(receiver: Receiver<PlayoutEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Adds a filter function to this stream; only matching events are
    /// returned by `recv()`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&PlayoutEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    /// Receives the next event that passes the filter (if any).
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Lagged(n)` if the subscriber fell behind by `n`
    /// events, `RecvError::Closed` if all senders have been dropped.
    pub async fn recv(&mut self) -> Result<PlayoutEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;

            let Some(filter) = &self.filter else {
                return Ok(event);
            };

            if filter(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive an event without blocking.
    ///
    /// Returns `None` if no matching events are currently available.
    pub fn try_recv(&mut self) -> Option<Result<PlayoutEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    let Some(filter) = &self.filter else {
                        return Some(Ok(event));
                    };

                    if filter(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
