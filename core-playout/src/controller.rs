//! # Playout Controller
//!
//! Orchestrates unattended wall-clock playout against a remote playback
//! device.
//!
//! ## Overview
//!
//! The `PlayoutController` is the central orchestrator of the engine. It
//! owns the schedule model, resolves it into an immutable [`Timeline`]
//! snapshot, and runs a reconciliation loop that:
//! - Asks the injected [`Clock`] for the current time of day
//! - Looks up which resolved entry should be on air right now
//! - Commands the device only when target and on-air item disagree
//! - Falls back to the filler cycle when no entry covers the current time
//! - Polls the device for early end-of-media and advances proactively
//! - Counts device failures and keeps ticking; adapter errors are never
//!   fatal to the loop
//!
//! The wall clock is the single source of truth: the loop never waits for
//! media to finish and recovers from restarts, drift, and edits by
//! recomputing "what should be on air" from scratch on every tick.
//!
//! ## Concurrency
//!
//! The reconciliation task is the only writer of live playback state.
//! Operator overrides (skip, jump) are routed into it over an mpsc channel
//! instead of touching the device from the caller's task. Schedule edits
//! swap in a fully-resolved `Arc<Timeline>` snapshot, so a tick sees either
//! the old timeline or the new one, never a half-applied edit.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use core_playout::{PlayoutConfig, PlayoutController};
//! use std::sync::Arc;
//!
//! # async fn example(controller: Arc<PlayoutController>) -> Result<(), Box<dyn std::error::Error>> {
//! controller.start().await?;
//!
//! // Operator overrides while live:
//! controller.skip_next().await?;
//! controller.jump_to(3).await?;
//!
//! controller.stop().await?;
//! # Ok(())
//! # }
//! ```

use crate::config::PlayoutConfig;
use crate::error::{PlayoutError, Result};
use crate::filler::{FillerCycler, FillerOutcome};
use crate::state::{ActiveItem, BroadcastState, Hold, LiveState, OnAir};
use bridge_traits::clock::Clock;
use bridge_traits::device::{MediaStatus, PlaybackDevice};
use bridge_traits::error::DeviceError;
use core_runtime::events::{BroadcastEvent, EventBus, PlayoutEvent, ScheduleEvent};
use core_schedule::{PlaylistItem, ScheduleModel, ScheduleSnapshot, Timeline};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Pending operator overrides the loop has not handled yet.
const COMMAND_QUEUE_SIZE: usize = 8;

/// Operator override routed into the reconciliation loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    /// Leave the current item for the next scheduled start; filler when none
    /// remains today.
    SkipNext,
    /// Put a specific playlist entry on air now.
    JumpTo(usize),
}

/// Handle to a running reconciliation task.
struct RunHandle {
    cancel: CancellationToken,
    commands: mpsc::Sender<ControlCommand>,
    task: JoinHandle<()>,
}

/// What a single reconciliation tick decided to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TickPlan {
    /// The on-air source already matches the clock.
    Steady,
    /// Command the device to the entry at `index`.
    Switch { index: usize },
    /// Same item stays on air, but a reorder moved it to a new playlist
    /// position. No device command.
    Relabel { index: usize },
    /// No entry covers the current time; hand over to the filler cycler.
    EnterFiller,
}

/// Live playout controller.
///
/// Cheap to share: every field is behind an `Arc`, and the controller clones
/// itself into the background task the way it hands work off.
pub struct PlayoutController {
    config: PlayoutConfig,
    device: Arc<dyn PlaybackDevice>,
    clock: Arc<dyn Clock>,
    event_bus: Arc<EventBus>,
    filler: FillerCycler,
    model: Arc<RwLock<ScheduleModel>>,
    timeline: Arc<RwLock<Arc<Timeline>>>,
    live: Arc<RwLock<LiveState>>,
    run: Arc<Mutex<Option<RunHandle>>>,
}

impl PlayoutController {
    /// Create a new controller.
    ///
    /// # Arguments
    ///
    /// * `config` - Playout configuration (validated here)
    /// * `device` - Playback device adapter
    /// * `clock` - Time-of-day source; inject a manual clock in tests
    /// * `event_bus` - Event bus for broadcast and schedule events
    pub fn new(
        config: PlayoutConfig,
        device: Arc<dyn PlaybackDevice>,
        clock: Arc<dyn Clock>,
        event_bus: Arc<EventBus>,
    ) -> Result<Self> {
        config.validate().map_err(PlayoutError::Config)?;

        let filler = FillerCycler::new(Arc::clone(&device), &config);

        Ok(Self {
            config,
            device,
            clock,
            event_bus,
            filler,
            model: Arc::new(RwLock::new(ScheduleModel::new())),
            timeline: Arc::new(RwLock::new(Arc::new(Timeline::default()))),
            live: Arc::new(RwLock::new(LiveState::default())),
            run: Arc::new(Mutex::new(None)),
        })
    }

    /// Clone for the background task (avoids `Arc<Self>` at the API surface).
    fn clone_for_task(&self) -> Self {
        Self {
            config: self.config.clone(),
            device: Arc::clone(&self.device),
            clock: Arc::clone(&self.clock),
            event_bus: Arc::clone(&self.event_bus),
            filler: FillerCycler::new(Arc::clone(&self.device), &self.config),
            model: Arc::clone(&self.model),
            timeline: Arc::clone(&self.timeline),
            live: Arc::clone(&self.live),
            run: Arc::clone(&self.run),
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Start broadcasting.
    ///
    /// Resolves a fresh timeline, spawns the reconciliation task and emits
    /// `BroadcastStarted`. The task's interval fires immediately, so the
    /// first clock alignment happens right away rather than one tick later.
    ///
    /// An empty playlist with a non-empty filler pool starts fine and sits
    /// on filler until items are added.
    ///
    /// # Errors
    ///
    /// - `AlreadyBroadcasting` when the loop is already running
    /// - `DeviceUnavailable` when the readiness probe says no
    /// - `NothingToPlay` when playlist and filler pool are both empty
    #[instrument(skip(self))]
    pub async fn start(&self) -> Result<()> {
        let mut run = self.run.lock().await;
        if run.is_some() {
            return Err(PlayoutError::AlreadyBroadcasting);
        }
        self.start_locked(&mut run, None).await
    }

    /// Stop broadcasting.
    ///
    /// Cancels the loop and waits for it bounded by `stop_grace` (the task
    /// is aborted past the bound, stopping never hangs). The device is then
    /// parked on the filler cycle, exactly like a scheduled gap. Stopping
    /// while idle is a no-op.
    #[instrument(skip(self))]
    pub async fn stop(&self) -> Result<()> {
        let handle = self.run.lock().await.take();
        let Some(handle) = handle else {
            return Ok(());
        };

        handle.cancel.cancel();
        let mut task = handle.task;
        if tokio::time::timeout(self.config.stop_grace, &mut task)
            .await
            .is_err()
        {
            warn!("reconciliation loop ignored cancellation, aborting it");
            task.abort();
        }

        self.live.write().await.reset();

        // Park the device on filler so the output does not go to black.
        self.enter_filler().await;

        self.event_bus
            .emit(PlayoutEvent::Broadcast(BroadcastEvent::Stopped))
            .ok();
        info!("broadcast stopped");
        Ok(())
    }

    /// Whether the reconciliation loop is currently running.
    pub async fn is_broadcasting(&self) -> bool {
        self.run.lock().await.is_some()
    }

    async fn start_locked(
        &self,
        run: &mut Option<RunHandle>,
        initial: Option<ControlCommand>,
    ) -> Result<()> {
        if !self.device.is_ready().await {
            return Err(PlayoutError::DeviceUnavailable);
        }

        let timeline = {
            let model = self.model.read().await;
            if model.is_empty() && model.fillers().is_empty() {
                return Err(PlayoutError::NothingToPlay);
            }
            self.swap_timeline(&model).await
        };

        {
            let mut live = self.live.write().await;
            live.reset();
            live.broadcasting = true;
            live.device_ok = true;
        }

        let cancel = CancellationToken::new();
        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_QUEUE_SIZE);
        let worker = self.clone_for_task();
        let loop_cancel = cancel.clone();
        let task = tokio::spawn(async move {
            worker.run_loop(loop_cancel, commands_rx, initial).await;
        });

        *run = Some(RunHandle {
            cancel,
            commands: commands_tx,
            task,
        });

        self.event_bus
            .emit(PlayoutEvent::Broadcast(BroadcastEvent::Started {
                item_count: timeline.len(),
                total_span_secs: timeline.total_span(),
            }))
            .ok();
        info!(
            item_count = timeline.len(),
            total_span_secs = timeline.total_span(),
            "broadcast started"
        );
        Ok(())
    }

    // ========================================================================
    // Operator overrides
    // ========================================================================

    /// Leave the current item and move to the next scheduled start.
    ///
    /// "Next" is time-based: the entry with the earliest absolute start
    /// strictly after now. When nothing remains today, the filler cycle
    /// takes over instead. While idle this is a no-op.
    #[instrument(skip(self))]
    pub async fn skip_next(&self) -> Result<()> {
        let run = self.run.lock().await;
        match run.as_ref() {
            Some(handle) => handle
                .commands
                .send(ControlCommand::SkipNext)
                .await
                .map_err(|_| PlayoutError::NotBroadcasting),
            None => Ok(()),
        }
    }

    /// Put the playlist entry at `index` on air now.
    ///
    /// Validates the index against the live timeline. While idle, starts
    /// broadcasting first and goes straight to the requested entry instead
    /// of whatever the clock would pick.
    #[instrument(skip(self))]
    pub async fn jump_to(&self, index: usize) -> Result<()> {
        {
            let timeline = self.current_timeline().await;
            if timeline.entry(index).is_none() {
                return Err(PlayoutError::NoSuchItem {
                    index,
                    len: timeline.len(),
                });
            }
        }

        let mut run = self.run.lock().await;
        match run.as_ref() {
            Some(handle) => handle
                .commands
                .send(ControlCommand::JumpTo(index))
                .await
                .map_err(|_| PlayoutError::NotBroadcasting),
            None => self.start_locked(&mut run, Some(ControlCommand::JumpTo(index))).await,
        }
    }

    // ========================================================================
    // Schedule edits
    // ========================================================================

    /// Apply an infallible mutation to the schedule model.
    ///
    /// Resolves and swaps a fresh timeline snapshot and emits the schedule
    /// events. The on-air item is never interrupted because the timeline
    /// changed; only the next tick's target/active comparison commands the
    /// device.
    pub async fn edit<T>(&self, mutate: impl FnOnce(&mut ScheduleModel) -> T) -> T {
        let (value, timeline) = {
            let mut model = self.model.write().await;
            let value = mutate(&mut model);
            let timeline = self.swap_timeline(&model).await;
            (value, timeline)
        };
        self.after_edit(&timeline).await;
        value
    }

    /// Apply a fallible mutation to the schedule model.
    ///
    /// On error nothing is resolved or emitted; the model is unchanged
    /// because all fallible model operations validate before mutating.
    pub async fn try_edit<T>(
        &self,
        mutate: impl FnOnce(&mut ScheduleModel) -> core_schedule::error::Result<T>,
    ) -> Result<T> {
        let (value, timeline) = {
            let mut model = self.model.write().await;
            let value = mutate(&mut model)?;
            let timeline = self.swap_timeline(&model).await;
            (value, timeline)
        };
        self.after_edit(&timeline).await;
        Ok(value)
    }

    /// Append an item to the playlist.
    pub async fn add_item(&self, item: PlaylistItem) {
        self.edit(|model| model.push(item)).await;
    }

    /// Insert an item at `index`.
    pub async fn insert_item(&self, index: usize, item: PlaylistItem) -> Result<()> {
        self.try_edit(|model| model.insert(index, item)).await
    }

    /// Remove the items at `indices`; returns how many were removed.
    pub async fn remove_items(&self, indices: &[usize]) -> Result<usize> {
        self.try_edit(|model| model.remove(indices)).await
    }

    /// Remove every playlist item.
    pub async fn clear_playlist(&self) {
        self.edit(|model| model.clear()).await;
    }

    /// Move the selection one slot up; `false` when it sits at the top.
    pub async fn move_up(&self, indices: &[usize]) -> Result<bool> {
        self.try_edit(|model| model.move_up(indices)).await
    }

    /// Move the selection one slot down; `false` when it sits at the bottom.
    pub async fn move_down(&self, indices: &[usize]) -> Result<bool> {
        self.try_edit(|model| model.move_down(indices)).await
    }

    /// Copy the items at `indices` for a later paste.
    pub async fn copy_items(&self, indices: &[usize]) -> Result<Vec<PlaylistItem>> {
        let model = self.model.read().await;
        Ok(model.copy(indices)?)
    }

    /// Paste previously copied items at `index`, with fresh identities.
    pub async fn paste_at(&self, index: usize, block: &[PlaylistItem]) -> Result<()> {
        self.try_edit(|model| model.paste_at(index, block)).await
    }

    /// Pin the item at `index` to an absolute start time.
    pub async fn pin_item(&self, index: usize, seconds_since_midnight: u32) -> Result<()> {
        self.try_edit(|model| model.pin(index, seconds_since_midnight))
            .await
    }

    /// Pin the item at `index` to a `HH:MM:SS` start time.
    pub async fn pin_item_hms(&self, index: usize, hms: &str) -> Result<()> {
        self.try_edit(|model| model.pin_hms(index, hms)).await
    }

    /// Let the item at `index` float again.
    pub async fn clear_pin(&self, index: usize) -> Result<()> {
        self.try_edit(|model| model.clear_pin(index)).await
    }

    /// Set the time the first floating item starts at.
    pub async fn set_default_start(&self, seconds_since_midnight: u32) {
        self.edit(|model| model.set_default_start(seconds_since_midnight))
            .await;
    }

    /// Set the default start from a `HH:MM:SS` string; malformed input falls
    /// back to midnight. Returns the applied value.
    pub async fn set_default_start_hms(&self, hms: &str) -> u32 {
        self.edit(|model| model.set_default_start_hms(hms)).await
    }

    /// Stamp the default start from the injected clock. Returns the applied
    /// value.
    pub async fn set_default_start_now(&self) -> u32 {
        let now = self.clock.seconds_since_midnight();
        self.edit(move |model| {
            model.set_default_start(now);
            now
        })
        .await
    }

    /// Replace the filler pool.
    pub async fn set_fillers(&self, paths: Vec<PathBuf>) {
        self.edit(|model| model.set_fillers(paths)).await;
    }

    /// Empty the filler pool.
    pub async fn clear_fillers(&self) {
        self.edit(|model| model.clear_fillers()).await;
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// What is on air right now.
    pub async fn status(&self) -> OnAir {
        self.live.read().await.on_air()
    }

    /// Cloneable snapshot of the live broadcast state.
    pub async fn broadcast_state(&self) -> BroadcastState {
        self.live.read().await.as_broadcast_state()
    }

    /// Current resolved timeline snapshot.
    pub async fn timeline(&self) -> Arc<Timeline> {
        self.current_timeline().await
    }

    /// Serializable view of the whole schedule with resolved times.
    pub async fn snapshot(&self) -> ScheduleSnapshot {
        let model = self.model.read().await;
        let timeline = self.current_timeline().await;
        ScheduleSnapshot::build(&model, &timeline)
    }

    /// Playback position of the on-air input, for display.
    ///
    /// `None` while idle, when nothing is playing, or when the device cannot
    /// answer. Operator-facing; failures here are not counted against the
    /// device.
    pub async fn media_progress(&self) -> Option<MediaStatus> {
        let input = {
            let live = self.live.read().await;
            if !live.broadcasting {
                return None;
            }
            if live.active.is_some() {
                self.config.player_input.clone()
            } else if live.filler_active {
                self.config.filler_input.clone()
            } else {
                return None;
            }
        };
        self.timed(self.device.playback_status(&input)).await.ok()
    }

    /// The event bus this controller publishes on.
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    // ========================================================================
    // Reconciliation loop
    // ========================================================================

    async fn run_loop(
        self,
        cancel: CancellationToken,
        mut commands: mpsc::Receiver<ControlCommand>,
        initial: Option<ControlCommand>,
    ) {
        let mut ticker = tokio::time::interval(self.config.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        // A jump that started the broadcast goes on air before the first
        // clock alignment, otherwise the first tick would put the
        // clock-derived item up for a moment.
        if let Some(command) = initial {
            self.handle_command(command).await;
        }

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                Some(command) = commands.recv() => {
                    self.handle_command(command).await;
                }
                _ = ticker.tick() => {
                    self.tick().await;
                }
            }
        }
        debug!("reconciliation loop exited");
    }

    #[instrument(skip(self), level = "debug")]
    async fn handle_command(&self, command: ControlCommand) {
        match command {
            ControlCommand::SkipNext => {
                let now = self.clock.seconds_since_midnight();
                let timeline = self.current_timeline().await;
                match timeline.next_start_after(now) {
                    Some(index) => {
                        info!(index, "skipping to the next scheduled start");
                        self.put_entry_on_air(&timeline, index, now, true).await;
                    }
                    None => {
                        info!("nothing scheduled after now, falling back to filler");
                        self.enter_filler().await;
                    }
                }
            }
            ControlCommand::JumpTo(index) => {
                let now = self.clock.seconds_since_midnight();
                let timeline = self.current_timeline().await;
                if timeline.entry(index).is_some() {
                    info!(index, "jumping to playlist entry");
                    self.put_entry_on_air(&timeline, index, now, true).await;
                } else {
                    // The playlist shrank between the request and now.
                    warn!(index, "jump target no longer exists, ignoring");
                }
            }
        }
    }

    /// One reconciliation pass.
    #[instrument(skip(self), level = "debug")]
    async fn tick(&self) {
        let now = self.clock.seconds_since_midnight();
        let timeline = self.current_timeline().await;
        let filler_pool_size = self.model.read().await.fillers().len();

        let plan = {
            let mut live = self.live.write().await;
            expire_hold(&mut live, &timeline, now);
            plan_tick(&live, &timeline, now, filler_pool_size)
        };

        match plan {
            TickPlan::Switch { index } => {
                self.put_entry_on_air(&timeline, index, now, false).await;
            }
            TickPlan::Relabel { index } => {
                let mut live = self.live.write().await;
                if let Some(active) = live.active.as_mut() {
                    debug!(
                        from = active.index,
                        to = index,
                        "reorder re-labelled the on-air item"
                    );
                    active.index = index;
                }
            }
            TickPlan::EnterFiller => {
                self.enter_filler().await;
            }
            TickPlan::Steady => {
                let (item_on_air, device_ok) = {
                    let live = self.live.read().await;
                    (live.active.is_some(), live.device_ok)
                };
                if item_on_air && self.config.detect_early_end {
                    self.check_early_end(&timeline, now).await;
                } else if !device_ok {
                    self.probe_device().await;
                }
            }
        }
    }

    /// Command the device to the resolved entry at `index`.
    ///
    /// `manual` marks an operator override and installs a hold keeping the
    /// entry on air outside its own interval.
    async fn put_entry_on_air(&self, timeline: &Timeline, index: usize, now: u32, manual: bool) {
        let Some(entry) = timeline.entry(index) else {
            warn!(index, "target entry vanished before it went on air");
            return;
        };

        let item = {
            let model = self.model.read().await;
            model
                .items()
                .iter()
                .find(|item| item.id() == entry.item_id)
                .cloned()
        };
        let Some(item) = item else {
            warn!(index, "target item no longer in the playlist");
            return;
        };

        let commanded: Result<()> = async {
            self.timed(self.device.set_active_media(item.source_path()))
                .await?;
            self.timed(self.device.switch_to_program(&self.config.player_scene))
                .await?;
            self.timed(self.device.restart_playback(&self.config.player_input))
                .await?;
            Ok(())
        }
        .await;

        match commanded {
            Ok(()) => {
                let recovered = {
                    let mut live = self.live.write().await;
                    live.active = Some(ActiveItem {
                        id: item.id(),
                        index,
                        display_name: item.display_name().to_string(),
                    });
                    live.filler_active = false;
                    live.nothing_playing = false;
                    if manual {
                        live.hold = Some(Hold {
                            item_id: item.id(),
                            expires_at: entry.end.max(now.saturating_add(entry.duration())),
                        });
                    }
                    note_device_ok(&mut live)
                };
                if recovered {
                    self.emit_recovered();
                }
                self.event_bus
                    .emit(PlayoutEvent::Broadcast(BroadcastEvent::ItemChanged {
                        index,
                        display_name: item.display_name().to_string(),
                    }))
                    .ok();
                info!(index, display_name = %item.display_name(), manual, "item on air");
            }
            Err(error) => self.record_device_failure(&error).await,
        }
    }

    /// Hand the output to the filler cycler, or surface the nothing-to-play
    /// state when the pool is empty.
    async fn enter_filler(&self) {
        let pool = {
            let model = self.model.read().await;
            model.fillers().to_vec()
        };

        match self.filler.activate(&pool).await {
            Ok(FillerOutcome::Cycling) => {
                let recovered = {
                    let mut live = self.live.write().await;
                    live.clear_playing();
                    live.filler_active = true;
                    live.hold = None;
                    note_device_ok(&mut live)
                };
                if recovered {
                    self.emit_recovered();
                }
                self.event_bus
                    .emit(PlayoutEvent::Broadcast(BroadcastEvent::FillerActivated {
                        pool_size: pool.len(),
                    }))
                    .ok();
            }
            Ok(FillerOutcome::Nothing) => {
                let announce = {
                    let mut live = self.live.write().await;
                    let first = !live.nothing_playing;
                    live.clear_playing();
                    live.nothing_playing = true;
                    live.hold = None;
                    first && live.broadcasting
                };
                if announce {
                    warn!("no scheduled item and the filler pool is empty");
                    self.event_bus
                        .emit(PlayoutEvent::Broadcast(BroadcastEvent::NothingPlaying))
                        .ok();
                }
            }
            Err(error) => self.record_device_failure(&error).await,
        }
    }

    /// Ask the device whether the on-air media ran out before its interval
    /// did, and advance to the next entry when it has.
    async fn check_early_end(&self, timeline: &Timeline, now: u32) {
        let active = {
            let live = self.live.read().await;
            live.active.clone()
        };
        let Some(active) = active else {
            return;
        };

        let status = match self
            .timed(self.device.playback_status(&self.config.player_input))
            .await
        {
            Ok(status) => status,
            Err(error) => {
                // Early-end detection is best effort; pure wall-clock
                // behavior continues, but the failure still counts.
                self.record_device_failure(&error).await;
                return;
            }
        };

        let recovered = {
            let mut live = self.live.write().await;
            note_device_ok(&mut live)
        };
        if recovered {
            self.emit_recovered();
        }

        if !status.has_ended() {
            return;
        }

        match plan_early_advance(timeline, &active) {
            Some(next_index) => {
                info!(
                    from = active.index,
                    to = next_index,
                    "media ended early, advancing"
                );
                self.put_entry_on_air(timeline, next_index, now, true).await;
            }
            None => {
                // Last entry just runs its interval out.
                debug!(index = active.index, "media ended early on the last entry");
            }
        }
    }

    /// Cheap readiness probe while the device is marked failing and nothing
    /// else talks to it.
    async fn probe_device(&self) {
        if self.device.is_ready().await {
            let recovered = {
                let mut live = self.live.write().await;
                note_device_ok(&mut live)
            };
            if recovered {
                self.emit_recovered();
            }
        } else {
            let mut live = self.live.write().await;
            live.failed_ticks = live.failed_ticks.saturating_add(1);
        }
    }

    async fn record_device_failure(&self, error: &PlayoutError) {
        let first = {
            let mut live = self.live.write().await;
            live.failed_ticks = live.failed_ticks.saturating_add(1);
            let first = live.device_ok;
            live.device_ok = false;
            first
        };
        warn!(%error, "device call failed, retrying next tick");
        if first {
            self.event_bus
                .emit(PlayoutEvent::Broadcast(BroadcastEvent::DeviceUnreachable {
                    message: error.to_string(),
                }))
                .ok();
        }
    }

    fn emit_recovered(&self) {
        info!("device calls succeeding again");
        self.event_bus
            .emit(PlayoutEvent::Broadcast(BroadcastEvent::DeviceRecovered))
            .ok();
    }

    // ========================================================================
    // Shared plumbing
    // ========================================================================

    async fn current_timeline(&self) -> Arc<Timeline> {
        Arc::clone(&*self.timeline.read().await)
    }

    async fn swap_timeline(&self, model: &ScheduleModel) -> Arc<Timeline> {
        let timeline = Arc::new(model.resolve());
        *self.timeline.write().await = Arc::clone(&timeline);
        timeline
    }

    async fn after_edit(&self, timeline: &Timeline) {
        {
            let mut live = self.live.write().await;
            if let Some(hold) = &live.hold {
                if timeline.entry_by_id(hold.item_id).is_none() {
                    debug!("held item edited away, releasing hold");
                    live.hold = None;
                }
            }
        }

        let item_count = timeline.len();
        self.event_bus
            .emit(PlayoutEvent::Schedule(ScheduleEvent::PlaylistChanged {
                item_count,
            }))
            .ok();
        self.event_bus
            .emit(PlayoutEvent::Schedule(ScheduleEvent::TimelineRecomputed {
                item_count,
                total_span_secs: timeline.total_span(),
            }))
            .ok();
        for (first_index, second_index) in timeline.overlapping_pins() {
            warn!(first_index, second_index, "pinned items overlap");
            self.event_bus
                .emit(PlayoutEvent::Schedule(ScheduleEvent::PinOverlap {
                    first_index,
                    second_index,
                }))
                .ok();
        }
    }

    async fn timed<T, F>(&self, call: F) -> Result<T>
    where
        F: Future<Output = bridge_traits::error::Result<T>>,
    {
        match tokio::time::timeout(self.config.device_call_timeout, call).await {
            Ok(result) => result.map_err(PlayoutError::from),
            Err(_) => Err(DeviceError::Timeout(self.config.device_call_timeout).into()),
        }
    }
}

// ============================================================================
// Pure planning
// ============================================================================

/// Release a hold the clock or an edit has made obsolete.
fn expire_hold(live: &mut LiveState, timeline: &Timeline, now: u32) {
    let Some(hold) = &live.hold else {
        return;
    };

    let Some(entry) = timeline.entry_by_id(hold.item_id) else {
        live.hold = None;
        return;
    };

    // Natural sync: the clock reached the held entry's own interval.
    if entry.contains(now) {
        live.hold = None;
        return;
    }

    if now >= hold.expires_at {
        live.hold = None;
    }
}

/// Decide what this tick should do. Pure so the decision table is testable
/// without a device or a runtime.
fn plan_tick(live: &LiveState, timeline: &Timeline, now: u32, filler_pool_size: usize) -> TickPlan {
    // An in-force hold pins the target regardless of the clock.
    let target = match &live.hold {
        Some(hold) => timeline.entry_by_id(hold.item_id).map(|e| e.index),
        None => timeline.index_for_time(now),
    };

    match target {
        Some(index) => {
            let entry = &timeline.entries()[index];
            match &live.active {
                Some(active) if active.id == entry.item_id => {
                    if active.index == index {
                        TickPlan::Steady
                    } else {
                        TickPlan::Relabel { index }
                    }
                }
                _ => TickPlan::Switch { index },
            }
        }
        None => {
            if live.active.is_some() {
                TickPlan::EnterFiller
            } else if live.filler_active {
                TickPlan::Steady
            } else if live.nothing_playing {
                // Re-arm only once the pool has something to cycle.
                if filler_pool_size > 0 {
                    TickPlan::EnterFiller
                } else {
                    TickPlan::Steady
                }
            } else {
                TickPlan::EnterFiller
            }
        }
    }
}

/// Early-end advance target: the next playlist entry, when one exists. The
/// last entry never advances; it runs its interval out.
fn plan_early_advance(timeline: &Timeline, active: &ActiveItem) -> Option<usize> {
    let entry = timeline.entry_by_id(active.id)?;
    let next = entry.index + 1;
    (next < timeline.len()).then_some(next)
}

fn note_device_ok(live: &mut LiveState) -> bool {
    let recovered = !live.device_ok;
    live.device_ok = true;
    live.failed_ticks = 0;
    recovered
}
