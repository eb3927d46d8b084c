//! End-to-end tests for the playout controller
//!
//! This test suite verifies:
//! - Start/stop lifecycle and its precondition errors
//! - Wall-clock reconciliation against a manual clock
//! - Operator overrides (skip, jump) and their manual holds
//! - Live schedule edits under broadcast
//! - Filler fallback and the nothing-to-play state
//! - Device failure resilience and recovery

use bridge_traits::clock::{Clock, ManualClock};
use bridge_traits::device::{MediaPlayState, MediaStatus, PlaybackDevice};
use bridge_traits::error::{DeviceError, Result as DeviceResult};
use core_playout::{OnAir, PlayoutConfig, PlayoutController, PlayoutError};
use core_runtime::events::{BroadcastEvent, EventBus, EventStream, PlayoutEvent};
use core_schedule::PlaylistItem;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::time::sleep;

// ============================================================================
// Recording Device Implementation
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum DeviceCall {
    SetMedia(PathBuf),
    SwitchScene(String),
    Restart(String),
    InstallFillers(Vec<PathBuf>),
}

#[derive(Debug)]
struct DeviceState {
    calls: Vec<DeviceCall>,
    ready: bool,
    fail_all: bool,
    status: MediaStatus,
}

/// In-memory playback device that records every command it receives.
struct RecordingDevice {
    state: Mutex<DeviceState>,
}

impl RecordingDevice {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(DeviceState {
                calls: Vec::new(),
                ready: true,
                fail_all: false,
                status: MediaStatus::new(0, 0, MediaPlayState::Playing),
            }),
        })
    }

    fn set_ready(&self, ready: bool) {
        self.state.lock().unwrap().ready = ready;
    }

    fn set_fail_all(&self, fail: bool) {
        self.state.lock().unwrap().fail_all = fail;
    }

    fn set_status(&self, status: MediaStatus) {
        self.state.lock().unwrap().status = status;
    }

    fn calls(&self) -> Vec<DeviceCall> {
        self.state.lock().unwrap().calls.clone()
    }

    fn restarts_of(&self, input: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|call| matches!(call, DeviceCall::Restart(i) if i == input))
            .count()
    }

    fn installs(&self) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|call| matches!(call, DeviceCall::InstallFillers(_)))
            .count()
    }

    fn record(&self, call: DeviceCall) -> DeviceResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_all {
            return Err(DeviceError::Connect("device offline".into()));
        }
        state.calls.push(call);
        Ok(())
    }
}

#[async_trait::async_trait]
impl PlaybackDevice for RecordingDevice {
    async fn set_active_media(&self, path: &Path) -> DeviceResult<()> {
        self.record(DeviceCall::SetMedia(path.to_path_buf()))
    }

    async fn switch_to_program(&self, scene: &str) -> DeviceResult<()> {
        self.record(DeviceCall::SwitchScene(scene.to_string()))
    }

    async fn restart_playback(&self, input: &str) -> DeviceResult<()> {
        self.record(DeviceCall::Restart(input.to_string()))
    }

    async fn playback_status(&self, _input: &str) -> DeviceResult<MediaStatus> {
        let state = self.state.lock().unwrap();
        if state.fail_all {
            return Err(DeviceError::Connect("device offline".into()));
        }
        Ok(state.status)
    }

    async fn install_filler_cycle(&self, paths: &[PathBuf]) -> DeviceResult<()> {
        self.record(DeviceCall::InstallFillers(paths.to_vec()))
    }

    async fn is_ready(&self) -> bool {
        let state = self.state.lock().unwrap();
        state.ready && !state.fail_all
    }
}

// ============================================================================
// Test Harness
// ============================================================================

struct Harness {
    controller: PlayoutController,
    device: Arc<RecordingDevice>,
    clock: Arc<ManualClock>,
    events: EventStream,
}

fn harness() -> Harness {
    let device = RecordingDevice::new();
    let clock = Arc::new(ManualClock::new(0));
    let bus = Arc::new(EventBus::default());
    let events = EventStream::new(bus.subscribe());

    let config = PlayoutConfig {
        tick_interval: Duration::from_millis(20),
        stop_grace: Duration::from_millis(500),
        ..Default::default()
    };

    let device_dyn: Arc<dyn PlaybackDevice> = device.clone();
    let clock_dyn: Arc<dyn Clock> = clock.clone();
    let controller = PlayoutController::new(config, device_dyn, clock_dyn, bus)
        .expect("default test config is valid");

    Harness {
        controller,
        device,
        clock,
        events,
    }
}

fn item(name: &str, secs: f64) -> PlaylistItem {
    PlaylistItem::new(format!("/media/{name}.mp4"), name, secs)
}

/// Poll an async condition until it holds or two seconds pass.
async fn eventually<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = Instant::now() + Duration::from_secs(2);
    loop {
        if check().await {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        sleep(Duration::from_millis(10)).await;
    }
}

fn drain(stream: &mut EventStream) -> Vec<PlayoutEvent> {
    let mut events = Vec::new();
    while let Some(Ok(event)) = stream.try_recv() {
        events.push(event);
    }
    events
}

fn has_broadcast_event(events: &[PlayoutEvent], check: impl Fn(&BroadcastEvent) -> bool) -> bool {
    events.iter().any(|event| match event {
        PlayoutEvent::Broadcast(b) => check(b),
        _ => false,
    })
}

// ============================================================================
// Lifecycle
// ============================================================================

#[tokio::test]
async fn start_rejects_an_empty_engine() {
    let h = harness();
    assert!(matches!(
        h.controller.start().await,
        Err(PlayoutError::NothingToPlay)
    ));
}

#[tokio::test]
async fn start_rejects_an_unready_device() {
    let h = harness();
    h.controller.add_item(item("a", 60.0)).await;
    h.device.set_ready(false);

    assert!(matches!(
        h.controller.start().await,
        Err(PlayoutError::DeviceUnavailable)
    ));
}

#[tokio::test]
async fn start_rejects_a_second_start() {
    let h = harness();
    h.controller.add_item(item("a", 60.0)).await;

    h.controller.start().await.unwrap();
    assert!(matches!(
        h.controller.start().await,
        Err(PlayoutError::AlreadyBroadcasting)
    ));

    h.controller.stop().await.unwrap();
}

#[tokio::test]
async fn start_with_only_fillers_sits_on_filler() {
    let mut h = harness();
    h.controller
        .set_fillers(vec!["/media/rain.mp4".into(), "/media/ocean.mp4".into()])
        .await;

    h.controller.start().await.unwrap();
    assert!(eventually(|| async { h.controller.status().await == OnAir::Filler }).await);

    let calls = h.device.calls();
    assert!(calls.contains(&DeviceCall::InstallFillers(vec![
        "/media/rain.mp4".into(),
        "/media/ocean.mp4".into(),
    ])));
    assert!(calls.contains(&DeviceCall::SwitchScene("Fillers_Scene".into())));
    assert!(calls.contains(&DeviceCall::Restart("Fillers_Playlist".into())));

    // Steady filler must not be reinstalled every tick.
    let installs = h.device.installs();
    sleep(Duration::from_millis(120)).await;
    assert_eq!(h.device.installs(), installs);

    let events = drain(&mut h.events);
    assert!(has_broadcast_event(&events, |e| matches!(
        e,
        BroadcastEvent::FillerActivated { pool_size: 2 }
    )));

    h.controller.stop().await.unwrap();
}

#[tokio::test]
async fn stop_is_idempotent_and_parks_on_filler() {
    let mut h = harness();
    h.controller.add_item(item("a", 600.0)).await;
    h.controller.set_fillers(vec!["/media/rain.mp4".into()]).await;

    h.controller.start().await.unwrap();
    assert!(
        eventually(|| async { h.controller.broadcast_state().await.active_index == Some(0) })
            .await
    );

    h.controller.stop().await.unwrap();
    assert!(!h.controller.is_broadcasting().await);
    assert_eq!(h.controller.status().await, OnAir::Off);

    // The device was parked on the filler cycle on the way out.
    assert!(h.device.installs() >= 1);
    assert!(h
        .device
        .calls()
        .contains(&DeviceCall::SwitchScene("Fillers_Scene".into())));

    let events = drain(&mut h.events);
    assert!(has_broadcast_event(&events, |e| matches!(
        e,
        BroadcastEvent::Stopped
    )));

    // Stopping again is a quiet no-op.
    h.controller.stop().await.unwrap();
}

// ============================================================================
// Clock reconciliation
// ============================================================================

#[tokio::test]
async fn broadcast_follows_the_wall_clock() {
    let mut h = harness();
    h.controller.add_item(item("morning", 60.0)).await;
    h.controller.add_item(item("news", 60.0)).await;

    h.controller.start().await.unwrap();
    assert!(
        eventually(|| async { h.controller.broadcast_state().await.active_index == Some(0) })
            .await
    );

    h.clock.set(60);
    assert!(
        eventually(|| async { h.controller.broadcast_state().await.active_index == Some(1) })
            .await
    );

    let calls = h.device.calls();
    assert!(calls.contains(&DeviceCall::SetMedia("/media/morning.mp4".into())));
    assert!(calls.contains(&DeviceCall::SetMedia("/media/news.mp4".into())));
    assert!(calls.contains(&DeviceCall::SwitchScene("Scheduler_Player".into())));

    let events = drain(&mut h.events);
    assert!(has_broadcast_event(&events, |e| matches!(
        e,
        BroadcastEvent::Started { item_count: 2, .. }
    )));
    assert!(has_broadcast_event(&events, |e| matches!(
        e,
        BroadcastEvent::ItemChanged { index: 1, .. }
    )));

    h.controller.stop().await.unwrap();
}

#[tokio::test]
async fn starting_mid_item_picks_the_covering_entry() {
    let h = harness();
    h.controller.add_item(item("a", 60.0)).await;
    h.controller.add_item(item("b", 60.0)).await;
    h.clock.set(75);

    h.controller.start().await.unwrap();
    assert!(
        eventually(|| async { h.controller.broadcast_state().await.active_index == Some(1) })
            .await
    );

    // The first item was never commanded; the clock is past it.
    assert!(!h
        .device
        .calls()
        .contains(&DeviceCall::SetMedia("/media/a.mp4".into())));

    h.controller.stop().await.unwrap();
}

#[tokio::test]
async fn schedule_gap_before_a_pin_falls_to_filler() {
    let h = harness();
    h.controller.add_item(item("late-show", 60.0)).await;
    h.controller.pin_item(0, 3_000).await.unwrap();
    h.controller.set_fillers(vec!["/media/rain.mp4".into()]).await;

    h.controller.start().await.unwrap();
    assert!(eventually(|| async { h.controller.status().await == OnAir::Filler }).await);

    // The pinned start arrives; the item takes over from filler.
    h.clock.set(3_000);
    assert!(
        eventually(|| async { h.controller.broadcast_state().await.active_index == Some(0) })
            .await
    );

    h.controller.stop().await.unwrap();
}

#[tokio::test]
async fn empty_gap_with_no_fillers_surfaces_nothing() {
    let mut h = harness();
    h.controller.add_item(item("late-show", 60.0)).await;
    h.controller.pin_item(0, 3_000).await.unwrap();

    h.controller.start().await.unwrap();
    assert!(eventually(|| async { h.controller.status().await == OnAir::Nothing }).await);

    // Nothing to play means no device commands at all.
    assert_eq!(h.device.calls(), Vec::new());

    let events = drain(&mut h.events);
    let nothing_count = events
        .iter()
        .filter(|e| matches!(e, PlayoutEvent::Broadcast(BroadcastEvent::NothingPlaying)))
        .count();
    assert_eq!(nothing_count, 1);

    h.controller.stop().await.unwrap();
}

// ============================================================================
// Operator overrides
// ============================================================================

#[tokio::test]
async fn skip_holds_the_next_entry_on_air() {
    let h = harness();
    h.controller.add_item(item("a", 60.0)).await;
    h.controller.add_item(item("b", 60.0)).await;

    h.controller.start().await.unwrap();
    assert!(
        eventually(|| async { h.controller.broadcast_state().await.active_index == Some(0) })
            .await
    );

    h.controller.skip_next().await.unwrap();
    assert!(
        eventually(|| async { h.controller.broadcast_state().await.active_index == Some(1) })
            .await
    );

    // The clock still says entry 0, but the hold keeps entry 1 up.
    sleep(Duration::from_millis(120)).await;
    assert_eq!(
        h.controller.broadcast_state().await.active_index,
        Some(1)
    );

    h.controller.stop().await.unwrap();
}

#[tokio::test]
async fn skip_past_the_last_entry_falls_to_filler() {
    let h = harness();
    h.controller.add_item(item("a", 60.0)).await;
    h.controller.set_fillers(vec!["/media/rain.mp4".into()]).await;

    h.controller.start().await.unwrap();
    assert!(
        eventually(|| async { h.controller.broadcast_state().await.active_index == Some(0) })
            .await
    );

    h.controller.skip_next().await.unwrap();
    assert!(eventually(|| async { h.controller.status().await == OnAir::Filler }).await);

    h.controller.stop().await.unwrap();
}

#[tokio::test]
async fn skip_while_idle_is_a_no_op() {
    let h = harness();
    h.controller.skip_next().await.unwrap();
    assert!(!h.controller.is_broadcasting().await);
}

#[tokio::test]
async fn jump_starts_broadcasting_when_idle() {
    let h = harness();
    h.controller.add_item(item("a", 60.0)).await;
    h.controller.add_item(item("b", 60.0)).await;
    h.controller.add_item(item("c", 60.0)).await;

    h.controller.jump_to(2).await.unwrap();
    assert!(h.controller.is_broadcasting().await);
    assert!(
        eventually(|| async { h.controller.broadcast_state().await.active_index == Some(2) })
            .await
    );

    // Entry 0 is what the clock would pick; the jump hold outranks it.
    sleep(Duration::from_millis(120)).await;
    assert_eq!(
        h.controller.broadcast_state().await.active_index,
        Some(2)
    );
    assert!(!h
        .device
        .calls()
        .contains(&DeviceCall::SetMedia("/media/a.mp4".into())));

    h.controller.stop().await.unwrap();
}

#[tokio::test]
async fn jump_rejects_an_out_of_range_index() {
    let h = harness();
    h.controller.add_item(item("a", 60.0)).await;

    assert!(matches!(
        h.controller.jump_to(5).await,
        Err(PlayoutError::NoSuchItem { index: 5, len: 1 })
    ));
    assert!(!h.controller.is_broadcasting().await);
}

#[tokio::test]
async fn hold_expires_back_to_the_clock() {
    let h = harness();
    h.controller.add_item(item("a", 60.0)).await;
    h.controller.add_item(item("b", 30.0)).await;
    h.controller.add_item(item("c", 600.0)).await;

    // Jump back to entry 1 ([60, 90), 30s) at now=200, inside entry 2.
    h.clock.set(200);
    h.controller.jump_to(1).await.unwrap();
    assert!(
        eventually(|| async { h.controller.broadcast_state().await.active_index == Some(1) })
            .await
    );

    // Hold runs out at max(90, 200+30) = 230; the clock then reclaims
    // entry 2, whose interval covers 230.
    h.clock.set(230);
    assert!(
        eventually(|| async { h.controller.broadcast_state().await.active_index == Some(2) })
            .await
    );

    h.controller.stop().await.unwrap();
}

// ============================================================================
// Live edits
// ============================================================================

#[tokio::test]
async fn edits_do_not_interrupt_the_on_air_item() {
    let h = harness();
    h.controller.add_item(item("feature", 600.0)).await;

    h.controller.start().await.unwrap();
    assert!(
        eventually(|| async { h.controller.broadcast_state().await.active_index == Some(0) })
            .await
    );

    let restarts = h.device.restarts_of("Scheduler_Player_Input");
    h.controller.add_item(item("extra", 60.0)).await;
    h.controller.set_default_start(0).await;
    sleep(Duration::from_millis(120)).await;

    assert_eq!(h.device.restarts_of("Scheduler_Player_Input"), restarts);
    assert_eq!(
        h.controller.broadcast_state().await.active_index,
        Some(0)
    );

    h.controller.stop().await.unwrap();
}

#[tokio::test]
async fn reorder_relabels_the_on_air_item_without_restart() {
    let h = harness();
    h.controller.add_item(item("short", 10.0)).await;
    h.controller.add_item(item("feature", 600.0)).await;
    h.controller.add_item(item("tail", 10.0)).await;

    // now=50 puts the feature ([10, 610)) on air at index 1.
    h.clock.set(50);
    h.controller.start().await.unwrap();
    assert!(
        eventually(|| async { h.controller.broadcast_state().await.active_index == Some(1) })
            .await
    );

    let restarts = h.device.restarts_of("Scheduler_Player_Input");

    // Move the feature to the top; it still covers now=50 as [0, 600).
    assert!(h.controller.move_up(&[1]).await.unwrap());
    assert!(
        eventually(|| async { h.controller.broadcast_state().await.active_index == Some(0) })
            .await
    );
    assert_eq!(h.device.restarts_of("Scheduler_Player_Input"), restarts);

    h.controller.stop().await.unwrap();
}

#[tokio::test]
async fn removing_every_item_hands_over_to_filler() {
    let h = harness();
    h.controller.add_item(item("only", 600.0)).await;
    h.controller.set_fillers(vec!["/media/rain.mp4".into()]).await;

    h.controller.start().await.unwrap();
    assert!(
        eventually(|| async { h.controller.broadcast_state().await.active_index == Some(0) })
            .await
    );

    h.controller.clear_playlist().await;
    assert!(eventually(|| async { h.controller.status().await == OnAir::Filler }).await);

    h.controller.stop().await.unwrap();
}

// ============================================================================
// Early end detection
// ============================================================================

#[tokio::test]
async fn early_media_end_advances_to_the_next_entry() {
    let h = harness();
    h.controller.add_item(item("feature", 600.0)).await;
    h.controller.add_item(item("backup", 600.0)).await;

    h.controller.start().await.unwrap();
    assert!(
        eventually(|| async { h.controller.broadcast_state().await.active_index == Some(0) })
            .await
    );

    // The source file runs out 590 seconds before its declared duration.
    h.device
        .set_status(MediaStatus::new(10_000, 10_000, MediaPlayState::Playing));
    assert!(
        eventually(|| async { h.controller.broadcast_state().await.active_index == Some(1) })
            .await
    );

    h.controller.stop().await.unwrap();
}

#[tokio::test]
async fn early_end_on_the_last_entry_stays_put() {
    let h = harness();
    h.controller.add_item(item("only", 600.0)).await;
    h.controller.set_fillers(vec!["/media/rain.mp4".into()]).await;

    h.controller.start().await.unwrap();
    assert!(
        eventually(|| async { h.controller.broadcast_state().await.active_index == Some(0) })
            .await
    );

    h.device
        .set_status(MediaStatus::new(10_000, 10_000, MediaPlayState::Ended));
    sleep(Duration::from_millis(120)).await;

    // No next entry: the interval runs out on the wall clock, not early.
    assert_eq!(
        h.controller.broadcast_state().await.active_index,
        Some(0)
    );
    assert_ne!(h.controller.status().await, OnAir::Filler);

    h.controller.stop().await.unwrap();
}

// ============================================================================
// Device failure handling
// ============================================================================

#[tokio::test]
async fn device_failures_never_kill_the_loop() {
    let mut h = harness();
    h.controller.add_item(item("a", 60.0)).await;
    h.controller.add_item(item("b", 60.0)).await;

    h.controller.start().await.unwrap();
    assert!(
        eventually(|| async { h.controller.broadcast_state().await.active_index == Some(0) })
            .await
    );

    h.device.set_fail_all(true);
    h.clock.set(60);

    assert!(eventually(|| async { !h.controller.broadcast_state().await.device_ok }).await);
    assert!(h.controller.is_broadcasting().await);
    assert_eq!(h.controller.status().await, OnAir::Unreachable);
    assert!(h.controller.broadcast_state().await.failed_ticks >= 1);

    // Back online: the pending switch lands and health clears.
    h.device.set_fail_all(false);
    assert!(
        eventually(|| async {
            let state = h.controller.broadcast_state().await;
            state.device_ok && state.active_index == Some(1)
        })
        .await
    );

    let events = drain(&mut h.events);
    assert!(has_broadcast_event(&events, |e| matches!(
        e,
        BroadcastEvent::DeviceUnreachable { .. }
    )));
    assert!(has_broadcast_event(&events, |e| matches!(
        e,
        BroadcastEvent::DeviceRecovered
    )));

    h.controller.stop().await.unwrap();
}

// ============================================================================
// Introspection
// ============================================================================

#[tokio::test]
async fn media_progress_reports_the_player_position() {
    let h = harness();
    h.controller.add_item(item("feature", 600.0)).await;

    assert!(h.controller.media_progress().await.is_none());

    h.controller.start().await.unwrap();
    assert!(
        eventually(|| async { h.controller.broadcast_state().await.active_index == Some(0) })
            .await
    );

    h.device
        .set_status(MediaStatus::new(5_000, 600_000, MediaPlayState::Playing));
    let progress = h.controller.media_progress().await.unwrap();
    assert_eq!(progress.cursor_ms, 5_000);
    assert_eq!(progress.remaining_ms(), Some(595_000));

    h.controller.stop().await.unwrap();
    assert!(h.controller.media_progress().await.is_none());
}

#[tokio::test]
async fn snapshot_reflects_resolved_times() {
    let h = harness();
    h.controller.add_item(item("a", 60.0)).await;
    h.controller.add_item(item("b", 30.0)).await;
    h.controller.pin_item(1, 300).await.unwrap();

    let snapshot = h.controller.snapshot().await;
    assert_eq!(snapshot.items.len(), 2);
    assert_eq!(snapshot.items[0].absolute_start, 0);
    assert_eq!(snapshot.items[0].absolute_end, 60);
    assert_eq!(snapshot.items[1].absolute_start, 300);
    assert_eq!(snapshot.items[1].start_hms, "00:05:00");
    assert!(snapshot.items[1].pinned);
}

#[tokio::test]
async fn set_default_start_now_uses_the_injected_clock() {
    let h = harness();
    h.clock.set(4_500);

    let applied = h.controller.set_default_start_now().await;
    assert_eq!(applied, 4_500);

    let snapshot = h.controller.snapshot().await;
    assert_eq!(snapshot.default_start, 4_500);
}
