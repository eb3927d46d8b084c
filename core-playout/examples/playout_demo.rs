//! # Playout Controller Usage Example
//!
//! This example walks a full broadcast day in fast-forward: build a schedule,
//! start broadcasting against a console-printing device, then drive the wall
//! clock by hand to watch the controller keep the output in sync.
//!
//! Run with: `cargo run --example playout_demo --package core-playout`

use bridge_traits::{ManualClock, MediaPlayState, MediaStatus, PlaybackDevice};
use bridge_traits::error::Result as DeviceResult;
use core_playout::{PlayoutConfig, PlayoutController};
use core_runtime::events::{EventBus, EventStream};
use core_schedule::PlaylistItem;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

// ============================================================================
// Console Playback Device (for demonstration)
// ============================================================================

/// Prints every device command instead of speaking a control protocol.
struct ConsoleDevice;

#[async_trait::async_trait]
impl PlaybackDevice for ConsoleDevice {
    async fn set_active_media(&self, path: &Path) -> DeviceResult<()> {
        println!("🎬 Device: load media {}", path.display());
        Ok(())
    }

    async fn switch_to_program(&self, scene: &str) -> DeviceResult<()> {
        println!("📺 Device: switch program to scene {scene:?}");
        Ok(())
    }

    async fn restart_playback(&self, input: &str) -> DeviceResult<()> {
        println!("🔁 Device: restart input {input:?}");
        Ok(())
    }

    async fn playback_status(&self, _input: &str) -> DeviceResult<MediaStatus> {
        // Silent: the controller polls this every tick.
        Ok(MediaStatus::new(42_000, 180_000, MediaPlayState::Playing))
    }

    async fn install_filler_cycle(&self, paths: &[PathBuf]) -> DeviceResult<()> {
        println!("🌊 Device: install filler cycle of {} item(s)", paths.len());
        Ok(())
    }

    async fn is_ready(&self) -> bool {
        true
    }
}

// ============================================================================
// Main Demo
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!("🗓  Core Playout - Controller Demo\n");

    let device: Arc<dyn PlaybackDevice> = Arc::new(ConsoleDevice);
    let clock = Arc::new(ManualClock::new(0));
    let bus = Arc::new(EventBus::default());
    let mut events = EventStream::new(bus.subscribe());

    let config = PlayoutConfig {
        tick_interval: Duration::from_millis(50),
        ..Default::default()
    };
    let controller = PlayoutController::new(config, device, clock.clone(), bus)?;

    // Build the day's schedule: two floating items from 09:00, one pinned.
    println!("📝 Building the schedule...");
    controller.set_default_start_hms("09:00:00").await;
    controller
        .add_item(PlaylistItem::new("/media/morning-news.mp4", "morning-news", 120.0))
        .await;
    controller
        .add_item(PlaylistItem::new("/media/cartoon.mp4", "cartoon", 90.0))
        .await;
    controller
        .add_item(PlaylistItem::new("/media/feature.mp4", "feature", 180.0))
        .await;
    controller.pin_item_hms(2, "09:05:00").await?;
    controller
        .set_fillers(vec!["/media/rain.mp4".into(), "/media/ocean.mp4".into()])
        .await;

    let rundown = controller.snapshot().await;
    println!("\n📋 Resolved rundown (default start {}):", rundown.default_start_hms);
    for row in &rundown.items {
        let marker = if row.pinned { "📌" } else { "  " };
        println!(
            "   {} [{}] {} - {}  {}",
            marker, row.index, row.start_hms, row.end_hms, row.display_name
        );
    }

    // Go on air at 09:00.
    clock.set(9 * 3600);
    println!("\n🔴 Going on air at 09:00:00...");
    controller.start().await?;
    sleep(Duration::from_millis(200)).await;
    println!("   On air: {:?}", controller.status().await);

    // The clock crosses into the second item; the controller follows.
    clock.set(9 * 3600 + 120);
    println!("\n⏰ Clock reaches 09:02:00...");
    sleep(Duration::from_millis(200)).await;
    println!("   On air: {:?}", controller.status().await);

    // Operator skips ahead to the next scheduled start.
    println!("\n⏭  Operator skips to the next start...");
    controller.skip_next().await?;
    sleep(Duration::from_millis(200)).await;
    println!("   On air: {:?}", controller.status().await);

    if let Some(progress) = controller.media_progress().await {
        println!(
            "   Player position: {:.0}s of {:.0}s",
            progress.cursor_ms as f64 / 1000.0,
            progress.duration_ms as f64 / 1000.0
        );
    }

    // Past the end of the schedule the filler cycle takes over.
    clock.set(9 * 3600 + 8 * 60);
    println!("\n⏰ Clock reaches 09:08:00, past the last item...");
    sleep(Duration::from_millis(200)).await;
    println!("   On air: {:?}", controller.status().await);

    println!("\n⏹  Stopping the broadcast...");
    controller.stop().await?;
    println!("   On air: {:?}", controller.status().await);

    println!("\n📨 Events seen along the way:");
    while let Some(Ok(event)) = events.try_recv() {
        println!("   - {}", event.description());
    }

    println!("\n🎉 Demo completed successfully!");

    Ok(())
}
