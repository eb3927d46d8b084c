//! Logging system demonstration
//!
//! This example shows how to use the logging infrastructure in different modes.
//!
//! Run with:
//! ```bash
//! # Pretty format (default in debug)
//! cargo run --example logging_demo
//!
//! # JSON format
//! cargo run --example logging_demo -- json
//!
//! # Compact format
//! cargo run --example logging_demo -- compact
//!
//! # With custom filter
//! cargo run --example logging_demo -- pretty "core_runtime=trace"
//! ```

use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use std::env;
use tracing::{debug, error, info, instrument, span, trace, warn, Level};

#[tokio::main]
async fn main() {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let format = if args.len() > 1 {
        match args[1].as_str() {
            "json" => LogFormat::Json,
            "compact" => LogFormat::Compact,
            "pretty" => LogFormat::Pretty,
            _ => LogFormat::Pretty,
        }
    } else {
        LogFormat::default()
    };

    let filter = args.get(2).cloned();

    // Initialize logging
    let mut config = LoggingConfig::default()
        .with_format(format)
        .with_level(Level::TRACE)
        .with_span_events(true)
        .with_target_display(true);

    if let Some(f) = filter {
        config = config.with_filter(f);
    }

    init_logging(config).expect("Failed to initialize logging");

    info!("=== Logging System Demo ===");
    info!(format = ?format, "Logging initialized");

    // Demonstrate different log levels
    demo_log_levels();

    // Demonstrate structured logging
    demo_structured_logging();

    // Demonstrate spans for tracing
    demo_spans().await;

    // Demonstrate instrumentation
    demo_instrumentation().await;

    info!("=== Demo Complete ===");
}

fn demo_log_levels() {
    let span = span!(Level::INFO, "log_levels");
    let _enter = span.enter();

    trace!("This is a TRACE level log");
    debug!("This is a DEBUG level log");
    info!("This is an INFO level log");
    warn!("This is a WARN level log");
    error!("This is an ERROR level log");
}

fn demo_structured_logging() {
    let span = span!(Level::INFO, "structured_logging");
    let _enter = span.enter();

    info!("Simple message without fields");

    info!(
        index = 4,
        display_name = "evening-news",
        duration_secs = 245.0,
        "Item on air"
    );

    info!(
        item_count = 12,
        total_span_secs = 7_200,
        pool_size = 3,
        "Schedule resolved"
    );
}

async fn demo_spans() {
    let span = span!(Level::INFO, "broadcast_tick", now = 32_400);
    let _enter = span.enter();

    info!("Starting reconciliation pass");

    {
        let inner_span = span!(Level::DEBUG, "resolve_target");
        let _inner = inner_span.enter();

        debug!(target_index = 2, "Wall clock maps to playlist entry");
        tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;
    }

    {
        let inner_span = span!(Level::DEBUG, "command_device");
        let _inner = inner_span.enter();

        debug!(scene = "Scheduler_Player", "Switching program output");
        tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;
    }

    info!(active_index = 2, "Reconciliation pass completed");
}

#[instrument]
async fn demo_instrumentation() {
    info!("Instrumented function automatically creates spans");

    let items = vec!["morning-news", "cartoon", "feature"];
    resolve_items(&items).await;
}

#[instrument(fields(count = items.len()))]
async fn resolve_items(items: &[&str]) {
    debug!("Resolving playlist entries");

    for (idx, item) in items.iter().enumerate() {
        resolve_item(idx, item).await;
    }

    info!("All entries resolved");
}

#[instrument(fields(index = idx))]
async fn resolve_item(idx: usize, item: &str) {
    trace!(item = %item, "Resolving individual entry");
    tokio::time::sleep(tokio::time::Duration::from_millis(5)).await;
}
