//! # Logging Infrastructure
//!
//! Structured logging built on `tracing` and `tracing-subscriber`.
//!
//! ## Features
//!
//! - Multiple output formats (pretty, JSON, compact)
//! - Per-crate filter directives with sane defaults
//! - Span lifecycle events for timing the broadcast loop
//!
//! ## Usage
//!
//! ```rust,no_run
//! use core_runtime::logging::{init_logging, LoggingConfig, LogFormat};
//!
//! let config = LoggingConfig::default()
//!     .with_format(LogFormat::Pretty)
//!     .with_level(tracing::Level::DEBUG);
//!
//! init_logging(config).expect("Failed to initialize logging");
//! ```

use crate::error::{Error, Result};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line, human-readable output for development.
    Pretty,
    /// Newline-delimited JSON for log shippers.
    Json,
    /// Single-line output for terminals and service logs.
    Compact,
}

impl Default for LogFormat {
    fn default() -> Self {
        #[cfg(debug_assertions)]
        return Self::Pretty;

        #[cfg(not(debug_assertions))]
        return Self::Json;
    }
}

/// Configuration for the logging system.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Output format.
    pub format: LogFormat,
    /// Level applied to the workspace crates.
    pub level: tracing::Level,
    /// Explicit filter directives. Overrides `level` when set.
    pub filter: Option<String>,
    /// Include the event's module path in the output.
    pub display_target: bool,
    /// Include thread ids and names in the output.
    pub display_thread_info: bool,
    /// Emit an event when instrumented spans close.
    pub enable_spans: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: tracing::Level::INFO,
            filter: None,
            display_target: true,
            display_thread_info: false,
            enable_spans: true,
        }
    }
}

impl LoggingConfig {
    /// Set the output format.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the level applied to the workspace crates.
    pub fn with_level(mut self, level: tracing::Level) -> Self {
        self.level = level;
        self
    }

    /// Set explicit filter directives, e.g. `"core_playout=trace,warn"`.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Toggle module path display.
    pub fn with_target_display(mut self, enabled: bool) -> Self {
        self.display_target = enabled;
        self
    }

    /// Toggle thread id and name display.
    pub fn with_thread_info(mut self, enabled: bool) -> Self {
        self.display_thread_info = enabled;
        self
    }

    /// Toggle span close events.
    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.enable_spans = enabled;
        self
    }
}

/// Initialize the global logging subscriber.
///
/// Call once at startup, before any log events are emitted. Fails if a
/// global subscriber is already installed.
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let filter = build_filter(&config);

    match config.format {
        LogFormat::Pretty => init_pretty_logging(config, filter),
        LogFormat::Json => init_json_logging(config, filter),
        LogFormat::Compact => init_compact_logging(config, filter),
    }
}

/// Build the filter: explicit directives win, otherwise the workspace
/// crates log at the configured level and dependencies stay at `warn`.
fn build_filter(config: &LoggingConfig) -> EnvFilter {
    if let Some(filter) = &config.filter {
        return EnvFilter::new(filter);
    }

    let level = config.level.to_string().to_lowercase();
    let directives = format!(
        "warn,core_playout={level},core_schedule={level},\
         core_runtime={level},bridge_traits={level}",
    );
    EnvFilter::new(directives)
}

fn span_events(config: &LoggingConfig) -> FmtSpan {
    if config.enable_spans {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    }
}

fn init_pretty_logging(config: LoggingConfig, filter: EnvFilter) -> Result<()> {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .pretty()
        .with_target(config.display_target)
        .with_thread_ids(config.display_thread_info)
        .with_thread_names(config.display_thread_info)
        .with_span_events(span_events(&config));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| Error::Config(format!("Failed to initialize pretty logging: {e}")))
}

fn init_json_logging(config: LoggingConfig, filter: EnvFilter) -> Result<()> {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_current_span(true)
        .with_target(config.display_target)
        .with_thread_ids(config.display_thread_info)
        .with_span_events(span_events(&config));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| Error::Config(format!("Failed to initialize JSON logging: {e}")))
}

fn init_compact_logging(config: LoggingConfig, filter: EnvFilter) -> Result<()> {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_target(config.display_target)
        .with_thread_ids(config.display_thread_info)
        .with_thread_names(config.display_thread_info)
        .with_span_events(span_events(&config));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| Error::Config(format!("Failed to initialize compact logging: {e}")))
}
