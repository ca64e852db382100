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

use bridge_traits::log::LogLevel;
use core_runtime::logging::{init_logging, strip_path, LogFormat, LoggingConfig};
use std::env;
use tracing::{debug, error, info, trace, warn};

fn main() {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let format = if args.len() > 1 {
        match args[1].as_str() {
            "json" => LogFormat::Json,
            "compact" => LogFormat::Compact,
            _ => LogFormat::Pretty,
        }
    } else {
        LogFormat::default()
    };

    let filter = args.get(2).cloned();

    let mut config = LoggingConfig::default()
        .with_format(format)
        .with_level(LogLevel::Trace)
        .with_spans(true)
        .with_target(true);

    if let Some(f) = filter {
        config = config.with_filter(f);
    }

    init_logging(config).expect("Failed to initialize logging");

    info!("=== Logging System Demo ===");
    info!(format = ?format, "Logging initialized");

    trace!("Trace-level message (poll ticks live here)");
    debug!(position_ms = 1500u64, "Debug-level message with fields");
    info!(
        media = %strip_path("https://media.example.com/tracks/song.mp3"),
        "Loading track"
    );
    warn!(track_id = "track-42", "Playback refused; waiting for unlock");
    error!(track_id = "track-42", "Media could not be loaded");
}
