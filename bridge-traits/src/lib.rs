//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the player core and platform-specific
//! implementations. Each trait represents a capability the core requires but that
//! must be implemented differently per platform (desktop, web, mobile).
//!
//! ## Traits
//!
//! ### Audio
//! - [`AudioEngine`](audio::AudioEngine) - Single-output audio playback primitive
//!   (load, play, pause, seek, volume, release) with event-based completion and
//!   error reporting
//!
//! ### Utilities
//! - [`LoggerSink`](log::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! Each supported platform ships a concrete [`AudioEngine`](audio::AudioEngine)
//! adapter: an HTML5 audio / Web Audio wrapper on the web, a native media engine
//! on desktop. The core never talks to device audio directly.
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type for
//! consistent error handling. Platform implementations should:
//!
//! - Convert platform-specific errors to `BridgeError`
//! - Provide actionable error messages
//! - Report asynchronous failures (decode errors, autoplay refusals) through
//!   the engine event sink, never by panicking
//!
//! ## Thread Safety
//!
//! On native targets bridge traits require `Send + Sync` to support usage across
//! async tasks. WebAssembly builds relax those bounds via the marker traits in
//! [`platform`].

pub mod audio;
pub mod error;
pub mod log;
pub mod platform;

pub use error::BridgeError;

// Re-export commonly used types
pub use audio::{AudioEngine, EngineEvent, EngineEventKind, EngineEventSink, EngineHandle};
pub use log::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
