//! # Player Core
//!
//! The player/queue subsystem of the streaming client: one controller owning
//! the play queue, the live audio session, and the transport state, kept in
//! sync with a polled playback position.
//!
//! ## Overview
//!
//! This crate provides:
//! - Transport commands (play single/queue, toggle, next/previous, seek, volume)
//! - Queue traversal with auto-advance on natural track completion
//! - Single-flight session management (at most one engine source holds device
//!   audio output; superseding a session releases the previous handle)
//! - Stale-callback protection: engine events from torn-down sessions are
//!   provably discarded
//! - A bounded autoplay-unlock replay (exactly one retry per session)
//! - A 100 ms position poller that suspends while the user drags a seek control
//!
//! ## Architecture
//!
//! `core-player` is platform-agnostic. The actual audio primitive is injected
//! as a [`bridge_traits::audio::AudioEngine`]; state changes are published on a
//! [`core_runtime::events::EventBus`] that host UIs subscribe to. The
//! controller is a plain synchronous struct: hosts put it behind a mutex and
//! feed engine events into [`PlayerController::handle_engine_event`], which
//! `core-service` wires up ready-made.
//!
//! ```text
//!  UI commands ──────────> PlayerController ──────> AudioEngine (host)
//!                            │        ▲                  │
//!               state events │        └── engine events ──┘
//!                            ▼
//!                         EventBus ──────> host UI
//!                            ▲
//!          PositionPoller ───┘  (100 ms position/duration samples)
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use core_player::{PlayerController, PlayerConfig, TrackDescriptor};
//! use core_runtime::events::EventBus;
//!
//! let config = PlayerConfig::default();
//! let bus = EventBus::new(config.event_buffer_size);
//! let mut controller = PlayerController::new(engine, engine_events, bus.clone(), &config);
//!
//! let tracks = vec![
//!     TrackDescriptor::new("1", "First", "Artist", "https://media.example.com/1.mp3"),
//!     TrackDescriptor::new("2", "Second", "Artist", "https://media.example.com/2.mp3"),
//! ];
//! controller.play_queue(tracks, 0);
//! controller.next();
//! controller.toggle_play_pause();
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod poller;
pub mod queue;
pub mod session;
pub mod types;

pub use config::{PlayerConfig, PlayerConfigBuilder};
pub use controller::PlayerController;
pub use error::{PlayerError, Result};
pub use poller::{PositionPoller, SeekDragState};
pub use queue::TrackQueue;
pub use session::{PlaybackSession, SessionId};
pub use types::{PlaybackProgress, PlaybackState, TrackDescriptor};
