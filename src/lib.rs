//! Workspace placeholder crate.
//!
//! This crate exists to expose shared feature flags that map to the individual
//! workspace crates (e.g., `core-service`, `core-player`). Host applications
//! can depend on `player-workspace` and enable the documented features without
//! needing to wire each crate individually.

#[cfg(feature = "player-only")]
pub use core_player as player;
#[cfg(feature = "service")]
pub use core_service as service;
