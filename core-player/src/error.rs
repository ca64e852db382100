//! Player error types.
//!
//! Engine-level failures (load errors, autoplay refusals) are never surfaced
//! through these types: they arrive asynchronously as engine events and are
//! reported via logging and `PlayerEvent::Error`. `PlayerError` covers the
//! synchronous, caller-facing failures only.

use thiserror::Error;

/// Errors that can occur constructing or wiring the player.
#[derive(Error, Debug)]
pub enum PlayerError {
    /// Player configuration failed validation.
    #[error("Invalid player configuration: {0}")]
    InvalidConfig(String),

    /// A bridge capability misbehaved during setup.
    #[error("Bridge error: {0}")]
    Bridge(#[from] bridge_traits::BridgeError),
}

/// Result type for player operations.
pub type Result<T> = std::result::Result<T, PlayerError>;
