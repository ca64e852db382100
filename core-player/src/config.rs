//! Player configuration.
//!
//! The defaults reproduce the transport behavior hosts ship with: volume at
//! 0.7, a 100 ms progress cadence, the 3-second rewind-vs-previous threshold,
//! and a 50 ms settle delay after a seek drag. The builder validates
//! fail-fast so a misconfigured host finds out at startup, not mid-playback.

use crate::error::{PlayerError, Result};
use std::time::Duration;

/// Default stored volume for a freshly constructed controller.
pub const DEFAULT_INITIAL_VOLUME: f32 = 0.7;

/// Default cadence of the position poller.
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_millis(100);

/// Position threshold separating "restart this track" from "go to the
/// previous track". Reproduced exactly; do not round.
pub const DEFAULT_REWIND_THRESHOLD: Duration = Duration::from_secs(3);

/// Delay between a seek-drag release and the poller resuming publication.
pub const DEFAULT_SEEK_DRAG_SETTLE: Duration = Duration::from_millis(50);

/// Player configuration.
///
/// Construct via [`PlayerConfig::builder`] or use [`Default`].
#[derive(Debug, Clone)]
pub struct PlayerConfig {
    /// Volume a new controller starts with, in `0.0..=1.0`.
    pub initial_volume: f32,
    /// Position poller cadence.
    pub progress_interval: Duration,
    /// The rewind-vs-previous threshold for the `previous` command.
    pub rewind_threshold: Duration,
    /// Settle delay after a seek-drag release.
    pub seek_drag_settle: Duration,
    /// Event bus buffer size.
    pub event_buffer_size: usize,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            initial_volume: DEFAULT_INITIAL_VOLUME,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            rewind_threshold: DEFAULT_REWIND_THRESHOLD,
            seek_drag_settle: DEFAULT_SEEK_DRAG_SETTLE,
            event_buffer_size: core_runtime::events::DEFAULT_EVENT_BUFFER_SIZE,
        }
    }
}

impl PlayerConfig {
    /// Start building a configuration from the defaults.
    pub fn builder() -> PlayerConfigBuilder {
        PlayerConfigBuilder::default()
    }
}

/// Builder for [`PlayerConfig`] with fail-fast validation.
#[derive(Debug, Default)]
pub struct PlayerConfigBuilder {
    config: PlayerConfig,
}

impl PlayerConfigBuilder {
    /// Set the initial volume (validated to `0.0..=1.0` on build).
    pub fn initial_volume(mut self, volume: f32) -> Self {
        self.config.initial_volume = volume;
        self
    }

    /// Set the position poller cadence.
    pub fn progress_interval(mut self, interval: Duration) -> Self {
        self.config.progress_interval = interval;
        self
    }

    /// Set the rewind-vs-previous threshold.
    pub fn rewind_threshold(mut self, threshold: Duration) -> Self {
        self.config.rewind_threshold = threshold;
        self
    }

    /// Set the seek-drag settle delay.
    pub fn seek_drag_settle(mut self, settle: Duration) -> Self {
        self.config.seek_drag_settle = settle;
        self
    }

    /// Set the event bus buffer size.
    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.config.event_buffer_size = size;
        self
    }

    /// Validate and produce the configuration.
    pub fn build(self) -> Result<PlayerConfig> {
        let config = self.config;

        if !(0.0..=1.0).contains(&config.initial_volume) {
            return Err(PlayerError::InvalidConfig(format!(
                "initial_volume must be within 0.0..=1.0, got {}",
                config.initial_volume
            )));
        }
        if config.progress_interval.is_zero() {
            return Err(PlayerError::InvalidConfig(
                "progress_interval must be non-zero".to_string(),
            ));
        }
        if config.event_buffer_size == 0 {
            return Err(PlayerError::InvalidConfig(
                "event_buffer_size must be non-zero".to_string(),
            ));
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_shipped_behavior() {
        let config = PlayerConfig::default();
        assert_eq!(config.initial_volume, 0.7);
        assert_eq!(config.progress_interval, Duration::from_millis(100));
        assert_eq!(config.rewind_threshold, Duration::from_secs(3));
        assert_eq!(config.seek_drag_settle, Duration::from_millis(50));
    }

    #[test]
    fn builder_overrides() {
        let config = PlayerConfig::builder()
            .initial_volume(0.5)
            .progress_interval(Duration::from_millis(250))
            .build()
            .unwrap();
        assert_eq!(config.initial_volume, 0.5);
        assert_eq!(config.progress_interval, Duration::from_millis(250));
    }

    #[test]
    fn builder_rejects_out_of_range_volume() {
        assert!(PlayerConfig::builder().initial_volume(1.5).build().is_err());
        assert!(PlayerConfig::builder().initial_volume(-0.1).build().is_err());
    }

    #[test]
    fn builder_rejects_zero_interval() {
        assert!(PlayerConfig::builder()
            .progress_interval(Duration::ZERO)
            .build()
            .is_err());
    }
}
