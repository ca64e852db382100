//! Playback sessions: the live binding between the controller and one loaded
//! engine source.
//!
//! Exactly one session is live at a time. Starting a new one always releases
//! the previous engine handle first, and every engine event is checked against
//! the live session's handle so that callbacks from a torn-down source are
//! provably ignored.

use bridge_traits::audio::EngineHandle;
use std::fmt;

/// Monotonic generation counter identifying one session.
///
/// Generations only ever increase; a stale callback can name a dead session in
/// logs even after the controller has moved on several tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(u64);

impl SessionId {
    pub(crate) fn new(generation: u64) -> Self {
        Self(generation)
    }

    /// The raw generation number.
    pub fn generation(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// The live binding to one loaded engine source.
#[derive(Debug)]
pub struct PlaybackSession {
    /// Generation of this session.
    pub id: SessionId,
    /// Engine handle all commands and events for this session reference.
    pub handle: EngineHandle,
    /// A playback failure armed a replay that waits for the unlock signal.
    awaiting_unlock: bool,
    /// The single bounded replay has been spent; further playback failures
    /// are reported without retrying.
    unlock_retry_used: bool,
}

impl PlaybackSession {
    pub(crate) fn new(id: SessionId, handle: EngineHandle) -> Self {
        Self {
            id,
            handle,
            awaiting_unlock: false,
            unlock_retry_used: false,
        }
    }

    /// Arm the one deferred replay after a playback failure.
    ///
    /// Returns `false` when the replay has already been spent for this
    /// session: the caller reports the failure and stops retrying.
    pub(crate) fn arm_unlock_replay(&mut self) -> bool {
        if self.unlock_retry_used {
            return false;
        }
        self.unlock_retry_used = true;
        self.awaiting_unlock = true;
        true
    }

    /// Consume the armed replay on an unlock signal.
    ///
    /// Returns `true` exactly once per armed failure.
    pub(crate) fn take_unlock_replay(&mut self) -> bool {
        std::mem::take(&mut self.awaiting_unlock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlock_replay_is_single_shot() {
        let mut session = PlaybackSession::new(SessionId::new(1), EngineHandle::new(10));

        // First failure arms the replay.
        assert!(session.arm_unlock_replay());
        assert!(session.take_unlock_replay());
        // Consuming it twice yields nothing.
        assert!(!session.take_unlock_replay());

        // A second failure on the same session does not re-arm.
        assert!(!session.arm_unlock_replay());
        assert!(!session.take_unlock_replay());
    }

    #[test]
    fn unlock_without_failure_is_ignored() {
        let mut session = PlaybackSession::new(SessionId::new(2), EngineHandle::new(11));
        assert!(!session.take_unlock_replay());
    }

    #[test]
    fn session_id_display() {
        assert_eq!(SessionId::new(3).to_string(), "session-3");
        assert!(SessionId::new(1) < SessionId::new(2));
    }
}
