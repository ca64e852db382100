//! Position poller: periodic sampling of the live session's position and
//! duration for progress display.
//!
//! The poller is a pure read-side concern. Every tick it takes the controller
//! lock, reads one [`progress_sample`](crate::PlayerController::progress_sample),
//! and republishes it as a [`ProgressEvent`]: it never mutates controller
//! state. Sampling is suspended while the user drags a seek control so the
//! polled position does not fight the drag position visually; the host sets
//! the flag on drag-start and releases it with a short settle delay after
//! drag-release.
//!
//! Lifecycle is explicit: the service starts a poller when a session begins
//! and stops it when playback stops. A poller whose session disappears
//! between ticks simply publishes nothing until stopped.

use crate::controller::PlayerController;

use core_runtime::events::{CoreEvent, EventBus, ProgressEvent};

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::trace;

/// Shared "the user is dragging the seek control" flag.
///
/// Cloned between the host UI (which drives it) and the poller (which only
/// reads it).
#[derive(Debug, Clone, Default)]
pub struct SeekDragState {
    dragging: Arc<AtomicBool>,
}

impl SeekDragState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a drag as started; the poller stops publishing immediately.
    pub fn begin(&self) {
        self.dragging.store(true, Ordering::Release);
    }

    /// Clear the flag after `settle`: the poller resumes once the engine has
    /// had a moment to honor the final drag position.
    ///
    /// Must be called from within a tokio runtime.
    pub fn release(&self, settle: Duration) {
        let dragging = Arc::clone(&self.dragging);
        tokio::spawn(async move {
            tokio::time::sleep(settle).await;
            dragging.store(false, Ordering::Release);
        });
    }

    /// Clear the flag immediately.
    pub fn clear(&self) {
        self.dragging.store(false, Ordering::Release);
    }

    /// Whether a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        self.dragging.load(Ordering::Acquire)
    }
}

/// Handle to a running poller task. Aborts the task on [`stop`](Self::stop)
/// or drop.
#[derive(Debug)]
pub struct PositionPoller {
    task: JoinHandle<()>,
}

impl PositionPoller {
    /// Spawn a poller sampling `controller` every `interval`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        controller: Arc<Mutex<PlayerController>>,
        seek_drag: SeekDragState,
        bus: EventBus,
        interval: Duration,
    ) -> Self {
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;

                if seek_drag.is_dragging() {
                    trace!("seek drag in progress; skipping poll tick");
                    continue;
                }

                // Read under the lock, publish outside it.
                let sample = controller.lock().progress_sample();

                if let Some((track_id, progress)) = sample {
                    bus.emit(CoreEvent::Progress(ProgressEvent::PositionChanged {
                        track_id,
                        position_ms: progress.position.as_millis() as u64,
                        duration_ms: progress.duration.map(|d| d.as_millis() as u64),
                    }))
                    .ok();
                }
            }
        });
        Self { task }
    }

    /// Stop sampling. Idempotent; dropping the poller has the same effect.
    pub fn stop(&self) {
        self.task.abort();
    }

    /// Whether the underlying task has exited.
    pub fn is_stopped(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for PositionPoller {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seek_drag_flag_toggles() {
        let drag = SeekDragState::new();
        assert!(!drag.is_dragging());
        drag.begin();
        assert!(drag.is_dragging());
        drag.clear();
        assert!(!drag.is_dragging());
    }

    #[tokio::test]
    async fn seek_drag_release_settles() {
        let drag = SeekDragState::new();
        drag.begin();
        drag.release(Duration::from_millis(10));
        // Still set right after release; cleared once the settle elapses.
        assert!(drag.is_dragging());
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!drag.is_dragging());
    }
}
