//! Fire-and-forget whoosh playback.
//!
//! [`WhooshPlayer::play`] probes the backend, opens a fresh session, renders
//! the recipe at the session's sample rate, starts playback, and schedules
//! the session's release. Every failure on that path is logged and
//! swallowed: the caller sees a silent no-op, never an error.

use super::session::{AudioBackend, Capability, OutputSession};
use super::whoosh::WhooshParams;
use crate::sequencer::Scheduler;
use std::rc::Rc;
use std::time::Duration;

/// Something the sequencer can sound at a point in a transition.
pub trait Cue {
    /// Starts the cue. Must not fail or block.
    fn play(&self, scheduler: &mut Scheduler);
}

/// Plays a procedurally synthesized whoosh on an [`AudioBackend`].
pub struct WhooshPlayer {
    backend: Rc<dyn AudioBackend>,
    params: WhooshParams,
}

impl WhooshPlayer {
    pub fn new(backend: Rc<dyn AudioBackend>, params: WhooshParams) -> Self {
        Self { backend, params }
    }

    pub fn params(&self) -> &WhooshParams {
        &self.params
    }
}

impl Cue for WhooshPlayer {
    fn play(&self, scheduler: &mut Scheduler) {
        if let Capability::Absent(reason) = self.backend.probe() {
            tracing::warn!(%reason, "Whoosh sound not available");
            return;
        }

        let mut session = match self.backend.open() {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(error = %e, "Whoosh sound not available");
                return;
            }
        };

        let samples = match self.params.render(session.sample_rate(), &mut rand::rng()) {
            Ok(samples) => samples,
            Err(e) => {
                tracing::warn!(error = %e, "Whoosh recipe rejected");
                release(session);
                return;
            }
        };

        if let Err(e) = session.play(samples) {
            tracing::warn!(error = %e, "Whoosh playback failed");
            release(session);
            return;
        }

        tracing::debug!(
            release_after_ms = self.params.release_after_ms,
            "whoosh started"
        );
        scheduler.schedule(
            Duration::from_millis(self.params.release_after_ms),
            move |_| release(session),
        );
    }
}

/// Closes a session, ignoring any failure.
fn release(session: Box<dyn OutputSession>) {
    if let Err(e) = session.close() {
        tracing::debug!(error = %e, "ignoring failure while releasing audio session");
    }
}
