//! Timed overlay-and-navigate sequences.
//!
//! A link transition runs:
//!
//! ```text
//! t = 0                  show overlay with message
//! t = whoosh delay       play the whoosh cue
//! t = navigation delay   navigate (same tab or new tab)
//!   + hide delay         hide overlay, whether or not navigation happened
//! ```
//!
//! A deep-link transition shows the overlay, schedules the whoosh, and
//! tries the app URI right away. After the check delay it compares the
//! elapsed time against a threshold: if little time has passed, the page
//! was evidently not suspended by an app taking over, so the web fallback
//! is opened. This is a heuristic and will misfire on hosts that swallow
//! the URI without any timing signal.

use super::navigation::{NavigationHost, OpenMode};
use super::overlay::OverlayController;
use super::scheduler::{CancellationToken, Scheduler};
use crate::audio::Cue;
use crate::config::Timings;
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use std::time::Duration;

/// What happens when a transition starts while another is still pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPolicy {
    /// Both sequences run to completion. The overlay is last-write-wins,
    /// so a later hide can hide the overlay of a still-pending navigation.
    #[default]
    LastWriteWins,
    /// Starting a sequence cancels every pending step of the previous one.
    Supersede,
}

/// Handle to one running sequence.
#[derive(Debug, Clone)]
pub struct TransitionHandle {
    token: CancellationToken,
    overlay: OverlayController,
}

impl TransitionHandle {
    /// Cancels every step of this sequence that has not run yet and hides
    /// the overlay, since the hide step is among the cancelled ones.
    pub fn cancel(&self) {
        self.token.cancel();
        self.overlay.hide();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Drives the overlay, the whoosh cue, and the navigation host.
pub struct Sequencer {
    overlay: OverlayController,
    host: Rc<dyn NavigationHost>,
    cue: Rc<dyn Cue>,
    timings: Timings,
    policy: OverlapPolicy,
    current: Option<TransitionHandle>,
}

impl Sequencer {
    pub fn new(
        overlay: OverlayController,
        host: Rc<dyn NavigationHost>,
        cue: Rc<dyn Cue>,
        timings: Timings,
        policy: OverlapPolicy,
    ) -> Self {
        Self {
            overlay,
            host,
            cue,
            timings,
            policy,
            current: None,
        }
    }

    pub fn overlay(&self) -> &OverlayController {
        &self.overlay
    }

    pub fn timings(&self) -> &Timings {
        &self.timings
    }

    /// Shows the overlay, plays the whoosh, then navigates to `url`.
    ///
    /// Returns immediately; every later step is a scheduled task.
    pub fn trigger_transition(
        &mut self,
        scheduler: &mut Scheduler,
        url: &str,
        mode: OpenMode,
        message: &str,
    ) -> TransitionHandle {
        let handle = self.begin();
        let token = handle.token.clone();

        tracing::info!(%url, ?mode, "transition started");
        self.overlay.show(message);
        self.schedule_cue(scheduler, &token, self.timings.transition_whoosh_delay());

        let host = Rc::clone(&self.host);
        let overlay = self.overlay.clone();
        let url = url.to_string();
        let hide_delay = self.timings.hide_delay();
        let hide_token = token.clone();
        scheduler.schedule_with(&token, self.timings.navigation_delay(), move |s| {
            if let Err(e) = host.open(&url, mode) {
                tracing::warn!(error = %e, "navigation did not happen");
            }
            s.schedule_with(&hide_token, hide_delay, move |_| overlay.hide());
        });

        handle
    }

    /// Shows the overlay with `message`, tries `app_uri`, and falls back to
    /// `web_fallback_url` in a new tab if the page still looks alive.
    pub fn trigger_deep_link(
        &mut self,
        scheduler: &mut Scheduler,
        app_uri: &str,
        web_fallback_url: &str,
        message: &str,
    ) -> TransitionHandle {
        let handle = self.begin();
        let token = handle.token.clone();

        tracing::info!(%app_uri, %web_fallback_url, "deep link started");
        self.overlay.show(message);
        self.schedule_cue(scheduler, &token, self.timings.deep_link_whoosh_delay());

        let started = scheduler.now();
        if let Err(e) = self.host.navigate_to_uri(app_uri) {
            tracing::warn!(error = %e, "deep link did not open");
        }

        let host = Rc::clone(&self.host);
        let overlay = self.overlay.clone();
        let fallback = web_fallback_url.to_string();
        let threshold = self.timings.deep_link_threshold();
        let hide_delay = self.timings.hide_delay();
        let hide_token = token.clone();
        scheduler.schedule_with(&token, self.timings.deep_link_check_delay(), move |s| {
            let elapsed = s.now().saturating_sub(started);
            if elapsed < threshold {
                tracing::info!(?elapsed, "app did not take over, opening web fallback");
                if let Err(e) = host.open_new_tab(&fallback) {
                    tracing::warn!(error = %e, "web fallback did not open");
                }
            } else {
                tracing::info!(?elapsed, "app took over, skipping web fallback");
            }
            s.schedule_with(&hide_token, hide_delay, move |_| overlay.hide());
        });

        handle
    }

    fn begin(&mut self) -> TransitionHandle {
        if self.policy == OverlapPolicy::Supersede {
            // The new sequence shows the overlay itself, so only the steps are cancelled.
            if let Some(previous) = self.current.take() {
                previous.token.cancel();
            }
        }
        let handle = TransitionHandle {
            token: CancellationToken::new(),
            overlay: self.overlay.clone(),
        };
        self.current = Some(handle.clone());
        handle
    }

    fn schedule_cue(&self, scheduler: &mut Scheduler, token: &CancellationToken, delay: Duration) {
        let cue = Rc::clone(&self.cue);
        scheduler.schedule_with(token, delay, move |s| cue.play(s));
    }
}
