//! Click interception for outbound links.
//!
//! Only plain primary clicks on outbound links start a transition. A click
//! that asks for a new context (ctrl/cmd held, or any button other than
//! the primary one) keeps the host's default behavior, as do in-page
//! anchors and links that opt out.

use super::navigation::OpenMode;
use super::scheduler::Scheduler;
use super::transition::{Sequencer, TransitionHandle};
use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Overlay message used when the configured list is empty.
const FALLBACK_MESSAGE: &str = "Loading...";

/// An outbound link on the landing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Text shown for the link.
    pub label: String,
    /// Destination.
    pub href: String,
    /// HTML-style target; `_blank` opens a new tab.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Opts the link out of the overlay sequence.
    #[serde(default)]
    pub no_overlay: bool,
}

impl Link {
    pub fn new(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: href.into(),
            target: None,
            no_overlay: false,
        }
    }

    /// Sets the target to `_blank`.
    pub fn in_new_tab(mut self) -> Self {
        self.target = Some("_blank".to_string());
        self
    }

    /// Whether clicks on this link may be intercepted at all.
    pub fn is_interceptable(&self) -> bool {
        !self.href.starts_with('#') && !self.no_overlay
    }

    pub fn open_mode(&self) -> OpenMode {
        OpenMode::from_target(self.target.as_deref())
    }
}

/// Which pointer button produced a click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClickButton {
    #[default]
    Primary,
    Middle,
    Secondary,
}

/// A click with its modifier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Click {
    pub button: ClickButton,
    pub ctrl: bool,
    pub meta: bool,
}

impl Click {
    /// A plain primary click with no modifiers.
    pub fn primary() -> Self {
        Self::default()
    }

    /// A ctrl-click, the usual "open in new tab" gesture.
    pub fn with_ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::default()
        }
    }

    pub fn middle() -> Self {
        Self {
            button: ClickButton::Middle,
            ..Self::default()
        }
    }

    /// Whether the user explicitly asked for a new context.
    pub fn requests_new_context(&self) -> bool {
        self.ctrl || self.meta || self.button != ClickButton::Primary
    }
}

/// What happened to a click.
#[derive(Debug, Clone)]
pub enum ClickOutcome {
    /// A transition was started.
    Intercepted(TransitionHandle),
    /// The click was left alone; the host should do its default action.
    Default,
}

impl ClickOutcome {
    pub fn is_intercepted(&self) -> bool {
        matches!(self, ClickOutcome::Intercepted(_))
    }
}

/// Decides which clicks start a transition and with which message.
#[derive(Debug, Clone)]
pub struct LinkInterceptor {
    messages: Vec<String>,
}

impl LinkInterceptor {
    pub fn new(messages: Vec<String>) -> Self {
        Self { messages }
    }

    /// Whether `click` on `link` should start a transition.
    pub fn should_intercept(link: &Link, click: &Click) -> bool {
        link.is_interceptable() && !click.requests_new_context()
    }

    /// Picks an overlay message uniformly at random.
    pub fn pick_message<R: Rng>(&self, rng: &mut R) -> &str {
        self.messages
            .choose(rng)
            .map(String::as_str)
            .unwrap_or(FALLBACK_MESSAGE)
    }

    /// Handles a click, starting a transition if it qualifies.
    pub fn handle_click<R: Rng>(
        &self,
        sequencer: &mut Sequencer,
        scheduler: &mut Scheduler,
        link: &Link,
        click: &Click,
        rng: &mut R,
    ) -> ClickOutcome {
        if !Self::should_intercept(link, click) {
            tracing::debug!(href = %link.href, ?click, "click left to default behavior");
            return ClickOutcome::Default;
        }
        let message = self.pick_message(rng).to_string();
        let handle =
            sequencer.trigger_transition(scheduler, &link.href, link.open_mode(), &message);
        ClickOutcome::Intercepted(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::Cue;
    use crate::config::{Config, Timings};
    use crate::sequencer::navigation::LoggingHost;
    use crate::sequencer::{ManualClock, OverlapPolicy, OverlayController};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Default)]
    struct CountingCue(Cell<usize>);

    impl Cue for CountingCue {
        fn play(&self, _scheduler: &mut Scheduler) {
            self.0.set(self.0.get() + 1);
        }
    }

    fn setup() -> (LinkInterceptor, Sequencer, Scheduler, Rc<CountingCue>) {
        let cue = Rc::new(CountingCue::default());
        let sequencer = Sequencer::new(
            OverlayController::new(),
            Rc::new(LoggingHost),
            cue.clone(),
            Timings::default(),
            OverlapPolicy::default(),
        );
        let scheduler = Scheduler::new(Rc::new(ManualClock::new()));
        let interceptor = LinkInterceptor::new(Config::default().messages);
        (interceptor, sequencer, scheduler, cue)
    }

    #[test]
    fn test_plain_primary_click_is_intercepted() {
        let link = Link::new("YouTube", "https://example.com");
        assert!(LinkInterceptor::should_intercept(&link, &Click::primary()));
    }

    #[test]
    fn test_new_context_clicks_bypass() {
        let link = Link::new("YouTube", "https://example.com");
        let meta = Click {
            meta: true,
            ..Click::default()
        };
        let secondary = Click {
            button: ClickButton::Secondary,
            ..Click::default()
        };
        for click in [Click::with_ctrl(), meta, Click::middle(), secondary] {
            assert!(!LinkInterceptor::should_intercept(&link, &click), "{click:?}");
        }
    }

    #[test]
    fn test_anchors_and_opt_outs_bypass() {
        let anchor = Link::new("Shop", "#shop");
        let opted_out = Link {
            no_overlay: true,
            ..Link::new("Docs", "https://example.com/docs")
        };
        assert!(!LinkInterceptor::should_intercept(&anchor, &Click::primary()));
        assert!(!LinkInterceptor::should_intercept(&opted_out, &Click::primary()));
    }

    #[test]
    fn test_open_mode_follows_target() {
        assert_eq!(Link::new("a", "https://a").open_mode(), OpenMode::SameTab);
        assert_eq!(
            Link::new("a", "https://a").in_new_tab().open_mode(),
            OpenMode::NewTab
        );
    }

    #[test]
    fn test_intercepted_click_shows_configured_message() {
        let (interceptor, mut sequencer, mut scheduler, cue) = setup();
        let mut rng = StdRng::seed_from_u64(3);
        let link = Link::new("Discord", "https://example.com");

        let outcome =
            interceptor.handle_click(&mut sequencer, &mut scheduler, &link, &Click::primary(), &mut rng);

        assert!(outcome.is_intercepted());
        let overlay = sequencer.overlay();
        assert!(overlay.is_visible());
        assert!(Config::default().messages.contains(&overlay.message()));

        scheduler.run_until_idle();
        assert_eq!(cue.0.get(), 1);
        assert!(!overlay.is_visible());
    }

    #[test]
    fn test_modifier_click_starts_nothing() {
        let (interceptor, mut sequencer, mut scheduler, cue) = setup();
        let mut rng = StdRng::seed_from_u64(3);
        let link = Link::new("Discord", "https://example.com").in_new_tab();

        let outcome = interceptor.handle_click(
            &mut sequencer,
            &mut scheduler,
            &link,
            &Click::with_ctrl(),
            &mut rng,
        );

        assert!(!outcome.is_intercepted());
        assert!(!sequencer.overlay().is_visible());
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(cue.0.get(), 0);
    }

    #[test]
    fn test_empty_message_list_uses_fallback() {
        let interceptor = LinkInterceptor::new(Vec::new());
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(interceptor.pick_message(&mut rng), FALLBACK_MESSAGE);
    }

    #[test]
    fn test_messages_are_picked_across_the_whole_list() {
        let messages = Config::default().messages;
        let interceptor = LinkInterceptor::new(messages.clone());
        let mut rng = StdRng::seed_from_u64(3);

        let picked: std::collections::HashSet<String> = (0..200)
            .map(|_| interceptor.pick_message(&mut rng).to_string())
            .collect();

        assert!(picked.iter().all(|m| messages.contains(m)));
        assert!(picked.len() > 1);
    }
}
