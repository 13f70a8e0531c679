//! Overlay and navigation sequencing.
//!
//! Everything here is single-threaded and timer-driven: triggering a
//! transition enqueues tasks on a [`Scheduler`], and whoever owns the
//! scheduler runs them as they come due.

pub mod clock;
pub mod intercept;
pub mod navigation;
pub mod overlay;
pub mod scheduler;
pub mod transition;

pub use clock::{Clock, ManualClock, SystemClock};
pub use intercept::{Click, ClickButton, ClickOutcome, Link, LinkInterceptor};
pub use navigation::{BrowserHost, LoggingHost, NavigationHost, OpenMode};
pub use overlay::{OverlayController, OverlayState};
pub use scheduler::{CancellationToken, Scheduler, TaskId};
pub use transition::{OverlapPolicy, Sequencer, TransitionHandle};
