//! Where a transition ends up: the navigation host.

use crate::error::NavigationError;
use serde::{Deserialize, Serialize};
use webbrowser::{Browser, BrowserOptions};

/// How a link opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OpenMode {
    /// Replace the current location.
    #[default]
    SameTab,
    /// Open a new browsing context with no reference back to the opener.
    NewTab,
}

impl OpenMode {
    /// Maps an HTML-style `target` attribute to an open mode.
    pub fn from_target(target: Option<&str>) -> Self {
        match target {
            Some("_blank") => OpenMode::NewTab,
            _ => OpenMode::SameTab,
        }
    }
}

/// The outside world a transition navigates into.
///
/// Hosts may silently ignore a request (a pop-up blocker, an app that does
/// not claim a URI scheme). Callers must not rely on navigation happening.
pub trait NavigationHost {
    /// Replaces the current location with `url`.
    fn navigate_same_tab(&self, url: &str) -> Result<(), NavigationError>;

    /// Opens `url` in a new context that has no access to its opener.
    fn open_new_tab(&self, url: &str) -> Result<(), NavigationError>;

    /// Hands `uri` to whatever application claims its scheme.
    fn navigate_to_uri(&self, uri: &str) -> Result<(), NavigationError>;

    /// Dispatches on `mode`.
    fn open(&self, url: &str, mode: OpenMode) -> Result<(), NavigationError> {
        match mode {
            OpenMode::SameTab => self.navigate_same_tab(url),
            OpenMode::NewTab => self.open_new_tab(url),
        }
    }
}

/// Opens URLs in the system's default browser.
///
/// A terminal has no "current page" to replace, so same-tab requests are
/// passed to the browser with a `_self` target hint and new-tab requests
/// with `_blank`; the browser process never gets a handle back to us.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserHost;

impl BrowserHost {
    pub fn new() -> Self {
        Self
    }

    fn launch(&self, url: &str, target_hint: &str) -> Result<(), NavigationError> {
        let mut options = BrowserOptions::new();
        options.with_target_hint(target_hint).with_suppress_output(true);
        webbrowser::open_browser_with_options(Browser::Default, url, &options).map_err(|e| {
            NavigationError::Blocked {
                target: url.to_string(),
                reason: e.to_string(),
            }
        })
    }
}

impl NavigationHost for BrowserHost {
    fn navigate_same_tab(&self, url: &str) -> Result<(), NavigationError> {
        self.launch(url, "_self")
    }

    fn open_new_tab(&self, url: &str) -> Result<(), NavigationError> {
        self.launch(url, "_blank")
    }

    fn navigate_to_uri(&self, uri: &str) -> Result<(), NavigationError> {
        self.launch(uri, "_self")
    }
}

/// Logs navigations instead of performing them (`--dry-run`).
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHost;

impl NavigationHost for LoggingHost {
    fn navigate_same_tab(&self, url: &str) -> Result<(), NavigationError> {
        tracing::info!(%url, "navigate (same tab)");
        Ok(())
    }

    fn open_new_tab(&self, url: &str) -> Result<(), NavigationError> {
        tracing::info!(%url, "open (new tab, noopener)");
        Ok(())
    }

    fn navigate_to_uri(&self, uri: &str) -> Result<(), NavigationError> {
        tracing::info!(%uri, "deep link");
        Ok(())
    }
}
