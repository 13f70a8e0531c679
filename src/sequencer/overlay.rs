//! The full-screen transition overlay.

use std::cell::RefCell;
use std::rc::Rc;

/// Visible/hidden flag plus the message shown while visible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlayState {
    pub visible: bool,
    pub message: String,
}

/// Handle to the overlay state, created once at startup and passed to
/// everything that shows or hides the overlay.
///
/// Clones share one state. Writes are last-write-wins.
#[derive(Debug, Clone, Default)]
pub struct OverlayController {
    state: Rc<RefCell<OverlayState>>,
}

impl OverlayController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shows the overlay with `message`.
    pub fn show(&self, message: impl Into<String>) {
        let mut state = self.state.borrow_mut();
        state.visible = true;
        state.message = message.into();
        tracing::debug!(message = %state.message, "overlay shown");
    }

    /// Hides the overlay. The last message is kept for fade-out rendering.
    pub fn hide(&self) {
        self.state.borrow_mut().visible = false;
        tracing::debug!("overlay hidden");
    }

    pub fn is_visible(&self) -> bool {
        self.state.borrow().visible
    }

    pub fn message(&self) -> String {
        self.state.borrow().message.clone()
    }

    /// A copy of the current state for rendering.
    pub fn snapshot(&self) -> OverlayState {
        self.state.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_then_hide() {
        let overlay = OverlayController::new();
        assert!(!overlay.is_visible());

        overlay.show("Respawning... 💀");
        assert!(overlay.is_visible());
        assert_eq!(overlay.message(), "Respawning... 💀");

        overlay.hide();
        assert!(!overlay.is_visible());
    }

    #[test]
    fn test_clones_share_state() {
        let overlay = OverlayController::new();
        let ui_handle = overlay.clone();
        overlay.show("Equipping Gear 🔫");
        assert_eq!(
            ui_handle.snapshot(),
            OverlayState {
                visible: true,
                message: "Equipping Gear 🔫".to_string()
            }
        );
    }
}
