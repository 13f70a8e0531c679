//! Application state and event handling.
//!
//! This module ties the landing links, the transition sequencer, the
//! whoosh cue and the shop together for the TUI.

use crate::audio::{AudioBackend, WhooshPlayer};
use crate::config::Config;
use crate::sequencer::{
    Click, ClickOutcome, Clock, LinkInterceptor, NavigationHost, OpenMode, OverlayController,
    OverlayState, Scheduler, Sequencer, TransitionHandle,
};
use crate::shop::{Message, Product, ProductDraft, Shop, ShopView};
use ratatui::layout::{Position, Rect};
use std::rc::Rc;
use std::time::{Duration, Instant};

/// How long a status message stays on screen.
const STATUS_DURATION: Duration = Duration::from_secs(3);

/// Longest wait for input between frames.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Which panel has keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusedPanel {
    #[default]
    Links,
    Shop,
    Mailbox,
}

/// Screen areas recorded during rendering, for mouse hit testing.
#[derive(Debug, Clone, Default)]
pub struct LayoutRegions {
    /// Rows of the link list, one link per row.
    pub links: Rect,
    /// Rows of the product list, one product per row.
    pub products: Rect,
    /// Rows of the mailbox, one message per row.
    pub messages: Rect,
}

impl LayoutRegions {
    fn row_in(area: Rect, x: u16, y: u16) -> Option<usize> {
        area.contains(Position::new(x, y))
            .then(|| (y - area.y) as usize)
    }

    pub fn link_at(&self, x: u16, y: u16) -> Option<usize> {
        Self::row_in(self.links, x, y)
    }

    pub fn product_at(&self, x: u16, y: u16) -> Option<usize> {
        Self::row_in(self.products, x, y)
    }

    pub fn message_at(&self, x: u16, y: u16) -> Option<usize> {
        Self::row_in(self.messages, x, y)
    }
}

/// State for the login dialog.
#[derive(Debug, Clone, Default)]
pub struct LoginDialogState {
    pub open: bool,
    pub username: String,
    /// The "I follow @admin" checkbox.
    pub follows: bool,
}

/// Field being edited in the product dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductField {
    #[default]
    Title,
    Price,
    Image,
    Desc,
}

impl ProductField {
    pub fn next(self) -> Self {
        match self {
            ProductField::Title => ProductField::Price,
            ProductField::Price => ProductField::Image,
            ProductField::Image => ProductField::Desc,
            ProductField::Desc => ProductField::Title,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ProductField::Title => "Title",
            ProductField::Price => "Price",
            ProductField::Image => "Image",
            ProductField::Desc => "Description",
        }
    }
}

/// State for the add/edit product dialog.
#[derive(Debug, Clone, Default)]
pub struct ProductDialogState {
    pub open: bool,
    /// Id of the product being edited; `None` when adding.
    pub editing: Option<String>,
    pub draft: ProductDraft,
    pub field: ProductField,
}

impl ProductDialogState {
    pub fn field_mut(&mut self, field: ProductField) -> &mut String {
        match field {
            ProductField::Title => &mut self.draft.title,
            ProductField::Price => &mut self.draft.price,
            ProductField::Image => &mut self.draft.image,
            ProductField::Desc => &mut self.draft.desc,
        }
    }
}

/// Who a DM dialog writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DmTarget {
    /// A visitor asking the admin about a product.
    Product { id: String, title: String },
    /// The admin answering a visitor.
    Reply { message_id: String, to: String },
}

/// State for the DM dialog.
#[derive(Debug, Clone, Default)]
pub struct DmDialogState {
    pub open: bool,
    pub target: Option<DmTarget>,
    pub text: String,
}

/// Main application state.
pub struct App {
    pub config: Config,
    scheduler: Scheduler,
    sequencer: Sequencer,
    interceptor: LinkInterceptor,
    host: Rc<dyn NavigationHost>,
    pub shop: Shop,
    /// Catalog as last loaded from the shop.
    pub products: Vec<Product>,
    /// Mailbox as last loaded from the shop.
    pub messages: Vec<Message>,
    pub focus: FocusedPanel,
    pub selected_link: usize,
    pub selected_product: usize,
    pub selected_message: usize,
    pub login_dialog: LoginDialogState,
    pub product_dialog: ProductDialogState,
    pub dm_dialog: DmDialogState,
    pub show_help: bool,
    pub status_message: Option<(String, Instant)>,
    pub layout: LayoutRegions,
    last_transition: Option<TransitionHandle>,
}

impl App {
    /// Creates the application.
    ///
    /// # Arguments
    ///
    /// * `config` - Loaded configuration
    /// * `clock` - Time source for the transition scheduler
    /// * `host` - Where links navigate to
    /// * `audio` - Output for the whoosh cue
    /// * `shop` - The opened shop
    pub fn new(
        config: Config,
        clock: Rc<dyn Clock>,
        host: Rc<dyn NavigationHost>,
        audio: Rc<dyn AudioBackend>,
        shop: Shop,
    ) -> Self {
        let cue = Rc::new(WhooshPlayer::new(audio, config.whoosh.clone()));
        let sequencer = Sequencer::new(
            OverlayController::new(),
            Rc::clone(&host),
            cue,
            config.timings.clone(),
            config.overlap_policy,
        );
        let interceptor = LinkInterceptor::new(config.messages.clone());

        let mut app = Self {
            config,
            scheduler: Scheduler::new(clock),
            sequencer,
            interceptor,
            host,
            shop,
            products: Vec::new(),
            messages: Vec::new(),
            focus: FocusedPanel::default(),
            selected_link: 0,
            selected_product: 0,
            selected_message: 0,
            login_dialog: LoginDialogState::default(),
            product_dialog: ProductDialogState::default(),
            dm_dialog: DmDialogState::default(),
            show_help: false,
            status_message: None,
            layout: LayoutRegions::default(),
            last_transition: None,
        };
        app.refresh();
        app
    }

    pub fn overlay(&self) -> OverlayState {
        self.sequencer.overlay().snapshot()
    }

    /// Runs due transition steps and expires the status line.
    pub fn tick(&mut self) {
        self.scheduler.run_due();
        self.clear_expired_status();
    }

    /// How long the event loop may block on input before the next step is due.
    pub fn poll_timeout(&self) -> Duration {
        let now = self.scheduler.now();
        self.scheduler
            .next_due()
            .map_or(FRAME_INTERVAL, |due| {
                due.saturating_sub(now).min(FRAME_INTERVAL)
            })
    }

    /// Whether a dialog or popup is capturing input.
    pub fn has_modal(&self) -> bool {
        self.show_help || self.login_dialog.open || self.product_dialog.open || self.dm_dialog.open
    }

    /// Sets a status message to display temporarily.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some((message.into(), Instant::now()));
    }

    /// Clears expired status messages.
    pub fn clear_expired_status(&mut self) {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed() >= STATUS_DURATION {
                self.status_message = None;
            }
        }
    }

    /// Reloads the catalog and mailbox and clamps the selections.
    pub fn refresh(&mut self) {
        match self.shop.products() {
            Ok(products) => self.products = products,
            Err(e) => {
                tracing::error!(error = %e, "failed to load products");
                self.set_status(format!("Could not load products: {}", e));
            }
        }
        match self.shop.messages() {
            Ok(messages) => self.messages = messages,
            Err(e) => {
                tracing::error!(error = %e, "failed to load messages");
                self.set_status(format!("Could not load messages: {}", e));
            }
        }
        self.selected_product = self.selected_product.min(self.products.len().saturating_sub(1));
        self.selected_message = self.selected_message.min(self.messages.len().saturating_sub(1));
    }

    /// The panels the current visitor can focus, in Tab order.
    fn focusable_panels(&self) -> Vec<FocusedPanel> {
        let mut panels = vec![FocusedPanel::Links, FocusedPanel::Shop];
        if self.shop.is_admin() {
            panels.push(FocusedPanel::Mailbox);
        }
        panels
    }

    pub fn cycle_focus(&mut self) {
        let panels = self.focusable_panels();
        let index = panels.iter().position(|p| *p == self.focus).unwrap_or(0);
        self.focus = panels[(index + 1) % panels.len()];
    }

    /// Moves the selection in the focused panel by `delta` rows.
    pub fn move_selection(&mut self, delta: isize) {
        let (selected, len) = match self.focus {
            FocusedPanel::Links => (&mut self.selected_link, self.config.links.len()),
            FocusedPanel::Shop => (&mut self.selected_product, self.products.len()),
            FocusedPanel::Mailbox => (&mut self.selected_message, self.messages.len()),
        };
        if len == 0 {
            return;
        }
        *selected = selected.saturating_add_signed(delta).min(len - 1);
    }

    // ── Links and deep links ──────────────────────────────────────────

    /// Clicks the link at `index` the way a pointer would.
    pub fn activate_link(&mut self, index: usize, click: Click) {
        let Some(link) = self.config.links.get(index).cloned() else {
            return;
        };
        self.selected_link = index;
        let mut rng = rand::rng();
        let outcome = self.interceptor.handle_click(
            &mut self.sequencer,
            &mut self.scheduler,
            &link,
            &click,
            &mut rng,
        );
        match outcome {
            ClickOutcome::Intercepted(handle) => self.last_transition = Some(handle),
            ClickOutcome::Default => {
                if let Some(anchor) = link.href.strip_prefix('#') {
                    self.jump_to_anchor(anchor);
                    return;
                }
                let mode = if click.requests_new_context() {
                    OpenMode::NewTab
                } else {
                    link.open_mode()
                };
                match self.host.open(&link.href, mode) {
                    Ok(()) => self.set_status(format!("Opened {}", link.label)),
                    Err(e) => {
                        tracing::warn!(error = %e, "link did not open");
                        self.set_status(e.to_string());
                    }
                }
            }
        }
    }

    fn jump_to_anchor(&mut self, anchor: &str) {
        match anchor {
            "shop" => {
                self.focus = FocusedPanel::Shop;
                self.set_status("Shop");
            }
            "messages" if self.shop.is_admin() => self.focus = FocusedPanel::Mailbox,
            _ => self.set_status(format!("#{anchor}")),
        }
    }

    /// Opens the Instagram profile (follow) through the deep-link sequence.
    pub fn follow_on_instagram(&mut self) {
        let fallback = self.config.shop.follow_url.clone();
        self.deep_link(&fallback);
    }

    /// Opens an Instagram DM through the deep-link sequence.
    pub fn dm_on_instagram(&mut self) {
        let fallback = self.config.shop.dm_url.clone();
        self.deep_link(&fallback);
    }

    fn deep_link(&mut self, fallback: &str) {
        let uri = self.config.shop.instagram_app_uri();
        let handle = self.sequencer.trigger_deep_link(
            &mut self.scheduler,
            &uri,
            fallback,
            &self.config.deep_link_message,
        );
        self.last_transition = Some(handle);
    }

    /// Cancels the most recent transition's pending steps.
    pub fn cancel_transition(&mut self) {
        if let Some(handle) = self.last_transition.take() {
            handle.cancel();
            self.set_status("Transition cancelled");
        }
    }

    // ── Login ─────────────────────────────────────────────────────────

    pub fn open_login_dialog(&mut self) {
        self.login_dialog = LoginDialogState {
            open: true,
            ..LoginDialogState::default()
        };
    }

    pub fn login_input(&mut self, c: char) {
        self.login_dialog.username.push(c);
    }

    pub fn login_backspace(&mut self) {
        self.login_dialog.username.pop();
    }

    pub fn login_toggle_follows(&mut self) {
        self.login_dialog.follows = !self.login_dialog.follows;
    }

    /// Logs in with the dialog's input. The dialog stays open on error.
    pub fn login_confirm(&mut self) {
        let username = self.login_dialog.username.clone();
        match self.shop.login(&username, self.login_dialog.follows) {
            Ok(user) => {
                let status = format!("Logged in as {}", user.username);
                self.login_dialog.open = false;
                self.set_status(status);
                self.refresh();
            }
            Err(e) => self.set_status(e.to_string()),
        }
    }

    pub fn login_cancel(&mut self) {
        self.login_dialog.open = false;
    }

    pub fn logout(&mut self) {
        match self.shop.logout() {
            Ok(()) => {
                if self.focus == FocusedPanel::Mailbox {
                    self.focus = FocusedPanel::Shop;
                }
                self.set_status("Logged out");
            }
            Err(e) => self.set_status(e.to_string()),
        }
    }

    // ── Catalog ───────────────────────────────────────────────────────

    pub fn selected_product(&self) -> Option<&Product> {
        self.products.get(self.selected_product)
    }

    pub fn buy_selected(&mut self) {
        let Some(id) = self.selected_product().map(|p| p.id.clone()) else {
            return;
        };
        match self.shop.buy(&id) {
            Ok(confirmation) => self.set_status(confirmation),
            Err(e) => self.set_status(e.to_string()),
        }
    }

    pub fn open_add_product(&mut self) {
        if !self.shop.is_admin() {
            return;
        }
        self.product_dialog = ProductDialogState {
            open: true,
            ..ProductDialogState::default()
        };
    }

    pub fn open_edit_product(&mut self) {
        if !self.shop.is_admin() {
            return;
        }
        let Some(product) = self.selected_product() else {
            return;
        };
        self.product_dialog = ProductDialogState {
            open: true,
            editing: Some(product.id.clone()),
            draft: ProductDraft::from_product(product),
            field: ProductField::Title,
        };
    }

    pub fn product_input(&mut self, c: char) {
        let field = self.product_dialog.field;
        self.product_dialog.field_mut(field).push(c);
    }

    pub fn product_backspace(&mut self) {
        let field = self.product_dialog.field;
        self.product_dialog.field_mut(field).pop();
    }

    pub fn product_next_field(&mut self) {
        self.product_dialog.field = self.product_dialog.field.next();
    }

    /// Saves the product dialog. The dialog stays open on error.
    pub fn product_confirm(&mut self) {
        let draft = self.product_dialog.draft.clone();
        let result = match self.product_dialog.editing.clone() {
            Some(id) => self.shop.update_product(&id, &draft),
            None => self.shop.add_product(&draft),
        };
        match result {
            Ok(product) => {
                self.product_dialog.open = false;
                self.set_status(format!("Saved {}", product.title));
                self.refresh();
            }
            Err(e) => self.set_status(e.to_string()),
        }
    }

    pub fn product_cancel(&mut self) {
        self.product_dialog.open = false;
    }

    pub fn delete_selected_product(&mut self) {
        let Some(product) = self.selected_product().cloned() else {
            return;
        };
        match self.shop.delete_product(&product.id) {
            Ok(_) => {
                self.set_status(format!("Deleted {}", product.title));
                self.refresh();
            }
            Err(e) => self.set_status(e.to_string()),
        }
    }

    // ── Messages ──────────────────────────────────────────────────────

    /// Opens a DM to the admin about the selected product.
    pub fn open_product_dm(&mut self) {
        if self.shop.user().is_none() {
            self.set_status("Please login to DM.");
            return;
        }
        let Some(product) = self.selected_product() else {
            return;
        };
        self.dm_dialog = DmDialogState {
            open: true,
            target: Some(DmTarget::Product {
                id: product.id.clone(),
                title: product.title.clone(),
            }),
            text: String::new(),
        };
    }

    /// Opens an admin reply to the selected mailbox message.
    pub fn open_reply(&mut self) {
        if !self.shop.is_admin() {
            return;
        }
        let Some(message) = self.messages.get(self.selected_message) else {
            return;
        };
        self.dm_dialog = DmDialogState {
            open: true,
            target: Some(DmTarget::Reply {
                message_id: message.id.clone(),
                to: message.from.clone(),
            }),
            text: String::new(),
        };
    }

    pub fn dm_input(&mut self, c: char) {
        self.dm_dialog.text.push(c);
    }

    pub fn dm_backspace(&mut self) {
        self.dm_dialog.text.pop();
    }

    /// Sends the DM dialog's text. The dialog stays open on error.
    pub fn dm_confirm(&mut self) {
        let Some(target) = self.dm_dialog.target.clone() else {
            self.dm_dialog.open = false;
            return;
        };
        let text = self.dm_dialog.text.clone();
        let result = match &target {
            DmTarget::Product { id, .. } => self
                .shop
                .send_dm(id, &text)
                .map(|_| "Message sent (simulated). Admin can reply via admin panel."),
            DmTarget::Reply { message_id, .. } => self
                .shop
                .reply(message_id, &text)
                .map(|_| "Reply saved (simulated)."),
        };
        match result {
            Ok(status) => {
                self.dm_dialog = DmDialogState::default();
                self.set_status(status);
                self.refresh();
            }
            Err(e) => self.set_status(e.to_string()),
        }
    }

    pub fn dm_cancel(&mut self) {
        self.dm_dialog = DmDialogState::default();
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn shop_view(&self) -> ShopView {
        self.shop.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::NullBackend;
    use crate::error::NavigationError;
    use crate::sequencer::ManualClock;
    use crate::shop::MemoryStore;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingHost {
        opened: RefCell<Vec<(String, OpenMode)>>,
        uris: RefCell<Vec<String>>,
    }

    impl NavigationHost for RecordingHost {
        fn navigate_same_tab(&self, url: &str) -> Result<(), NavigationError> {
            self.opened.borrow_mut().push((url.to_string(), OpenMode::SameTab));
            Ok(())
        }

        fn open_new_tab(&self, url: &str) -> Result<(), NavigationError> {
            self.opened.borrow_mut().push((url.to_string(), OpenMode::NewTab));
            Ok(())
        }

        fn navigate_to_uri(&self, uri: &str) -> Result<(), NavigationError> {
            self.uris.borrow_mut().push(uri.to_string());
            Ok(())
        }
    }

    fn app() -> (App, ManualClock, Rc<RecordingHost>) {
        let clock = ManualClock::new();
        let host = Rc::new(RecordingHost::default());
        let shop = Shop::new(Box::new(MemoryStore::new()), "itszflame").unwrap();
        let app = App::new(
            Config::default(),
            Rc::new(clock.clone()),
            host.clone(),
            Rc::new(NullBackend::default()),
            shop,
        );
        (app, clock, host)
    }

    fn link_index(app: &App, label: &str) -> usize {
        app.config
            .links
            .iter()
            .position(|l| l.label == label)
            .unwrap()
    }

    fn login(app: &mut App, name: &str, follows: bool) {
        app.open_login_dialog();
        name.chars().for_each(|c| app.login_input(c));
        if follows {
            app.login_toggle_follows();
        }
        app.login_confirm();
    }

    #[test]
    fn test_click_runs_overlay_sequence() {
        let (mut app, clock, host) = app();
        let twitch = link_index(&app, "Twitch");

        app.activate_link(twitch, Click::primary());
        assert!(app.overlay().visible);
        assert!(host.opened.borrow().is_empty());

        clock.advance(Duration::from_millis(1800));
        app.tick();
        assert_eq!(
            host.opened.borrow().as_slice(),
            [("https://www.twitch.tv/itszflame".to_string(), OpenMode::SameTab)]
        );
        assert!(app.overlay().visible);

        clock.advance(Duration::from_millis(900));
        app.tick();
        assert!(!app.overlay().visible);
    }

    #[test]
    fn test_ctrl_click_opens_new_tab_immediately() {
        let (mut app, _clock, host) = app();
        let twitch = link_index(&app, "Twitch");

        app.activate_link(twitch, Click::with_ctrl());

        assert!(!app.overlay().visible);
        assert_eq!(host.opened.borrow()[0].1, OpenMode::NewTab);
    }

    #[test]
    fn test_anchor_link_focuses_shop() {
        let (mut app, _clock, host) = app();
        let shop = link_index(&app, "Shop");
        app.activate_link(shop, Click::primary());
        assert_eq!(app.focus, FocusedPanel::Shop);
        assert!(host.opened.borrow().is_empty());
        assert!(!app.overlay().visible);
    }

    #[test]
    fn test_follow_falls_back_to_web() {
        let (mut app, clock, host) = app();
        app.follow_on_instagram();
        assert_eq!(
            host.uris.borrow().as_slice(),
            ["instagram://user?username=itszflame".to_string()]
        );
        assert_eq!(app.overlay().message, "Opening Instagram...");

        clock.advance(Duration::from_millis(900));
        app.tick();
        assert_eq!(
            host.opened.borrow().as_slice(),
            [("https://www.instagram.com/itszflame/".to_string(), OpenMode::NewTab)]
        );
    }

    #[test]
    fn test_poll_timeout_shrinks_near_due_task() {
        let (mut app, clock, _host) = app();
        assert_eq!(app.poll_timeout(), FRAME_INTERVAL);

        app.activate_link(link_index(&app, "Twitch"), Click::primary());
        clock.advance(Duration::from_millis(275));
        assert_eq!(app.poll_timeout(), Duration::from_millis(5));
    }

    #[test]
    fn test_cancel_transition_hides_overlay() {
        let (mut app, clock, host) = app();
        app.activate_link(link_index(&app, "Twitch"), Click::primary());
        app.cancel_transition();
        assert!(!app.overlay().visible);

        clock.advance(Duration::from_secs(3));
        app.tick();
        assert!(host.opened.borrow().is_empty());
    }

    #[test]
    fn test_login_dialog_flow() {
        let (mut app, _clock, _host) = app();
        app.open_login_dialog();
        app.login_confirm();
        assert!(app.login_dialog.open);

        login(&mut app, "ravi", false);
        assert!(!app.login_dialog.open);
        assert_eq!(app.shop_view(), ShopView::FollowPrompt);

        app.buy_selected();
        let (status, _) = app.status_message.clone().unwrap();
        assert_eq!(status, "You must follow @itszflame to buy.");
    }

    #[test]
    fn test_admin_adds_product_through_dialog() {
        let (mut app, _clock, _host) = app();
        login(&mut app, "itszflame", true);

        app.open_add_product();
        "Cap".chars().for_each(|c| app.product_input(c));
        app.product_next_field();
        "₹199".chars().for_each(|c| app.product_input(c));
        app.product_confirm();

        assert!(!app.product_dialog.open);
        assert_eq!(app.products.len(), 4);
        assert_eq!(app.products[0].title, "Cap");
    }

    #[test]
    fn test_visitor_cannot_open_admin_dialogs() {
        let (mut app, _clock, _host) = app();
        login(&mut app, "ravi", true);
        app.open_add_product();
        app.open_edit_product();
        app.open_reply();
        assert!(!app.has_modal());
        app.cycle_focus();
        app.cycle_focus();
        assert_eq!(app.focus, FocusedPanel::Links);
    }

    #[test]
    fn test_dm_then_admin_reply() {
        let (mut app, _clock, _host) = app();
        login(&mut app, "ravi", true);
        app.open_product_dm();
        "Size L?".chars().for_each(|c| app.dm_input(c));
        app.dm_confirm();
        assert!(!app.dm_dialog.open);
        assert_eq!(app.messages.len(), 1);

        app.logout();
        login(&mut app, "itszflame", true);
        app.open_reply();
        assert_eq!(
            app.dm_dialog.target,
            Some(DmTarget::Reply {
                message_id: app.messages[0].id.clone(),
                to: "ravi".to_string()
            })
        );
        "Yes".chars().for_each(|c| app.dm_input(c));
        app.dm_confirm();
        assert_eq!(app.messages.len(), 2);
        assert_eq!(app.messages[0].from, "admin(itszflame)");
    }

    #[test]
    fn test_layout_hit_testing() {
        let layout = LayoutRegions {
            links: Rect::new(2, 3, 20, 4),
            ..LayoutRegions::default()
        };
        assert_eq!(layout.link_at(5, 3), Some(0));
        assert_eq!(layout.link_at(5, 6), Some(3));
        assert_eq!(layout.link_at(5, 7), None);
        assert_eq!(layout.product_at(5, 3), None);
    }
}
