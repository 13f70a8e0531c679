//! The simulated fan shop: login gate, catalog, and mailbox.
//!
//! Everything is local. Nothing is bought and no message leaves the
//! machine; state lives in a [`KeyValueStore`].

pub mod message;
pub mod product;
pub mod store;
pub mod user;

pub use message::{Mailbox, Message};
pub use product::{Catalog, Product, ProductDraft};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore};
pub use user::{CurrentUser, ShopView};

use crate::config::ShopConfig;
use crate::error::ShopError;

/// Shop state for one visitor session.
pub struct Shop {
    store: Box<dyn KeyValueStore>,
    admin_username: String,
    user: Option<CurrentUser>,
}

impl Shop {
    /// Creates a shop over `store`, restoring any saved login and seeding
    /// the default catalog on first use.
    pub fn new(
        mut store: Box<dyn KeyValueStore>,
        admin_username: impl Into<String>,
    ) -> Result<Self, ShopError> {
        if Catalog::seed_defaults(store.as_mut())? {
            tracing::debug!("seeded default catalog");
        }
        let user = CurrentUser::load(store.as_ref())?;
        if let Some(user) = &user {
            tracing::info!(username = %user.username, "restored login");
        }
        Ok(Self {
            store,
            admin_username: admin_username.into(),
            user,
        })
    }

    /// Opens the file-backed store named in `config`.
    pub fn from_config(config: &ShopConfig) -> Result<Self, ShopError> {
        let store = JsonFileStore::open(&config.storage_path)?;
        Self::new(Box::new(store), config.admin_username.clone())
    }

    pub fn admin_username(&self) -> &str {
        &self.admin_username
    }

    pub fn user(&self) -> Option<&CurrentUser> {
        self.user.as_ref()
    }

    pub fn view(&self) -> ShopView {
        ShopView::for_user(self.user.as_ref())
    }

    pub fn is_admin(&self) -> bool {
        self.user
            .as_ref()
            .is_some_and(|u| u.is_admin(&self.admin_username))
    }

    pub fn products(&self) -> Result<Vec<Product>, ShopError> {
        Catalog::load(self.store.as_ref())
    }

    pub fn messages(&self) -> Result<Vec<Message>, ShopError> {
        Mailbox::load(self.store.as_ref())
    }

    /// Logs in as `username`. Following is self-reported.
    pub fn login(&mut self, username: &str, follows: bool) -> Result<&CurrentUser, ShopError> {
        let user = CurrentUser::new(username, follows)?;
        CurrentUser::save(self.store.as_mut(), Some(&user))?;
        tracing::info!(username = %user.username, follows, "logged in");
        Ok(self.user.insert(user))
    }

    pub fn logout(&mut self) -> Result<(), ShopError> {
        CurrentUser::save(self.store.as_mut(), None)?;
        self.user = None;
        Ok(())
    }

    /// Simulated purchase. Returns the confirmation text to show.
    ///
    /// # Errors
    ///
    /// Returns `NotLoggedIn` or `NotFollowing` when the gate is closed,
    /// `ProductNotFound` for an unknown id.
    pub fn buy(&self, product_id: &str) -> Result<String, ShopError> {
        let user = self.user.as_ref().ok_or(ShopError::NotLoggedIn)?;
        if !user.follows {
            return Err(ShopError::NotFollowing {
                admin: self.admin_username.clone(),
            });
        }
        let product = Catalog::find(self.store.as_ref(), product_id)?;
        tracing::info!(product = %product.id, username = %user.username, "simulated purchase");
        Ok(format!(
            "Thanks! This is a simulated \"Buy Now\" for {}.",
            product.title
        ))
    }

    /// Sends a message to the admin about a product.
    pub fn send_dm(&mut self, product_id: &str, text: &str) -> Result<Message, ShopError> {
        let from = self
            .user
            .as_ref()
            .ok_or(ShopError::NotLoggedIn)?
            .username
            .clone();
        Catalog::find(self.store.as_ref(), product_id)?;
        Mailbox::send(self.store.as_mut(), &from, product_id, text)
    }

    /// Admin reply to the sender of `message_id`.
    pub fn reply(&mut self, message_id: &str, text: &str) -> Result<Message, ShopError> {
        self.require_admin()?;
        Mailbox::reply(self.store.as_mut(), &self.admin_username, message_id, text)
    }

    pub fn add_product(&mut self, draft: &ProductDraft) -> Result<Product, ShopError> {
        self.require_admin()?;
        Catalog::add(self.store.as_mut(), draft)
    }

    pub fn update_product(
        &mut self,
        id: &str,
        draft: &ProductDraft,
    ) -> Result<Product, ShopError> {
        self.require_admin()?;
        Catalog::update(self.store.as_mut(), id, draft)
    }

    pub fn delete_product(&mut self, id: &str) -> Result<bool, ShopError> {
        self.require_admin()?;
        Catalog::delete(self.store.as_mut(), id)
    }

    fn require_admin(&self) -> Result<(), ShopError> {
        match &self.user {
            None => Err(ShopError::NotLoggedIn),
            Some(_) if !self.is_admin() => Err(ShopError::NotAdmin),
            Some(_) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shop() -> Shop {
        Shop::new(Box::new(MemoryStore::new()), "itszflame").unwrap()
    }

    fn first_product(shop: &Shop) -> Product {
        shop.products().unwrap().remove(0)
    }

    #[test]
    fn test_buy_gate() {
        let mut shop = shop();
        let id = first_product(&shop).id;
        assert!(matches!(shop.buy(&id), Err(ShopError::NotLoggedIn)));

        shop.login("ravi", false).unwrap();
        assert_eq!(shop.view(), ShopView::FollowPrompt);
        assert_eq!(
            shop.buy(&id).unwrap_err().to_string(),
            "You must follow @itszflame to buy."
        );

        shop.login("ravi", true).unwrap();
        assert_eq!(shop.view(), ShopView::Catalog);
        assert!(shop.buy(&id).unwrap().contains("simulated"));
    }

    #[test]
    fn test_products_are_stable_once_saved() {
        let mut shop = shop();
        shop.login("ItszFlame", true).unwrap();
        let added = shop.add_product(&ProductDraft::new("Cap", "₹199")).unwrap();
        let ids: Vec<_> = shop.products().unwrap().into_iter().map(|p| p.id).collect();
        let again: Vec<_> = shop.products().unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, again);
        assert_eq!(ids[0], added.id);
    }

    #[test]
    fn test_admin_only_operations() {
        let mut shop = shop();
        let draft = ProductDraft::new("Cap", "₹199");
        assert!(matches!(shop.add_product(&draft), Err(ShopError::NotLoggedIn)));

        shop.login("ravi", true).unwrap();
        assert!(!shop.is_admin());
        assert!(matches!(shop.add_product(&draft), Err(ShopError::NotAdmin)));
        assert!(matches!(shop.delete_product("p_x"), Err(ShopError::NotAdmin)));
        assert!(matches!(shop.reply("p_x", "hi"), Err(ShopError::NotAdmin)));
    }

    #[test]
    fn test_dm_and_admin_reply() {
        let mut shop = shop();
        let pid = first_product(&shop).id;
        assert!(matches!(shop.send_dm(&pid, "hi"), Err(ShopError::NotLoggedIn)));

        shop.login("ravi", false).unwrap();
        let dm = shop.send_dm(&pid, "Is the hoodie warm?").unwrap();
        assert_eq!(dm.from, "ravi");

        shop.logout().unwrap();
        shop.login("itszflame", true).unwrap();
        let reply = shop.reply(&dm.id, "Very").unwrap();
        assert_eq!(reply.to.as_deref(), Some("ravi"));
        assert_eq!(shop.messages().unwrap().len(), 2);
    }

    #[test]
    fn test_login_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let config = ShopConfig {
            storage_path: dir.path().join("storage.json"),
            ..ShopConfig::default()
        };
        {
            let mut shop = Shop::from_config(&config).unwrap();
            shop.login("ravi", true).unwrap();
        }
        let shop = Shop::from_config(&config).unwrap();
        assert_eq!(shop.user().map(|u| u.username.as_str()), Some("ravi"));

        let mut shop = shop;
        shop.logout().unwrap();
        assert_eq!(Shop::from_config(&config).unwrap().view(), ShopView::Welcome);
    }
}
