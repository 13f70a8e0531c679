//! Simulated login and the follow gate.
//!
//! There is no authentication: the visitor types a name and says whether
//! they follow the account.

use super::store::KeyValueStore;
use crate::error::ShopError;
use serde::{Deserialize, Serialize};

/// Storage key for the logged-in visitor.
pub const USER_KEY: &str = "mrflame_current_user";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub username: String,
    pub follows: bool,
}

impl CurrentUser {
    /// Builds a user from login-form input.
    ///
    /// # Errors
    ///
    /// Returns `EmptyUsername` if the trimmed name is empty.
    pub fn new(username: &str, follows: bool) -> Result<Self, ShopError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(ShopError::EmptyUsername);
        }
        Ok(Self {
            username: username.to_string(),
            follows,
        })
    }

    pub fn is_admin(&self, admin_username: &str) -> bool {
        self.username.to_lowercase() == admin_username.to_lowercase()
    }

    pub fn load(store: &dyn KeyValueStore) -> Result<Option<Self>, ShopError> {
        match store.get(USER_KEY)? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(None),
        }
    }

    /// Persists `user`; `None` stores an explicit `null`.
    pub fn save(store: &mut dyn KeyValueStore, user: Option<&Self>) -> Result<(), ShopError> {
        store.set(USER_KEY, serde_json::to_string(&user)?)
    }
}

/// Which part of the shop page is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShopView {
    /// Logged out.
    Welcome,
    /// Logged in without following.
    FollowPrompt,
    /// Logged in and following; the catalog is visible.
    Catalog,
}

impl ShopView {
    pub fn for_user(user: Option<&CurrentUser>) -> Self {
        match user {
            None => ShopView::Welcome,
            Some(user) if user.follows => ShopView::Catalog,
            Some(_) => ShopView::FollowPrompt,
        }
    }
}
