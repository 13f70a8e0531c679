//! Products and the catalog.

use super::store::KeyValueStore;
use crate::error::ShopError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Storage key for the product list.
pub const PRODUCTS_KEY: &str = "mrflame_products_v1";

/// Image used when a product is saved without one.
pub const DEFAULT_IMAGE: &str = "Gta.jpg";

/// Length of the random part of generated ids.
const ID_SUFFIX_LEN: usize = 7;

/// Generates a short id: `p_` followed by seven lowercase alphanumerics.
pub fn new_id() -> String {
    let simple = Uuid::new_v4().simple().to_string();
    format!("p_{}", &simple[..ID_SUFFIX_LEN])
}

/// A catalog entry. Prices are display strings ("₹799").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub title: String,
    pub price: String,
    pub image: String,
    #[serde(default)]
    pub desc: String,
}

/// Admin input for adding or editing a product, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductDraft {
    pub title: String,
    pub price: String,
    pub image: String,
    pub desc: String,
}

impl ProductDraft {
    pub fn new(title: impl Into<String>, price: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            price: price.into(),
            ..Self::default()
        }
    }

    /// Pre-fills a draft from an existing product (the edit dialog).
    pub fn from_product(product: &Product) -> Self {
        Self {
            title: product.title.clone(),
            price: product.price.clone(),
            image: product.image.clone(),
            desc: product.desc.clone(),
        }
    }

    /// Trims every field, defaults the image and checks required fields.
    ///
    /// # Errors
    ///
    /// Returns `MissingTitleOrPrice` if the title or price is blank.
    pub fn validate(&self) -> Result<ProductDraft, ShopError> {
        let title = self.title.trim();
        let price = self.price.trim();
        if title.is_empty() || price.is_empty() {
            return Err(ShopError::MissingTitleOrPrice);
        }
        let image = match self.image.trim() {
            "" => DEFAULT_IMAGE,
            image => image,
        };
        Ok(ProductDraft {
            title: title.to_string(),
            price: price.to_string(),
            image: image.to_string(),
            desc: self.desc.trim().to_string(),
        })
    }
}

/// The catalog shown when nothing has been saved yet.
pub fn default_products() -> Vec<Product> {
    [
        ("MR. FLAME Tee", "₹799", "bgmi.jpg", "Premium cotton tee"),
        ("MR. FLAME Hoodie", "₹1499", "palworld.jpg", "Warm & comfy hoodie"),
        ("MR. FLAME Mousepad", "₹299", "Gta.jpg", "Large gaming mousepad"),
    ]
    .into_iter()
    .map(|(title, price, image, desc)| Product {
        id: new_id(),
        title: title.to_string(),
        price: price.to_string(),
        image: image.to_string(),
        desc: desc.to_string(),
    })
    .collect()
}

/// Product list persisted in a [`KeyValueStore`].
///
/// Every operation loads the whole list, changes it and saves it back.
pub struct Catalog;

impl Catalog {
    /// Loads the stored list, or the default catalog when nothing is stored.
    pub fn load(store: &dyn KeyValueStore) -> Result<Vec<Product>, ShopError> {
        let stored = match store.get(PRODUCTS_KEY)? {
            Some(json) => serde_json::from_str::<Option<Vec<Product>>>(&json)?,
            None => None,
        };
        Ok(stored.unwrap_or_else(default_products))
    }

    /// Persists the default catalog if nothing is stored, so default
    /// product ids stay the same across loads. Returns whether it seeded.
    pub fn seed_defaults(store: &mut dyn KeyValueStore) -> Result<bool, ShopError> {
        if store.get(PRODUCTS_KEY)?.is_some() {
            return Ok(false);
        }
        Self::save(store, &default_products())?;
        Ok(true)
    }

    pub fn save(store: &mut dyn KeyValueStore, products: &[Product]) -> Result<(), ShopError> {
        store.set(PRODUCTS_KEY, serde_json::to_string(products)?)
    }

    pub fn find(store: &dyn KeyValueStore, id: &str) -> Result<Product, ShopError> {
        Self::load(store)?
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| ShopError::ProductNotFound(id.to_string()))
    }

    /// Validates `draft` and inserts it at the front of the list.
    pub fn add(store: &mut dyn KeyValueStore, draft: &ProductDraft) -> Result<Product, ShopError> {
        let draft = draft.validate()?;
        let product = Product {
            id: new_id(),
            title: draft.title,
            price: draft.price,
            image: draft.image,
            desc: draft.desc,
        };
        let mut products = Self::load(store)?;
        products.insert(0, product.clone());
        Self::save(store, &products)?;
        Ok(product)
    }

    /// Validates `draft` and overwrites the product with `id` in place.
    pub fn update(
        store: &mut dyn KeyValueStore,
        id: &str,
        draft: &ProductDraft,
    ) -> Result<Product, ShopError> {
        let draft = draft.validate()?;
        let mut products = Self::load(store)?;
        let product = products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| ShopError::ProductNotFound(id.to_string()))?;
        product.title = draft.title;
        product.price = draft.price;
        product.image = draft.image;
        product.desc = draft.desc;
        let updated = product.clone();
        Self::save(store, &products)?;
        Ok(updated)
    }

    /// Removes the product with `id`. Returns whether anything was removed.
    pub fn delete(store: &mut dyn KeyValueStore, id: &str) -> Result<bool, ShopError> {
        let mut products = Self::load(store)?;
        let before = products.len();
        products.retain(|p| p.id != id);
        let removed = products.len() != before;
        Self::save(store, &products)?;
        Ok(removed)
    }
}
