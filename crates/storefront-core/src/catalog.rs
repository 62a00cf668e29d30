//! Product Catalog
//!
//! Owner-scoped catalog management plus the public read paths. Every
//! mutation checks that the product belongs to the calling store; a product
//! owned by another tenant is indistinguishable from a missing one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use crate::error::{CoreError, Result};
use crate::store::{StoreId, StoreRepository};

/// Product identifier (storage-generated surrogate key)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(Uuid);

impl ProductId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ProductId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Selling status of a product
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selling {
    OnSale,
    Hidden,
    SoldOut,
}

/// A catalog item owned by one store
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,

    /// Owning store
    pub store_id: StoreId,

    pub name: String,

    pub description: String,

    /// Unit price in the smallest currency unit (KRW has no sub-unit)
    pub price: i64,

    pub selling: Selling,

    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn new(store_id: StoreId, details: NewProduct) -> Self {
        Self {
            id: ProductId::generate(),
            store_id,
            name: details.name,
            description: details.description,
            price: details.price,
            selling: Selling::OnSale,
            created_at: Utc::now(),
        }
    }

    /// Replace the mutable fields
    pub fn update(&mut self, name: String, description: String, price: i64) {
        self.name = name;
        self.description = description;
        self.price = price;
    }

    pub fn change_selling_status(&mut self, selling: Selling) {
        self.selling = selling;
    }
}

/// Fields required to list a new product
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: i64,
}

/// Product storage trait
pub trait ProductRepository: Send + Sync {
    /// Save or update a product
    fn save(&self, product: &Product) -> Result<()>;

    /// Get product by id
    fn find(&self, id: ProductId) -> Result<Option<Product>>;

    /// Remove a product
    fn delete(&self, id: ProductId) -> Result<()>;

    /// All products of one store, newest first
    fn find_all_by_store(&self, store_id: StoreId) -> Result<Vec<Product>>;
}

/// In-memory product repository (for development)
pub struct MemoryProductRepository {
    products: RwLock<HashMap<ProductId, Product>>,
}

impl Default for MemoryProductRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryProductRepository {
    pub fn new() -> Self {
        Self {
            products: RwLock::new(HashMap::new()),
        }
    }
}

impl ProductRepository for MemoryProductRepository {
    fn save(&self, product: &Product) -> Result<()> {
        let mut products = self.products.write().unwrap();
        products.insert(product.id, product.clone());
        Ok(())
    }

    fn find(&self, id: ProductId) -> Result<Option<Product>> {
        let products = self.products.read().unwrap();
        Ok(products.get(&id).cloned())
    }

    fn delete(&self, id: ProductId) -> Result<()> {
        let mut products = self.products.write().unwrap();
        products.remove(&id);
        Ok(())
    }

    fn find_all_by_store(&self, store_id: StoreId) -> Result<Vec<Product>> {
        let products = self.products.read().unwrap();
        let mut found: Vec<Product> = products
            .values()
            .filter(|p| p.store_id == store_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }
}

/// Catalog operations, always scoped to the calling store
pub struct CatalogService {
    stores: Arc<dyn StoreRepository>,
    products: Arc<dyn ProductRepository>,
}

impl CatalogService {
    pub fn new(stores: Arc<dyn StoreRepository>, products: Arc<dyn ProductRepository>) -> Self {
        Self { stores, products }
    }

    /// List a new product for the store
    pub fn create(&self, store_id: StoreId, details: NewProduct) -> Result<Product> {
        if self.stores.find(store_id)?.is_none() {
            return Err(CoreError::StoreNotFound(store_id));
        }

        let product = Product::new(store_id, details);
        self.products.save(&product)?;

        tracing::info!(
            store_id = %store_id,
            product_id = %product.id,
            name = %product.name,
            "Listed product"
        );

        Ok(product)
    }

    /// Update name, description, and price
    pub fn update(
        &self,
        store_id: StoreId,
        product_id: ProductId,
        name: String,
        description: String,
        price: i64,
    ) -> Result<Product> {
        let mut product = self.owned(store_id, product_id)?;
        product.update(name, description, price);
        self.products.save(&product)?;
        Ok(product)
    }

    /// Remove a product from the catalog
    pub fn delete(&self, store_id: StoreId, product_id: ProductId) -> Result<()> {
        let product = self.owned(store_id, product_id)?;
        self.products.delete(product.id)
    }

    /// Flip the selling status
    pub fn change_selling_status(
        &self,
        store_id: StoreId,
        product_id: ProductId,
        selling: Selling,
    ) -> Result<Product> {
        let mut product = self.owned(store_id, product_id)?;
        product.change_selling_status(selling);
        self.products.save(&product)?;
        Ok(product)
    }

    /// Public read of a single product within one store
    pub fn get(&self, store_id: StoreId, product_id: ProductId) -> Result<Product> {
        self.owned(store_id, product_id)
    }

    /// Public listing of one store's catalog
    pub fn list_by_store(&self, store_id: StoreId) -> Result<Vec<Product>> {
        self.products.find_all_by_store(store_id)
    }

    /// Public keyword search over one store's on-sale products
    pub fn search_by_keyword(&self, store_id: StoreId, keyword: &str) -> Result<Vec<Product>> {
        let keyword = keyword.to_lowercase();
        let products = self.products.find_all_by_store(store_id)?;

        Ok(products
            .into_iter()
            .filter(|p| p.selling == Selling::OnSale)
            .filter(|p| p.name.to_lowercase().contains(&keyword))
            .collect())
    }

    fn owned(&self, store_id: StoreId, product_id: ProductId) -> Result<Product> {
        match self.products.find(product_id)? {
            Some(product) if product.store_id == store_id => Ok(product),
            _ => Err(CoreError::ProductNotFound(product_id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStoreRepository, Store};

    fn setup() -> (CatalogService, StoreId) {
        let stores = Arc::new(MemoryStoreRepository::new());
        let store = Store::new("owner@cafe.kr", "Mosk Cafe");
        stores.save(&store).unwrap();

        let products = Arc::new(MemoryProductRepository::new());
        (CatalogService::new(stores, products), store.id)
    }

    fn americano() -> NewProduct {
        NewProduct {
            name: "Americano".into(),
            description: "Hot americano".into(),
            price: 3500,
        }
    }

    #[test]
    fn test_create_requires_store() {
        let (catalog, _) = setup();
        let result = catalog.create(StoreId::generate(), americano());
        assert!(matches!(result, Err(CoreError::StoreNotFound(_))));
    }

    #[test]
    fn test_update_and_status_change() {
        let (catalog, store_id) = setup();
        let product = catalog.create(store_id, americano()).unwrap();

        let updated = catalog
            .update(store_id, product.id, "Iced Americano".into(), "Iced".into(), 4000)
            .unwrap();
        assert_eq!(updated.price, 4000);

        let hidden = catalog
            .change_selling_status(store_id, product.id, Selling::Hidden)
            .unwrap();
        assert_eq!(hidden.selling, Selling::Hidden);
    }

    #[test]
    fn test_other_stores_products_are_invisible() {
        let (catalog, store_id) = setup();
        let product = catalog.create(store_id, americano()).unwrap();

        let intruder = StoreId::generate();
        assert!(matches!(
            catalog.delete(intruder, product.id),
            Err(CoreError::ProductNotFound(_))
        ));
    }

    #[test]
    fn test_keyword_search_skips_hidden() {
        let (catalog, store_id) = setup();
        let product = catalog.create(store_id, americano()).unwrap();
        catalog
            .create(
                store_id,
                NewProduct {
                    name: "Cafe Latte".into(),
                    description: "Latte".into(),
                    price: 4000,
                },
            )
            .unwrap();

        let hits = catalog.search_by_keyword(store_id, "ameri").unwrap();
        assert_eq!(hits.len(), 1);

        catalog
            .change_selling_status(store_id, product.id, Selling::SoldOut)
            .unwrap();
        assert!(catalog.search_by_keyword(store_id, "ameri").unwrap().is_empty());
    }
}
