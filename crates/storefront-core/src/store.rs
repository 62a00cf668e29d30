//! Store Tenancy
//!
//! Handles tenant registration, lookup, and storage. The store is the root
//! of ownership for every other record in the system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use crate::error::{CoreError, Result};

/// Store identifier (storage-generated surrogate key)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoreId(Uuid);

impl StoreId {
    /// Generate a new store id
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

impl std::fmt::Display for StoreId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for StoreId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A merchant tenant
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Store {
    /// Store id
    pub id: StoreId,

    /// Login email, unique across tenants
    pub email: String,

    /// Display name of the business
    pub business_name: String,

    /// Registration timestamp
    pub created_at: DateTime<Utc>,
}

impl Store {
    /// Create a new store
    pub fn new(email: impl Into<String>, business_name: impl Into<String>) -> Self {
        Self {
            id: StoreId::generate(),
            email: email.into().to_lowercase(),
            business_name: business_name.into(),
            created_at: Utc::now(),
        }
    }
}

/// Store storage trait
pub trait StoreRepository: Send + Sync {
    /// Save or update a store
    fn save(&self, store: &Store) -> Result<()>;

    /// Get store by id
    fn find(&self, id: StoreId) -> Result<Option<Store>>;

    /// Get store by login email
    fn find_by_email(&self, email: &str) -> Result<Option<Store>>;
}

/// In-memory store repository (for development)
pub struct MemoryStoreRepository {
    stores: RwLock<HashMap<StoreId, Store>>,
    by_email: RwLock<HashMap<String, StoreId>>,
}

impl Default for MemoryStoreRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStoreRepository {
    pub fn new() -> Self {
        Self {
            stores: RwLock::new(HashMap::new()),
            by_email: RwLock::new(HashMap::new()),
        }
    }
}

impl StoreRepository for MemoryStoreRepository {
    fn save(&self, store: &Store) -> Result<()> {
        let mut stores = self.stores.write().unwrap();
        let mut by_email = self.by_email.write().unwrap();

        by_email.insert(store.email.clone(), store.id);
        stores.insert(store.id, store.clone());

        Ok(())
    }

    fn find(&self, id: StoreId) -> Result<Option<Store>> {
        let stores = self.stores.read().unwrap();
        Ok(stores.get(&id).cloned())
    }

    fn find_by_email(&self, email: &str) -> Result<Option<Store>> {
        let by_email = self.by_email.read().unwrap();
        let stores = self.stores.read().unwrap();

        if let Some(id) = by_email.get(&email.to_lowercase()) {
            Ok(stores.get(id).cloned())
        } else {
            Ok(None)
        }
    }
}

/// Tenant registration and lookup
pub struct StoreService {
    stores: Arc<dyn StoreRepository>,
}

impl StoreService {
    pub fn new(stores: Arc<dyn StoreRepository>) -> Self {
        Self { stores }
    }

    /// Register a new tenant. Emails are unique across stores.
    pub fn register(
        &self,
        email: impl Into<String>,
        business_name: impl Into<String>,
    ) -> Result<Store> {
        let email = email.into();

        if self.stores.find_by_email(&email)?.is_some() {
            return Err(CoreError::EmailTaken(email));
        }

        let store = Store::new(email, business_name);
        self.stores.save(&store)?;

        tracing::info!(store_id = %store.id, email = %store.email, "Registered store");

        Ok(store)
    }

    /// Look up a store, failing hard when it is missing
    pub fn get(&self, id: StoreId) -> Result<Store> {
        self.stores
            .find(id)?
            .ok_or(CoreError::StoreNotFound(id))
    }
}
