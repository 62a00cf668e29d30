//! Subscription Storage
//!
//! Repository traits plus in-memory implementations. The subscription store
//! keys on the store id, which is what enforces the one-subscription-per-
//! store invariant; the history store is strictly append-only.

use std::collections::HashMap;
use std::sync::RwLock;

use storefront_core::StoreId;

use crate::error::Result;
use crate::model::{Subscription, SubscriptionHistory};

/// Subscription storage trait
pub trait SubscriptionRepository: Send + Sync {
    /// Get the store's subscription; unique per store
    fn find_by_store(&self, store_id: StoreId) -> Result<Option<Subscription>>;

    /// Save or update the store's subscription
    fn save(&self, subscription: &Subscription) -> Result<()>;
}

/// History storage trait
pub trait SubscriptionHistoryRepository: Send + Sync {
    /// Append one ledger row; rows are never updated or deleted
    fn append(&self, entry: &SubscriptionHistory) -> Result<()>;

    /// Full ledger for one store, newest first
    fn find_all_by_store(&self, store_id: StoreId) -> Result<Vec<SubscriptionHistory>>;
}

/// In-memory subscription repository (for development)
pub struct MemorySubscriptionRepository {
    by_store: RwLock<HashMap<StoreId, Subscription>>,
}

impl Default for MemorySubscriptionRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySubscriptionRepository {
    pub fn new() -> Self {
        Self {
            by_store: RwLock::new(HashMap::new()),
        }
    }
}

impl SubscriptionRepository for MemorySubscriptionRepository {
    fn find_by_store(&self, store_id: StoreId) -> Result<Option<Subscription>> {
        let by_store = self.by_store.read().unwrap();
        Ok(by_store.get(&store_id).cloned())
    }

    fn save(&self, subscription: &Subscription) -> Result<()> {
        let mut by_store = self.by_store.write().unwrap();
        by_store.insert(subscription.store_id, subscription.clone());
        Ok(())
    }
}

/// In-memory history repository (for development)
pub struct MemorySubscriptionHistoryRepository {
    entries: RwLock<Vec<SubscriptionHistory>>,
}

impl Default for MemorySubscriptionHistoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySubscriptionHistoryRepository {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }
}

impl SubscriptionHistoryRepository for MemorySubscriptionHistoryRepository {
    fn append(&self, entry: &SubscriptionHistory) -> Result<()> {
        let mut entries = self.entries.write().unwrap();
        entries.push(entry.clone());
        Ok(())
    }

    fn find_all_by_store(&self, store_id: StoreId) -> Result<Vec<SubscriptionHistory>> {
        let entries = self.entries.read().unwrap();
        Ok(entries
            .iter()
            .rev()
            .filter(|e| e.store_id == store_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_one_subscription_per_store() {
        let repo = MemorySubscriptionRepository::new();
        let store_id = StoreId::generate();
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

        let first = Subscription::open(store_id, 30, today);
        repo.save(&first).unwrap();

        let mut second = first.clone();
        second.renew_end_date(30);
        repo.save(&second).unwrap();

        let found = repo.find_by_store(store_id).unwrap().unwrap();
        assert_eq!(found.end_date, second.end_date);
    }

    #[test]
    fn test_history_is_per_store_and_newest_first() {
        let repo = MemorySubscriptionHistoryRepository::new();
        let store_a = StoreId::generate();
        let store_b = StoreId::generate();
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

        repo.append(&SubscriptionHistory::failed_attempt(store_a, 1000, today))
            .unwrap();
        repo.append(&SubscriptionHistory::failed_attempt(store_b, 2000, today))
            .unwrap();
        repo.append(&SubscriptionHistory::failed_attempt(store_a, 3000, today))
            .unwrap();

        let ledger = repo.find_all_by_store(store_a).unwrap();
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger[0].amount, 3000);
        assert_eq!(ledger[1].amount, 1000);
    }
}
