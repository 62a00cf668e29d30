//! Application State

use std::sync::Arc;

use storefront_core::{CatalogService, StoreService};
use storefront_subscriptions::SubscriptionService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Tenant registration and lookup
    pub stores: Arc<StoreService>,

    /// Owner-scoped catalog operations and public reads
    pub catalog: Arc<CatalogService>,

    /// Subscription settlement and history
    pub subscriptions: Arc<SubscriptionService>,

    /// Whether a real gateway is configured (mock fallback otherwise)
    pub gateway_configured: bool,
}
