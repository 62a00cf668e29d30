//! Subscription Settlement Service
//!
//! Drives one payment attempt end-to-end: gateway approval, then the paired
//! subscription/ledger writes for the branch the gateway outcome selects.

use chrono::{NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use storefront_core::{StoreId, StoreRepository};
use storefront_payments::{Approval, ApprovalRequest, PaymentGateway};

use crate::error::{Result, SubscriptionError};
use crate::model::{Subscription, SubscriptionHistory, SubscriptionStatus};
use crate::repository::{SubscriptionHistoryRepository, SubscriptionRepository};

/// One inbound subscription-payment request
///
/// The caller-supplied order id is carried for the audit log only; the
/// gateway always sees a freshly generated token.
#[derive(Clone, Debug)]
pub struct SubscribePaymentCommand {
    pub payment_key: String,

    /// Ignored for settlement; regenerated before the gateway call
    pub order_id: String,

    /// Amount to charge, in KRW
    pub amount: i64,

    /// Requested period length in days
    pub period_days: i64,
}

/// Response shape for a settled payment
#[derive(Clone, Debug, serde::Serialize)]
pub struct SubscriptionSummary {
    pub store_id: StoreId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub amount: i64,
    pub status: SubscriptionStatus,
}

impl SubscriptionSummary {
    fn of(subscription: &Subscription, amount: i64, today: NaiveDate) -> Self {
        Self {
            store_id: subscription.store_id,
            start_date: subscription.start_date,
            end_date: subscription.end_date,
            amount,
            status: subscription.status(today),
        }
    }
}

/// Per-store mutual exclusion
///
/// The storage layer's row locks are not relied on; two settlements for the
/// same store must never interleave their read-extend-write cycles.
struct StoreLocks {
    locks: Mutex<HashMap<StoreId, Arc<Mutex<()>>>>,
}

impl StoreLocks {
    fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    async fn acquire(&self, store_id: StoreId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks
                .entry(store_id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

/// Subscription lifecycle manager
pub struct SubscriptionService {
    stores: Arc<dyn StoreRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
    histories: Arc<dyn SubscriptionHistoryRepository>,
    gateway: Arc<dyn PaymentGateway>,
    locks: StoreLocks,
}

impl SubscriptionService {
    pub fn new(
        stores: Arc<dyn StoreRepository>,
        subscriptions: Arc<dyn SubscriptionRepository>,
        histories: Arc<dyn SubscriptionHistoryRepository>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            stores,
            subscriptions,
            histories,
            gateway,
            locks: StoreLocks::new(),
        }
    }

    /// Settle one subscription payment for the store
    pub async fn subscribe_payment(
        &self,
        store_id: StoreId,
        command: SubscribePaymentCommand,
    ) -> Result<SubscriptionSummary> {
        self.subscribe_payment_on(store_id, command, Utc::now().date_naive())
            .await
    }

    /// Date-injected variant of [`subscribe_payment`](Self::subscribe_payment)
    pub async fn subscribe_payment_on(
        &self,
        store_id: StoreId,
        command: SubscribePaymentCommand,
        today: NaiveDate,
    ) -> Result<SubscriptionSummary> {
        let _guard = self.locks.acquire(store_id).await;

        // One gateway call per logical attempt, with a regenerated order id.
        let request = ApprovalRequest::for_attempt(&command.payment_key, command.amount);

        tracing::info!(
            store_id = %store_id,
            order_id = %request.order_id,
            client_order_id = %command.order_id,
            amount = command.amount,
            "Requesting subscription payment approval"
        );

        match self.gateway.approve(&request).await {
            Ok(Approval::Approved { .. }) => {
                self.settle(store_id, command.amount, command.period_days, today)
            }
            Ok(Approval::Declined { code, message }) => {
                tracing::warn!(
                    store_id = %store_id,
                    order_id = %request.order_id,
                    code = %code,
                    message = %message,
                    "Payment declined"
                );
                self.record_failed_attempt(store_id, command.amount, today)?;
                Err(SubscriptionError::GatewayUnstable)
            }
            Err(err) => {
                tracing::warn!(
                    store_id = %store_id,
                    order_id = %request.order_id,
                    error = %err,
                    "Gateway unreachable"
                );
                self.record_failed_attempt(store_id, command.amount, today)?;
                Err(SubscriptionError::GatewayUnstable)
            }
        }
    }

    /// Ledger for one store, newest first
    pub fn history(&self, store_id: StoreId) -> Result<Vec<SubscriptionHistory>> {
        self.histories.find_all_by_store(store_id)
    }

    fn settle(
        &self,
        store_id: StoreId,
        amount: i64,
        period_days: i64,
        today: NaiveDate,
    ) -> Result<SubscriptionSummary> {
        match self.subscriptions.find_by_store(store_id)? {
            None => self.open_subscription(store_id, amount, period_days, today),
            Some(_) => self.renew_subscription(store_id, amount, period_days, today),
        }
    }

    fn open_subscription(
        &self,
        store_id: StoreId,
        amount: i64,
        period_days: i64,
        today: NaiveDate,
    ) -> Result<SubscriptionSummary> {
        let store = self
            .stores
            .find(store_id)?
            .ok_or(SubscriptionError::StoreNotFound(store_id))?;

        let subscription = Subscription::open(store.id, period_days, today);
        self.subscriptions.save(&subscription)?;
        self.histories
            .append(&SubscriptionHistory::settled(&subscription, amount))?;

        tracing::info!(
            store_id = %store_id,
            end_date = %subscription.end_date,
            "Opened subscription"
        );

        Ok(SubscriptionSummary::of(&subscription, amount, today))
    }

    fn renew_subscription(
        &self,
        store_id: StoreId,
        amount: i64,
        period_days: i64,
        today: NaiveDate,
    ) -> Result<SubscriptionSummary> {
        let mut subscription = self
            .subscriptions
            .find_by_store(store_id)?
            .ok_or(SubscriptionError::SubscriptionInfoNotFound(store_id))?;

        if subscription.is_lapsed(today) {
            subscription.reset_start_date(today);
        }

        // The ledger records the pre-renewal period; the extension lands
        // only on the subscription row.
        self.histories
            .append(&SubscriptionHistory::settled(&subscription, amount))?;

        subscription.renew_end_date(period_days);
        self.subscriptions.save(&subscription)?;

        tracing::info!(
            store_id = %store_id,
            end_date = %subscription.end_date,
            "Renewed subscription"
        );

        Ok(SubscriptionSummary::of(&subscription, amount, today))
    }

    fn record_failed_attempt(&self, store_id: StoreId, amount: i64, today: NaiveDate) -> Result<()> {
        let store = self
            .stores
            .find(store_id)?
            .ok_or(SubscriptionError::StoreNotFound(store_id))?;

        self.histories
            .append(&SubscriptionHistory::failed_attempt(store.id, amount, today))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{MemorySubscriptionHistoryRepository, MemorySubscriptionRepository};
    use storefront_core::{MemoryStoreRepository, Store};
    use storefront_payments::MockGateway;

    struct Fixture {
        service: SubscriptionService,
        gateway: Arc<MockGateway>,
        stores: Arc<MemoryStoreRepository>,
        subscriptions: Arc<MemorySubscriptionRepository>,
        histories: Arc<MemorySubscriptionHistoryRepository>,
        store_id: StoreId,
    }

    fn fixture(gateway: MockGateway) -> Fixture {
        let stores = Arc::new(MemoryStoreRepository::new());
        let store = Store::new("owner@cafe.kr", "Mosk Cafe");
        stores.save(&store).unwrap();

        let gateway = Arc::new(gateway);
        let subscriptions = Arc::new(MemorySubscriptionRepository::new());
        let histories = Arc::new(MemorySubscriptionHistoryRepository::new());

        let service = SubscriptionService::new(
            stores.clone(),
            subscriptions.clone(),
            histories.clone(),
            gateway.clone(),
        );

        Fixture {
            service,
            gateway,
            stores,
            subscriptions,
            histories,
            store_id: store.id,
        }
    }

    fn command(amount: i64, period_days: i64) -> SubscribePaymentCommand {
        SubscribePaymentCommand {
            payment_key: "pay_key".into(),
            order_id: "client-supplied".into(),
            amount,
            period_days,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_first_payment_opens_subscription() {
        let fx = fixture(MockGateway::approving());
        let today = date(2024, 1, 1);

        let summary = fx
            .service
            .subscribe_payment_on(fx.store_id, command(29_000, 30), today)
            .await
            .unwrap();

        assert_eq!(summary.start_date, today);
        assert_eq!(summary.end_date, date(2024, 1, 31));
        assert_eq!(summary.status, SubscriptionStatus::Active);

        let ledger = fx.histories.find_all_by_store(fx.store_id).unwrap();
        assert_eq!(ledger.len(), 1);
        assert!(ledger[0].payment_succeeded);
        assert_eq!(ledger[0].start_date, today);
        assert_eq!(ledger[0].end_date, Some(date(2024, 1, 31)));
        assert_eq!(ledger[0].amount, 29_000);
    }

    #[tokio::test]
    async fn test_renewal_extends_from_current_end() {
        let fx = fixture(MockGateway::approving());

        // Subscription(start=2024-01-01, end=2024-02-01), renewed with
        // period=30 on 2024-01-15 for 1000.
        fx.service
            .subscribe_payment_on(fx.store_id, command(1000, 31), date(2024, 1, 1))
            .await
            .unwrap();

        let summary = fx
            .service
            .subscribe_payment_on(fx.store_id, command(1000, 30), date(2024, 1, 15))
            .await
            .unwrap();

        assert_eq!(summary.start_date, date(2024, 1, 1));
        assert_eq!(summary.end_date, date(2024, 3, 2));

        // Second ledger row carries the pre-renewal period.
        let ledger = fx.histories.find_all_by_store(fx.store_id).unwrap();
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger[0].start_date, date(2024, 1, 1));
        assert_eq!(ledger[0].end_date, Some(date(2024, 2, 1)));
        assert_eq!(ledger[0].amount, 1000);
    }

    #[tokio::test]
    async fn test_lapsed_renewal_resets_start() {
        let fx = fixture(MockGateway::approving());

        // end=2024-03-01; by 2024-03-10 the subscription has lapsed.
        fx.service
            .subscribe_payment_on(fx.store_id, command(1000, 60), date(2024, 1, 1))
            .await
            .unwrap();

        let summary = fx
            .service
            .subscribe_payment_on(fx.store_id, command(1000, 30), date(2024, 3, 10))
            .await
            .unwrap();

        assert_eq!(summary.start_date, date(2024, 3, 10));
        // Extension still runs from the old end, not from today.
        assert_eq!(summary.end_date, date(2024, 3, 31));

        // Pre-renewal ledger row sees the reset start and the old end.
        let ledger = fx.histories.find_all_by_store(fx.store_id).unwrap();
        assert_eq!(ledger[0].start_date, date(2024, 3, 10));
        assert_eq!(ledger[0].end_date, Some(date(2024, 3, 1)));
    }

    #[tokio::test]
    async fn test_decline_writes_ledger_but_not_subscription() {
        let fx = fixture(MockGateway::declining("REJECT_CARD_COMPANY", "Declined"));

        let result = fx
            .service
            .subscribe_payment_on(fx.store_id, command(29_000, 30), date(2024, 1, 15))
            .await;

        assert!(matches!(result, Err(SubscriptionError::GatewayUnstable)));
        assert!(fx.subscriptions.find_by_store(fx.store_id).unwrap().is_none());

        let ledger = fx.histories.find_all_by_store(fx.store_id).unwrap();
        assert_eq!(ledger.len(), 1);
        assert!(!ledger[0].payment_succeeded);
        assert_eq!(ledger[0].start_date, date(2024, 1, 15));
        assert_eq!(ledger[0].end_date, None);
        assert_eq!(ledger[0].amount, 29_000);
    }

    #[tokio::test]
    async fn test_decline_leaves_existing_subscription_untouched() {
        let fx = fixture(MockGateway::approving());
        fx.service
            .subscribe_payment_on(fx.store_id, command(1000, 30), date(2024, 1, 1))
            .await
            .unwrap();

        // Same repositories, declining gateway.
        let declining = SubscriptionService::new(
            fx.stores.clone(),
            fx.subscriptions.clone(),
            fx.histories.clone(),
            Arc::new(MockGateway::declining("INVALID_CARD", "Bad card")),
        );

        let result = declining
            .subscribe_payment_on(fx.store_id, command(1000, 30), date(2024, 1, 15))
            .await;
        assert!(matches!(result, Err(SubscriptionError::GatewayUnstable)));

        let subscription = fx.subscriptions.find_by_store(fx.store_id).unwrap().unwrap();
        assert_eq!(subscription.start_date, date(2024, 1, 1));
        assert_eq!(subscription.end_date, date(2024, 1, 31));

        let ledger = fx.histories.find_all_by_store(fx.store_id).unwrap();
        assert_eq!(ledger.len(), 2);
        assert!(!ledger[0].payment_succeeded);
        assert!(ledger[1].payment_succeeded);
    }

    #[tokio::test]
    async fn test_unknown_store_fails_hard_with_no_ledger_row() {
        let fx = fixture(MockGateway::approving());
        let stranger = StoreId::generate();

        let result = fx
            .service
            .subscribe_payment_on(stranger, command(1000, 30), date(2024, 1, 1))
            .await;

        assert!(matches!(result, Err(SubscriptionError::StoreNotFound(_))));
        assert!(fx.histories.find_all_by_store(stranger).unwrap().is_empty());
        // The approval itself had already gone out; the abort only skips
        // the writes.
        assert_eq!(fx.gateway.calls(), 1);
    }

    #[tokio::test]
    async fn test_gateway_sees_fresh_order_ids() {
        let fx = fixture(MockGateway::approving());

        fx.service
            .subscribe_payment_on(fx.store_id, command(1000, 30), date(2024, 1, 1))
            .await
            .unwrap();
        fx.service
            .subscribe_payment_on(fx.store_id, command(1000, 30), date(2024, 1, 2))
            .await
            .unwrap();

        let requests = fx.gateway.requests();
        assert_eq!(requests.len(), 2);
        assert_ne!(requests[0].order_id, requests[1].order_id);
        assert_ne!(requests[0].order_id.as_str(), "client-supplied");
    }

    #[tokio::test]
    async fn test_transport_failure_is_compensated_like_a_decline() {
        let fx = fixture(MockGateway::unreachable());

        let result = fx
            .service
            .subscribe_payment_on(fx.store_id, command(1000, 30), date(2024, 1, 1))
            .await;

        assert!(matches!(result, Err(SubscriptionError::GatewayUnstable)));
        assert_eq!(fx.gateway.calls(), 1);

        let ledger = fx.histories.find_all_by_store(fx.store_id).unwrap();
        assert_eq!(ledger.len(), 1);
        assert!(!ledger[0].payment_succeeded);
    }

    #[tokio::test]
    async fn test_concurrent_renewals_serialize_per_store() {
        let fx = fixture(MockGateway::approving());
        let service = Arc::new(fx.service);

        service
            .subscribe_payment_on(fx.store_id, command(1000, 30), date(2024, 1, 1))
            .await
            .unwrap();

        let a = {
            let service = service.clone();
            let store_id = fx.store_id;
            tokio::spawn(async move {
                service
                    .subscribe_payment_on(store_id, command(1000, 30), date(2024, 1, 10))
                    .await
            })
        };
        let b = {
            let service = service.clone();
            let store_id = fx.store_id;
            tokio::spawn(async move {
                service
                    .subscribe_payment_on(store_id, command(1000, 30), date(2024, 1, 10))
                    .await
            })
        };

        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        // Both renewals landed: 2024-01-31 + 30 + 30.
        let subscription = fx.subscriptions.find_by_store(fx.store_id).unwrap().unwrap();
        assert_eq!(subscription.end_date, date(2024, 3, 31));

        let ledger = fx.histories.find_all_by_store(fx.store_id).unwrap();
        assert_eq!(ledger.len(), 3);
    }
}
