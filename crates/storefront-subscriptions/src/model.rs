//! Domain Models
//!
//! The subscription row and its append-only payment ledger. Amounts are
//! integer KRW; billing periods are whole days on `NaiveDate`.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront_core::StoreId;

/// One store's current (or most recent) subscription period
///
/// At most one of these exists per store; the repository keys on the store
/// id to enforce it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Subscription {
    /// Surrogate key
    pub id: Uuid,

    /// Owning store
    pub store_id: StoreId,

    /// First day of the current period
    pub start_date: NaiveDate,

    /// Last day the subscription is considered active
    pub end_date: NaiveDate,

    /// Period length in days, used to compute each renewal
    pub period_days: i64,
}

impl Subscription {
    /// Open a fresh subscription running from `today`
    pub fn open(store_id: StoreId, period_days: i64, today: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            store_id,
            start_date: today,
            end_date: today + Duration::days(period_days),
            period_days,
        }
    }

    /// A subscription whose end date has passed
    pub fn is_lapsed(&self, today: NaiveDate) -> bool {
        self.end_date < today
    }

    /// Restart the period clock after a lapse
    pub fn reset_start_date(&mut self, today: NaiveDate) {
        self.start_date = today;
    }

    /// Extend by `period_days` from the current end date, not from today
    pub fn renew_end_date(&mut self, period_days: i64) {
        self.end_date = self.end_date + Duration::days(period_days);
        self.period_days = period_days;
    }

    /// Status computed on read; there is no stored EXPIRED state
    pub fn status(&self, today: NaiveDate) -> SubscriptionStatus {
        if self.is_lapsed(today) {
            SubscriptionStatus::Lapsed
        } else {
            SubscriptionStatus::Active
        }
    }
}

/// Subscription status relative to the current date
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Lapsed,
}

/// One immutable ledger row per payment attempt
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubscriptionHistory {
    /// Surrogate key
    pub id: Uuid,

    /// Owning store
    pub store_id: StoreId,

    /// Period start as recorded at settlement time
    pub start_date: NaiveDate,

    /// Period end; `None` for failed attempts, which bought no period
    pub end_date: Option<NaiveDate>,

    /// Amount charged (or attempted), in KRW
    pub amount: i64,

    /// Whether the gateway approved the attempt
    pub payment_succeeded: bool,

    /// When the attempt resolved
    pub recorded_at: DateTime<Utc>,
}

impl SubscriptionHistory {
    /// Ledger row mirroring a settled subscription's current dates
    pub fn settled(subscription: &Subscription, amount: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            store_id: subscription.store_id,
            start_date: subscription.start_date,
            end_date: Some(subscription.end_date),
            amount,
            payment_succeeded: true,
            recorded_at: Utc::now(),
        }
    }

    /// Ledger row for a declined or unreachable-gateway attempt
    pub fn failed_attempt(store_id: StoreId, amount: i64, today: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            store_id,
            start_date: today,
            end_date: None,
            amount,
            payment_succeeded: false,
            recorded_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_open_runs_from_today() {
        let sub = Subscription::open(StoreId::generate(), 30, date(2024, 1, 1));
        assert_eq!(sub.start_date, date(2024, 1, 1));
        assert_eq!(sub.end_date, date(2024, 1, 31));
    }

    #[test]
    fn test_renewal_extends_from_current_end() {
        let mut sub = Subscription::open(StoreId::generate(), 31, date(2024, 1, 1));
        assert_eq!(sub.end_date, date(2024, 2, 1));

        sub.renew_end_date(30);
        assert_eq!(sub.end_date, date(2024, 3, 2));
        assert_eq!(sub.start_date, date(2024, 1, 1));
    }

    #[test]
    fn test_lapse_is_computed_on_read() {
        let sub = Subscription::open(StoreId::generate(), 30, date(2024, 1, 1));

        assert_eq!(sub.status(date(2024, 1, 31)), SubscriptionStatus::Active);
        assert_eq!(sub.status(date(2024, 2, 1)), SubscriptionStatus::Lapsed);
        assert!(sub.is_lapsed(date(2024, 2, 1)));
    }

    #[test]
    fn test_failed_attempt_buys_no_period() {
        let row = SubscriptionHistory::failed_attempt(StoreId::generate(), 1000, date(2024, 1, 15));
        assert_eq!(row.end_date, None);
        assert!(!row.payment_succeeded);
        assert_eq!(row.start_date, date(2024, 1, 15));
    }
}
