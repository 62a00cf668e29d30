//! # storefront-subscriptions
//!
//! Subscription lifecycle and payment settlement.
//!
//! ## Lifecycle
//!
//! ```text
//!          first approved payment          approved renewal
//!  NONE ──────────────────────▶ ACTIVE ──────────────────▶ ACTIVE (extended)
//!                                  │
//!                                  │ end date passes (computed on read,
//!                                  ▼  no stored state)
//!                               LAPSED ── approved renewal resets start ──▶ ACTIVE
//! ```
//!
//! Every payment attempt, approved or declined, appends one immutable
//! ledger row. A declined payment never touches the subscription itself;
//! the compensating ledger write is the only side effect before the error
//! surfaces to the caller.
//!
//! Renewals for one store are serialized behind a per-store async lock, so
//! two concurrent requests cannot interleave their read-extend-write cycles
//! or double-charge a lapse reset.

pub mod error;
pub mod model;
pub mod repository;
pub mod service;

pub use error::{Result, SubscriptionError};
pub use model::{Subscription, SubscriptionHistory, SubscriptionStatus};
pub use repository::{
    MemorySubscriptionHistoryRepository, MemorySubscriptionRepository,
    SubscriptionHistoryRepository, SubscriptionRepository,
};
pub use service::{SubscribePaymentCommand, SubscriptionService, SubscriptionSummary};
