//! # storefront-payments
//!
//! Payment gateway client for the storefront backend.
//!
//! ## Approval Flow
//!
//! One call, one charge. The gateway approval endpoint is the sole point of
//! real money movement, so the client issues exactly one request per logical
//! payment attempt and never retries on its own.
//!
//! ```text
//! ┌──────────────┐     ┌──────────────────┐     ┌──────────────┐
//! │  Storefront  │────▶│  Toss /payments/ │────▶│  Approved /  │
//! │  (attempt)   │     │     confirm      │     │  Declined    │
//! └──────────────┘     └──────────────────┘     └──────────────┘
//! ```
//!
//! The order identifier sent to the gateway is a 16-character hex token
//! generated fresh for every attempt, so retried attempts can never collide
//! on the gateway side. Whatever order id the storefront's own caller
//! supplied is ignored.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use storefront_payments::{ApprovalRequest, PaymentGateway, TossGateway};
//!
//! let gateway = TossGateway::from_env()?;
//! let request = ApprovalRequest::for_attempt("pay_key_xxx", 29_000);
//!
//! match gateway.approve(&request).await? {
//!     Approval::Approved { .. } => { /* settle */ }
//!     Approval::Declined { code, .. } => { /* compensate */ }
//! }
//! ```

mod error;
mod gateway;

pub use error::{PaymentError, Result};
pub use gateway::{
    Approval, ApprovalRequest, MockGateway, OrderToken, PaymentGateway, TossConfig, TossGateway,
};
