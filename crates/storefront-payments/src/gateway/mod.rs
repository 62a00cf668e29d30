//! Gateway Integration
//!
//! Abstractions and implementations for payment gateways.

mod mock;
mod toss;

pub use mock::MockGateway;
pub use toss::{TossConfig, TossGateway};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;

/// Gateway-side order identifier
///
/// A sufficiently random token generated per attempt, never reused across
/// retries. 16 hex characters from a v4 UUID.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderToken(String);

impl OrderToken {
    /// Generate a fresh token
    pub fn generate() -> Self {
        let hex = Uuid::new_v4().simple().to_string();
        Self(hex[..16].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OrderToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One payment-approval attempt, as sent over the wire
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalRequest {
    /// Payment key issued to the customer's browser by the gateway
    pub payment_key: String,

    /// Caller-generated order identifier, unique per attempt
    pub order_id: OrderToken,

    /// Amount to charge, in KRW
    pub amount: i64,
}

impl ApprovalRequest {
    /// Build a request for a new attempt, generating a fresh order token
    pub fn for_attempt(payment_key: impl Into<String>, amount: i64) -> Self {
        Self {
            payment_key: payment_key.into(),
            order_id: OrderToken::generate(),
            amount,
        }
    }
}

/// Outcome of a payment approval
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Approval {
    /// The gateway accepted the charge
    Approved {
        approved_at: DateTime<Utc>,
    },

    /// The gateway refused the charge
    Declined {
        /// Gateway-defined decline code
        code: String,
        message: String,
    },
}

impl Approval {
    pub fn is_approved(&self) -> bool {
        matches!(self, Approval::Approved { .. })
    }
}

/// Payment gateway trait (Strategy pattern)
///
/// Implement this for each gateway. The implementation must issue at most
/// one remote call per `approve` invocation and perform no retries; the
/// caller runs its own failure handling.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Request approval for one payment attempt
    async fn approve(&self, request: &ApprovalRequest) -> Result<Approval>;

    /// Gateway name
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_token_shape() {
        let token = OrderToken::generate();
        assert_eq!(token.as_str().len(), 16);
        assert!(token.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_order_tokens_are_unique_per_attempt() {
        let a = ApprovalRequest::for_attempt("pay_key", 1000);
        let b = ApprovalRequest::for_attempt("pay_key", 1000);
        assert_ne!(a.order_id, b.order_id);
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let request = ApprovalRequest::for_attempt("pay_key", 29_000);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["paymentKey"], "pay_key");
        assert_eq!(json["amount"], 29_000);
        assert_eq!(
            json["orderId"].as_str().unwrap(),
            request.order_id.as_str()
        );
    }
}
