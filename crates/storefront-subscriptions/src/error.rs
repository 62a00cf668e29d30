//! Error Types for Subscription Settlement

use thiserror::Error;

use storefront_core::{CoreError, StoreId};

pub type Result<T> = std::result::Result<T, SubscriptionError>;

#[derive(Error, Debug)]
pub enum SubscriptionError {
    /// Referenced store has no backing record; nothing was written
    #[error("Store not found: {0}")]
    StoreNotFound(StoreId),

    /// Renewal expected an existing subscription and found none
    #[error("Subscription info not found for store: {0}")]
    SubscriptionInfoNotFound(StoreId),

    /// The gateway declined or could not process the payment. The decline
    /// reason is logged, not carried here.
    #[error("Payment gateway unstable")]
    GatewayUnstable,

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(String),
}

impl SubscriptionError {
    /// Get user-friendly message
    pub fn user_message(&self) -> &str {
        match self {
            SubscriptionError::StoreNotFound(_) => "Store not found.",
            SubscriptionError::SubscriptionInfoNotFound(_) => "Subscription info not found.",
            SubscriptionError::GatewayUnstable => {
                "The payment gateway is unstable. Please try again later."
            }
            SubscriptionError::Storage(_) => "An error occurred processing your request.",
        }
    }
}

impl From<CoreError> for SubscriptionError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::StoreNotFound(id) => SubscriptionError::StoreNotFound(id),
            other => SubscriptionError::Storage(other.to_string()),
        }
    }
}
