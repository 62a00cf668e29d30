//! Payment Error Types

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, PaymentError>;

/// Payment-related errors
///
/// A decline is not an error; it comes back as `Approval::Declined`. These
/// variants cover everything that prevents getting an answer at all.
#[derive(Error, Debug)]
pub enum PaymentError {
    /// Gateway responded outside its documented contract
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network-level failure reaching the gateway
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl PaymentError {
    /// Get user-friendly message
    pub fn user_message(&self) -> &str {
        match self {
            PaymentError::Config(_) => "Service configuration error.",
            _ => "Payment processing failed. Please try again.",
        }
    }
}
