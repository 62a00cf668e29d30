//! Toss Payments Gateway
//!
//! Implementation of `PaymentGateway` against the Toss payment-confirmation
//! endpoint.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;

use super::{Approval, ApprovalRequest, PaymentGateway};
use crate::error::{PaymentError, Result};

/// Toss gateway configuration
#[derive(Clone, Debug)]
pub struct TossConfig {
    /// Merchant secret key, sent as HTTP basic auth username
    pub secret_key: String,

    /// API base URL
    pub api_base: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for TossConfig {
    fn default() -> Self {
        Self {
            secret_key: String::new(),
            api_base: "https://api.tosspayments.com".into(),
            timeout_secs: 30,
        }
    }
}

impl TossConfig {
    pub fn from_env() -> Result<Self> {
        let secret_key = std::env::var("TOSS_SECRET_KEY")
            .map_err(|_| PaymentError::Config("TOSS_SECRET_KEY not set".into()))?;
        let api_base = std::env::var("TOSS_API_BASE")
            .unwrap_or_else(|_| "https://api.tosspayments.com".into());

        Ok(Self {
            secret_key,
            api_base,
            ..Default::default()
        })
    }
}

/// Toss payment gateway client
pub struct TossGateway {
    http: reqwest::Client,
    config: TossConfig,
}

impl TossGateway {
    /// Create from configuration
    pub fn from_config(config: TossConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { http, config })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_config(TossConfig::from_env()?)
    }

    fn confirm_url(&self) -> String {
        format!("{}/v1/payments/confirm", self.config.api_base)
    }
}

/// Fields we read from a successful confirmation body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfirmBody {
    approved_at: Option<DateTime<Utc>>,
}

/// Error body returned on a decline
#[derive(Debug, Deserialize)]
struct DeclineBody {
    code: String,
    message: String,
}

#[async_trait]
impl PaymentGateway for TossGateway {
    async fn approve(&self, request: &ApprovalRequest) -> Result<Approval> {
        tracing::debug!(
            order_id = %request.order_id,
            amount = request.amount,
            "Requesting payment approval"
        );

        let response = self
            .http
            .post(self.confirm_url())
            .basic_auth(&self.config.secret_key, Some(""))
            .json(request)
            .send()
            .await?;

        let status = response.status();

        if status.is_success() {
            let body: ConfirmBody = response
                .json()
                .await
                .map_err(|e| PaymentError::Gateway(format!("Malformed approval body: {e}")))?;

            return Ok(Approval::Approved {
                approved_at: body.approved_at.unwrap_or_else(Utc::now),
            });
        }

        if status.is_client_error() {
            let body: DeclineBody = response
                .json()
                .await
                .map_err(|e| PaymentError::Gateway(format!("Malformed decline body: {e}")))?;

            tracing::warn!(
                order_id = %request.order_id,
                code = %body.code,
                "Payment declined"
            );

            return Ok(Approval::Declined {
                code: body.code,
                message: body.message,
            });
        }

        Err(PaymentError::Gateway(format!(
            "Unexpected status {status} from confirmation endpoint"
        )))
    }

    fn name(&self) -> &str {
        "Toss"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = TossConfig::default();
        assert_eq!(config.api_base, "https://api.tosspayments.com");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_confirm_url() {
        let gateway = TossGateway::from_config(TossConfig {
            secret_key: "test_sk".into(),
            api_base: "http://localhost:8080".into(),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(gateway.confirm_url(), "http://localhost:8080/v1/payments/confirm");
    }
}
