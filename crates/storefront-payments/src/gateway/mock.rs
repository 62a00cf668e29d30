//! Mock Payment Gateway
//!
//! For testing and local development. Records every request it sees so
//! tests can assert on call counts and order-token regeneration.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Mutex;

use super::{Approval, ApprovalRequest, PaymentGateway};
use crate::error::{PaymentError, Result};

enum Behavior {
    Approve,
    Decline { code: String, message: String },
    Unreachable,
}

/// Mock gateway with scripted behavior
pub struct MockGateway {
    behavior: Behavior,
    requests: Mutex<Vec<ApprovalRequest>>,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::approving()
    }
}

impl MockGateway {
    /// Approve every attempt
    pub fn approving() -> Self {
        Self {
            behavior: Behavior::Approve,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Decline every attempt with the given code
    pub fn declining(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            behavior: Behavior::Decline {
                code: code.into(),
                message: message.into(),
            },
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Fail every attempt at the transport level
    pub fn unreachable() -> Self {
        Self {
            behavior: Behavior::Unreachable,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Number of approval calls issued so far
    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Every request seen, in order
    pub fn requests(&self) -> Vec<ApprovalRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn approve(&self, request: &ApprovalRequest) -> Result<Approval> {
        self.requests.lock().unwrap().push(request.clone());

        match &self.behavior {
            Behavior::Approve => Ok(Approval::Approved {
                approved_at: Utc::now(),
            }),
            Behavior::Decline { code, message } => Ok(Approval::Declined {
                code: code.clone(),
                message: message.clone(),
            }),
            Behavior::Unreachable => {
                Err(PaymentError::Gateway("Mock gateway unreachable".into()))
            }
        }
    }

    fn name(&self) -> &str {
        "MockGateway"
    }
}
