//! Uniform Response Envelope
//!
//! Every endpoint answers `{ status, message, data }`; errors carry a null
//! payload and never leak internal detail.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use storefront_core::CoreError;
use storefront_subscriptions::SubscriptionError;

/// Response envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: u16,
    pub message: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> (StatusCode, Json<Self>) {
        Self::with_status(StatusCode::OK, data)
    }

    pub fn created(data: T) -> (StatusCode, Json<Self>) {
        Self::with_status(StatusCode::CREATED, data)
    }

    fn with_status(status: StatusCode, data: T) -> (StatusCode, Json<Self>) {
        (
            status,
            Json(Self {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or_default()
                    .to_string(),
                data: Some(data),
            }),
        )
    }
}

/// Boundary error, already mapped to an HTTP status
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiResponse::<()> {
            status: self.status.as_u16(),
            message: self.message,
            data: None,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let status = match &err {
            CoreError::StoreNotFound(_) | CoreError::ProductNotFound(_) => StatusCode::NOT_FOUND,
            CoreError::EmailTaken(_) => StatusCode::CONFLICT,
            CoreError::Validation(_) => StatusCode::BAD_REQUEST,
            CoreError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %err, "Storage failure");
        }

        Self::new(status, err.user_message())
    }
}

impl From<SubscriptionError> for ApiError {
    fn from(err: SubscriptionError) -> Self {
        let status = match &err {
            SubscriptionError::StoreNotFound(_)
            | SubscriptionError::SubscriptionInfoNotFound(_) => StatusCode::NOT_FOUND,
            SubscriptionError::GatewayUnstable => StatusCode::BAD_REQUEST,
            SubscriptionError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %err, "Storage failure");
        }

        Self::new(status, err.user_message())
    }
}
