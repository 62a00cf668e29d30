//! HTTP Handlers

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront_core::{NewProduct, Product, ProductId, Selling, Store, StoreId};
use storefront_subscriptions::{
    SubscribePaymentCommand, SubscriptionHistory, SubscriptionStatus, SubscriptionSummary,
};

use crate::response::{ApiError, ApiResponse};
use crate::state::AppState;

/// Header carrying the authenticated store's id. Stands in for the session
/// principal; real authentication lives outside this service.
const STORE_HEADER: &str = "x-store-id";

type Reply<T> = Result<(axum::http::StatusCode, Json<ApiResponse<T>>), ApiError>;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub gateway_configured: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStoreRequest {
    pub email: String,
    pub business_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreResponse {
    pub id: Uuid,
    pub email: String,
    pub business_name: String,
    pub created_at: DateTime<Utc>,
}

impl From<Store> for StoreResponse {
    fn from(store: Store) -> Self {
        Self {
            id: store.id.as_uuid(),
            email: store.email,
            business_name: store.business_name,
            created_at: store.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribePaymentRequest {
    pub payment_key: String,

    /// Accepted for the audit log, regenerated before the gateway call
    pub order_id: String,

    pub amount: i64,

    /// Period length in days
    pub period: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeResponse {
    pub store_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub amount: i64,
    pub status: SubscriptionStatus,
}

impl From<SubscriptionSummary> for SubscribeResponse {
    fn from(summary: SubscriptionSummary) -> Self {
        Self {
            store_id: summary.store_id.as_uuid(),
            start_date: summary.start_date,
            end_date: summary.end_date,
            amount: summary.amount,
            status: summary.status,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeHistoryResponse {
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub amount: i64,
    pub payment_succeeded: bool,
    pub recorded_at: DateTime<Utc>,
}

impl From<SubscriptionHistory> for SubscribeHistoryResponse {
    fn from(entry: SubscriptionHistory) -> Self {
        Self {
            start_date: entry.start_date,
            end_date: entry.end_date,
            amount: entry.amount,
            payment_succeeded: entry.payment_succeeded,
            recorded_at: entry.recorded_at,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub product_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellingStatusRequest {
    pub product_id: Uuid,
    pub selling: Selling,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: Uuid,
    pub store_id: Uuid,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub selling: Selling,
    pub created_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.as_uuid(),
            store_id: product.store_id.as_uuid(),
            name: product.name,
            description: product.description,
            price: product.price,
            selling: product.selling,
            created_at: product.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    pub product_id: Uuid,
    pub store_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreQuery {
    pub store_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordQuery {
    pub store_id: Uuid,
    pub keyword: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        gateway_configured: state.gateway_configured,
    })
}

/// Register a tenant
pub async fn create_store(
    State(state): State<AppState>,
    Json(payload): Json<CreateStoreRequest>,
) -> Reply<StoreResponse> {
    if payload.email.trim().is_empty() || !payload.email.contains('@') {
        return Err(ApiError::bad_request("A valid email is required"));
    }
    if payload.business_name.trim().is_empty() {
        return Err(ApiError::bad_request("Business name is required"));
    }

    let store = state.stores.register(payload.email, payload.business_name)?;
    Ok(ApiResponse::created(store.into()))
}

/// Settle a subscription payment for the calling store
pub async fn subscribe_payment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<SubscribePaymentRequest>,
) -> Reply<SubscribeResponse> {
    let store_id = caller_store(&headers)?;

    if payload.payment_key.trim().is_empty() {
        return Err(ApiError::bad_request("Payment key is required"));
    }
    if payload.order_id.trim().is_empty() {
        return Err(ApiError::bad_request("Order id is required"));
    }
    if payload.amount <= 0 {
        return Err(ApiError::bad_request("Amount must be positive"));
    }
    if payload.period <= 0 {
        return Err(ApiError::bad_request("Period must be positive"));
    }

    let command = SubscribePaymentCommand {
        payment_key: payload.payment_key,
        order_id: payload.order_id,
        amount: payload.amount,
        period_days: payload.period,
    };

    let summary = state.subscriptions.subscribe_payment(store_id, command).await?;
    Ok(ApiResponse::created(summary.into()))
}

/// Payment ledger for the calling store, newest first
pub async fn subscription_history(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Reply<Vec<SubscribeHistoryResponse>> {
    let store_id = caller_store(&headers)?;

    let ledger = state.subscriptions.history(store_id)?;
    Ok(ApiResponse::ok(
        ledger.into_iter().map(Into::into).collect(),
    ))
}

/// List a new product for the calling store
pub async fn create_product(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateProductRequest>,
) -> Reply<ProductResponse> {
    let store_id = caller_store(&headers)?;
    validate_product_fields(&payload.name, payload.price)?;

    let product = state.catalog.create(
        store_id,
        NewProduct {
            name: payload.name,
            description: payload.description,
            price: payload.price,
        },
    )?;

    Ok(ApiResponse::created(product.into()))
}

/// Update a product owned by the calling store
pub async fn update_product(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<UpdateProductRequest>,
) -> Reply<ProductResponse> {
    let store_id = caller_store(&headers)?;
    validate_product_fields(&payload.name, payload.price)?;

    let product = state.catalog.update(
        store_id,
        ProductId::from_uuid(payload.product_id),
        payload.name,
        payload.description,
        payload.price,
    )?;

    Ok(ApiResponse::ok(product.into()))
}

/// Remove a product owned by the calling store
pub async fn delete_product(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(product_id): Path<Uuid>,
) -> Reply<()> {
    let store_id = caller_store(&headers)?;

    state
        .catalog
        .delete(store_id, ProductId::from_uuid(product_id))?;
    Ok(ApiResponse::ok(()))
}

/// Flip a product's selling status
pub async fn change_selling_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<SellingStatusRequest>,
) -> Reply<ProductResponse> {
    let store_id = caller_store(&headers)?;

    let product = state.catalog.change_selling_status(
        store_id,
        ProductId::from_uuid(payload.product_id),
        payload.selling,
    )?;

    Ok(ApiResponse::ok(product.into()))
}

/// Public read of one product within a store
pub async fn find_product(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Reply<ProductResponse> {
    let product = state.catalog.get(
        StoreId::from_uuid(query.store_id),
        ProductId::from_uuid(query.product_id),
    )?;

    Ok(ApiResponse::ok(product.into()))
}

/// Public listing of one store's catalog
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<StoreQuery>,
) -> Reply<Vec<ProductResponse>> {
    let products = state.catalog.list_by_store(StoreId::from_uuid(query.store_id))?;
    Ok(ApiResponse::ok(
        products.into_iter().map(Into::into).collect(),
    ))
}

/// Public keyword search over a store's on-sale products
pub async fn search_products(
    State(state): State<AppState>,
    Query(query): Query<KeywordQuery>,
) -> Reply<Vec<ProductResponse>> {
    let products = state
        .catalog
        .search_by_keyword(StoreId::from_uuid(query.store_id), &query.keyword)?;
    Ok(ApiResponse::ok(
        products.into_iter().map(Into::into).collect(),
    ))
}

// ============================================================================
// Helpers
// ============================================================================

fn caller_store(headers: &HeaderMap) -> Result<StoreId, ApiError> {
    headers
        .get(STORE_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<StoreId>().ok())
        .ok_or_else(|| ApiError::bad_request("Missing or malformed x-store-id header"))
}

fn validate_product_fields(name: &str, price: i64) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::bad_request("Product name is required"));
    }
    if price <= 0 {
        return Err(ApiError::bad_request("Price must be positive"));
    }
    Ok(())
}
