//! Storefront HTTP Server
//!
//! Axum-based server exposing tenant registration, the product catalog, and
//! subscription payment settlement against the Toss gateway.

mod handlers;
mod response;
mod state;

use std::sync::Arc;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront_core::{
    CatalogService, MemoryProductRepository, MemoryStoreRepository, StoreService,
};
use storefront_payments::{MockGateway, PaymentGateway, TossGateway};
use storefront_subscriptions::{
    MemorySubscriptionHistoryRepository, MemorySubscriptionRepository, SubscriptionService,
};

use crate::handlers::{
    change_selling_status, create_product, create_store, delete_product, find_product,
    health_check, list_products, search_products, subscribe_payment, subscription_history,
    update_product,
};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    // Payment gateway: Toss when configured, mock otherwise
    let (gateway, gateway_configured): (Arc<dyn PaymentGateway>, bool) =
        match TossGateway::from_env() {
            Ok(toss) => {
                tracing::info!("✓ Toss gateway configured");
                (Arc::new(toss), true)
            }
            Err(_) => {
                tracing::warn!("⚠ TOSS_SECRET_KEY not set - approving every payment via mock gateway");
                tracing::warn!("  Set TOSS_SECRET_KEY and TOSS_API_BASE in .env");
                (Arc::new(MockGateway::approving()), false)
            }
        };

    // Repositories
    let store_repo = Arc::new(MemoryStoreRepository::new());
    let product_repo = Arc::new(MemoryProductRepository::new());
    let subscription_repo = Arc::new(MemorySubscriptionRepository::new());
    let history_repo = Arc::new(MemorySubscriptionHistoryRepository::new());

    // Services
    let stores = Arc::new(StoreService::new(store_repo.clone()));
    let catalog = Arc::new(CatalogService::new(store_repo.clone(), product_repo));
    let subscriptions = Arc::new(SubscriptionService::new(
        store_repo,
        subscription_repo,
        history_repo,
        gateway,
    ));

    // Build application state
    let state = AppState {
        stores,
        catalog,
        subscriptions,
        gateway_configured,
    };

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = Router::new()
        // Health & info
        .route("/health", get(health_check))
        // Tenants
        .route("/api/v1/stores", post(create_store))
        // Subscriptions
        .route("/api/v1/subscribes/payment", post(subscribe_payment))
        .route("/api/v1/subscribes", get(subscription_history))
        // Catalog (owner-scoped)
        .route("/api/v1/products", post(create_product).put(update_product))
        .route("/api/v1/products/{product_id}", delete(delete_product))
        .route("/api/v1/products/status", patch(change_selling_status))
        // Catalog (public)
        .route("/api/v1/public/products", get(find_product))
        .route("/api/v1/public/products/all", get(list_products))
        .route("/api/v1/public/products/keywords", get(search_products))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 storefront server running on http://{}", addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET    /health                        - Health check");
    tracing::info!("  POST   /api/v1/stores                 - Register store");
    tracing::info!("  POST   /api/v1/subscribes/payment     - Settle subscription payment");
    tracing::info!("  GET    /api/v1/subscribes             - Payment history");
    tracing::info!("  POST   /api/v1/products               - List product");
    tracing::info!("  PUT    /api/v1/products               - Update product");
    tracing::info!("  DELETE /api/v1/products/{{id}}          - Remove product");
    tracing::info!("  PATCH  /api/v1/products/status        - Change selling status");
    tracing::info!("  GET    /api/v1/public/products/...    - Public catalog reads");
    tracing::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}
