//! # storefront-core
//!
//! Tenant identity and product catalog for the storefront backend.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Store (tenant root)                   │
//! │  ┌─────────────┐  ┌──────────────┐  ┌────────────────────┐  │
//! │  │   Store     │  │   Product    │  │  Repository traits │  │
//! │  │  Registry   │──│   Catalog    │──│  (memory-backed)   │  │
//! │  └─────────────┘  └──────────────┘  └────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! A `Store` owns everything: products here, subscriptions in the
//! `storefront-subscriptions` crate. No cross-store references exist, and
//! store existence is a precondition for every tenant-scoped operation.

pub mod catalog;
pub mod error;
pub mod store;

pub use catalog::{
    CatalogService, MemoryProductRepository, NewProduct, Product, ProductId, ProductRepository,
    Selling,
};
pub use error::{CoreError, Result};
pub use store::{MemoryStoreRepository, Store, StoreId, StoreRepository, StoreService};
