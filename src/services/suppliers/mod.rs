// Supplier integrations: one adapter per external fulfillment partner behind
// a shared capability interface. Callers never branch on partner identity
// outside the factory.

pub mod factory;
pub mod loomworks;
pub mod printhaus;

pub use factory::{AdapterFactory, FactoryError};
pub use loomworks::{LoomWorksAdapter, LoomWorksConfig};
pub use printhaus::{PrintHausAdapter, PrintHausConfig};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::supplier::SupplierKind;

// ============================================================================
// Error Taxonomy
// ============================================================================

/// Shared failure taxonomy all adapters map partner-specific errors into, so
/// the routing and sync layers can react uniformly.
#[derive(Error, Debug, Clone)]
pub enum AdapterError {
    #[error("rate limited by supplier")]
    RateLimited,

    #[error("supplier authentication failed: {0}")]
    AuthFailed(String),

    #[error("supplier unavailable: {0}")]
    Unavailable(String),

    #[error("supplier rejected SKU: {0}")]
    InvalidSku(String),

    #[error("unexpected supplier response: {0}")]
    Unknown(String),
}

impl From<reqwest::Error> for AdapterError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            AdapterError::Unavailable(err.to_string())
        } else {
            AdapterError::Unknown(err.to_string())
        }
    }
}

pub type AdapterResult<T> = std::result::Result<T, AdapterError>;

// ============================================================================
// Capability Types
// ============================================================================

/// Live inventory answer for one supplier SKU. "SKU unknown at this partner"
/// is a normal `available: false` result, not an error.
#[derive(Debug, Clone, Serialize)]
pub struct InventoryStatus {
    pub available: bool,
    pub quantity: i32,
    pub lead_time_days: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PriceQuote {
    pub cost: Decimal,
    pub currency: String,
}

/// One product as reported by a partner's catalog pull. `internal_sku` is the
/// merchant-assigned external id some partners echo back; when present it
/// lets catalog discovery create mappings without manual translation.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub supplier_sku: String,
    pub name: String,
    pub internal_sku: Option<String>,
    pub cost: Decimal,
    pub currency: String,
    pub available: bool,
    pub stock_quantity: i32,
    pub lead_time_days: i32,
    pub moq: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SupplierOrderItem {
    pub supplier_sku: String,
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShippingAddress {
    pub name: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub country: String,
    pub postal_code: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SupplierOrderRequest {
    pub external_ref: String,
    pub ship_to: ShippingAddress,
    pub items: Vec<SupplierOrderItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SupplierOrderReceipt {
    pub external_order_id: String,
    pub status: String,
}

/// Partner webhook payload normalized into a wire-independent event.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedEvent {
    InventoryChanged {
        supplier_sku: String,
        available: bool,
        quantity: i32,
        occurred_at: DateTime<Utc>,
    },
    PriceChanged {
        supplier_sku: String,
        cost: Decimal,
        currency: String,
        occurred_at: DateTime<Utc>,
    },
    OrderStatusChanged {
        external_order_id: String,
        status: String,
        occurred_at: DateTime<Utc>,
    },
}

// ============================================================================
// Capability Interface
// ============================================================================

/// Uniform capability set implemented once per external partner. Every
/// network call runs under the adapter's own client timeout and surfaces
/// failures through the shared taxonomy instead of blocking the caller.
#[async_trait]
pub trait SupplierAdapter: Send + Sync {
    fn kind(&self) -> SupplierKind;

    async fn check_inventory(&self, supplier_sku: &str) -> AdapterResult<InventoryStatus>;

    async fn get_price(&self, supplier_sku: &str) -> AdapterResult<PriceQuote>;

    async fn pull_catalog(&self) -> AdapterResult<Vec<CatalogEntry>>;

    async fn submit_order(
        &self,
        request: &SupplierOrderRequest,
    ) -> AdapterResult<SupplierOrderReceipt>;

    fn parse_webhook(
        &self,
        event_type: &str,
        payload: &serde_json::Value,
    ) -> AdapterResult<NormalizedEvent>;
}

// ============================================================================
// Test Support
// ============================================================================
