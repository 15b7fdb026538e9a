use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

/// One requested line item, as the order workflow hands it to the engine.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderItemRequest {
    #[validate(length(min = 1, message = "SKU required"))]
    pub sku: String,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
}

/// Why a line item could not be routed to any supplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnroutableReason {
    NoMapping,
    InsufficientStock,
    AllSuppliersUnavailable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutedItem {
    pub variant_id: Uuid,
    pub internal_sku: String,
    pub supplier_sku: String,
    pub quantity: i32,
    pub unit_cost: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierRoute {
    pub supplier_id: Uuid,
    pub items: Vec<RoutedItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnroutableItem {
    pub sku: String,
    pub quantity: i32,
    pub reason: UnroutableReason,
}

/// Per-order routing decision. Ephemeral: computed per request and only
/// persisted if the caller records it.
///
/// Every requested line item lands in exactly one of `routes` or
/// `unroutable_items`, and routed quantity never exceeds the request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoutingPlan {
    pub routes: HashMap<Uuid, SupplierRoute>,
    pub unroutable_items: Vec<UnroutableItem>,
}

impl RoutingPlan {
    pub fn routed_item_count(&self) -> usize {
        self.routes.values().map(|r| r.items.len()).sum()
    }

    pub fn total_item_count(&self) -> usize {
        self.routed_item_count() + self.unroutable_items.len()
    }

    pub fn is_fully_routable(&self) -> bool {
        self.unroutable_items.is_empty()
    }
}

/// One supplier's live answer inside an inventory summary.
#[derive(Debug, Clone, Serialize)]
pub struct SupplierInventoryStatus {
    pub supplier_id: Uuid,
    pub supplier_sku: String,
    pub available: bool,
    pub quantity: i32,
    pub lead_time_days: Option<i32>,
    /// False when the adapter call failed; `error` carries the cause.
    pub checked: bool,
    pub error: Option<String>,
}

/// Cross-supplier availability read-model, derived fresh at call time.
#[derive(Debug, Clone, Serialize)]
pub struct InventorySummary {
    pub sku: String,
    pub total_available: i64,
    pub suppliers: Vec<SupplierInventoryStatus>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SupplierRoutingCount {
    pub supplier_id: Uuid,
    pub routed_items: i64,
}

/// Aggregated historical routing outcomes over recorded plans.
#[derive(Debug, Clone, Serialize)]
pub struct RoutingStatistics {
    pub total_plans: i64,
    pub routed_items: i64,
    pub unroutable_items: i64,
    pub unroutable_rate: f64,
    pub supplier_distribution: Vec<SupplierRoutingCount>,
}

/// One persisted line-item outcome of a recorded plan.
#[derive(Debug, Clone)]
pub struct NewRoutingOutcome {
    pub plan_id: Uuid,
    pub order_ref: Option<String>,
    pub internal_sku: String,
    pub quantity: i32,
    pub supplier_id: Option<Uuid>,
    pub unroutable_reason: Option<UnroutableReason>,
    pub unit_cost: Option<Decimal>,
}

impl UnroutableReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnroutableReason::NoMapping => "no_mapping",
            UnroutableReason::InsufficientStock => "insufficient_stock",
            UnroutableReason::AllSuppliersUnavailable => "all_suppliers_unavailable",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "no_mapping" => Some(UnroutableReason::NoMapping),
            "insufficient_stock" => Some(UnroutableReason::InsufficientStock),
            "all_suppliers_unavailable" => Some(UnroutableReason::AllSuppliersUnavailable),
            _ => None,
        }
    }
}
