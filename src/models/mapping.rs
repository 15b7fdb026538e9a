use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

pub fn validate_positive_cost(cost: &Decimal) -> Result<(), ValidationError> {
    if *cost < Decimal::ZERO {
        return Err(ValidationError::new("negative_cost"));
    }
    Ok(())
}

/// Freshness state of one supplier mapping's synced data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Active,
    Stale,
    Disabled,
    Error,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Active => "active",
            SyncStatus::Stale => "stale",
            SyncStatus::Disabled => "disabled",
            SyncStatus::Error => "error",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(SyncStatus::Active),
            "stale" => Some(SyncStatus::Stale),
            "disabled" => Some(SyncStatus::Disabled),
            "error" => Some(SyncStatus::Error),
            _ => None,
        }
    }
}

/// One row of the SKU translation table: an internal product variant offered
/// by one supplier under that supplier's own SKU and terms.
///
/// Unique on (variant_id, supplier_id). Never hard-deleted; retired rows are
/// soft-marked `disabled`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierVariantMapping {
    pub id: Uuid,
    pub variant_id: Uuid,
    pub internal_sku: String,
    pub supplier_id: Uuid,
    pub supplier_sku: String,
    pub cost: Decimal,
    pub currency: String,
    pub stock_quantity: i32,
    pub is_available: bool,
    pub lead_time_days: i32,
    pub moq: i32,
    pub is_preferred: bool,
    pub priority: i32,
    pub sync_status: SyncStatus,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SupplierVariantMapping {
    /// Priority derived from the preference flag: preferred mappings rank 1,
    /// everything else 2. Explicit admin overrides bypass this.
    pub fn derived_priority(is_preferred: bool) -> i32 {
        if is_preferred {
            1
        } else {
            2
        }
    }

    /// MOQ is the supplier's minimum production batch. A mapping whose known
    /// stock sits below it cannot be ordered from at all, regardless of the
    /// quantity being requested.
    pub fn meets_moq(&self) -> bool {
        self.stock_quantity >= self.moq
    }
}

/// Full field set for creating a mapping (catalog discovery, onboarding).
#[derive(Debug, Clone)]
pub struct NewMapping {
    pub variant_id: Uuid,
    pub internal_sku: String,
    pub supplier_id: Uuid,
    pub supplier_sku: String,
    pub cost: Decimal,
    pub currency: String,
    pub stock_quantity: i32,
    pub is_available: bool,
    pub lead_time_days: i32,
    pub moq: i32,
    pub is_preferred: bool,
    pub priority: i32,
    pub sync_status: SyncStatus,
    pub last_synced_at: Option<DateTime<Utc>>,
}

/// Partial update applied to an existing mapping; only supplied fields are
/// written (last-write-wins per field).
#[derive(Debug, Clone, Default)]
pub struct MappingPatch {
    pub supplier_sku: Option<String>,
    pub cost: Option<Decimal>,
    pub currency: Option<String>,
    pub stock_quantity: Option<i32>,
    pub is_available: Option<bool>,
    pub lead_time_days: Option<i32>,
    pub moq: Option<i32>,
    pub is_preferred: Option<bool>,
    pub priority: Option<i32>,
    pub sync_status: Option<SyncStatus>,
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl MappingPatch {
    pub fn is_empty(&self) -> bool {
        self.supplier_sku.is_none()
            && self.cost.is_none()
            && self.currency.is_none()
            && self.stock_quantity.is_none()
            && self.is_available.is_none()
            && self.lead_time_days.is_none()
            && self.moq.is_none()
            && self.is_preferred.is_none()
            && self.priority.is_none()
            && self.sync_status.is_none()
            && self.last_synced_at.is_none()
    }
}

/// Result of a conditional, freshness-guarded single-mapping write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateOutcome {
    /// The event was newer than the stored state and was written.
    Applied,
    /// The event was older than the stored state and was dropped.
    Discarded,
    /// No mapping exists for that supplier SKU.
    NotFound,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpsertMappingRequest {
    pub variant_id: Uuid,
    #[validate(length(min = 1, message = "Internal SKU required"))]
    pub internal_sku: String,
    pub supplier_id: Uuid,
    #[validate(length(min = 1, message = "Supplier SKU required"))]
    pub supplier_sku: String,
    #[validate(custom(function = validate_positive_cost))]
    pub cost: Option<Decimal>,
    pub currency: Option<String>,
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock_quantity: Option<i32>,
    pub is_available: Option<bool>,
    #[validate(range(min = 0, message = "Lead time cannot be negative"))]
    pub lead_time_days: Option<i32>,
    #[validate(range(min = 1, message = "MOQ must be at least 1"))]
    pub moq: Option<i32>,
    pub is_preferred: Option<bool>,
    /// Explicit priority override; when absent, priority is derived from
    /// `is_preferred`.
    #[validate(range(min = 1, message = "Priority must be at least 1"))]
    pub priority: Option<i32>,
}
