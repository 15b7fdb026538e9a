// SKU Translation Service
// Single source of truth for which suppliers can produce an internal variant
// and on what terms. All reads/writes go through the MappingStore port.

use rust_decimal::Decimal;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::models::mapping::{
    MappingPatch, NewMapping, SupplierVariantMapping, SyncStatus, UpsertMappingRequest,
};
use crate::repositories::{MappingStore, StoreError};

#[derive(Error, Debug)]
pub enum TranslationError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("mapping not found for variant {variant_id} and supplier {supplier_id}")]
    MappingNotFound {
        variant_id: Uuid,
        supplier_id: Uuid,
    },
}

pub type Result<T> = std::result::Result<T, TranslationError>;

const DEFAULT_CURRENCY: &str = "USD";
const DEFAULT_LEAD_TIME_DAYS: i32 = 7;

pub struct SkuTranslationService {
    store: Arc<dyn MappingStore>,
}

impl SkuTranslationService {
    pub fn new(store: Arc<dyn MappingStore>) -> Self {
        Self { store }
    }

    /// All non-disabled mappings for a variant, best candidate first.
    pub async fn mappings_for_variant(
        &self,
        variant_id: Uuid,
    ) -> Result<Vec<SupplierVariantMapping>> {
        Ok(self.store.find_by_variant(variant_id).await?)
    }

    /// All non-disabled mappings for an internal SKU, best candidate first.
    pub async fn mappings_for_sku(&self, internal_sku: &str) -> Result<Vec<SupplierVariantMapping>> {
        Ok(self.store.find_by_sku(internal_sku).await?)
    }

    /// Idempotent create-or-update on (variant_id, supplier_id). A duplicate
    /// insert becomes an update with last-write-wins on the supplied fields;
    /// priority is recomputed from `is_preferred` unless explicitly given.
    pub async fn upsert_mapping(
        &self,
        request: UpsertMappingRequest,
    ) -> Result<SupplierVariantMapping> {
        let existing = self
            .store
            .find_one(request.variant_id, request.supplier_id)
            .await?;

        let mapping = match existing {
            None => {
                let is_preferred = request.is_preferred.unwrap_or(false);
                let priority = request
                    .priority
                    .unwrap_or_else(|| SupplierVariantMapping::derived_priority(is_preferred));

                let created = self
                    .store
                    .upsert(NewMapping {
                        variant_id: request.variant_id,
                        internal_sku: request.internal_sku,
                        supplier_id: request.supplier_id,
                        supplier_sku: request.supplier_sku,
                        cost: request.cost.unwrap_or(Decimal::ZERO),
                        currency: request
                            .currency
                            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
                        stock_quantity: request.stock_quantity.unwrap_or(0),
                        is_available: request.is_available.unwrap_or(false),
                        lead_time_days: request.lead_time_days.unwrap_or(DEFAULT_LEAD_TIME_DAYS),
                        moq: request.moq.unwrap_or(1),
                        is_preferred,
                        priority,
                        sync_status: SyncStatus::Active,
                        last_synced_at: None,
                    })
                    .await?;

                tracing::info!(
                    variant_id = %created.variant_id,
                    supplier_id = %created.supplier_id,
                    supplier_sku = %created.supplier_sku,
                    "created supplier mapping"
                );
                created
            }
            Some(current) => {
                // Priority follows the preference flag unless the caller
                // pinned it explicitly.
                let priority = match (request.priority, request.is_preferred) {
                    (Some(explicit), _) => Some(explicit),
                    (None, Some(preferred)) if preferred != current.is_preferred => {
                        Some(SupplierVariantMapping::derived_priority(preferred))
                    }
                    _ => None,
                };

                let patch = MappingPatch {
                    supplier_sku: Some(request.supplier_sku),
                    cost: request.cost,
                    currency: request.currency,
                    stock_quantity: request.stock_quantity,
                    is_available: request.is_available,
                    lead_time_days: request.lead_time_days,
                    moq: request.moq,
                    is_preferred: request.is_preferred,
                    priority,
                    ..Default::default()
                };

                let updated = self
                    .store
                    .update_fields(request.variant_id, request.supplier_id, patch)
                    .await?
                    .ok_or(TranslationError::MappingNotFound {
                        variant_id: request.variant_id,
                        supplier_id: request.supplier_id,
                    })?;

                tracing::info!(
                    variant_id = %updated.variant_id,
                    supplier_id = %updated.supplier_id,
                    "updated supplier mapping"
                );
                updated
            }
        };

        Ok(mapping)
    }

    /// Flag a mapping's synced data as untrusted until the next refresh.
    pub async fn mark_stale(&self, variant_id: Uuid, supplier_id: Uuid) -> Result<()> {
        self.set_status(variant_id, supplier_id, SyncStatus::Stale)
            .await
    }

    /// Soft-disable: the mapping is excluded from routing and sync until
    /// re-enabled. Nothing is ever hard-deleted.
    pub async fn disable(&self, variant_id: Uuid, supplier_id: Uuid) -> Result<()> {
        self.set_status(variant_id, supplier_id, SyncStatus::Disabled)
            .await
    }

    pub async fn enable(&self, variant_id: Uuid, supplier_id: Uuid) -> Result<()> {
        self.set_status(variant_id, supplier_id, SyncStatus::Stale)
            .await
    }

    async fn set_status(
        &self,
        variant_id: Uuid,
        supplier_id: Uuid,
        status: SyncStatus,
    ) -> Result<()> {
        let changed = self
            .store
            .set_sync_status(variant_id, supplier_id, status)
            .await?;
        if !changed {
            return Err(TranslationError::MappingNotFound {
                variant_id,
                supplier_id,
            });
        }
        tracing::debug!(%variant_id, %supplier_id, status = status.as_str(), "mapping status changed");
        Ok(())
    }
}
