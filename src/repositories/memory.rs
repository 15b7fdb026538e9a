//! In-memory store implementations backing unit tests and local harnesses,
//! mirroring the Postgres repositories' semantics (candidate ordering,
//! disabled exclusion, freshness guards).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::mapping::{
    MappingPatch, NewMapping, SupplierVariantMapping, SyncStatus, UpdateOutcome,
};
use crate::models::routing::{
    DateRange, NewRoutingOutcome, RoutingStatistics, SupplierRoutingCount,
};
use crate::models::supplier::Supplier;
use crate::repositories::mapping_repo::MappingStore;
use crate::repositories::routing_log_repo::RoutingLogStore;
use crate::repositories::supplier_repo::{SupplierStore, VariantLookup};
use crate::repositories::StoreResult;

fn candidate_order(a: &SupplierVariantMapping, b: &SupplierVariantMapping) -> Ordering {
    a.priority
        .cmp(&b.priority)
        .then_with(|| a.cost.cmp(&b.cost))
        .then_with(|| a.lead_time_days.cmp(&b.lead_time_days))
        .then_with(|| b.last_synced_at.cmp(&a.last_synced_at))
}

#[derive(Default)]
pub struct InMemoryMappingStore {
    rows: RwLock<HashMap<(Uuid, Uuid), SupplierVariantMapping>>,
}

impl InMemoryMappingStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn collect_where<F>(&self, keep: F) -> Vec<SupplierVariantMapping>
    where
        F: Fn(&SupplierVariantMapping) -> bool,
    {
        let rows = self.rows.read().await;
        let mut found: Vec<_> = rows.values().filter(|m| keep(m)).cloned().collect();
        found.sort_by(candidate_order);
        found
    }
}

#[async_trait]
impl MappingStore for InMemoryMappingStore {
    async fn find_by_variant(&self, variant_id: Uuid) -> StoreResult<Vec<SupplierVariantMapping>> {
        Ok(self
            .collect_where(|m| m.variant_id == variant_id && m.sync_status != SyncStatus::Disabled)
            .await)
    }

    async fn find_by_sku(&self, internal_sku: &str) -> StoreResult<Vec<SupplierVariantMapping>> {
        Ok(self
            .collect_where(|m| m.internal_sku == internal_sku && m.sync_status != SyncStatus::Disabled)
            .await)
    }

    async fn find_by_supplier(&self, supplier_id: Uuid) -> StoreResult<Vec<SupplierVariantMapping>> {
        let mut found = self
            .collect_where(|m| m.supplier_id == supplier_id && m.sync_status != SyncStatus::Disabled)
            .await;
        found.sort_by(|a, b| a.internal_sku.cmp(&b.internal_sku));
        Ok(found)
    }

    async fn find_by_supplier_sku(
        &self,
        supplier_id: Uuid,
        supplier_sku: &str,
    ) -> StoreResult<Option<SupplierVariantMapping>> {
        let rows = self.rows.read().await;
        Ok(rows
            .values()
            .find(|m| m.supplier_id == supplier_id && m.supplier_sku == supplier_sku)
            .cloned())
    }

    async fn find_one(
        &self,
        variant_id: Uuid,
        supplier_id: Uuid,
    ) -> StoreResult<Option<SupplierVariantMapping>> {
        let rows = self.rows.read().await;
        Ok(rows.get(&(variant_id, supplier_id)).cloned())
    }

    async fn upsert(&self, new: NewMapping) -> StoreResult<SupplierVariantMapping> {
        let mut rows = self.rows.write().await;
        let now = Utc::now();
        let key = (new.variant_id, new.supplier_id);

        let mapping = match rows.get(&key) {
            Some(existing) => SupplierVariantMapping {
                id: existing.id,
                created_at: existing.created_at,
                variant_id: new.variant_id,
                internal_sku: new.internal_sku,
                supplier_id: new.supplier_id,
                supplier_sku: new.supplier_sku,
                cost: new.cost,
                currency: new.currency,
                stock_quantity: new.stock_quantity,
                is_available: new.is_available,
                lead_time_days: new.lead_time_days,
                moq: new.moq,
                is_preferred: new.is_preferred,
                priority: new.priority,
                sync_status: new.sync_status,
                last_synced_at: new.last_synced_at,
                updated_at: now,
            },
            None => SupplierVariantMapping {
                id: Uuid::new_v4(),
                variant_id: new.variant_id,
                internal_sku: new.internal_sku,
                supplier_id: new.supplier_id,
                supplier_sku: new.supplier_sku,
                cost: new.cost,
                currency: new.currency,
                stock_quantity: new.stock_quantity,
                is_available: new.is_available,
                lead_time_days: new.lead_time_days,
                moq: new.moq,
                is_preferred: new.is_preferred,
                priority: new.priority,
                sync_status: new.sync_status,
                last_synced_at: new.last_synced_at,
                created_at: now,
                updated_at: now,
            },
        };

        rows.insert(key, mapping.clone());
        Ok(mapping)
    }

    async fn update_fields(
        &self,
        variant_id: Uuid,
        supplier_id: Uuid,
        patch: MappingPatch,
    ) -> StoreResult<Option<SupplierVariantMapping>> {
        let mut rows = self.rows.write().await;
        let Some(mapping) = rows.get_mut(&(variant_id, supplier_id)) else {
            return Ok(None);
        };

        if let Some(supplier_sku) = patch.supplier_sku {
            mapping.supplier_sku = supplier_sku;
        }
        if let Some(cost) = patch.cost {
            mapping.cost = cost;
        }
        if let Some(currency) = patch.currency {
            mapping.currency = currency;
        }
        if let Some(stock_quantity) = patch.stock_quantity {
            mapping.stock_quantity = stock_quantity;
        }
        if let Some(is_available) = patch.is_available {
            mapping.is_available = is_available;
        }
        if let Some(lead_time_days) = patch.lead_time_days {
            mapping.lead_time_days = lead_time_days;
        }
        if let Some(moq) = patch.moq {
            mapping.moq = moq;
        }
        if let Some(is_preferred) = patch.is_preferred {
            mapping.is_preferred = is_preferred;
        }
        if let Some(priority) = patch.priority {
            mapping.priority = priority;
        }
        if let Some(sync_status) = patch.sync_status {
            mapping.sync_status = sync_status;
        }
        if let Some(last_synced_at) = patch.last_synced_at {
            mapping.last_synced_at = Some(last_synced_at);
        }
        mapping.updated_at = Utc::now();

        Ok(Some(mapping.clone()))
    }

    async fn set_sync_status(
        &self,
        variant_id: Uuid,
        supplier_id: Uuid,
        status: SyncStatus,
    ) -> StoreResult<bool> {
        let mut rows = self.rows.write().await;
        match rows.get_mut(&(variant_id, supplier_id)) {
            Some(mapping) => {
                mapping.sync_status = status;
                mapping.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn apply_inventory_update(
        &self,
        supplier_id: Uuid,
        supplier_sku: &str,
        available: bool,
        quantity: i32,
        observed_at: DateTime<Utc>,
    ) -> StoreResult<UpdateOutcome> {
        let mut rows = self.rows.write().await;
        let Some(mapping) = rows
            .values_mut()
            .find(|m| m.supplier_id == supplier_id && m.supplier_sku == supplier_sku)
        else {
            return Ok(UpdateOutcome::NotFound);
        };

        if mapping.sync_status == SyncStatus::Disabled
            || mapping.last_synced_at.is_some_and(|at| at > observed_at)
        {
            return Ok(UpdateOutcome::Discarded);
        }

        mapping.stock_quantity = quantity;
        mapping.is_available = available;
        mapping.sync_status = SyncStatus::Active;
        mapping.last_synced_at = Some(observed_at);
        mapping.updated_at = Utc::now();
        Ok(UpdateOutcome::Applied)
    }

    async fn apply_price_update(
        &self,
        supplier_id: Uuid,
        supplier_sku: &str,
        cost: Decimal,
        currency: &str,
        observed_at: DateTime<Utc>,
    ) -> StoreResult<UpdateOutcome> {
        let mut rows = self.rows.write().await;
        let Some(mapping) = rows
            .values_mut()
            .find(|m| m.supplier_id == supplier_id && m.supplier_sku == supplier_sku)
        else {
            return Ok(UpdateOutcome::NotFound);
        };

        if mapping.sync_status == SyncStatus::Disabled
            || mapping.last_synced_at.is_some_and(|at| at > observed_at)
        {
            return Ok(UpdateOutcome::Discarded);
        }

        mapping.cost = cost;
        mapping.currency = currency.to_string();
        mapping.sync_status = SyncStatus::Active;
        mapping.last_synced_at = Some(observed_at);
        mapping.updated_at = Utc::now();
        Ok(UpdateOutcome::Applied)
    }
}

#[derive(Default)]
pub struct InMemorySupplierStore {
    rows: RwLock<HashMap<Uuid, Supplier>>,
}

impl InMemorySupplierStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, supplier: Supplier) {
        self.rows.write().await.insert(supplier.id, supplier);
    }
}

#[async_trait]
impl SupplierStore for InMemorySupplierStore {
    async fn find_by_id(&self, supplier_id: Uuid) -> StoreResult<Option<Supplier>> {
        Ok(self.rows.read().await.get(&supplier_id).cloned())
    }

    async fn find_active(&self) -> StoreResult<Vec<Supplier>> {
        let rows = self.rows.read().await;
        let mut active: Vec<_> = rows.values().filter(|s| s.is_active).cloned().collect();
        active.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(active)
    }
}

#[derive(Default)]
pub struct InMemoryVariantCatalog {
    skus: RwLock<HashMap<String, Uuid>>,
}

impl InMemoryVariantCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, internal_sku: &str, variant_id: Uuid) {
        self.skus
            .write()
            .await
            .insert(internal_sku.to_string(), variant_id);
    }
}

#[async_trait]
impl VariantLookup for InMemoryVariantCatalog {
    async fn variant_id_for_sku(&self, internal_sku: &str) -> StoreResult<Option<Uuid>> {
        Ok(self.skus.read().await.get(internal_sku).copied())
    }
}

struct RecordedOutcome {
    outcome: NewRoutingOutcome,
    routed_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct InMemoryRoutingLog {
    rows: RwLock<Vec<RecordedOutcome>>,
}

impl InMemoryRoutingLog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoutingLogStore for InMemoryRoutingLog {
    async fn record(&self, outcomes: &[NewRoutingOutcome]) -> StoreResult<()> {
        let now = Utc::now();
        let mut rows = self.rows.write().await;
        rows.extend(outcomes.iter().map(|outcome| RecordedOutcome {
            outcome: outcome.clone(),
            routed_at: now,
        }));
        Ok(())
    }

    async fn statistics(&self, range: DateRange) -> StoreResult<RoutingStatistics> {
        let rows = self.rows.read().await;
        let in_range: Vec<_> = rows
            .iter()
            .filter(|r| r.routed_at >= range.start && r.routed_at < range.end)
            .collect();

        let mut plan_ids = std::collections::HashSet::new();
        let mut per_supplier: HashMap<Uuid, i64> = HashMap::new();
        let mut routed_items = 0i64;
        let mut unroutable_items = 0i64;

        for row in &in_range {
            plan_ids.insert(row.outcome.plan_id);
            match row.outcome.supplier_id {
                Some(supplier_id) => {
                    routed_items += 1;
                    *per_supplier.entry(supplier_id).or_default() += 1;
                }
                None => unroutable_items += 1,
            }
        }

        let mut supplier_distribution: Vec<_> = per_supplier
            .into_iter()
            .map(|(supplier_id, routed_items)| SupplierRoutingCount {
                supplier_id,
                routed_items,
            })
            .collect();
        supplier_distribution.sort_by(|a, b| b.routed_items.cmp(&a.routed_items));

        let total_items = routed_items + unroutable_items;
        let unroutable_rate = if total_items == 0 {
            0.0
        } else {
            unroutable_items as f64 / total_items as f64
        };

        Ok(RoutingStatistics {
            total_plans: plan_ids.len() as i64,
            routed_items,
            unroutable_items,
            unroutable_rate,
            supplier_distribution,
        })
    }
}
