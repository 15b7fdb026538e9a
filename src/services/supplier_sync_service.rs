// Supplier Sync Service
// Keeps the SKU translation table approximately fresh without ever blocking
// routing: pull-based inventory/pricing/catalog refreshes plus webhook-driven
// targeted updates. Per-item failures are absorbed and counted; a failed
// refresh leaves prior data in place and flips the mapping's sync status.

use chrono::Utc;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use crate::models::mapping::{MappingPatch, NewMapping, SupplierVariantMapping, SyncStatus, UpdateOutcome};
use crate::models::supplier::Supplier;
use crate::repositories::{MappingStore, StoreError, SupplierStore, VariantLookup};
use crate::services::suppliers::{
    AdapterError, AdapterFactory, CatalogEntry, FactoryError, NormalizedEvent, SupplierAdapter,
};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("supplier not found: {0}")]
    SupplierNotFound(Uuid),

    #[error("adapter resolution failed: {0}")]
    Factory(#[from] FactoryError),

    #[error("catalog pull failed: {0}")]
    CatalogPull(String),

    #[error("webhook rejected: {0}")]
    WebhookRejected(String),
}

pub type Result<T> = std::result::Result<T, SyncError>;

// ============================================================================
// Reports
// ============================================================================

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SyncReport {
    pub updated: u32,
    pub errors: u32,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct CatalogSyncReport {
    pub new_products: u32,
    pub updated_products: u32,
}

/// What happened to a webhook event after normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookOutcome {
    Applied,
    /// Stale or replayed event; the stored state already reflects something
    /// newer, so the event was dropped.
    Discarded,
    /// No mapping carries that supplier SKU.
    UnknownSku,
    /// Parsed fine but targets nothing this subsystem tracks.
    Ignored,
}

impl From<UpdateOutcome> for WebhookOutcome {
    fn from(outcome: UpdateOutcome) -> Self {
        match outcome {
            UpdateOutcome::Applied => WebhookOutcome::Applied,
            UpdateOutcome::Discarded => WebhookOutcome::Discarded,
            UpdateOutcome::NotFound => WebhookOutcome::UnknownSku,
        }
    }
}

// ============================================================================
// Sync Service
// ============================================================================

/// Bounded fan-out per supplier batch; keeps us under partner rate limits.
const SYNC_CONCURRENCY: usize = 8;

const RATE_LIMIT_RETRY_DELAY: Duration = Duration::from_millis(750);

pub struct SupplierSyncService {
    mappings: Arc<dyn MappingStore>,
    suppliers: Arc<dyn SupplierStore>,
    variants: Arc<dyn VariantLookup>,
    factory: Arc<AdapterFactory>,
}

impl SupplierSyncService {
    pub fn new(
        mappings: Arc<dyn MappingStore>,
        suppliers: Arc<dyn SupplierStore>,
        variants: Arc<dyn VariantLookup>,
        factory: Arc<AdapterFactory>,
    ) -> Self {
        Self {
            mappings,
            suppliers,
            variants,
            factory,
        }
    }

    /// Refresh stock levels for every syncable mapping of one supplier.
    /// Individual failures mark that mapping `error` and the batch continues.
    pub async fn sync_inventory(&self, supplier_id: Uuid) -> Result<SyncReport> {
        let supplier = self.require_supplier(supplier_id).await?;
        let adapter = self.factory.get(supplier_id)?;
        let mappings = self.mappings.find_by_supplier(supplier_id).await?;

        tracing::info!(
            supplier = %supplier.name,
            mappings = mappings.len(),
            "starting inventory sync"
        );

        let results = stream::iter(mappings.into_iter().map(|mapping| {
            let adapter = adapter.clone();
            async move {
                let outcome = self.refresh_inventory(&adapter, &mapping).await;
                (mapping, outcome)
            }
        }))
        .buffer_unordered(SYNC_CONCURRENCY)
        .collect::<Vec<_>>()
        .await;

        let mut report = SyncReport::default();
        for (mapping, outcome) in results {
            match outcome {
                Ok(()) => report.updated += 1,
                Err(reason) => {
                    report.errors += 1;
                    tracing::warn!(
                        supplier = %supplier.name,
                        sku = %mapping.internal_sku,
                        supplier_sku = %mapping.supplier_sku,
                        %reason,
                        "inventory sync failed for mapping"
                    );
                }
            }
        }

        tracing::info!(
            supplier = %supplier.name,
            updated = report.updated,
            errors = report.errors,
            "inventory sync complete"
        );
        Ok(report)
    }

    /// Refresh unit costs for every syncable mapping of one supplier.
    pub async fn sync_pricing(&self, supplier_id: Uuid) -> Result<SyncReport> {
        let supplier = self.require_supplier(supplier_id).await?;
        let adapter = self.factory.get(supplier_id)?;
        let mappings = self.mappings.find_by_supplier(supplier_id).await?;

        tracing::info!(
            supplier = %supplier.name,
            mappings = mappings.len(),
            "starting pricing sync"
        );

        let results = stream::iter(mappings.into_iter().map(|mapping| {
            let adapter = adapter.clone();
            async move {
                let outcome = self.refresh_price(&adapter, &mapping).await;
                (mapping, outcome)
            }
        }))
        .buffer_unordered(SYNC_CONCURRENCY)
        .collect::<Vec<_>>()
        .await;

        let mut report = SyncReport::default();
        for (mapping, outcome) in results {
            match outcome {
                Ok(()) => report.updated += 1,
                Err(reason) => {
                    report.errors += 1;
                    tracing::warn!(
                        supplier = %supplier.name,
                        sku = %mapping.internal_sku,
                        supplier_sku = %mapping.supplier_sku,
                        %reason,
                        "pricing sync failed for mapping"
                    );
                }
            }
        }

        tracing::info!(
            supplier = %supplier.name,
            updated = report.updated,
            errors = report.errors,
            "pricing sync complete"
        );
        Ok(report)
    }

    /// Pull the partner's full catalog and reconcile it against existing
    /// mappings. Absence from a pull means "not refreshed this cycle", never
    /// removal; new mappings are created only when the partner echoes a
    /// merchant SKU that resolves to a known variant.
    pub async fn sync_catalog(&self, supplier_id: Uuid) -> Result<CatalogSyncReport> {
        let supplier = self.require_supplier(supplier_id).await?;
        let adapter = self.factory.get(supplier_id)?;

        let entries = adapter
            .pull_catalog()
            .await
            .map_err(|e| SyncError::CatalogPull(e.to_string()))?;

        tracing::info!(
            supplier = %supplier.name,
            products = entries.len(),
            "starting catalog sync"
        );

        let mut report = CatalogSyncReport::default();
        let now = Utc::now();

        for entry in entries {
            match self
                .mappings
                .find_by_supplier_sku(supplier_id, &entry.supplier_sku)
                .await?
            {
                Some(existing) => {
                    let patch = MappingPatch {
                        cost: Some(entry.cost),
                        currency: Some(entry.currency),
                        stock_quantity: Some(entry.stock_quantity),
                        is_available: Some(entry.available),
                        lead_time_days: Some(entry.lead_time_days),
                        moq: Some(entry.moq),
                        sync_status: Some(SyncStatus::Active),
                        last_synced_at: Some(now),
                        ..Default::default()
                    };
                    self.mappings
                        .update_fields(existing.variant_id, existing.supplier_id, patch)
                        .await?;
                    report.updated_products += 1;
                }
                None => {
                    report.new_products += 1;
                    self.discover_mapping(&supplier, entry).await?;
                }
            }
        }

        tracing::info!(
            supplier = %supplier.name,
            new = report.new_products,
            updated = report.updated_products,
            "catalog sync complete"
        );
        Ok(report)
    }

    /// Apply one partner webhook as a targeted single-mapping update.
    /// Idempotent: replays and out-of-order deliveries are resolved by the
    /// event timestamp against the mapping's `last_synced_at`.
    pub async fn handle_webhook(
        &self,
        supplier_id: Uuid,
        event_type: &str,
        payload: &serde_json::Value,
    ) -> Result<WebhookOutcome> {
        let adapter = self.factory.get(supplier_id)?;
        let event = adapter
            .parse_webhook(event_type, payload)
            .map_err(|e| SyncError::WebhookRejected(e.to_string()))?;

        let outcome = match event {
            NormalizedEvent::InventoryChanged {
                supplier_sku,
                available,
                quantity,
                occurred_at,
            } => {
                let outcome = self
                    .mappings
                    .apply_inventory_update(supplier_id, &supplier_sku, available, quantity, occurred_at)
                    .await?;
                tracing::debug!(
                    %supplier_id,
                    %supplier_sku,
                    quantity,
                    outcome = ?outcome,
                    "webhook inventory update"
                );
                WebhookOutcome::from(outcome)
            }
            NormalizedEvent::PriceChanged {
                supplier_sku,
                cost,
                currency,
                occurred_at,
            } => {
                let outcome = self
                    .mappings
                    .apply_price_update(supplier_id, &supplier_sku, cost, &currency, occurred_at)
                    .await?;
                tracing::debug!(
                    %supplier_id,
                    %supplier_sku,
                    %cost,
                    outcome = ?outcome,
                    "webhook price update"
                );
                WebhookOutcome::from(outcome)
            }
            NormalizedEvent::OrderStatusChanged {
                external_order_id,
                status,
                ..
            } => {
                // Production-order tracking lives with the order workflow;
                // acknowledged here so partners never see a failure.
                tracing::info!(%supplier_id, %external_order_id, %status, "supplier order status update");
                WebhookOutcome::Ignored
            }
        };

        if outcome == WebhookOutcome::UnknownSku {
            tracing::warn!(%supplier_id, event_type, "webhook references unknown supplier SKU");
        }

        Ok(outcome)
    }

    /// Scheduled entry point: refresh every active supplier, absorbing
    /// per-supplier failures so one partner outage never stalls the rest.
    pub async fn sync_all(&self) {
        let suppliers = match self.suppliers.find_active().await {
            Ok(suppliers) => suppliers,
            Err(e) => {
                tracing::error!("failed to enumerate active suppliers: {}", e);
                return;
            }
        };

        for supplier in suppliers {
            if let Err(e) = self.sync_catalog(supplier.id).await {
                tracing::error!(supplier = %supplier.name, "catalog sync failed: {}", e);
            }
            if let Err(e) = self.sync_inventory(supplier.id).await {
                tracing::error!(supplier = %supplier.name, "inventory sync failed: {}", e);
            }
            if let Err(e) = self.sync_pricing(supplier.id).await {
                tracing::error!(supplier = %supplier.name, "pricing sync failed: {}", e);
            }
        }
    }

    /// Long-lived background loop re-running `sync_all` on a fixed interval.
    pub fn spawn_scheduler(
        service: Arc<SupplierSyncService>,
        every: Duration,
    ) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                tracing::info!("running scheduled supplier sync");
                service.sync_all().await;
            }
        })
    }

    // ========================================================================
    // Per-Item Refresh
    // ========================================================================

    async fn refresh_inventory(
        &self,
        adapter: &Arc<dyn SupplierAdapter>,
        mapping: &SupplierVariantMapping,
    ) -> std::result::Result<(), String> {
        let status = match self.call_with_rate_limit_retry(adapter, &mapping.supplier_sku).await {
            Ok(status) => status,
            Err(e) => return self.note_failure(mapping, e).await,
        };

        self.mappings
            .apply_inventory_update(
                mapping.supplier_id,
                &mapping.supplier_sku,
                status.available,
                status.quantity,
                Utc::now(),
            )
            .await
            .map_err(|e| e.to_string())?;
        Ok(())
    }

    async fn refresh_price(
        &self,
        adapter: &Arc<dyn SupplierAdapter>,
        mapping: &SupplierVariantMapping,
    ) -> std::result::Result<(), String> {
        let quote = match adapter.get_price(&mapping.supplier_sku).await {
            Ok(quote) => quote,
            Err(AdapterError::RateLimited) => {
                tokio::time::sleep(RATE_LIMIT_RETRY_DELAY).await;
                match adapter.get_price(&mapping.supplier_sku).await {
                    Ok(quote) => quote,
                    Err(e) => return self.note_failure(mapping, e).await,
                }
            }
            Err(e) => return self.note_failure(mapping, e).await,
        };

        self.mappings
            .apply_price_update(
                mapping.supplier_id,
                &mapping.supplier_sku,
                quote.cost,
                &quote.currency,
                Utc::now(),
            )
            .await
            .map_err(|e| e.to_string())?;
        Ok(())
    }

    async fn call_with_rate_limit_retry(
        &self,
        adapter: &Arc<dyn SupplierAdapter>,
        supplier_sku: &str,
    ) -> std::result::Result<crate::services::suppliers::InventoryStatus, AdapterError> {
        match adapter.check_inventory(supplier_sku).await {
            Err(AdapterError::RateLimited) => {
                tokio::time::sleep(RATE_LIMIT_RETRY_DELAY).await;
                adapter.check_inventory(supplier_sku).await
            }
            other => other,
        }
    }

    /// A partner rejecting the SKU outright disables the mapping; transient
    /// failures flag it `error` and leave the cached data untouched.
    async fn note_failure(
        &self,
        mapping: &SupplierVariantMapping,
        err: AdapterError,
    ) -> std::result::Result<(), String> {
        let status = match err {
            AdapterError::InvalidSku(_) => SyncStatus::Disabled,
            _ => SyncStatus::Error,
        };

        if let Err(store_err) = self
            .mappings
            .set_sync_status(mapping.variant_id, mapping.supplier_id, status)
            .await
        {
            return Err(format!("{} (status write failed: {})", err, store_err));
        }
        Err(err.to_string())
    }

    async fn discover_mapping(&self, supplier: &Supplier, entry: CatalogEntry) -> Result<()> {
        let Some(internal_sku) = entry.internal_sku.as_deref() else {
            tracing::info!(
                supplier = %supplier.name,
                supplier_sku = %entry.supplier_sku,
                "new catalog product needs manual SKU translation"
            );
            return Ok(());
        };

        let Some(variant_id) = self.variants.variant_id_for_sku(internal_sku).await? else {
            tracing::warn!(
                supplier = %supplier.name,
                supplier_sku = %entry.supplier_sku,
                internal_sku,
                "catalog product references unknown internal SKU"
            );
            return Ok(());
        };

        self.mappings
            .upsert(NewMapping {
                variant_id,
                internal_sku: internal_sku.to_string(),
                supplier_id: supplier.id,
                supplier_sku: entry.supplier_sku.clone(),
                cost: entry.cost,
                currency: entry.currency,
                stock_quantity: entry.stock_quantity,
                is_available: entry.available,
                lead_time_days: entry.lead_time_days,
                moq: entry.moq,
                is_preferred: false,
                priority: SupplierVariantMapping::derived_priority(false),
                sync_status: SyncStatus::Active,
                last_synced_at: Some(Utc::now()),
            })
            .await?;

        tracing::info!(
            supplier = %supplier.name,
            supplier_sku = %entry.supplier_sku,
            internal_sku,
            "created mapping from catalog discovery"
        );
        Ok(())
    }

    async fn require_supplier(&self, supplier_id: Uuid) -> Result<Supplier> {
        self.suppliers
            .find_by_id(supplier_id)
            .await?
            .ok_or(SyncError::SupplierNotFound(supplier_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::supplier::SupplierKind;
    use crate::repositories::{
        InMemoryMappingStore, InMemorySupplierStore, InMemoryVariantCatalog,
    };
    use crate::services::suppliers::testing::MockAdapter;
    use crate::services::suppliers::PriceQuote;
    use rust_decimal_macros::dec;
    use serde_json::json;

    struct Harness {
        service: SupplierSyncService,
        mappings: Arc<InMemoryMappingStore>,
        supplier_id: Uuid,
    }

    async fn harness(adapter: MockAdapter) -> Harness {
        let mappings = Arc::new(InMemoryMappingStore::new());
        let suppliers = Arc::new(InMemorySupplierStore::new());
        let variants = Arc::new(InMemoryVariantCatalog::new());
        let factory = Arc::new(AdapterFactory::new());

        let supplier_id = Uuid::new_v4();
        suppliers
            .insert(Supplier {
                id: supplier_id,
                name: "LoomWorks EU".to_string(),
                kind: SupplierKind::Loomworks,
                is_active: true,
                created_at: Utc::now(),
            })
            .await;
        factory.register(supplier_id, Arc::new(adapter));

        Harness {
            service: SupplierSyncService::new(
                mappings.clone(),
                suppliers,
                variants.clone(),
                factory,
            ),
            mappings,
            supplier_id,
        }
    }

    async fn seed_mapping(
        mappings: &InMemoryMappingStore,
        supplier_id: Uuid,
        internal_sku: &str,
        supplier_sku: &str,
    ) -> SupplierVariantMapping {
        mappings
            .upsert(NewMapping {
                variant_id: Uuid::new_v4(),
                internal_sku: internal_sku.to_string(),
                supplier_id,
                supplier_sku: supplier_sku.to_string(),
                cost: dec!(10.00),
                currency: "USD".to_string(),
                stock_quantity: 1,
                is_available: true,
                lead_time_days: 7,
                moq: 1,
                is_preferred: false,
                priority: 2,
                sync_status: SyncStatus::Active,
                last_synced_at: None,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn inventory_sync_isolates_per_item_failures() {
        let mut adapter = MockAdapter::new(SupplierKind::Loomworks);
        for i in 0..7 {
            adapter = adapter.stock(&format!("LW-{}", i), 25);
        }
        for i in 7..10 {
            adapter = adapter.inventory_response(
                &format!("LW-{}", i),
                Err(AdapterError::Unavailable("partner outage".to_string())),
            );
        }

        let h = harness(adapter).await;
        for i in 0..10 {
            seed_mapping(&h.mappings, h.supplier_id, &format!("SKU-{}", i), &format!("LW-{}", i))
                .await;
        }

        let report = h.service.sync_inventory(h.supplier_id).await.unwrap();
        assert_eq!(report.updated, 7);
        assert_eq!(report.errors, 3);

        // Failed mappings are flagged, successful ones refreshed.
        let refreshed = h
            .mappings
            .find_by_supplier_sku(h.supplier_id, "LW-0")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(refreshed.stock_quantity, 25);
        assert_eq!(refreshed.sync_status, SyncStatus::Active);

        let failed = h
            .mappings
            .find_by_supplier_sku(h.supplier_id, "LW-9")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(failed.sync_status, SyncStatus::Error);
        // Prior stock is never zeroed by a failed refresh.
        assert_eq!(failed.stock_quantity, 1);
    }

    #[tokio::test]
    async fn rate_limited_calls_are_retried_once() {
        let adapter = MockAdapter::new(SupplierKind::Loomworks)
            .inventory_response("LW-1", Err(AdapterError::RateLimited))
            .stock("LW-1", 12);

        let h = harness(adapter).await;
        seed_mapping(&h.mappings, h.supplier_id, "SKU-1", "LW-1").await;

        let report = h.service.sync_inventory(h.supplier_id).await.unwrap();
        assert_eq!(report.updated, 1);
        assert_eq!(report.errors, 0);

        let mapping = h
            .mappings
            .find_by_supplier_sku(h.supplier_id, "LW-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(mapping.stock_quantity, 12);
    }

    #[tokio::test]
    async fn invalid_sku_during_pricing_sync_disables_mapping() {
        let adapter = MockAdapter::new(SupplierKind::Loomworks)
            .price("LW-1", Err(AdapterError::InvalidSku("LW-1".to_string())));

        let h = harness(adapter).await;
        let seeded = seed_mapping(&h.mappings, h.supplier_id, "SKU-1", "LW-1").await;

        let report = h.service.sync_pricing(h.supplier_id).await.unwrap();
        assert_eq!(report.updated, 0);
        assert_eq!(report.errors, 1);

        let mapping = h
            .mappings
            .find_one(seeded.variant_id, h.supplier_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(mapping.sync_status, SyncStatus::Disabled);
    }

    #[tokio::test]
    async fn pricing_sync_updates_cost() {
        let adapter = MockAdapter::new(SupplierKind::Loomworks).price(
            "LW-1",
            Ok(PriceQuote {
                cost: dec!(8.40),
                currency: "EUR".to_string(),
            }),
        );

        let h = harness(adapter).await;
        seed_mapping(&h.mappings, h.supplier_id, "SKU-1", "LW-1").await;

        let report = h.service.sync_pricing(h.supplier_id).await.unwrap();
        assert_eq!(report.updated, 1);

        let mapping = h
            .mappings
            .find_by_supplier_sku(h.supplier_id, "LW-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(mapping.cost, dec!(8.40));
        assert_eq!(mapping.currency, "EUR");
    }

    #[tokio::test]
    async fn webhook_replay_is_idempotent() {
        let h = harness(MockAdapter::new(SupplierKind::Loomworks)).await;
        seed_mapping(&h.mappings, h.supplier_id, "SKU-1", "LW-1").await;

        let payload = json!({
            "sku": "LW-1",
            "available": true,
            "quantity": 33,
            "occurred_at": "2025-06-03T10:00:00Z",
        });

        let first = h
            .service
            .handle_webhook(h.supplier_id, "inventory", &payload)
            .await
            .unwrap();
        assert_eq!(first, WebhookOutcome::Applied);

        let state_after_first = h
            .mappings
            .find_by_supplier_sku(h.supplier_id, "LW-1")
            .await
            .unwrap()
            .unwrap();

        let second = h
            .service
            .handle_webhook(h.supplier_id, "inventory", &payload)
            .await
            .unwrap();
        assert_eq!(second, WebhookOutcome::Applied);

        let state_after_second = h
            .mappings
            .find_by_supplier_sku(h.supplier_id, "LW-1")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(state_after_first.stock_quantity, state_after_second.stock_quantity);
        assert_eq!(state_after_first.is_available, state_after_second.is_available);
        assert_eq!(state_after_first.last_synced_at, state_after_second.last_synced_at);
    }

    #[tokio::test]
    async fn out_of_order_webhook_is_discarded() {
        let h = harness(MockAdapter::new(SupplierKind::Loomworks)).await;
        seed_mapping(&h.mappings, h.supplier_id, "SKU-1", "LW-1").await;

        let newer = json!({
            "sku": "LW-1",
            "available": true,
            "quantity": 50,
            "occurred_at": "2025-06-03T12:00:00Z",
        });
        let older = json!({
            "sku": "LW-1",
            "available": false,
            "quantity": 0,
            "occurred_at": "2025-06-03T09:00:00Z",
        });

        h.service
            .handle_webhook(h.supplier_id, "inventory", &newer)
            .await
            .unwrap();
        let outcome = h
            .service
            .handle_webhook(h.supplier_id, "inventory", &older)
            .await
            .unwrap();
        assert_eq!(outcome, WebhookOutcome::Discarded);

        let mapping = h
            .mappings
            .find_by_supplier_sku(h.supplier_id, "LW-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(mapping.stock_quantity, 50);
        assert!(mapping.is_available);
    }

    #[tokio::test]
    async fn webhook_for_unknown_sku_reports_unknown() {
        let h = harness(MockAdapter::new(SupplierKind::Loomworks)).await;

        let outcome = h
            .service
            .handle_webhook(
                h.supplier_id,
                "inventory",
                &json!({
                    "sku": "LW-GHOST",
                    "available": true,
                    "quantity": 4,
                    "occurred_at": "2025-06-03T10:00:00Z",
                }),
            )
            .await
            .unwrap();
        assert_eq!(outcome, WebhookOutcome::UnknownSku);
    }

    #[tokio::test]
    async fn order_status_webhook_is_acknowledged_and_ignored() {
        let h = harness(MockAdapter::new(SupplierKind::Loomworks)).await;

        let outcome = h
            .service
            .handle_webhook(
                h.supplier_id,
                "order",
                &json!({
                    "order_id": "PO-88",
                    "status": "shipped",
                    "occurred_at": "2025-06-03T10:00:00Z",
                }),
            )
            .await
            .unwrap();
        assert_eq!(outcome, WebhookOutcome::Ignored);
    }

    #[tokio::test]
    async fn malformed_webhook_is_rejected() {
        let h = harness(MockAdapter::new(SupplierKind::Loomworks)).await;

        let result = h
            .service
            .handle_webhook(h.supplier_id, "inventory", &json!({"sku": 7}))
            .await;
        assert!(matches!(result, Err(SyncError::WebhookRejected(_))));
    }

    #[tokio::test]
    async fn catalog_sync_updates_and_discovers() {
        let adapter = MockAdapter::new(SupplierKind::Loomworks).catalog(vec![
            CatalogEntry {
                supplier_sku: "LW-1".to_string(),
                name: "Canvas Tote".to_string(),
                internal_sku: None,
                cost: dec!(6.10),
                currency: "USD".to_string(),
                available: true,
                stock_quantity: 80,
                lead_time_days: 4,
                moq: 24,
            },
            CatalogEntry {
                supplier_sku: "LW-NEW".to_string(),
                name: "Linen Apron".to_string(),
                internal_sku: Some("APRON-NAT".to_string()),
                cost: dec!(9.90),
                currency: "USD".to_string(),
                available: true,
                stock_quantity: 40,
                lead_time_days: 6,
                moq: 12,
            },
            CatalogEntry {
                supplier_sku: "LW-UNMAPPED".to_string(),
                name: "Wool Beanie".to_string(),
                internal_sku: None,
                cost: dec!(4.25),
                currency: "USD".to_string(),
                available: true,
                stock_quantity: 10,
                lead_time_days: 9,
                moq: 48,
            },
        ]);

        let mappings = Arc::new(InMemoryMappingStore::new());
        let suppliers = Arc::new(InMemorySupplierStore::new());
        let variants = Arc::new(InMemoryVariantCatalog::new());
        let factory = Arc::new(AdapterFactory::new());

        let supplier_id = Uuid::new_v4();
        suppliers
            .insert(Supplier {
                id: supplier_id,
                name: "LoomWorks EU".to_string(),
                kind: SupplierKind::Loomworks,
                is_active: true,
                created_at: Utc::now(),
            })
            .await;
        factory.register(supplier_id, Arc::new(adapter));

        let apron_variant = Uuid::new_v4();
        variants.register("APRON-NAT", apron_variant).await;

        seed_mapping(&mappings, supplier_id, "TOTE-CANVAS", "LW-1").await;

        let service =
            SupplierSyncService::new(mappings.clone(), suppliers, variants, factory);
        let report = service.sync_catalog(supplier_id).await.unwrap();

        // Both unseen SKUs count as new; only the resolvable one becomes a
        // mapping.
        assert_eq!(report.updated_products, 1);
        assert_eq!(report.new_products, 2);

        let updated = mappings
            .find_by_supplier_sku(supplier_id, "LW-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.cost, dec!(6.10));
        assert_eq!(updated.stock_quantity, 80);
        assert_eq!(updated.moq, 24);

        let discovered = mappings
            .find_by_supplier_sku(supplier_id, "LW-NEW")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(discovered.variant_id, apron_variant);
        assert_eq!(discovered.internal_sku, "APRON-NAT");
        assert_eq!(discovered.priority, 2);

        assert!(mappings
            .find_by_supplier_sku(supplier_id, "LW-UNMAPPED")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn sync_for_unknown_supplier_fails() {
        let h = harness(MockAdapter::new(SupplierKind::Loomworks)).await;
        let result = h.service.sync_inventory(Uuid::new_v4()).await;
        assert!(matches!(result, Err(SyncError::SupplierNotFound(_))));
    }
}
