// Supplier Routing Service
// Decides which fulfillment partner produces each line item of an order.
//
// Selection rules, in order:
// 1. Hard rule: candidate must clear its supplier's MOQ, and (for cached
//    decisions) hold enough stock for the request.
// 2. Business preference: priority ascending; preferred mappings rank first.
// 3. Cost, then lead time, then data freshness break ties.
// 4. For final placement the winner is confirmed live, probing candidates in
//    preference order and stopping at the first confirmation.

use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use crate::models::mapping::SupplierVariantMapping;
use crate::models::routing::{
    DateRange, InventorySummary, NewRoutingOutcome, OrderItemRequest, RoutedItem, RoutingPlan,
    RoutingStatistics, SupplierInventoryStatus, SupplierRoute, UnroutableItem, UnroutableReason,
};
use crate::repositories::{MappingStore, RoutingLogStore, StoreError};
use crate::services::suppliers::{AdapterFactory, FactoryError};

#[derive(Error, Debug)]
pub enum RoutingError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("adapter resolution failed: {0}")]
    Factory(#[from] FactoryError),
}

pub type Result<T> = std::result::Result<T, RoutingError>;

/// Upper bound on waiting for one live probe; the adapter's own client
/// timeout fires first, this only guards against a wedged task.
const PROBE_TIMEOUT: Duration = Duration::from_secs(12);

enum Selection {
    Chosen(SupplierVariantMapping),
    NoMapping,
    InsufficientStock,
    AllSuppliersUnavailable,
}

/// Equal priority resolves by cost, then lead time, then the most recently
/// synced mapping (fresher data wins).
fn rank_candidates(candidates: &mut [SupplierVariantMapping]) {
    candidates.sort_by(|a, b| {
        a.priority
            .cmp(&b.priority)
            .then_with(|| a.cost.cmp(&b.cost))
            .then_with(|| a.lead_time_days.cmp(&b.lead_time_days))
            .then_with(|| b.last_synced_at.cmp(&a.last_synced_at))
    });
}

pub struct SupplierRoutingService {
    mappings: Arc<dyn MappingStore>,
    factory: Arc<AdapterFactory>,
    routing_log: Arc<dyn RoutingLogStore>,
}

impl SupplierRoutingService {
    pub fn new(
        mappings: Arc<dyn MappingStore>,
        factory: Arc<AdapterFactory>,
        routing_log: Arc<dyn RoutingLogStore>,
    ) -> Self {
        Self {
            mappings,
            factory,
            routing_log,
        }
    }

    /// Pick the best supplier for one SKU, or `None` when no supplier can
    /// satisfy it — a normal outcome, distinct from any failure.
    ///
    /// `live_check` is required for final order placement; cost estimates may
    /// skip it and trust cached stock.
    pub async fn select_supplier(
        &self,
        sku: &str,
        quantity: i32,
        live_check: bool,
    ) -> Result<Option<SupplierVariantMapping>> {
        match self.select_with_reason(sku, quantity, live_check).await? {
            Selection::Chosen(mapping) => Ok(Some(mapping)),
            _ => Ok(None),
        }
    }

    async fn select_with_reason(
        &self,
        sku: &str,
        quantity: i32,
        live_check: bool,
    ) -> Result<Selection> {
        let mut candidates = self.mappings.find_by_sku(sku).await?;
        if candidates.is_empty() {
            tracing::debug!(sku, "no supplier mappings for SKU");
            return Ok(Selection::NoMapping);
        }
        rank_candidates(&mut candidates);

        let viable: Vec<_> = candidates
            .into_iter()
            .filter(|m| {
                if !m.meets_moq() {
                    return false;
                }
                if !live_check && (!m.is_available || m.stock_quantity < quantity) {
                    return false;
                }
                true
            })
            .collect();

        if viable.is_empty() {
            tracing::debug!(sku, quantity, "no candidate clears stock/MOQ filters");
            return Ok(Selection::InsufficientStock);
        }

        if !live_check {
            // Cached decision: the ranked head already passed the stock
            // filter.
            return match viable.into_iter().next() {
                Some(mapping) => Ok(Selection::Chosen(mapping)),
                None => Ok(Selection::InsufficientStock),
            };
        }

        // Sequential preference-ordered probe, short-circuiting on the first
        // confirmation. Priority expresses contract terms that must dominate
        // cost, so this is deliberately not a parallel ask-everyone.
        for mapping in viable {
            let adapter = self.factory.get(mapping.supplier_id)?;
            let supplier_sku = mapping.supplier_sku.clone();

            // Spawned so an aborted caller stops issuing further probes while
            // the in-flight one completes and gets discarded.
            let probe = tokio::spawn(async move { adapter.check_inventory(&supplier_sku).await });

            match tokio::time::timeout(PROBE_TIMEOUT, probe).await {
                Ok(Ok(Ok(status))) if status.available && status.quantity >= quantity => {
                    tracing::info!(
                        sku,
                        quantity,
                        supplier_id = %mapping.supplier_id,
                        supplier_sku = %mapping.supplier_sku,
                        confirmed = status.quantity,
                        "selected supplier"
                    );
                    return Ok(Selection::Chosen(mapping));
                }
                Ok(Ok(Ok(status))) => {
                    tracing::debug!(
                        sku,
                        supplier_id = %mapping.supplier_id,
                        confirmed = status.quantity,
                        quantity,
                        "supplier cannot cover requested quantity"
                    );
                }
                Ok(Ok(Err(err))) => {
                    // Transient partner failure: same as "unavailable", move
                    // to the next candidate.
                    tracing::warn!(
                        sku,
                        supplier_id = %mapping.supplier_id,
                        "live inventory check failed: {}",
                        err
                    );
                }
                Ok(Err(join_err)) => {
                    tracing::warn!(
                        sku,
                        supplier_id = %mapping.supplier_id,
                        "inventory probe task failed: {}",
                        join_err
                    );
                }
                Err(_) => {
                    tracing::warn!(
                        sku,
                        supplier_id = %mapping.supplier_id,
                        "inventory probe timed out"
                    );
                }
            }
        }

        Ok(Selection::AllSuppliersUnavailable)
    }

    /// Route a whole order. Always returns a complete plan: every requested
    /// item lands in exactly one of `routes` or `unroutable_items`, and one
    /// unroutable item never fails the call.
    pub async fn route_order(
        &self,
        items: &[OrderItemRequest],
        live_check: bool,
    ) -> Result<RoutingPlan> {
        tracing::info!(items = items.len(), live_check, "routing order");

        // Line items share no mutable state, so they are evaluated
        // concurrently; each selection still probes its own candidates in
        // preference order.
        let selections = join_all(items.iter().map(|item| async move {
            let selection = self
                .select_with_reason(&item.sku, item.quantity, live_check)
                .await;
            (item, selection)
        }))
        .await;

        let mut plan = RoutingPlan::default();
        for (item, selection) in selections {
            match selection? {
                Selection::Chosen(mapping) => {
                    let route = plan
                        .routes
                        .entry(mapping.supplier_id)
                        .or_insert_with(|| SupplierRoute {
                            supplier_id: mapping.supplier_id,
                            items: Vec::new(),
                        });
                    route.items.push(RoutedItem {
                        variant_id: mapping.variant_id,
                        internal_sku: mapping.internal_sku,
                        supplier_sku: mapping.supplier_sku,
                        quantity: item.quantity,
                        unit_cost: mapping.cost,
                    });
                }
                Selection::NoMapping => plan.unroutable_items.push(UnroutableItem {
                    sku: item.sku.clone(),
                    quantity: item.quantity,
                    reason: UnroutableReason::NoMapping,
                }),
                Selection::InsufficientStock => plan.unroutable_items.push(UnroutableItem {
                    sku: item.sku.clone(),
                    quantity: item.quantity,
                    reason: UnroutableReason::InsufficientStock,
                }),
                Selection::AllSuppliersUnavailable => plan.unroutable_items.push(UnroutableItem {
                    sku: item.sku.clone(),
                    quantity: item.quantity,
                    reason: UnroutableReason::AllSuppliersUnavailable,
                }),
            }
        }

        tracing::info!(
            suppliers = plan.routes.len(),
            unroutable = plan.unroutable_items.len(),
            "routing complete"
        );
        Ok(plan)
    }

    /// Diagnostic read: probe every non-disabled mapping for the SKU (no
    /// short-circuit) and report the comparative picture. Adapter failures
    /// show up as unchecked entries instead of aborting the summary.
    pub async fn check_inventory_across_suppliers(&self, sku: &str) -> Result<InventorySummary> {
        let mappings = self.mappings.find_by_sku(sku).await?;

        let probes = mappings.into_iter().map(|mapping| async move {
            match self.factory.get(mapping.supplier_id) {
                Ok(adapter) => match adapter.check_inventory(&mapping.supplier_sku).await {
                    Ok(status) => SupplierInventoryStatus {
                        supplier_id: mapping.supplier_id,
                        supplier_sku: mapping.supplier_sku,
                        available: status.available,
                        quantity: status.quantity,
                        lead_time_days: status.lead_time_days,
                        checked: true,
                        error: None,
                    },
                    Err(err) => SupplierInventoryStatus {
                        supplier_id: mapping.supplier_id,
                        supplier_sku: mapping.supplier_sku,
                        available: false,
                        quantity: 0,
                        lead_time_days: None,
                        checked: false,
                        error: Some(err.to_string()),
                    },
                },
                Err(err) => SupplierInventoryStatus {
                    supplier_id: mapping.supplier_id,
                    supplier_sku: mapping.supplier_sku,
                    available: false,
                    quantity: 0,
                    lead_time_days: None,
                    checked: false,
                    error: Some(err.to_string()),
                },
            }
        });

        let suppliers = join_all(probes).await;
        let total_available = suppliers
            .iter()
            .filter(|s| s.available)
            .map(|s| s.quantity as i64)
            .sum();

        Ok(InventorySummary {
            sku: sku.to_string(),
            total_available,
            suppliers,
        })
    }

    /// Persist a chosen plan's per-line outcomes so routing statistics have
    /// history to aggregate. Callers opt in; routing itself never writes.
    pub async fn record_plan(&self, plan: &RoutingPlan, order_ref: Option<String>) -> Result<Uuid> {
        let plan_id = Uuid::new_v4();
        let mut outcomes = Vec::with_capacity(plan.total_item_count());

        for route in plan.routes.values() {
            for item in &route.items {
                outcomes.push(NewRoutingOutcome {
                    plan_id,
                    order_ref: order_ref.clone(),
                    internal_sku: item.internal_sku.clone(),
                    quantity: item.quantity,
                    supplier_id: Some(route.supplier_id),
                    unroutable_reason: None,
                    unit_cost: Some(item.unit_cost),
                });
            }
        }
        for item in &plan.unroutable_items {
            outcomes.push(NewRoutingOutcome {
                plan_id,
                order_ref: order_ref.clone(),
                internal_sku: item.sku.clone(),
                quantity: item.quantity,
                supplier_id: None,
                unroutable_reason: Some(item.reason),
                unit_cost: None,
            });
        }

        self.routing_log.record(&outcomes).await?;
        tracing::debug!(%plan_id, lines = outcomes.len(), "recorded routing plan");
        Ok(plan_id)
    }

    /// Reporting query over recorded plans. No side effects.
    pub async fn routing_statistics(&self, range: DateRange) -> Result<RoutingStatistics> {
        Ok(self.routing_log.statistics(range).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::mapping::{NewMapping, SyncStatus};
    use crate::models::supplier::SupplierKind;
    use crate::repositories::{InMemoryMappingStore, InMemoryRoutingLog};
    use crate::services::suppliers::testing::MockAdapter;
    use crate::services::suppliers::AdapterError;
    use chrono::{Duration as ChronoDuration, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    struct Harness {
        service: SupplierRoutingService,
        mappings: Arc<InMemoryMappingStore>,
        factory: Arc<AdapterFactory>,
    }

    fn harness() -> Harness {
        let mappings = Arc::new(InMemoryMappingStore::new());
        let factory = Arc::new(AdapterFactory::new());
        let log = Arc::new(InMemoryRoutingLog::new());
        Harness {
            service: SupplierRoutingService::new(mappings.clone(), factory.clone(), log),
            mappings,
            factory,
        }
    }

    struct MappingSpec {
        sku: &'static str,
        supplier_sku: &'static str,
        cost: Decimal,
        stock: i32,
        moq: i32,
        lead_time_days: i32,
        is_preferred: bool,
        priority: i32,
    }

    impl Default for MappingSpec {
        fn default() -> Self {
            Self {
                sku: "TEE-RED-M",
                supplier_sku: "SUP-1",
                cost: dec!(10.00),
                stock: 100,
                moq: 1,
                lead_time_days: 5,
                is_preferred: false,
                priority: 2,
            }
        }
    }

    async fn seed(h: &Harness, supplier_id: Uuid, spec: MappingSpec) -> SupplierVariantMapping {
        h.mappings
            .upsert(NewMapping {
                variant_id: Uuid::new_v4(),
                internal_sku: spec.sku.to_string(),
                supplier_id,
                supplier_sku: spec.supplier_sku.to_string(),
                cost: spec.cost,
                currency: "USD".to_string(),
                stock_quantity: spec.stock,
                is_available: spec.stock > 0,
                lead_time_days: spec.lead_time_days,
                moq: spec.moq,
                is_preferred: spec.is_preferred,
                priority: spec.priority,
                sync_status: SyncStatus::Active,
                last_synced_at: Some(Utc::now()),
            })
            .await
            .unwrap()
    }

    fn register(h: &Harness, adapter: MockAdapter) -> (Uuid, Arc<MockAdapter>) {
        let supplier_id = Uuid::new_v4();
        let adapter = Arc::new(adapter);
        h.factory.register(supplier_id, adapter.clone());
        (supplier_id, adapter)
    }

    #[tokio::test]
    async fn preferred_supplier_wins_over_cheaper_one() {
        let h = harness();
        let (supplier_a, probe_a) =
            register(&h, MockAdapter::new(SupplierKind::Printhaus).stock("A-1", 50));
        let (supplier_b, probe_b) =
            register(&h, MockAdapter::new(SupplierKind::Loomworks).stock("B-1", 50));

        seed(
            &h,
            supplier_a,
            MappingSpec {
                supplier_sku: "A-1",
                cost: dec!(100),
                is_preferred: true,
                priority: 1,
                stock: 50,
                ..Default::default()
            },
        )
        .await;
        seed(
            &h,
            supplier_b,
            MappingSpec {
                supplier_sku: "B-1",
                cost: dec!(80),
                priority: 2,
                stock: 50,
                ..Default::default()
            },
        )
        .await;

        let chosen = h
            .service
            .select_supplier("TEE-RED-M", 20, true)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(chosen.supplier_id, supplier_a);
        // Short-circuit: the cheaper priority-2 supplier is never probed.
        assert_eq!(probe_a.probe_count(), 1);
        assert_eq!(probe_b.probe_count(), 0);
    }

    #[tokio::test]
    async fn equal_priority_breaks_tie_on_cost() {
        let h = harness();
        let (supplier_a, _) =
            register(&h, MockAdapter::new(SupplierKind::Printhaus).stock("A-1", 50));
        let (supplier_b, _) =
            register(&h, MockAdapter::new(SupplierKind::Loomworks).stock("B-1", 50));

        seed(
            &h,
            supplier_a,
            MappingSpec {
                supplier_sku: "A-1",
                cost: dec!(120),
                ..Default::default()
            },
        )
        .await;
        seed(
            &h,
            supplier_b,
            MappingSpec {
                supplier_sku: "B-1",
                cost: dec!(100),
                ..Default::default()
            },
        )
        .await;

        let chosen = h
            .service
            .select_supplier("TEE-RED-M", 10, true)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(chosen.supplier_id, supplier_b);
    }

    #[tokio::test]
    async fn equal_cost_breaks_tie_on_lead_time() {
        let h = harness();
        let (supplier_a, _) =
            register(&h, MockAdapter::new(SupplierKind::Printhaus).stock("A-1", 50));
        let (supplier_b, _) =
            register(&h, MockAdapter::new(SupplierKind::Loomworks).stock("B-1", 50));

        seed(
            &h,
            supplier_a,
            MappingSpec {
                supplier_sku: "A-1",
                lead_time_days: 9,
                ..Default::default()
            },
        )
        .await;
        seed(
            &h,
            supplier_b,
            MappingSpec {
                supplier_sku: "B-1",
                lead_time_days: 3,
                ..Default::default()
            },
        )
        .await;

        let chosen = h
            .service
            .select_supplier("TEE-RED-M", 10, true)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(chosen.supplier_id, supplier_b);
    }

    #[tokio::test]
    async fn fresher_sync_data_wins_the_final_tie() {
        let h = harness();
        let (supplier_a, _) =
            register(&h, MockAdapter::new(SupplierKind::Printhaus).stock("A-1", 50));
        let (supplier_b, _) =
            register(&h, MockAdapter::new(SupplierKind::Loomworks).stock("B-1", 50));

        let stale = seed(
            &h,
            supplier_a,
            MappingSpec {
                supplier_sku: "A-1",
                ..Default::default()
            },
        )
        .await;
        h.mappings
            .update_fields(
                stale.variant_id,
                supplier_a,
                crate::models::mapping::MappingPatch {
                    last_synced_at: Some(Utc::now() - ChronoDuration::hours(36)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        seed(
            &h,
            supplier_b,
            MappingSpec {
                supplier_sku: "B-1",
                ..Default::default()
            },
        )
        .await;

        let chosen = h
            .service
            .select_supplier("TEE-RED-M", 10, true)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(chosen.supplier_id, supplier_b);
    }

    #[tokio::test]
    async fn stock_below_moq_is_excluded_even_for_small_requests() {
        let h = harness();
        let (supplier_a, probe_a) =
            register(&h, MockAdapter::new(SupplierKind::Loomworks).stock("A-1", 5));

        seed(
            &h,
            supplier_a,
            MappingSpec {
                supplier_sku: "A-1",
                stock: 5,
                moq: 10,
                ..Default::default()
            },
        )
        .await;

        let chosen = h.service.select_supplier("TEE-RED-M", 3, true).await.unwrap();
        assert!(chosen.is_none());
        // Filtered out before any probe was issued.
        assert_eq!(probe_a.probe_count(), 0);
    }

    #[tokio::test]
    async fn failed_probe_falls_through_to_next_candidate() {
        let h = harness();
        let (supplier_a, _) = register(
            &h,
            MockAdapter::new(SupplierKind::Printhaus).inventory_response(
                "A-1",
                Err(AdapterError::Unavailable("timeout".to_string())),
            ),
        );
        let (supplier_b, _) =
            register(&h, MockAdapter::new(SupplierKind::Loomworks).stock("B-1", 50));

        seed(
            &h,
            supplier_a,
            MappingSpec {
                supplier_sku: "A-1",
                priority: 1,
                is_preferred: true,
                ..Default::default()
            },
        )
        .await;
        seed(
            &h,
            supplier_b,
            MappingSpec {
                supplier_sku: "B-1",
                ..Default::default()
            },
        )
        .await;

        let chosen = h
            .service
            .select_supplier("TEE-RED-M", 10, true)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(chosen.supplier_id, supplier_b);
    }

    #[tokio::test]
    async fn live_confirmation_below_request_moves_on() {
        let h = harness();
        let (supplier_a, _) =
            register(&h, MockAdapter::new(SupplierKind::Loomworks).stock("A-1", 5));
        let (supplier_b, _) =
            register(&h, MockAdapter::new(SupplierKind::Loomworks).stock("B-1", 50));

        // Cached stock says 100, live answer says 5.
        seed(
            &h,
            supplier_a,
            MappingSpec {
                supplier_sku: "A-1",
                priority: 1,
                ..Default::default()
            },
        )
        .await;
        seed(
            &h,
            supplier_b,
            MappingSpec {
                supplier_sku: "B-1",
                ..Default::default()
            },
        )
        .await;

        let chosen = h
            .service
            .select_supplier("TEE-RED-M", 20, true)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(chosen.supplier_id, supplier_b);
    }

    #[tokio::test]
    async fn cached_selection_trusts_the_table() {
        let h = harness();
        // No adapter registered: a cached decision must not probe at all.
        let supplier_id = Uuid::new_v4();
        seed(
            &h,
            supplier_id,
            MappingSpec {
                supplier_sku: "A-1",
                stock: 30,
                ..Default::default()
            },
        )
        .await;

        let chosen = h
            .service
            .select_supplier("TEE-RED-M", 10, false)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(chosen.supplier_id, supplier_id);

        let none = h.service.select_supplier("TEE-RED-M", 31, false).await.unwrap();
        assert!(none.is_none());
    }

    #[tokio::test]
    async fn route_order_covers_every_item_exactly_once() {
        let h = harness();
        let (supplier_a, _) = register(
            &h,
            MockAdapter::new(SupplierKind::Printhaus)
                .stock("A-1", 50)
                .stock("A-2", 50),
        );

        seed(
            &h,
            supplier_a,
            MappingSpec {
                sku: "TEE-RED-M",
                supplier_sku: "A-1",
                ..Default::default()
            },
        )
        .await;
        seed(
            &h,
            supplier_a,
            MappingSpec {
                sku: "HOODIE-BLK-L",
                supplier_sku: "A-2",
                ..Default::default()
            },
        )
        .await;

        let items = vec![
            OrderItemRequest {
                sku: "TEE-RED-M".to_string(),
                quantity: 5,
            },
            OrderItemRequest {
                sku: "HOODIE-BLK-L".to_string(),
                quantity: 2,
            },
            OrderItemRequest {
                sku: "MUG-GHOST".to_string(),
                quantity: 3,
            },
        ];

        let plan = h.service.route_order(&items, true).await.unwrap();

        assert_eq!(plan.total_item_count(), items.len());
        assert_eq!(plan.routed_item_count(), 2);
        assert_eq!(plan.routes[&supplier_a].items.len(), 2);
        assert_eq!(plan.unroutable_items.len(), 1);
        assert_eq!(plan.unroutable_items[0].sku, "MUG-GHOST");
        assert_eq!(plan.unroutable_items[0].reason, UnroutableReason::NoMapping);

        // Conservation: routed quantity never exceeds the request.
        for route in plan.routes.values() {
            for routed in &route.items {
                let requested = items
                    .iter()
                    .find(|i| i.sku == routed.internal_sku)
                    .map(|i| i.quantity)
                    .unwrap();
                assert!(routed.quantity <= requested);
            }
        }
    }

    #[tokio::test]
    async fn route_order_reports_unavailable_suppliers() {
        let h = harness();
        let (supplier_a, _) = register(
            &h,
            MockAdapter::new(SupplierKind::Loomworks).inventory_response(
                "A-1",
                Err(AdapterError::Unavailable("outage".to_string())),
            ),
        );
        seed(
            &h,
            supplier_a,
            MappingSpec {
                supplier_sku: "A-1",
                ..Default::default()
            },
        )
        .await;

        let plan = h
            .service
            .route_order(
                &[OrderItemRequest {
                    sku: "TEE-RED-M".to_string(),
                    quantity: 1,
                }],
                true,
            )
            .await
            .unwrap();

        assert!(plan.routes.is_empty());
        assert_eq!(
            plan.unroutable_items[0].reason,
            UnroutableReason::AllSuppliersUnavailable
        );
    }

    #[tokio::test]
    async fn inventory_summary_probes_all_suppliers() {
        let h = harness();
        let (supplier_a, probe_a) =
            register(&h, MockAdapter::new(SupplierKind::Printhaus).stock("A-1", 30));
        let (supplier_b, probe_b) = register(
            &h,
            MockAdapter::new(SupplierKind::Loomworks).inventory_response(
                "B-1",
                Err(AdapterError::Unavailable("outage".to_string())),
            ),
        );

        seed(
            &h,
            supplier_a,
            MappingSpec {
                supplier_sku: "A-1",
                priority: 1,
                ..Default::default()
            },
        )
        .await;
        seed(
            &h,
            supplier_b,
            MappingSpec {
                supplier_sku: "B-1",
                ..Default::default()
            },
        )
        .await;

        let summary = h
            .service
            .check_inventory_across_suppliers("TEE-RED-M")
            .await
            .unwrap();

        // Diagnostic: both probed, no short-circuit.
        assert_eq!(probe_a.probe_count(), 1);
        assert_eq!(probe_b.probe_count(), 1);
        assert_eq!(summary.total_available, 30);
        assert_eq!(summary.suppliers.len(), 2);

        let failed = summary
            .suppliers
            .iter()
            .find(|s| s.supplier_id == supplier_b)
            .unwrap();
        assert!(!failed.checked);
        assert!(failed.error.is_some());
    }

    #[tokio::test]
    async fn recorded_plans_feed_statistics() {
        let h = harness();
        let (supplier_a, _) =
            register(&h, MockAdapter::new(SupplierKind::Printhaus).stock("A-1", 50));
        seed(
            &h,
            supplier_a,
            MappingSpec {
                supplier_sku: "A-1",
                ..Default::default()
            },
        )
        .await;

        let items = vec![
            OrderItemRequest {
                sku: "TEE-RED-M".to_string(),
                quantity: 5,
            },
            OrderItemRequest {
                sku: "MUG-GHOST".to_string(),
                quantity: 1,
            },
        ];
        let plan = h.service.route_order(&items, true).await.unwrap();
        h.service
            .record_plan(&plan, Some("ORD-1001".to_string()))
            .await
            .unwrap();

        let stats = h
            .service
            .routing_statistics(DateRange {
                start: Utc::now() - ChronoDuration::hours(1),
                end: Utc::now() + ChronoDuration::hours(1),
            })
            .await
            .unwrap();

        assert_eq!(stats.total_plans, 1);
        assert_eq!(stats.routed_items, 1);
        assert_eq!(stats.unroutable_items, 1);
        assert!((stats.unroutable_rate - 0.5).abs() < f64::EPSILON);
        assert_eq!(stats.supplier_distribution[0].supplier_id, supplier_a);
        assert_eq!(stats.supplier_distribution[0].routed_items, 1);
    }

    #[tokio::test]
    async fn unregistered_adapter_is_a_configuration_error() {
        let h = harness();
        let supplier_id = Uuid::new_v4();
        seed(
            &h,
            supplier_id,
            MappingSpec {
                supplier_sku: "A-1",
                ..Default::default()
            },
        )
        .await;

        let result = h.service.select_supplier("TEE-RED-M", 1, true).await;
        assert!(matches!(
            result,
            Err(RoutingError::Factory(FactoryError::NoAdapterRegistered(_)))
        ));
    }
}
