use async_trait::async_trait;
use sqlx::{query, PgPool, Row};
use uuid::Uuid;

use crate::models::routing::{
    DateRange, NewRoutingOutcome, RoutingStatistics, SupplierRoutingCount,
};
use crate::repositories::StoreResult;

/// Persistence port for recorded routing outcomes. Routing itself is
/// side-effect free; callers opt in to recording a chosen plan, and the
/// statistics query reads only what was recorded.
#[async_trait]
pub trait RoutingLogStore: Send + Sync {
    async fn record(&self, outcomes: &[NewRoutingOutcome]) -> StoreResult<()>;

    async fn statistics(&self, range: DateRange) -> StoreResult<RoutingStatistics>;
}

pub struct PgRoutingLogRepository {
    pool: PgPool,
}

impl PgRoutingLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoutingLogStore for PgRoutingLogRepository {
    async fn record(&self, outcomes: &[NewRoutingOutcome]) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        for outcome in outcomes {
            query(
                "INSERT INTO routing_log \
                 (plan_id, order_ref, internal_sku, quantity, supplier_id, unroutable_reason, unit_cost) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(outcome.plan_id)
            .bind(&outcome.order_ref)
            .bind(&outcome.internal_sku)
            .bind(outcome.quantity)
            .bind(outcome.supplier_id)
            .bind(outcome.unroutable_reason.map(|r| r.as_str()))
            .bind(outcome.unit_cost)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn statistics(&self, range: DateRange) -> StoreResult<RoutingStatistics> {
        let totals = query(
            "SELECT COUNT(DISTINCT plan_id) AS total_plans, \
                    COUNT(*) FILTER (WHERE supplier_id IS NOT NULL) AS routed_items, \
                    COUNT(*) FILTER (WHERE supplier_id IS NULL) AS unroutable_items \
             FROM routing_log WHERE routed_at >= $1 AND routed_at < $2",
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_one(&self.pool)
        .await?;

        let total_plans: i64 = totals.try_get("total_plans")?;
        let routed_items: i64 = totals.try_get("routed_items")?;
        let unroutable_items: i64 = totals.try_get("unroutable_items")?;

        let distribution_rows = query(
            "SELECT supplier_id, COUNT(*) AS routed_items FROM routing_log \
             WHERE supplier_id IS NOT NULL AND routed_at >= $1 AND routed_at < $2 \
             GROUP BY supplier_id ORDER BY routed_items DESC",
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.pool)
        .await?;

        let supplier_distribution = distribution_rows
            .iter()
            .map(|row| {
                Ok(SupplierRoutingCount {
                    supplier_id: row.try_get::<Uuid, _>("supplier_id")?,
                    routed_items: row.try_get("routed_items")?,
                })
            })
            .collect::<StoreResult<Vec<_>>>()?;

        let total_items = routed_items + unroutable_items;
        let unroutable_rate = if total_items == 0 {
            0.0
        } else {
            unroutable_items as f64 / total_items as f64
        };

        Ok(RoutingStatistics {
            total_plans,
            routed_items,
            unroutable_items,
            unroutable_rate,
            supplier_distribution,
        })
    }
}
