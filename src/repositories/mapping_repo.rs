use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{query, query_scalar, PgPool, Row};
use uuid::Uuid;

use crate::models::mapping::{
    MappingPatch, NewMapping, SupplierVariantMapping, SyncStatus, UpdateOutcome,
};
use crate::repositories::{StoreError, StoreResult};

/// Read/write port to the SKU translation table. Services depend on this
/// trait, not on a concrete database client.
#[async_trait]
pub trait MappingStore: Send + Sync {
    /// Non-disabled mappings for a variant, best candidate first.
    async fn find_by_variant(&self, variant_id: Uuid) -> StoreResult<Vec<SupplierVariantMapping>>;

    /// Non-disabled mappings for an internal SKU, best candidate first.
    async fn find_by_sku(&self, internal_sku: &str) -> StoreResult<Vec<SupplierVariantMapping>>;

    /// Non-disabled mappings belonging to one supplier (batch sync scans).
    async fn find_by_supplier(&self, supplier_id: Uuid) -> StoreResult<Vec<SupplierVariantMapping>>;

    async fn find_by_supplier_sku(
        &self,
        supplier_id: Uuid,
        supplier_sku: &str,
    ) -> StoreResult<Option<SupplierVariantMapping>>;

    /// Single mapping regardless of status (admin reads include disabled).
    async fn find_one(
        &self,
        variant_id: Uuid,
        supplier_id: Uuid,
    ) -> StoreResult<Option<SupplierVariantMapping>>;

    /// Create-or-replace on the (variant_id, supplier_id) key. A conflicting
    /// insert becomes an update; the table caches external truth, so this is
    /// never an error.
    async fn upsert(&self, row: NewMapping) -> StoreResult<SupplierVariantMapping>;

    /// Write only the supplied fields of an existing mapping.
    async fn update_fields(
        &self,
        variant_id: Uuid,
        supplier_id: Uuid,
        patch: MappingPatch,
    ) -> StoreResult<Option<SupplierVariantMapping>>;

    async fn set_sync_status(
        &self,
        variant_id: Uuid,
        supplier_id: Uuid,
        status: SyncStatus,
    ) -> StoreResult<bool>;

    /// Freshness-guarded inventory write keyed by supplier SKU: events older
    /// than the stored `last_synced_at` are discarded, which makes webhook
    /// replay and out-of-order delivery safe.
    async fn apply_inventory_update(
        &self,
        supplier_id: Uuid,
        supplier_sku: &str,
        available: bool,
        quantity: i32,
        observed_at: DateTime<Utc>,
    ) -> StoreResult<UpdateOutcome>;

    /// Same guard for price updates.
    async fn apply_price_update(
        &self,
        supplier_id: Uuid,
        supplier_sku: &str,
        cost: Decimal,
        currency: &str,
        observed_at: DateTime<Utc>,
    ) -> StoreResult<UpdateOutcome>;
}

const MAPPING_COLUMNS: &str = "id, variant_id, internal_sku, supplier_id, supplier_sku, cost, currency, stock_quantity, is_available, lead_time_days, moq, is_preferred, priority, sync_status, last_synced_at, created_at, updated_at";

/// Candidate ordering: business preference first, then cost, then lead time,
/// then freshest sync data.
const CANDIDATE_ORDER: &str =
    "ORDER BY priority ASC, cost ASC, lead_time_days ASC, last_synced_at DESC NULLS LAST";

pub struct PgMappingRepository {
    pool: PgPool,
}

impl PgMappingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_row(row: &PgRow) -> StoreResult<SupplierVariantMapping> {
        let status_text: String = row.try_get("sync_status")?;
        let sync_status = SyncStatus::parse(&status_text).ok_or_else(|| {
            StoreError::MalformedRecord(format!("unknown sync_status '{}'", status_text))
        })?;

        Ok(SupplierVariantMapping {
            id: row.try_get("id")?,
            variant_id: row.try_get("variant_id")?,
            internal_sku: row.try_get("internal_sku")?,
            supplier_id: row.try_get("supplier_id")?,
            supplier_sku: row.try_get("supplier_sku")?,
            cost: row.try_get("cost")?,
            currency: row.try_get("currency")?,
            stock_quantity: row.try_get("stock_quantity")?,
            is_available: row.try_get("is_available")?,
            lead_time_days: row.try_get("lead_time_days")?,
            moq: row.try_get("moq")?,
            is_preferred: row.try_get("is_preferred")?,
            priority: row.try_get("priority")?,
            sync_status,
            last_synced_at: row.try_get("last_synced_at")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn map_rows(rows: Vec<PgRow>) -> StoreResult<Vec<SupplierVariantMapping>> {
        rows.iter().map(Self::map_row).collect()
    }

    async fn mapping_exists(&self, supplier_id: Uuid, supplier_sku: &str) -> StoreResult<bool> {
        let exists: bool = query_scalar(
            "SELECT EXISTS(SELECT 1 FROM supplier_variant_mappings WHERE supplier_id = $1 AND supplier_sku = $2)",
        )
        .bind(supplier_id)
        .bind(supplier_sku)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}

#[async_trait]
impl MappingStore for PgMappingRepository {
    async fn find_by_variant(&self, variant_id: Uuid) -> StoreResult<Vec<SupplierVariantMapping>> {
        let rows = query(&format!(
            "SELECT {MAPPING_COLUMNS} FROM supplier_variant_mappings \
             WHERE variant_id = $1 AND sync_status <> 'disabled' {CANDIDATE_ORDER}"
        ))
        .bind(variant_id)
        .fetch_all(&self.pool)
        .await?;

        Self::map_rows(rows)
    }

    async fn find_by_sku(&self, internal_sku: &str) -> StoreResult<Vec<SupplierVariantMapping>> {
        let rows = query(&format!(
            "SELECT {MAPPING_COLUMNS} FROM supplier_variant_mappings \
             WHERE internal_sku = $1 AND sync_status <> 'disabled' {CANDIDATE_ORDER}"
        ))
        .bind(internal_sku)
        .fetch_all(&self.pool)
        .await?;

        Self::map_rows(rows)
    }

    async fn find_by_supplier(&self, supplier_id: Uuid) -> StoreResult<Vec<SupplierVariantMapping>> {
        let rows = query(&format!(
            "SELECT {MAPPING_COLUMNS} FROM supplier_variant_mappings \
             WHERE supplier_id = $1 AND sync_status <> 'disabled' ORDER BY internal_sku"
        ))
        .bind(supplier_id)
        .fetch_all(&self.pool)
        .await?;

        Self::map_rows(rows)
    }

    async fn find_by_supplier_sku(
        &self,
        supplier_id: Uuid,
        supplier_sku: &str,
    ) -> StoreResult<Option<SupplierVariantMapping>> {
        let row = query(&format!(
            "SELECT {MAPPING_COLUMNS} FROM supplier_variant_mappings \
             WHERE supplier_id = $1 AND supplier_sku = $2"
        ))
        .bind(supplier_id)
        .bind(supplier_sku)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::map_row).transpose()
    }

    async fn find_one(
        &self,
        variant_id: Uuid,
        supplier_id: Uuid,
    ) -> StoreResult<Option<SupplierVariantMapping>> {
        let row = query(&format!(
            "SELECT {MAPPING_COLUMNS} FROM supplier_variant_mappings \
             WHERE variant_id = $1 AND supplier_id = $2"
        ))
        .bind(variant_id)
        .bind(supplier_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::map_row).transpose()
    }

    async fn upsert(&self, new: NewMapping) -> StoreResult<SupplierVariantMapping> {
        let row = query(&format!(
            "INSERT INTO supplier_variant_mappings (
                variant_id, internal_sku, supplier_id, supplier_sku, cost, currency,
                stock_quantity, is_available, lead_time_days, moq, is_preferred,
                priority, sync_status, last_synced_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ON CONFLICT (variant_id, supplier_id) DO UPDATE SET
                internal_sku = EXCLUDED.internal_sku,
                supplier_sku = EXCLUDED.supplier_sku,
                cost = EXCLUDED.cost,
                currency = EXCLUDED.currency,
                stock_quantity = EXCLUDED.stock_quantity,
                is_available = EXCLUDED.is_available,
                lead_time_days = EXCLUDED.lead_time_days,
                moq = EXCLUDED.moq,
                is_preferred = EXCLUDED.is_preferred,
                priority = EXCLUDED.priority,
                sync_status = EXCLUDED.sync_status,
                last_synced_at = EXCLUDED.last_synced_at,
                updated_at = NOW()
            RETURNING {MAPPING_COLUMNS}"
        ))
        .bind(new.variant_id)
        .bind(&new.internal_sku)
        .bind(new.supplier_id)
        .bind(&new.supplier_sku)
        .bind(new.cost)
        .bind(&new.currency)
        .bind(new.stock_quantity)
        .bind(new.is_available)
        .bind(new.lead_time_days)
        .bind(new.moq)
        .bind(new.is_preferred)
        .bind(new.priority)
        .bind(new.sync_status.as_str())
        .bind(new.last_synced_at)
        .fetch_one(&self.pool)
        .await?;

        Self::map_row(&row)
    }

    async fn update_fields(
        &self,
        variant_id: Uuid,
        supplier_id: Uuid,
        patch: MappingPatch,
    ) -> StoreResult<Option<SupplierVariantMapping>> {
        if patch.is_empty() {
            return self.find_one(variant_id, supplier_id).await;
        }

        use sqlx::QueryBuilder;

        let mut builder: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new("UPDATE supplier_variant_mappings SET ");
        let mut separated = builder.separated(", ");

        if let Some(ref supplier_sku) = patch.supplier_sku {
            separated.push("supplier_sku = ");
            separated.push_bind_unseparated(supplier_sku.clone());
        }
        if let Some(cost) = patch.cost {
            separated.push("cost = ");
            separated.push_bind_unseparated(cost);
        }
        if let Some(ref currency) = patch.currency {
            separated.push("currency = ");
            separated.push_bind_unseparated(currency.clone());
        }
        if let Some(stock_quantity) = patch.stock_quantity {
            separated.push("stock_quantity = ");
            separated.push_bind_unseparated(stock_quantity);
        }
        if let Some(is_available) = patch.is_available {
            separated.push("is_available = ");
            separated.push_bind_unseparated(is_available);
        }
        if let Some(lead_time_days) = patch.lead_time_days {
            separated.push("lead_time_days = ");
            separated.push_bind_unseparated(lead_time_days);
        }
        if let Some(moq) = patch.moq {
            separated.push("moq = ");
            separated.push_bind_unseparated(moq);
        }
        if let Some(is_preferred) = patch.is_preferred {
            separated.push("is_preferred = ");
            separated.push_bind_unseparated(is_preferred);
        }
        if let Some(priority) = patch.priority {
            separated.push("priority = ");
            separated.push_bind_unseparated(priority);
        }
        if let Some(sync_status) = patch.sync_status {
            separated.push("sync_status = ");
            separated.push_bind_unseparated(sync_status.as_str());
        }
        if let Some(last_synced_at) = patch.last_synced_at {
            separated.push("last_synced_at = ");
            separated.push_bind_unseparated(last_synced_at);
        }
        separated.push("updated_at = NOW()");

        builder.push(" WHERE variant_id = ");
        builder.push_bind(variant_id);
        builder.push(" AND supplier_id = ");
        builder.push_bind(supplier_id);
        builder.push(format!(" RETURNING {MAPPING_COLUMNS}"));

        let row = builder.build().fetch_optional(&self.pool).await?;
        row.as_ref().map(Self::map_row).transpose()
    }

    async fn set_sync_status(
        &self,
        variant_id: Uuid,
        supplier_id: Uuid,
        status: SyncStatus,
    ) -> StoreResult<bool> {
        let result = query(
            "UPDATE supplier_variant_mappings SET sync_status = $3, updated_at = NOW() \
             WHERE variant_id = $1 AND supplier_id = $2",
        )
        .bind(variant_id)
        .bind(supplier_id)
        .bind(status.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn apply_inventory_update(
        &self,
        supplier_id: Uuid,
        supplier_sku: &str,
        available: bool,
        quantity: i32,
        observed_at: DateTime<Utc>,
    ) -> StoreResult<UpdateOutcome> {
        let result = query(
            "UPDATE supplier_variant_mappings \
             SET stock_quantity = $3, is_available = $4, sync_status = 'active', \
                 last_synced_at = $5, updated_at = NOW() \
             WHERE supplier_id = $1 AND supplier_sku = $2 \
               AND sync_status <> 'disabled' \
               AND (last_synced_at IS NULL OR last_synced_at <= $5)",
        )
        .bind(supplier_id)
        .bind(supplier_sku)
        .bind(quantity)
        .bind(available)
        .bind(observed_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            return Ok(UpdateOutcome::Applied);
        }
        if self.mapping_exists(supplier_id, supplier_sku).await? {
            return Ok(UpdateOutcome::Discarded);
        }
        Ok(UpdateOutcome::NotFound)
    }

    async fn apply_price_update(
        &self,
        supplier_id: Uuid,
        supplier_sku: &str,
        cost: Decimal,
        currency: &str,
        observed_at: DateTime<Utc>,
    ) -> StoreResult<UpdateOutcome> {
        let result = query(
            "UPDATE supplier_variant_mappings \
             SET cost = $3, currency = $4, sync_status = 'active', \
                 last_synced_at = $5, updated_at = NOW() \
             WHERE supplier_id = $1 AND supplier_sku = $2 \
               AND sync_status <> 'disabled' \
               AND (last_synced_at IS NULL OR last_synced_at <= $5)",
        )
        .bind(supplier_id)
        .bind(supplier_sku)
        .bind(cost)
        .bind(currency)
        .bind(observed_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            return Ok(UpdateOutcome::Applied);
        }
        if self.mapping_exists(supplier_id, supplier_sku).await? {
            return Ok(UpdateOutcome::Discarded);
        }
        Ok(UpdateOutcome::NotFound)
    }
}
