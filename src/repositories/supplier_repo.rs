use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{query, query_scalar, PgPool, Row};
use uuid::Uuid;

use crate::models::supplier::{Supplier, SupplierKind};
use crate::repositories::{StoreError, StoreResult};

/// Read port over the supplier registry.
#[async_trait]
pub trait SupplierStore: Send + Sync {
    async fn find_by_id(&self, supplier_id: Uuid) -> StoreResult<Option<Supplier>>;

    async fn find_active(&self) -> StoreResult<Vec<Supplier>>;
}

/// Narrow lookup from internal SKU to variant id. The routing subsystem never
/// owns product catalog data; it only resolves identities through this port.
#[async_trait]
pub trait VariantLookup: Send + Sync {
    async fn variant_id_for_sku(&self, internal_sku: &str) -> StoreResult<Option<Uuid>>;
}

pub struct PgSupplierRepository {
    pool: PgPool,
}

impl PgSupplierRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_row(row: &PgRow) -> StoreResult<Supplier> {
        let kind_text: String = row.try_get("kind")?;
        let kind = SupplierKind::parse(&kind_text).ok_or_else(|| {
            StoreError::MalformedRecord(format!("unknown supplier kind '{}'", kind_text))
        })?;

        Ok(Supplier {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            kind,
            is_active: row.try_get("is_active")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl SupplierStore for PgSupplierRepository {
    async fn find_by_id(&self, supplier_id: Uuid) -> StoreResult<Option<Supplier>> {
        let row = query("SELECT id, name, kind, is_active, created_at FROM suppliers WHERE id = $1")
            .bind(supplier_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::map_row).transpose()
    }

    async fn find_active(&self) -> StoreResult<Vec<Supplier>> {
        let rows = query(
            "SELECT id, name, kind, is_active, created_at FROM suppliers \
             WHERE is_active = TRUE ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::map_row).collect()
    }
}

pub struct PgVariantCatalog {
    pool: PgPool,
}

impl PgVariantCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VariantLookup for PgVariantCatalog {
    async fn variant_id_for_sku(&self, internal_sku: &str) -> StoreResult<Option<Uuid>> {
        let id: Option<Uuid> =
            query_scalar("SELECT id FROM product_variants WHERE internal_sku = $1")
                .bind(internal_sku)
                .fetch_optional(&self.pool)
                .await?;

        Ok(id)
    }
}
