use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::middleware::error_handling::Result;
use crate::services::{CatalogSyncReport, SupplierSyncService, SyncReport};
use crate::AppState;

fn sync_service(state: &AppState) -> SupplierSyncService {
    SupplierSyncService::new(
        state.mappings.clone(),
        state.suppliers.clone(),
        state.variants.clone(),
        state.factory.clone(),
    )
}

pub async fn sync_inventory(
    State(state): State<AppState>,
    Path(supplier_id): Path<Uuid>,
) -> Result<Json<SyncReport>> {
    let report = sync_service(&state).sync_inventory(supplier_id).await?;
    Ok(Json(report))
}

pub async fn sync_pricing(
    State(state): State<AppState>,
    Path(supplier_id): Path<Uuid>,
) -> Result<Json<SyncReport>> {
    let report = sync_service(&state).sync_pricing(supplier_id).await?;
    Ok(Json(report))
}

pub async fn sync_catalog(
    State(state): State<AppState>,
    Path(supplier_id): Path<Uuid>,
) -> Result<Json<CatalogSyncReport>> {
    let report = sync_service(&state).sync_catalog(supplier_id).await?;
    Ok(Json(report))
}
