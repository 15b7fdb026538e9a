use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::middleware::error_handling::{AppError, Result};
use crate::models::mapping::{SupplierVariantMapping, UpsertMappingRequest};
use crate::services::SkuTranslationService;
use crate::AppState;

fn translation_service(state: &AppState) -> SkuTranslationService {
    SkuTranslationService::new(state.mappings.clone())
}

pub async fn mappings_for_variant(
    State(state): State<AppState>,
    Path(variant_id): Path<Uuid>,
) -> Result<Json<Vec<SupplierVariantMapping>>> {
    let mappings = translation_service(&state)
        .mappings_for_variant(variant_id)
        .await?;
    Ok(Json(mappings))
}

pub async fn upsert_mapping(
    State(state): State<AppState>,
    Json(request): Json<UpsertMappingRequest>,
) -> Result<Json<SupplierVariantMapping>> {
    request.validate().map_err(AppError::Validation)?;

    let mapping = translation_service(&state).upsert_mapping(request).await?;
    Ok(Json(mapping))
}

pub async fn mark_stale(
    State(state): State<AppState>,
    Path((variant_id, supplier_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode> {
    translation_service(&state)
        .mark_stale(variant_id, supplier_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn disable_mapping(
    State(state): State<AppState>,
    Path((variant_id, supplier_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode> {
    translation_service(&state)
        .disable(variant_id, supplier_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn enable_mapping(
    State(state): State<AppState>,
    Path((variant_id, supplier_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode> {
    translation_service(&state)
        .enable(variant_id, supplier_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
