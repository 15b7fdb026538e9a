use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::middleware::error_handling::{AppError, Result};
use crate::models::mapping::SupplierVariantMapping;
use crate::models::routing::{
    DateRange, InventorySummary, OrderItemRequest, RoutingPlan, RoutingStatistics,
};
use crate::services::SupplierRoutingService;
use crate::AppState;

fn routing_service(state: &AppState) -> SupplierRoutingService {
    SupplierRoutingService::new(
        state.mappings.clone(),
        state.factory.clone(),
        state.routing_log.clone(),
    )
}

fn default_live_check() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct RouteOrderRequest {
    pub items: Vec<OrderItemRequest>,
    #[serde(default = "default_live_check")]
    pub live_check: bool,
}

pub async fn route_order(
    State(state): State<AppState>,
    Json(request): Json<RouteOrderRequest>,
) -> Result<Json<RoutingPlan>> {
    if request.items.is_empty() {
        return Err(AppError::BadRequest(
            "Order must contain at least one item".to_string(),
        ));
    }
    for item in &request.items {
        item.validate().map_err(AppError::Validation)?;
    }

    let plan = routing_service(&state)
        .route_order(&request.items, request.live_check)
        .await?;
    Ok(Json(plan))
}

#[derive(Debug, Deserialize, Validate)]
pub struct SelectSupplierRequest {
    #[validate(length(min = 1, message = "SKU required"))]
    pub sku: String,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
    #[serde(default = "default_live_check")]
    pub live_check: bool,
}

pub async fn select_supplier(
    State(state): State<AppState>,
    Json(request): Json<SelectSupplierRequest>,
) -> Result<Json<Option<SupplierVariantMapping>>> {
    request.validate().map_err(AppError::Validation)?;

    let selected = routing_service(&state)
        .select_supplier(&request.sku, request.quantity, request.live_check)
        .await?;
    Ok(Json(selected))
}

#[derive(Debug, Deserialize)]
pub struct RecordPlanRequest {
    pub plan: RoutingPlan,
    pub order_ref: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecordPlanResponse {
    pub plan_id: Uuid,
}

pub async fn record_plan(
    State(state): State<AppState>,
    Json(request): Json<RecordPlanRequest>,
) -> Result<Json<RecordPlanResponse>> {
    let plan_id = routing_service(&state)
        .record_plan(&request.plan, request.order_ref)
        .await?;
    Ok(Json(RecordPlanResponse { plan_id }))
}

pub async fn inventory_summary(
    State(state): State<AppState>,
    Path(sku): Path<String>,
) -> Result<Json<InventorySummary>> {
    let summary = routing_service(&state)
        .check_inventory_across_suppliers(&sku)
        .await?;
    Ok(Json(summary))
}

pub async fn routing_statistics(
    State(state): State<AppState>,
    Query(range): Query<DateRange>,
) -> Result<Json<RoutingStatistics>> {
    if range.end <= range.start {
        return Err(AppError::BadRequest(
            "Date range end must be after start".to_string(),
        ));
    }

    let stats = routing_service(&state).routing_statistics(range).await?;
    Ok(Json(stats))
}
