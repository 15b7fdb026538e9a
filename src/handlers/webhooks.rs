// Per-supplier webhook intake. Signatures are verified before anything is
// parsed; once a payload is accepted it is acked immediately and processed in
// the background, so an internal failure never triggers a partner-side retry
// storm.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use uuid::Uuid;

use crate::middleware::error_handling::{AppError, Result};
use crate::services::SupplierSyncService;
use crate::AppState;

type HmacSha256 = Hmac<Sha256>;

const SIGNATURE_HEADER: &str = "x-webhook-signature";
const EVENT_TYPE_HEADER: &str = "x-webhook-event";

pub async fn receive_webhook(
    State(state): State<AppState>,
    Path(supplier_id): Path<Uuid>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<serde_json::Value>> {
    let supplier = state
        .suppliers
        .find_by_id(supplier_id)
        .await
        .map_err(AppError::Store)?
        .ok_or_else(|| AppError::NotFound("Unknown supplier".to_string()))?;

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::BadRequest("Missing webhook signature".to_string()))?;

    let secret = state.webhook_secrets.secret_for(supplier.kind);
    if !verify_signature(secret, &body, signature)? {
        tracing::warn!(%supplier_id, "webhook signature verification failed");
        return Err(AppError::Unauthorized);
    }

    let event_type = headers
        .get(EVENT_TYPE_HEADER)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::BadRequest("Missing webhook event type".to_string()))?
        .to_string();

    let payload: serde_json::Value = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid JSON payload: {}", e)))?;

    let service = SupplierSyncService::new(
        state.mappings.clone(),
        state.suppliers.clone(),
        state.variants.clone(),
        state.factory.clone(),
    );

    tokio::spawn(async move {
        match service
            .handle_webhook(supplier_id, &event_type, &payload)
            .await
        {
            Ok(outcome) => {
                tracing::debug!(%supplier_id, event_type, outcome = ?outcome, "webhook processed")
            }
            Err(e) => {
                tracing::error!(%supplier_id, event_type, "webhook processing failed: {}", e)
            }
        }
    });

    Ok(Json(json!({ "received": true })))
}

/// HMAC-SHA256 over the raw body, constant-time compare.
/// Header format: `X-Webhook-Signature: sha256=<hex>`.
fn verify_signature(secret: &str, payload: &[u8], signature_header: &str) -> Result<bool> {
    let signature_hex = signature_header.strip_prefix("sha256=").ok_or_else(|| {
        AppError::BadRequest("Invalid signature format. Expected: sha256=<hex>".to_string())
    })?;

    let expected = hex::decode(signature_hex)
        .map_err(|_| AppError::BadRequest("Invalid signature encoding".to_string()))?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("HMAC init failed: {:?}", e)))?;
    mac.update(payload);

    Ok(mac.verify_slice(&expected).is_ok())
}
