// LoomWorks Adapter
// Stocked textile partner: finite warehouse inventory, carton-based minimum
// order quantities, pushes inventory and price changes over webhooks.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Response, StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::models::supplier::SupplierKind;
use crate::services::suppliers::{
    AdapterError, AdapterResult, CatalogEntry, InventoryStatus, NormalizedEvent, PriceQuote,
    SupplierAdapter, SupplierOrderReceipt, SupplierOrderRequest,
};

const REQUEST_TIMEOUT_SECS: u64 = 8;

#[derive(Debug, Clone)]
pub struct LoomWorksConfig {
    pub base_url: String,
    pub api_token: String,
}

impl LoomWorksConfig {
    pub fn validate(&self) -> AdapterResult<()> {
        if self.base_url.is_empty() {
            return Err(AdapterError::Unknown("base_url is required".to_string()));
        }
        if self.api_token.is_empty() {
            return Err(AdapterError::AuthFailed("api_token is required".to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct LoomWorksStock {
    #[allow(dead_code)]
    sku: String,
    on_hand: i32,
    lead_days: i32,
}

#[derive(Debug, Deserialize)]
struct LoomWorksPrice {
    #[allow(dead_code)]
    sku: String,
    unit_price: String,
    currency: String,
}

#[derive(Debug, Deserialize)]
struct LoomWorksCatalogProduct {
    sku: String,
    name: String,
    unit_price: String,
    currency: String,
    on_hand: i32,
    lead_days: i32,
    carton_size: i32,
}

#[derive(Debug, Deserialize)]
struct LoomWorksCatalog {
    products: Vec<LoomWorksCatalogProduct>,
}

#[derive(Debug, Deserialize)]
struct LoomWorksPurchaseOrder {
    po_number: String,
    state: String,
}

#[derive(Debug, Deserialize)]
struct InventoryUpdatedPayload {
    sku: String,
    on_hand: i32,
    occurred_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct PriceUpdatedPayload {
    sku: String,
    unit_price: String,
    currency: String,
    occurred_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct OrderUpdatedPayload {
    po_number: String,
    state: String,
    occurred_at: DateTime<Utc>,
}

// ============================================================================
// Adapter
// ============================================================================

pub struct LoomWorksAdapter {
    config: LoomWorksConfig,
    http_client: Client,
}

impl LoomWorksAdapter {
    pub fn new(config: LoomWorksConfig) -> AdapterResult<Self> {
        config.validate()?;

        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(AdapterError::from)?;

        Ok(Self {
            config,
            http_client,
        })
    }

    async fn get(&self, path: &str) -> AdapterResult<Response> {
        let url = format!("{}{}", self.config.base_url, path);
        let response = self
            .http_client
            .get(&url)
            .header("X-Api-Token", &self.config.api_token)
            .send()
            .await?;
        Ok(response)
    }

    fn map_error_status(status: StatusCode, body: String) -> AdapterError {
        match status {
            StatusCode::TOO_MANY_REQUESTS => AdapterError::RateLimited,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AdapterError::AuthFailed(body),
            s if s.is_server_error() => AdapterError::Unavailable(format!("{}: {}", s, body)),
            s => AdapterError::Unknown(format!("{}: {}", s, body)),
        }
    }

    fn parse_price(raw: &str) -> AdapterResult<Decimal> {
        raw.parse::<Decimal>()
            .map_err(|e| AdapterError::Unknown(format!("unparseable unit price '{}': {}", raw, e)))
    }
}

#[async_trait]
impl SupplierAdapter for LoomWorksAdapter {
    fn kind(&self) -> SupplierKind {
        SupplierKind::Loomworks
    }

    async fn check_inventory(&self, supplier_sku: &str) -> AdapterResult<InventoryStatus> {
        let response = self.get(&format!("/api/v2/stock/{}", supplier_sku)).await?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!(supplier_sku, "loomworks: sku not stocked, treating as unavailable");
            return Ok(InventoryStatus {
                available: false,
                quantity: 0,
                lead_time_days: None,
            });
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Self::map_error_status(status, body));
        }

        let stock = response
            .json::<LoomWorksStock>()
            .await
            .map_err(|e| AdapterError::Unknown(format!("malformed stock response: {}", e)))?;

        Ok(InventoryStatus {
            available: stock.on_hand > 0,
            quantity: stock.on_hand,
            lead_time_days: Some(stock.lead_days),
        })
    }

    async fn get_price(&self, supplier_sku: &str) -> AdapterResult<PriceQuote> {
        let response = self.get(&format!("/api/v2/prices/{}", supplier_sku)).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(AdapterError::InvalidSku(supplier_sku.to_string()));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Self::map_error_status(status, body));
        }

        let price = response
            .json::<LoomWorksPrice>()
            .await
            .map_err(|e| AdapterError::Unknown(format!("malformed price response: {}", e)))?;

        Ok(PriceQuote {
            cost: Self::parse_price(&price.unit_price)?,
            currency: price.currency,
        })
    }

    async fn pull_catalog(&self) -> AdapterResult<Vec<CatalogEntry>> {
        tracing::debug!("loomworks: pulling product catalog");
        let response = self.get("/api/v2/catalog").await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Self::map_error_status(status, body));
        }

        let catalog = response
            .json::<LoomWorksCatalog>()
            .await
            .map_err(|e| AdapterError::Unknown(format!("malformed catalog response: {}", e)))?;

        catalog
            .products
            .into_iter()
            .map(|product| {
                Ok(CatalogEntry {
                    cost: Self::parse_price(&product.unit_price)?,
                    supplier_sku: product.sku,
                    name: product.name,
                    // LoomWorks has no external-id concept; new SKUs need
                    // manual translation before they become mappings.
                    internal_sku: None,
                    currency: product.currency,
                    available: product.on_hand > 0,
                    stock_quantity: product.on_hand,
                    lead_time_days: product.lead_days,
                    moq: product.carton_size,
                })
            })
            .collect()
    }

    async fn submit_order(
        &self,
        request: &SupplierOrderRequest,
    ) -> AdapterResult<SupplierOrderReceipt> {
        tracing::info!(external_ref = %request.external_ref, "loomworks: submitting purchase order");

        let url = format!("{}/api/v2/purchase-orders", self.config.base_url);
        let response = self
            .http_client
            .post(&url)
            .header("X-Api-Token", &self.config.api_token)
            .json(&serde_json::json!({
                "reference": request.external_ref,
                "ship_to": request.ship_to,
                "lines": request.items,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Self::map_error_status(status, body));
        }

        let po = response
            .json::<LoomWorksPurchaseOrder>()
            .await
            .map_err(|e| AdapterError::Unknown(format!("malformed order response: {}", e)))?;

        Ok(SupplierOrderReceipt {
            external_order_id: po.po_number,
            status: po.state,
        })
    }

    fn parse_webhook(
        &self,
        event_type: &str,
        payload: &serde_json::Value,
    ) -> AdapterResult<NormalizedEvent> {
        match event_type {
            "inventory.updated" => {
                let event: InventoryUpdatedPayload = serde_json::from_value(payload.clone())
                    .map_err(|e| AdapterError::Unknown(format!("bad inventory payload: {}", e)))?;
                Ok(NormalizedEvent::InventoryChanged {
                    supplier_sku: event.sku,
                    available: event.on_hand > 0,
                    quantity: event.on_hand,
                    occurred_at: event.occurred_at,
                })
            }
            "price.updated" => {
                let event: PriceUpdatedPayload = serde_json::from_value(payload.clone())
                    .map_err(|e| AdapterError::Unknown(format!("bad price payload: {}", e)))?;
                Ok(NormalizedEvent::PriceChanged {
                    cost: Self::parse_price(&event.unit_price)?,
                    supplier_sku: event.sku,
                    currency: event.currency,
                    occurred_at: event.occurred_at,
                })
            }
            "order.updated" => {
                let event: OrderUpdatedPayload = serde_json::from_value(payload.clone())
                    .map_err(|e| AdapterError::Unknown(format!("bad order payload: {}", e)))?;
                Ok(NormalizedEvent::OrderStatusChanged {
                    external_order_id: event.po_number,
                    status: event.state,
                    occurred_at: event.occurred_at,
                })
            }
            other => Err(AdapterError::Unknown(format!(
                "unrecognized loomworks event type '{}'",
                other
            ))),
        }
    }
}
