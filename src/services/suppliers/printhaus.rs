// PrintHaus Adapter
// Print-on-demand partner: produces to order, so inventory is effectively
// unlimited while a product is active. Echoes the merchant-assigned external
// SKU in catalog responses.

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

/// Stock reported for an active print-on-demand product.
const MADE_TO_ORDER_STOCK: i32 = 999;

#[derive(Debug, Clone)]
pub struct PrintHausConfig {
    pub base_url: String,
    pub api_key: String,
}

impl PrintHausConfig {
    pub fn validate(&self) -> AdapterResult<()> {
        if self.base_url.is_empty() {
            return Err(AdapterError::Unknown("base_url is required".to_string()));
        }
        if self.api_key.is_empty() {
            return Err(AdapterError::AuthFailed("api_key is required".to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct PrintHausProduct {
    sku: String,
    name: String,
    unit_cost: String,
    currency: String,
    external_sku: Option<String>,
    lead_time_days: i32,
    min_units: i32,
    active: bool,
}

#[derive(Debug, Deserialize)]
struct PrintHausProductList {
    items: Vec<PrintHausProduct>,
}

#[derive(Debug, Deserialize)]
struct PrintHausOrderResponse {
    id: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct PriceUpdatedPayload {
    sku: String,
    unit_cost: String,
    currency: String,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct OrderStatusPayload {
    order_id: String,
    status: String,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct ProductAvailabilityPayload {
    sku: String,
    active: bool,
    updated_at: DateTime<Utc>,
}

// ============================================================================
// Adapter
// ============================================================================

pub struct PrintHausAdapter {
    config: PrintHausConfig,
    http_client: Client,
}

impl PrintHausAdapter {
    pub fn new(config: PrintHausConfig) -> AdapterResult<Self> {
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
            .bearer_auth(&self.config.api_key)
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

    async fn parse_product(response: Response) -> AdapterResult<PrintHausProduct> {
        response
            .json::<PrintHausProduct>()
            .await
            .map_err(|e| AdapterError::Unknown(format!("malformed product response: {}", e)))
    }

    fn parse_cost(raw: &str) -> AdapterResult<Decimal> {
        raw.parse::<Decimal>()
            .map_err(|e| AdapterError::Unknown(format!("unparseable unit cost '{}': {}", raw, e)))
    }
}

#[async_trait]
impl SupplierAdapter for PrintHausAdapter {
    fn kind(&self) -> SupplierKind {
        SupplierKind::Printhaus
    }

    async fn check_inventory(&self, supplier_sku: &str) -> AdapterResult<InventoryStatus> {
        let response = self.get(&format!("/v1/products/{}", supplier_sku)).await?;

        // A SKU PrintHaus does not carry is a normal "not available" answer.
        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!(supplier_sku, "printhaus: sku not found, treating as unavailable");
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

        let product = Self::parse_product(response).await?;
        Ok(InventoryStatus {
            available: product.active,
            quantity: if product.active { MADE_TO_ORDER_STOCK } else { 0 },
            lead_time_days: Some(product.lead_time_days),
        })
    }

    async fn get_price(&self, supplier_sku: &str) -> AdapterResult<PriceQuote> {
        let response = self.get(&format!("/v1/products/{}", supplier_sku)).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(AdapterError::InvalidSku(supplier_sku.to_string()));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Self::map_error_status(status, body));
        }

        let product = Self::parse_product(response).await?;
        Ok(PriceQuote {
            cost: Self::parse_cost(&product.unit_cost)?,
            currency: product.currency,
        })
    }

    async fn pull_catalog(&self) -> AdapterResult<Vec<CatalogEntry>> {
        tracing::debug!("printhaus: pulling product catalog");
        let response = self.get("/v1/products").await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Self::map_error_status(status, body));
        }

        let list = response
            .json::<PrintHausProductList>()
            .await
            .map_err(|e| AdapterError::Unknown(format!("malformed catalog response: {}", e)))?;

        list.items
            .into_iter()
            .map(|product| {
                Ok(CatalogEntry {
                    cost: Self::parse_cost(&product.unit_cost)?,
                    supplier_sku: product.sku,
                    name: product.name,
                    internal_sku: product.external_sku,
                    currency: product.currency,
                    available: product.active,
                    stock_quantity: if product.active { MADE_TO_ORDER_STOCK } else { 0 },
                    lead_time_days: product.lead_time_days,
                    moq: product.min_units,
                })
            })
            .collect()
    }

    async fn submit_order(
        &self,
        request: &SupplierOrderRequest,
    ) -> AdapterResult<SupplierOrderReceipt> {
        tracing::info!(external_ref = %request.external_ref, "printhaus: submitting order");

        let url = format!("{}/v1/orders", self.config.base_url);
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&serde_json::json!({
                "external_ref": request.external_ref,
                "recipient": request.ship_to,
                "items": request.items,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Self::map_error_status(status, body));
        }

        let order = response
            .json::<PrintHausOrderResponse>()
            .await
            .map_err(|e| AdapterError::Unknown(format!("malformed order response: {}", e)))?;

        Ok(SupplierOrderReceipt {
            external_order_id: order.id,
            status: order.status,
        })
    }

    fn parse_webhook(
        &self,
        event_type: &str,
        payload: &serde_json::Value,
    ) -> AdapterResult<NormalizedEvent> {
        match event_type {
            "catalog.price_updated" => {
                let event: PriceUpdatedPayload = serde_json::from_value(payload.clone())
                    .map_err(|e| AdapterError::Unknown(format!("bad price payload: {}", e)))?;
                Ok(NormalizedEvent::PriceChanged {
                    cost: Self::parse_cost(&event.unit_cost)?,
                    supplier_sku: event.sku,
                    currency: event.currency,
                    occurred_at: event.updated_at,
                })
            }
            "catalog.availability_updated" => {
                let event: ProductAvailabilityPayload = serde_json::from_value(payload.clone())
                    .map_err(|e| {
                        AdapterError::Unknown(format!("bad availability payload: {}", e))
                    })?;
                Ok(NormalizedEvent::InventoryChanged {
                    supplier_sku: event.sku,
                    available: event.active,
                    quantity: if event.active { MADE_TO_ORDER_STOCK } else { 0 },
                    occurred_at: event.updated_at,
                })
            }
            "order.status_changed" => {
                let event: OrderStatusPayload = serde_json::from_value(payload.clone())
                    .map_err(|e| AdapterError::Unknown(format!("bad order payload: {}", e)))?;
                Ok(NormalizedEvent::OrderStatusChanged {
                    external_order_id: event.order_id,
                    status: event.status,
                    occurred_at: event.updated_at,
                })
            }
            other => Err(AdapterError::Unknown(format!(
                "unrecognized printhaus event type '{}'",
                other
            ))),
        }
    }
}
