pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod services;

use std::sync::Arc;

use axum::{
    body::Body,
    extract::Request,
    middleware::Next,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

use config::{AppConfig, WebhookSecrets};
use repositories::{
    MappingStore, PgMappingRepository, PgRoutingLogRepository, PgSupplierRepository,
    PgVariantCatalog, RoutingLogStore, SupplierStore, VariantLookup,
};
use services::suppliers::AdapterFactory;

/// Shared handle set every handler builds its services from. Stores are trait
/// objects so tests and alternative backends can swap the persistence layer.
#[derive(Clone)]
pub struct AppState {
    pub mappings: Arc<dyn MappingStore>,
    pub suppliers: Arc<dyn SupplierStore>,
    pub variants: Arc<dyn VariantLookup>,
    pub routing_log: Arc<dyn RoutingLogStore>,
    pub factory: Arc<AdapterFactory>,
    pub webhook_secrets: WebhookSecrets,
}

impl AppState {
    /// Wire the Postgres-backed state and register one adapter per active
    /// supplier for the process lifetime.
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let pool = config.database_pool.clone();

        let suppliers: Arc<dyn SupplierStore> = Arc::new(PgSupplierRepository::new(pool.clone()));
        let active = suppliers.find_active().await?;
        let factory = Arc::new(AdapterFactory::from_suppliers(
            &active,
            &config.supplier_apis,
        )?);

        Ok(Self {
            mappings: Arc::new(PgMappingRepository::new(pool.clone())),
            suppliers,
            variants: Arc::new(PgVariantCatalog::new(pool.clone())),
            routing_log: Arc::new(PgRoutingLogRepository::new(pool)),
            factory,
            webhook_secrets: config.webhook_secrets.clone(),
        })
    }
}

pub fn create_app(state: AppState) -> Router {
    use handlers::{
        mappings::{
            disable_mapping, enable_mapping, mappings_for_variant, mark_stale, upsert_mapping,
        },
        routing::{
            inventory_summary, record_plan, route_order, routing_statistics, select_supplier,
        },
        sync::{sync_catalog, sync_inventory, sync_pricing},
        webhooks::receive_webhook,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest(
            "/api/routing",
            Router::new()
                .route("/plan", post(route_order))
                .route("/select", post(select_supplier))
                .route("/plans/record", post(record_plan))
                .route("/inventory/:sku", get(inventory_summary))
                .route("/statistics", get(routing_statistics)),
        )
        .nest(
            "/api/mappings",
            Router::new()
                .route("/", post(upsert_mapping))
                .route("/variant/:variant_id", get(mappings_for_variant))
                .route("/:variant_id/:supplier_id/stale", post(mark_stale))
                .route("/:variant_id/:supplier_id/disable", post(disable_mapping))
                .route("/:variant_id/:supplier_id/enable", post(enable_mapping)),
        )
        .nest(
            "/api/sync",
            Router::new()
                .route("/:supplier_id/inventory", post(sync_inventory))
                .route("/:supplier_id/pricing", post(sync_pricing))
                .route("/:supplier_id/catalog", post(sync_catalog)),
        )
        .nest(
            "/api/webhooks",
            Router::new().route("/:supplier_id", post(receive_webhook)),
        )
        .layer(ServiceBuilder::new().layer(cors))
        .with_state(state)
        .layer(axum::middleware::from_fn(
            |req: Request<Body>, next: Next| async move {
                tracing::info!("{} {}", req.method(), req.uri());
                let response = next.run(req).await;
                tracing::info!("Response status: {}", response.status());
                response
            },
        ))
}
