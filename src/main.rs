use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trellis_fulfillment::config::AppConfig;
use trellis_fulfillment::services::SupplierSyncService;
use trellis_fulfillment::{create_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trellis_fulfillment=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env().await?;
    let state = AppState::from_config(&config).await?;

    // Background refresh loop: catalog, inventory, and pricing for every
    // active supplier on a fixed interval.
    let sync_service = Arc::new(SupplierSyncService::new(
        state.mappings.clone(),
        state.suppliers.clone(),
        state.variants.clone(),
        state.factory.clone(),
    ));
    SupplierSyncService::spawn_scheduler(
        sync_service,
        Duration::from_secs(config.sync_interval_secs),
    );

    let addr = config.server_address();
    let app = create_app(state);

    tracing::info!("Starting Trellis fulfillment engine on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
