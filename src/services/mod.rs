pub mod sku_translation_service;
pub mod supplier_routing_service;
pub mod supplier_sync_service;
pub mod suppliers;

pub use sku_translation_service::{SkuTranslationService, TranslationError};
pub use supplier_routing_service::{RoutingError, SupplierRoutingService};
pub use supplier_sync_service::{
    CatalogSyncReport, SupplierSyncService, SyncError, SyncReport, WebhookOutcome,
};
