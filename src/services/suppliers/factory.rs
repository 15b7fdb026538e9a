// Adapter Factory
// Pure resolution from supplier identity to its long-lived adapter instance.
// No business logic lives here; adapters are stateless and shared for the
// process lifetime.

use dashmap::DashMap;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::config::SupplierApiSettings;
use crate::models::supplier::{Supplier, SupplierKind};
use crate::services::suppliers::{
    LoomWorksAdapter, PrintHausAdapter, SupplierAdapter,
};

#[derive(Error, Debug)]
pub enum FactoryError {
    /// Fatal configuration error: the supplier exists but no adapter was
    /// registered for it. Never retried.
    #[error("no adapter registered for supplier {0}")]
    NoAdapterRegistered(Uuid),

    #[error("invalid adapter configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Default)]
pub struct AdapterFactory {
    adapters: DashMap<Uuid, Arc<dyn SupplierAdapter>>,
}

impl AdapterFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build and register one adapter per supplier at startup.
    pub fn from_suppliers(
        suppliers: &[Supplier],
        apis: &SupplierApiSettings,
    ) -> Result<Self, FactoryError> {
        let factory = Self::new();
        for supplier in suppliers {
            let adapter = Self::build_adapter(supplier.kind, apis)?;
            tracing::info!(supplier = %supplier.name, kind = %supplier.kind, "registered supplier adapter");
            factory.register(supplier.id, adapter);
        }
        Ok(factory)
    }

    pub fn build_adapter(
        kind: SupplierKind,
        apis: &SupplierApiSettings,
    ) -> Result<Arc<dyn SupplierAdapter>, FactoryError> {
        let adapter: Arc<dyn SupplierAdapter> = match kind {
            SupplierKind::Printhaus => Arc::new(
                PrintHausAdapter::new(apis.printhaus.clone())
                    .map_err(|e| FactoryError::InvalidConfig(e.to_string()))?,
            ),
            SupplierKind::Loomworks => Arc::new(
                LoomWorksAdapter::new(apis.loomworks.clone())
                    .map_err(|e| FactoryError::InvalidConfig(e.to_string()))?,
            ),
        };
        Ok(adapter)
    }

    pub fn register(&self, supplier_id: Uuid, adapter: Arc<dyn SupplierAdapter>) {
        self.adapters.insert(supplier_id, adapter);
    }

    pub fn get(&self, supplier_id: Uuid) -> Result<Arc<dyn SupplierAdapter>, FactoryError> {
        self.adapters
            .get(&supplier_id)
            .map(|entry| entry.value().clone())
            .ok_or(FactoryError::NoAdapterRegistered(supplier_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::suppliers::PrintHausConfig;

    #[test]
    fn unknown_supplier_is_a_fatal_resolution_error() {
        let factory = AdapterFactory::new();
        let supplier_id = Uuid::new_v4();
        match factory.get(supplier_id) {
            Err(FactoryError::NoAdapterRegistered(id)) => assert_eq!(id, supplier_id),
            other => panic!("expected NoAdapterRegistered, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn registered_adapter_resolves() {
        let factory = AdapterFactory::new();
        let supplier_id = Uuid::new_v4();
        let adapter = PrintHausAdapter::new(PrintHausConfig {
            base_url: "http://localhost:9".to_string(),
            api_key: "key".to_string(),
        })
        .unwrap();

        factory.register(supplier_id, Arc::new(adapter));
        let resolved = factory.get(supplier_id).unwrap();
        assert_eq!(resolved.kind(), crate::models::supplier::SupplierKind::Printhaus);
    }
}
