use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// External fulfillment partner integrations supported by this deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupplierKind {
    /// Print-on-demand partner; produces to order, no finite stock.
    Printhaus,
    /// Stocked textile partner; finite warehouse inventory, webhook pushes.
    Loomworks,
}

impl SupplierKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SupplierKind::Printhaus => "printhaus",
            SupplierKind::Loomworks => "loomworks",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "printhaus" => Some(SupplierKind::Printhaus),
            "loomworks" => Some(SupplierKind::Loomworks),
            _ => None,
        }
    }
}

impl std::fmt::Display for SupplierKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supplier {
    pub id: Uuid,
    pub name: String,
    pub kind: SupplierKind,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supplier_kind_round_trips() {
        for kind in [SupplierKind::Printhaus, SupplierKind::Loomworks] {
            assert_eq!(SupplierKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(SupplierKind::parse("acme"), None);
    }
}
