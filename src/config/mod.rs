use anyhow::Result;
use sqlx::PgPool;
use std::env;

use crate::models::supplier::SupplierKind;
use crate::services::suppliers::{LoomWorksConfig, PrintHausConfig};

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
    pub ssl_mode: String,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: env::var("DATABASE_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: env::var("DATABASE_PORT")
                .unwrap_or_else(|_| "5432".to_string())
                .parse()?,
            username: env::var("DATABASE_USER").unwrap_or_else(|_| "postgres".to_string()),
            password: env::var("DATABASE_PASSWORD")?,
            database: env::var("DATABASE_NAME")
                .unwrap_or_else(|_| "trellis_fulfillment".to_string()),
            ssl_mode: env::var("DATABASE_SSL_MODE").unwrap_or_else(|_| "prefer".to_string()),
        })
    }

    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}?sslmode={}",
            self.username, self.password, self.host, self.port, self.database, self.ssl_mode
        )
    }
}

/// Credentials for every supplier API this deployment talks to.
#[derive(Debug, Clone)]
pub struct SupplierApiSettings {
    pub printhaus: PrintHausConfig,
    pub loomworks: LoomWorksConfig,
}

impl SupplierApiSettings {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            printhaus: PrintHausConfig {
                base_url: env::var("PRINTHAUS_API_URL")
                    .unwrap_or_else(|_| "https://api.printhaus.com".to_string()),
                api_key: env::var("PRINTHAUS_API_KEY")?,
            },
            loomworks: LoomWorksConfig {
                base_url: env::var("LOOMWORKS_API_URL")
                    .unwrap_or_else(|_| "https://api.loomworks.io".to_string()),
                api_token: env::var("LOOMWORKS_API_TOKEN")?,
            },
        })
    }
}

/// Per-partner shared secrets for webhook signature verification.
#[derive(Debug, Clone)]
pub struct WebhookSecrets {
    pub printhaus: String,
    pub loomworks: String,
}

impl WebhookSecrets {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            printhaus: env::var("PRINTHAUS_WEBHOOK_SECRET")?,
            loomworks: env::var("LOOMWORKS_WEBHOOK_SECRET")?,
        })
    }

    pub fn secret_for(&self, kind: SupplierKind) -> &str {
        match kind {
            SupplierKind::Printhaus => &self.printhaus,
            SupplierKind::Loomworks => &self.loomworks,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub server_host: String,
    pub server_port: u16,
    pub database_pool: PgPool,
    pub supplier_apis: SupplierApiSettings,
    pub webhook_secrets: WebhookSecrets,
    pub sync_interval_secs: u64,
}

impl AppConfig {
    pub async fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let database = DatabaseConfig::from_env()?;
        let database_pool = sqlx::PgPool::connect(&database.connection_string()).await?;

        Ok(Self {
            database,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            database_pool,
            supplier_apis: SupplierApiSettings::from_env()?,
            webhook_secrets: WebhookSecrets::from_env()?,
            sync_interval_secs: env::var("SYNC_INTERVAL_SECS")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()
                .unwrap_or(3600),
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
