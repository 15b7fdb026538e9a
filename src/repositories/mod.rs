pub mod mapping_repo;
pub mod memory;
pub mod routing_log_repo;
pub mod supplier_repo;

pub use mapping_repo::*;
pub use memory::*;
pub use routing_log_repo::*;
pub use supplier_repo::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("malformed record: {0}")]
    MalformedRecord(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
