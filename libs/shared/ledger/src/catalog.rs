use async_trait::async_trait;

use shared_models::{Service, StorageError};

/// Read-only lookup of service definitions.
///
/// The engine never writes through this seam; service management belongs to
/// the surrounding CRUD layer.
#[async_trait]
pub trait ServiceCatalog: Send + Sync {
    async fn resolve(&self, service_id: i64) -> Result<Option<Service>, StorageError>;
}
