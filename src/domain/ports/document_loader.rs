use crate::domain::{errors::DomainError, Page};
use async_trait::async_trait;
use std::path::Path;

#[async_trait]
pub trait DocumentLoader: Send + Sync {
    /// Extracts one `Page` per document page, in page order.
    async fn load(&self, path: &Path) -> Result<Vec<Page>, DomainError>;
}
