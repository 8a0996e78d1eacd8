use crate::domain::{errors::DomainError, Embedding, SearchResult, StoredRecord};
use async_trait::async_trait;

/// A vector index scoped to a single namespace.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Writes records, replacing any with the same chunk id. Returns the
    /// number of records written.
    async fn upsert(&self, records: &[StoredRecord]) -> Result<usize, DomainError>;
    /// Nearest records to `query`, best first. Returns fewer than `top_k`
    /// when the namespace holds fewer records.
    async fn search(
        &self,
        query: &Embedding,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, DomainError>;
    /// Number of records currently stored in the namespace.
    async fn count(&self) -> Result<usize, DomainError>;
    fn namespace(&self) -> &str;
}
