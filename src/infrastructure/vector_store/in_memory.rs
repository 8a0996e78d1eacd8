use async_trait::async_trait;
use std::sync::RwLock;

use crate::domain::{ports::VectorStore, DomainError, Embedding, SearchResult, StoredRecord};

/// Process-local store ranking by cosine similarity. Test backend only.
pub struct InMemoryVectorStore {
    namespace: String,
    records: RwLock<Vec<StoredRecord>>,
}

impl InMemoryVectorStore {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            records: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn upsert(&self, records: &[StoredRecord]) -> Result<usize, DomainError> {
        let mut store = self
            .records
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        for record in records {
            store.retain(|r| r.chunk.id != record.chunk.id);
            store.push(record.clone());
        }
        Ok(records.len())
    }

    async fn search(
        &self,
        query: &Embedding,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, DomainError> {
        let store = self
            .records
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        let mut results: Vec<SearchResult> = store
            .iter()
            .map(|record| SearchResult {
                chunk: record.chunk.clone(),
                score: query.cosine_similarity(&record.embedding),
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(top_k);

        Ok(results)
    }

    async fn count(&self) -> Result<usize, DomainError> {
        self.records
            .read()
            .map(|store| store.len())
            .map_err(|e| DomainError::internal(e.to_string()))
    }

    fn namespace(&self) -> &str {
        &self.namespace
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DocumentChunk;

    fn record(text: &str, vector: Vec<f32>) -> StoredRecord {
        StoredRecord {
            chunk: DocumentChunk::new(text, 0),
            embedding: Embedding::new(vector),
        }
    }

    #[tokio::test]
    async fn test_upsert_and_search_ranks_by_similarity() {
        let store = InMemoryVectorStore::new("test");
        store
            .upsert(&[
                record("north", vec![0.0, 1.0, 0.0]),
                record("east", vec![1.0, 0.0, 0.0]),
                record("north-east", vec![0.7, 0.7, 0.0]),
            ])
            .await
            .unwrap();

        let results = store
            .search(&Embedding::new(vec![1.0, 0.0, 0.0]), 2)
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.content, "east");
        assert!((results[0].score - 1.0).abs() < 0.001);
        assert_eq!(results[1].chunk.content, "north-east");
    }

    #[tokio::test]
    async fn test_search_with_k_above_count_returns_everything() {
        let store = InMemoryVectorStore::new("test");
        store
            .upsert(&[record("only", vec![1.0, 0.0])])
            .await
            .unwrap();

        let results = store
            .search(&Embedding::new(vec![1.0, 0.0]), 4)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_upsert_replaces_same_chunk_id() {
        let store = InMemoryVectorStore::new("test");
        let mut first = record("v1", vec![1.0, 0.0]);
        store.upsert(&[first.clone()]).await.unwrap();

        first.chunk.content = "v2".to_string();
        store.upsert(&[first]).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
        let results = store
            .search(&Embedding::new(vec![1.0, 0.0]), 4)
            .await
            .unwrap();
        assert_eq!(results[0].chunk.content, "v2");
    }
}
