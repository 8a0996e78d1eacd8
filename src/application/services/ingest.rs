use std::sync::Arc;
use tracing::{info, instrument};

use crate::domain::{
    chunk_pages,
    ports::{DocumentLoader, EmbeddingService, VectorStore},
    Document, DocumentChunk, DomainError, StoredRecord, CHUNK_OVERLAP, CHUNK_SIZE,
};

/// Progress notifications emitted while a document is embedded and stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestEvent {
    Loaded { pages: usize },
    Chunked { chunks: usize },
    BatchStored { batch: usize, batches: usize, records: usize },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub pages: usize,
    pub chunks: usize,
    pub records_written: usize,
}

/// Load → chunk → embed → store. Any failure aborts the run; batches
/// already written stay in the index.
pub struct IngestService {
    loader: Arc<dyn DocumentLoader>,
    embedding: Arc<dyn EmbeddingService>,
    vector_store: Arc<dyn VectorStore>,
    batch_size: usize,
}

impl IngestService {
    pub fn new(
        loader: Arc<dyn DocumentLoader>,
        embedding: Arc<dyn EmbeddingService>,
        vector_store: Arc<dyn VectorStore>,
        batch_size: usize,
    ) -> Self {
        Self {
            loader,
            embedding,
            vector_store,
            batch_size: batch_size.max(1),
        }
    }

    pub async fn ingest(&self, document: &Document) -> Result<IngestReport, DomainError> {
        self.ingest_with_progress(document, |_| {}).await
    }

    #[instrument(skip(self, document, on_event), fields(document = %document.name))]
    pub async fn ingest_with_progress<F>(
        &self,
        document: &Document,
        mut on_event: F,
    ) -> Result<IngestReport, DomainError>
    where
        F: FnMut(IngestEvent),
    {
        let pages = self.loader.load(document.path()).await?;
        info!(pages = pages.len(), "loaded document");
        on_event(IngestEvent::Loaded { pages: pages.len() });

        let chunks = chunk_pages(&pages, &document.name, CHUNK_SIZE, CHUNK_OVERLAP)?;
        info!(chunks = chunks.len(), "chunked document");
        on_event(IngestEvent::Chunked {
            chunks: chunks.len(),
        });

        let records_written = self.index_chunks(&chunks, &mut on_event).await?;

        Ok(IngestReport {
            pages: pages.len(),
            chunks: chunks.len(),
            records_written,
        })
    }

    #[instrument(skip(self, chunks, on_event), fields(count = chunks.len(), namespace = self.vector_store.namespace()))]
    async fn index_chunks<F>(
        &self,
        chunks: &[DocumentChunk],
        on_event: &mut F,
    ) -> Result<usize, DomainError>
    where
        F: FnMut(IngestEvent),
    {
        let batches = chunks.len().div_ceil(self.batch_size);
        let mut written = 0;

        for (i, batch) in chunks.chunks(self.batch_size).enumerate() {
            let texts: Vec<&str> = batch.iter().map(|c| c.content.as_str()).collect();
            let embeddings = self.embedding.embed_batch(&texts).await?;
            if embeddings.len() != batch.len() {
                return Err(DomainError::internal(format!(
                    "got {} embeddings for {} chunks",
                    embeddings.len(),
                    batch.len()
                )));
            }

            let records: Vec<StoredRecord> = batch
                .iter()
                .cloned()
                .zip(embeddings)
                .map(|(chunk, embedding)| StoredRecord { chunk, embedding })
                .collect();

            let stored = self.vector_store.upsert(&records).await?;
            written += stored;
            info!(batch = i + 1, batches, stored, "stored batch");
            on_event(IngestEvent::BatchStored {
                batch: i + 1,
                batches,
                records: stored,
            });
        }

        Ok(written)
    }
}
