//! Provider fakes shared by unit tests.

use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::domain::ports::{DocumentLoader, EmbeddingService, LlmService, VectorStore};
use crate::domain::{DomainError, Embedding, Page, SearchResult, StoredRecord};
use crate::infrastructure::InMemoryVectorStore;

/// Letter-frequency vectors: texts sharing letters score as similar.
pub struct FakeEmbedding {
    fail: bool,
    embed_calls: AtomicUsize,
    batch_calls: AtomicUsize,
}

impl FakeEmbedding {
    pub const DIMENSION: usize = 26;

    pub fn new() -> Self {
        Self {
            fail: false,
            embed_calls: AtomicUsize::new(0),
            batch_calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn vector_for(text: &str) -> Embedding {
        let mut counts = vec![0.0_f32; Self::DIMENSION];
        for c in text.chars().filter(char::is_ascii_alphabetic) {
            counts[(c.to_ascii_lowercase() as u8 - b'a') as usize] += 1.0;
        }
        Embedding::new(counts)
    }

    pub fn embed_calls(&self) -> usize {
        self.embed_calls.load(Ordering::SeqCst)
    }

    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingService for FakeEmbedding {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
        self.embed_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(DomainError::external("embedding provider unavailable"));
        }
        Ok(Self::vector_for(text))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(DomainError::external("embedding provider unavailable"));
        }
        Ok(texts.iter().map(|t| Self::vector_for(t)).collect())
    }

    fn dimension(&self) -> usize {
        Self::DIMENSION
    }
}

/// Replies with canned text (or fails) and records every request.
pub struct FakeLlm {
    replies: Mutex<Vec<Result<String, String>>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl FakeLlm {
    pub fn replying(text: &str) -> Self {
        Self::scripted(vec![Ok(text.to_string())])
    }

    pub fn failing() -> Self {
        Self::scripted(vec![Err("completion provider unavailable".to_string())])
    }

    /// Plays `replies` in order; the last one repeats once the script runs out.
    pub fn scripted(replies: Vec<Result<String, String>>) -> Self {
        Self {
            replies: Mutex::new(replies),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    fn next_reply(&self) -> Result<String, DomainError> {
        let mut replies = self.replies.lock().unwrap();
        let reply = if replies.len() > 1 {
            replies.remove(0)
        } else {
            replies
                .first()
                .cloned()
                .unwrap_or_else(|| Ok(String::new()))
        };
        reply.map_err(DomainError::external)
    }
}

#[async_trait]
impl LlmService for FakeLlm {
    async fn complete_with_system(
        &self,
        system: &str,
        prompt: &str,
    ) -> Result<String, DomainError> {
        self.calls
            .lock()
            .unwrap()
            .push((system.to_string(), prompt.to_string()));
        self.next_reply()
    }

    fn model(&self) -> &str {
        "fake-model"
    }
}

/// Wraps the in-memory store, recording requests and optionally failing
/// upserts after a number of successful ones.
pub struct SpyVectorStore {
    inner: InMemoryVectorStore,
    last_top_k: Mutex<Option<usize>>,
    upsert_calls: AtomicUsize,
    fail_after_upserts: Option<usize>,
}

impl SpyVectorStore {
    pub fn new(inner: InMemoryVectorStore) -> Self {
        Self {
            inner,
            last_top_k: Mutex::new(None),
            upsert_calls: AtomicUsize::new(0),
            fail_after_upserts: None,
        }
    }

    pub fn failing_after_upserts(mut self, successes: usize) -> Self {
        self.fail_after_upserts = Some(successes);
        self
    }

    pub fn last_top_k(&self) -> Option<usize> {
        *self.last_top_k.lock().unwrap()
    }

    pub fn upsert_calls(&self) -> usize {
        self.upsert_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VectorStore for SpyVectorStore {
    async fn upsert(&self, records: &[StoredRecord]) -> Result<usize, DomainError> {
        let previous = self.upsert_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_after_upserts.is_some_and(|limit| previous >= limit) {
            return Err(DomainError::external("vector store rejected upsert"));
        }
        self.inner.upsert(records).await
    }

    async fn search(
        &self,
        query: &Embedding,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, DomainError> {
        *self.last_top_k.lock().unwrap() = Some(top_k);
        self.inner.search(query, top_k).await
    }

    async fn count(&self) -> Result<usize, DomainError> {
        self.inner.count().await
    }

    fn namespace(&self) -> &str {
        self.inner.namespace()
    }
}

/// Serves fixed pages regardless of path, or reports the document missing.
pub struct FakeLoader {
    pages: Option<Vec<Page>>,
}

impl FakeLoader {
    pub fn new(pages: Vec<Page>) -> Self {
        Self { pages: Some(pages) }
    }

    pub fn missing() -> Self {
        Self { pages: None }
    }
}

#[async_trait]
impl DocumentLoader for FakeLoader {
    async fn load(&self, path: &Path) -> Result<Vec<Page>, DomainError> {
        self.pages
            .clone()
            .ok_or_else(|| DomainError::not_found(path.display().to_string()))
    }
}
