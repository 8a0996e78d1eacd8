use std::sync::Arc;
use tracing::instrument;

use crate::domain::{
    ports::{EmbeddingService, LlmService, VectorStore},
    Answer, DomainError, SearchResult,
};

/// Number of stored chunks handed to the model per question.
pub const TOP_K: usize = 4;

pub struct RagService {
    embedding: Arc<dyn EmbeddingService>,
    vector_store: Arc<dyn VectorStore>,
    llm: Arc<dyn LlmService>,
    system_prompt: String,
}

impl RagService {
    pub fn new(
        embedding: Arc<dyn EmbeddingService>,
        vector_store: Arc<dyn VectorStore>,
        llm: Arc<dyn LlmService>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            embedding,
            vector_store,
            llm,
            system_prompt: system_prompt.into(),
        }
    }

    #[instrument(skip(self))]
    pub async fn retrieve(&self, query: &str) -> Result<Vec<SearchResult>, DomainError> {
        let embedding = self.embedding.embed(query).await?;
        self.vector_store.search(&embedding, TOP_K).await
    }

    #[instrument(skip(self), fields(model = self.llm.model()))]
    pub async fn answer(&self, question: &str) -> Result<Answer, DomainError> {
        let sources = self.retrieve(question).await?;
        tracing::debug!(sources = sources.len(), "retrieved context");

        let prompt = build_prompt(question, &sources);
        let text = self
            .llm
            .complete_with_system(&self.system_prompt, &prompt)
            .await?;

        Ok(Answer::new(text.trim(), sources))
    }

    /// Records currently stored in the namespace this service reads from.
    #[instrument(skip(self), fields(namespace = self.vector_store.namespace()))]
    pub async fn indexed_records(&self) -> Result<usize, DomainError> {
        self.vector_store.count().await
    }

    pub fn namespace(&self) -> &str {
        self.vector_store.namespace()
    }
}

fn build_prompt(question: &str, sources: &[SearchResult]) -> String {
    let context = sources
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let origin = match (&r.chunk.metadata.source, r.chunk.metadata.page) {
                (Some(source), Some(page)) => format!(" ({source}, page {page})"),
                (Some(source), None) => format!(" ({source})"),
                (None, Some(page)) => format!(" (page {page})"),
                (None, None) => String::new(),
            };
            format!("[{}]{}\n{}", i + 1, origin, r.chunk.content.trim())
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Use the following excerpts to answer the question at the end.\n\n\
         Excerpts:\n{context}\n\nQuestion: {question}\nAnswer:"
    )
}
