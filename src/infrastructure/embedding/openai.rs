use async_trait::async_trait;
use rig::client::EmbeddingsClient;
use rig::embeddings::EmbeddingsBuilder;
use rig::providers::openai;
use std::collections::HashMap;
use tracing::debug;

use crate::domain::{ports::EmbeddingService, DomainError, Embedding};
use crate::infrastructure::config::AppConfig;

/// OpenAI embeddings through rig, keyed from [`AppConfig`] credentials.
pub struct OpenAiEmbedding {
    client: openai::Client,
    model: String,
    dimension: usize,
}

impl OpenAiEmbedding {
    pub fn from_config(config: &AppConfig) -> Result<Self, DomainError> {
        let client = openai::Client::new(config.credentials.openai_api_key.as_str())
            .map_err(|e| DomainError::configuration(format!("openai client: {e}")))?;
        Ok(Self {
            client,
            model: config.config.embedding.model.clone(),
            dimension: config.config.embedding.dimension,
        })
    }

    fn check_dimension(&self, embedding: &Embedding) -> Result<(), DomainError> {
        if embedding.dimension() != self.dimension {
            return Err(DomainError::external(format!(
                "{} returned {}-dimensional vectors, expected {}",
                self.model,
                embedding.dimension(),
                self.dimension
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl EmbeddingService for OpenAiEmbedding {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
        self.embed_batch(&[text])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::internal("No embedding returned"))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let model = self.client.embedding_model(&self.model);
        let mut builder = EmbeddingsBuilder::new(model);
        for text in texts {
            builder = builder
                .document(text.to_string())
                .map_err(|e| DomainError::external(e.to_string()))?;
        }

        debug!(model = %self.model, inputs = texts.len(), "requesting embeddings");
        let embedded = builder
            .build()
            .await
            .map_err(|e| DomainError::external(e.to_string()))?;

        // rig batches requests internally, so match vectors back to inputs by text.
        let by_text: HashMap<String, Embedding> = embedded
            .into_iter()
            .map(|(doc, emb)| (doc, Embedding::from_f64(emb.first().vec)))
            .collect();

        texts
            .iter()
            .map(|text| {
                let embedding = by_text.get(*text).cloned().ok_or_else(|| {
                    DomainError::internal("embedding provider skipped an input")
                })?;
                self.check_dimension(&embedding)?;
                Ok(embedding)
            })
            .collect()
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
