use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::{
    ports::VectorStore, ChunkMetadata, DocumentChunk, DomainError, Embedding, SearchResult,
    StoredRecord,
};
use crate::infrastructure::config::AppConfig;

/// Pinecone index accessed over its REST API, scoped to one namespace.
pub struct PineconeVectorStore {
    client: Client,
    host: String,
    namespace: String,
}

impl PineconeVectorStore {
    /// Resolves the index host through the environment's controller and
    /// fails unless the index reports itself ready.
    pub async fn connect(config: &AppConfig) -> Result<Self, DomainError> {
        let client = build_client(&config.credentials.pinecone_api_key)?;
        let index = &config.credentials.pinecone_index_name;
        let url = format!(
            "{}/databases/{}",
            config.pinecone_controller_url().trim_end_matches('/'),
            index
        );

        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| DomainError::external(format!("failed to reach Pinecone: {e}")))?;
        let description: IndexDescription = parse(response, "describe index").await?;

        if !description.status.ready {
            return Err(DomainError::external(format!(
                "Pinecone index '{index}' is not ready"
            )));
        }

        let host = normalize_host(&description.status.host);
        info!(index = %index, host = %host, "connected to Pinecone");
        Ok(Self {
            client,
            host,
            namespace: config.config.pinecone.namespace.clone(),
        })
    }

    /// Talks to an already-known index host, skipping controller lookup.
    pub fn with_host(
        api_key: &str,
        host: &str,
        namespace: impl Into<String>,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            client: build_client(api_key)?,
            host: normalize_host(host),
            namespace: namespace.into(),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    async fn post<B, T>(&self, path: &str, body: &B, what: &str) -> Result<T, DomainError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(format!("{}{}", self.host, path))
            .json(body)
            .send()
            .await
            .map_err(|e| DomainError::external(format!("Pinecone {what} failed: {e}")))?;
        parse(response, what).await
    }
}

fn build_client(api_key: &str) -> Result<Client, DomainError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        "api-key",
        HeaderValue::from_str(api_key.trim())
            .map_err(|_| DomainError::configuration("invalid Pinecone API key"))?,
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Client::builder()
        .default_headers(headers)
        .build()
        .map_err(|e| DomainError::internal(format!("failed to build Pinecone HTTP client: {e}")))
}

fn normalize_host(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{host}")
    }
}

async fn parse<T: DeserializeOwned>(
    response: reqwest::Response,
    what: &str,
) -> Result<T, DomainError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<body unavailable>".to_string());
        return Err(DomainError::external(format!(
            "Pinecone {what} returned {status}: {body}"
        )));
    }
    response
        .json()
        .await
        .map_err(|e| DomainError::external(format!("failed to parse Pinecone {what}: {e}")))
}

fn record_metadata(chunk: &DocumentChunk, ingested_at: &str) -> Value {
    let mut metadata = json!({
        "text": chunk.content,
        "chunk_index": chunk.chunk_index,
        "ingested_at": ingested_at,
    });
    if let Some(source) = &chunk.metadata.source {
        metadata["source"] = json!(source);
    }
    if let Some(page) = chunk.metadata.page {
        metadata["page"] = json!(page);
    }
    metadata
}

fn chunk_from_match(m: QueryMatch) -> Option<SearchResult> {
    let metadata = m.metadata?;
    let content = metadata.get("text")?.as_str()?.to_string();
    let chunk_index = metadata
        .get("chunk_index")
        .and_then(Value::as_u64)
        .unwrap_or_default() as usize;

    Some(SearchResult {
        chunk: DocumentChunk {
            id: m.id.parse().unwrap_or_else(|_| Uuid::nil()),
            content,
            chunk_index,
            metadata: ChunkMetadata {
                source: metadata
                    .get("source")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                page: metadata
                    .get("page")
                    .and_then(Value::as_u64)
                    .map(|p| p as usize),
            },
        },
        score: m.score,
    })
}

#[async_trait]
impl VectorStore for PineconeVectorStore {
    async fn upsert(&self, records: &[StoredRecord]) -> Result<usize, DomainError> {
        if records.is_empty() {
            return Ok(0);
        }

        let ingested_at = Utc::now().to_rfc3339();
        let vectors: Vec<UpsertVector> = records
            .iter()
            .map(|r| UpsertVector {
                id: r.chunk.id.to_string(),
                values: r.embedding.as_slice(),
                metadata: record_metadata(&r.chunk, &ingested_at),
            })
            .collect();

        let response: UpsertResponse = self
            .post(
                "/vectors/upsert",
                &UpsertRequest {
                    vectors,
                    namespace: &self.namespace,
                },
                "upsert",
            )
            .await?;

        debug!(namespace = %self.namespace, upserted = response.upserted_count, "upserted vectors");
        Ok(response.upserted_count)
    }

    async fn search(
        &self,
        query: &Embedding,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, DomainError> {
        let response: QueryResponse = self
            .post(
                "/query",
                &QueryRequest {
                    vector: query.as_slice(),
                    top_k,
                    include_metadata: true,
                    namespace: &self.namespace,
                },
                "query",
            )
            .await?;

        Ok(response
            .matches
            .into_iter()
            .filter_map(chunk_from_match)
            .collect())
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let stats: IndexStats = self
            .post("/describe_index_stats", &json!({}), "describe index stats")
            .await?;
        Ok(stats
            .namespaces
            .get(&self.namespace)
            .map(|ns| ns.vector_count)
            .unwrap_or(0))
    }

    fn namespace(&self) -> &str {
        &self.namespace
    }
}

#[derive(Debug, Deserialize)]
struct IndexDescription {
    status: IndexStatus,
}

#[derive(Debug, Deserialize)]
struct IndexStatus {
    #[serde(default)]
    ready: bool,
    host: String,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    vectors: Vec<UpsertVector<'a>>,
    namespace: &'a str,
}

#[derive(Serialize)]
struct UpsertVector<'a> {
    id: String,
    values: &'a [f32],
    metadata: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertResponse {
    #[serde(default)]
    upserted_count: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    namespace: &'a str,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Debug, Deserialize)]
struct QueryMatch {
    id: String,
    #[serde(default)]
    score: f32,
    metadata: Option<serde_json::Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct IndexStats {
    #[serde(default)]
    namespaces: HashMap<String, NamespaceStats>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NamespaceStats {
    #[serde(default)]
    vector_count: usize,
}
