pub mod config;
pub mod embedding;
pub mod llm;
pub mod loader;
pub mod vector_store;

pub use config::{AppConfig, Config, Credentials, PromptsConfig};
pub use embedding::OpenAiEmbedding;
pub use llm::OpenAiLlm;
pub use loader::PdfLoader;
#[cfg(test)]
pub use vector_store::InMemoryVectorStore;
pub use vector_store::PineconeVectorStore;
