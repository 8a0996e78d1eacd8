mod answer;
mod document;
mod embedding;

pub use answer::Answer;
pub use document::{
    chunk_pages, split_text, ChunkMetadata, Document, DocumentChunk, Page, SearchResult,
    StoredRecord, CHUNK_OVERLAP, CHUNK_SIZE,
};
pub use embedding::Embedding;
