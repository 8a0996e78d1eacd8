use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::Embedding;
use crate::domain::errors::{DomainError, Result};

pub const CHUNK_SIZE: usize = 1000;
pub const CHUNK_OVERLAP: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub path: PathBuf,
    pub name: String,
}

impl Document {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Text extracted from one PDF page. `number` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub number: usize,
    pub text: String,
}

impl Page {
    pub fn new(number: usize, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub id: Uuid,
    pub content: String,
    pub chunk_index: usize,
    pub metadata: ChunkMetadata,
}

impl DocumentChunk {
    pub fn new(content: impl Into<String>, chunk_index: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            chunk_index,
            metadata: ChunkMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: ChunkMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub source: Option<String>,
    pub page: Option<usize>,
}

/// A chunk paired with its vector, as written to the vector store.
#[derive(Debug, Clone)]
pub struct StoredRecord {
    pub chunk: DocumentChunk,
    pub embedding: Embedding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub chunk: DocumentChunk,
    pub score: f32,
}

/// Splits `text` into fixed-width windows of `chunk_size` characters.
///
/// Consecutive windows share `overlap` characters; each window starts
/// `chunk_size - overlap` characters after the previous one and the final
/// window may be shorter. Widths count `char`s, so multi-byte text is never
/// split inside a code point. Empty text yields no windows.
pub fn split_text(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<String>> {
    if chunk_size == 0 {
        return Err(DomainError::validation("chunk size must be positive"));
    }
    if overlap >= chunk_size {
        return Err(DomainError::validation(format!(
            "chunk overlap ({overlap}) must be smaller than chunk size ({chunk_size})"
        )));
    }

    let boundaries: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let char_count = boundaries.len() - 1;
    let step = chunk_size - overlap;

    let mut windows = Vec::new();
    let mut start = 0;
    while start < char_count {
        let end = (start + chunk_size).min(char_count);
        windows.push(text[boundaries[start]..boundaries[end]].to_string());
        if end == char_count {
            break;
        }
        start += step;
    }

    Ok(windows)
}

/// Chunks every page of a document, numbering chunks across the whole
/// document and tagging each with its page and source name.
pub fn chunk_pages(
    pages: &[Page],
    source: &str,
    chunk_size: usize,
    overlap: usize,
) -> Result<Vec<DocumentChunk>> {
    let mut chunks = Vec::new();

    for page in pages {
        for window in split_text(&page.text, chunk_size, overlap)? {
            let metadata = ChunkMetadata {
                source: Some(source.to_string()),
                page: Some(page.number),
            };
            chunks.push(DocumentChunk::new(window, chunks.len()).with_metadata(metadata));
        }
    }

    Ok(chunks)
}
