use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::domain::{ports::DocumentLoader, DomainError, Page};

/// Extracts per-page text with `pdf-extract` on the blocking pool.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfLoader;

impl PdfLoader {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DocumentLoader for PdfLoader {
    async fn load(&self, path: &Path) -> Result<Vec<Page>, DomainError> {
        if !path.is_file() {
            return Err(DomainError::not_found(path.display().to_string()));
        }

        let owned: PathBuf = path.to_path_buf();
        let texts = tokio::task::spawn_blocking(move || pdf_extract::extract_text_by_pages(&owned))
            .await
            .map_err(|e| {
                // pdf-extract panics on some malformed files
                DomainError::extraction(format!("{}: extraction aborted: {e}", path.display()))
            })?
            .map_err(|e| DomainError::extraction(format!("{}: {e}", path.display())))?;

        debug!(path = %path.display(), pages = texts.len(), "extracted pdf text");
        Ok(pages_from_texts(texts))
    }
}

fn pages_from_texts(texts: Vec<String>) -> Vec<Page> {
    texts
        .into_iter()
        .enumerate()
        .map(|(i, text)| Page::new(i + 1, text))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_load_missing_file_is_not_found() {
        let result = PdfLoader::new()
            .load(Path::new("/definitely/not/here.pdf"))
            .await;
        assert!(matches!(result, Err(DomainError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_load_garbage_is_extraction_error() {
        let mut file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        file.write_all(b"this is not a pdf").unwrap();

        let result = PdfLoader::new().load(file.path()).await;
        assert!(matches!(result, Err(DomainError::Extraction(_))));
    }

    #[tokio::test]
    async fn test_load_multi_page_pdf_in_order() {
        let fixture = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/three_pages.pdf");

        let pages = PdfLoader::new().load(&fixture).await.unwrap();

        assert_eq!(pages.len(), 3);
        for (i, word) in ["Alpha", "Bravo", "Charlie"].iter().enumerate() {
            assert_eq!(pages[i].number, i + 1);
            assert!(
                pages[i].text.contains(word),
                "page {} text was {:?}",
                i + 1,
                pages[i].text
            );
        }
    }

    #[test]
    fn test_pages_keep_order_and_count() {
        let texts = vec!["first".to_string(), String::new(), "third".to_string()];
        let pages = pages_from_texts(texts);

        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0], Page::new(1, "first"));
        assert_eq!(pages[1], Page::new(2, ""));
        assert_eq!(pages[2], Page::new(3, "third"));
    }
}
