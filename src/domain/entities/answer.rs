use serde::{Deserialize, Serialize};

use super::SearchResult;

/// Generated text together with the chunks it was conditioned on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    pub sources: Vec<SearchResult>,
}

impl Answer {
    pub fn new(text: impl Into<String>, sources: Vec<SearchResult>) -> Self {
        Self {
            text: text.into(),
            sources,
        }
    }
}
