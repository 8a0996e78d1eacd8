use serde::Deserialize;
use std::fmt;
use std::path::Path;

use crate::domain::DomainError;

pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const PINECONE_API_KEY: &str = "PINECONE_API_KEY";
pub const PINECONE_INDEX_NAME: &str = "PINECONE_INDEX_NAME";
pub const PINECONE_ENVIRONMENT: &str = "PINECONE_ENVIRONMENT";
/// Optional path to a YAML file overriding [`Config`] defaults.
pub const CONFIG_PATH_VAR: &str = "PDF_RAG_CONFIG";

const REQUIRED_SETTINGS: [&str; 4] = [
    OPENAI_API_KEY,
    PINECONE_API_KEY,
    PINECONE_INDEX_NAME,
    PINECONE_ENVIRONMENT,
];

/// Everything the program needs from its environment, resolved once at
/// startup and handed to each component by reference.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub credentials: Credentials,
    pub config: Config,
    pub prompts: PromptsConfig,
}

#[derive(Clone)]
pub struct Credentials {
    pub openai_api_key: String,
    pub pinecone_api_key: String,
    pub pinecone_index_name: String,
    pub pinecone_environment: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("openai_api_key", &"<redacted>")
            .field("pinecone_api_key", &"<redacted>")
            .field("pinecone_index_name", &self.pinecone_index_name)
            .field("pinecone_environment", &self.pinecone_environment)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub embedding: EmbeddingConfig,
    pub pinecone: PineconeConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub model: String,
    pub dimension: usize,
    /// Chunks embedded and upserted per provider round trip.
    pub batch_size: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "text-embedding-ada-002".to_string(),
            dimension: 1536,
            batch_size: 100,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PineconeConfig {
    pub namespace: String,
    /// Overrides `https://controller.{environment}.pinecone.io`.
    pub controller_url: Option<String>,
}

impl Default for PineconeConfig {
    fn default() -> Self {
        Self {
            namespace: "pdf-rag".to_string(),
            controller_url: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    pub system: String,
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            system: "You answer questions about a PDF document using only the excerpts \
                     provided. If the excerpts do not contain the answer, say that you \
                     don't know instead of making one up."
                .to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    #[serde(flatten)]
    config: Config,
    prompts: PromptsConfig,
}

impl AppConfig {
    /// Builds the configuration from the process environment.
    pub fn from_env() -> Result<Self, DomainError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Blank values
    /// count as missing; every missing setting is reported at once.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DomainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let missing: Vec<&str> = REQUIRED_SETTINGS
            .iter()
            .copied()
            .filter(|key| get(*key).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(DomainError::configuration(format!(
                "missing required settings: {}",
                missing.join(", ")
            )));
        }

        let credentials = Credentials {
            openai_api_key: get(OPENAI_API_KEY).unwrap_or_default(),
            pinecone_api_key: get(PINECONE_API_KEY).unwrap_or_default(),
            pinecone_index_name: get(PINECONE_INDEX_NAME).unwrap_or_default(),
            pinecone_environment: get(PINECONE_ENVIRONMENT).unwrap_or_default(),
        };

        let file = match get(CONFIG_PATH_VAR) {
            Some(path) => load_file(Path::new(&path))?,
            None => FileConfig::default(),
        };

        let app = Self {
            credentials,
            config: file.config,
            prompts: file.prompts,
        };
        app.validate()?;
        Ok(app)
    }

    fn validate(&self) -> Result<(), DomainError> {
        if self.config.pinecone.namespace.trim().is_empty() {
            return Err(DomainError::configuration("pinecone.namespace must not be empty"));
        }
        if self.config.embedding.batch_size == 0 {
            return Err(DomainError::configuration(
                "embedding.batch_size must be positive",
            ));
        }
        Ok(())
    }

    pub fn pinecone_controller_url(&self) -> String {
        self.config.pinecone.controller_url.clone().unwrap_or_else(|| {
            format!(
                "https://controller.{}.pinecone.io",
                self.credentials.pinecone_environment
            )
        })
    }
}

fn load_file(path: &Path) -> Result<FileConfig, DomainError> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        DomainError::configuration(format!("cannot read {}: {e}", path.display()))
    })?;
    serde_yaml::from_str(&raw).map_err(|e| {
        DomainError::configuration(format!("invalid config file {}: {e}", path.display()))
    })
}
