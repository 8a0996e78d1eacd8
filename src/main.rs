use clap::Parser;
use std::io;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pdf_rag::application::{IngestService, RagService};
use pdf_rag::cli::{choose_mode, open_document, resolve_pdf_path, Args, Console, Session};
use pdf_rag::domain::ports::EmbeddingService;
use pdf_rag::infrastructure::{
    AppConfig, OpenAiEmbedding, OpenAiLlm, PdfLoader, PineconeVectorStore,
};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pdf_rag=info".into());

    // stdout carries the session transcript, so logs go to stderr.
    let json = std::env::var("PDF_RAG_LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    let (json_layer, text_layer) = if json {
        (
            Some(tracing_subscriber::fmt::layer().json().with_writer(io::stderr)),
            None,
        )
    } else {
        (
            None,
            Some(tracing_subscriber::fmt::layer().with_writer(io::stderr)),
        )
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    info!(
        index = %config.credentials.pinecone_index_name,
        namespace = %config.config.pinecone.namespace,
        "configuration loaded"
    );

    let mut console = Console::new(io::stdin().lock(), io::stdout());
    let (path, source) = resolve_pdf_path(&args, &mut console)?;
    info!(?source, "pdf path resolved");
    let document = open_document(path)?;

    let mode = choose_mode(&args, &mut console)?;

    console.line(format!(
        "Connecting to Pinecone index '{}' ...",
        config.credentials.pinecone_index_name
    ))?;
    let vector_store = Arc::new(PineconeVectorStore::connect(&config).await?);
    console.line("Connected.")?;

    let embedding = Arc::new(OpenAiEmbedding::from_config(&config)?);
    info!(
        model = %config.config.embedding.model,
        dimension = embedding.dimension(),
        "embedding provider ready"
    );
    let llm = Arc::new(OpenAiLlm::from_config(&config)?);
    let rag = Arc::new(RagService::new(
        embedding.clone(),
        vector_store.clone(),
        llm,
        config.prompts.system.clone(),
    ));
    let ingest = Arc::new(IngestService::new(
        Arc::new(PdfLoader::new()),
        embedding,
        vector_store,
        config.config.embedding.batch_size,
    ));

    let mut session = Session::new(console, rag, ingest);
    session.initialize(&document, mode).await?;
    session.run().await?;

    Ok(())
}
