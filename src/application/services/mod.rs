mod ingest;
mod rag;

pub use ingest::{IngestEvent, IngestReport, IngestService};
pub use rag::{RagService, TOP_K};
