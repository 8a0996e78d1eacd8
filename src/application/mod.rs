//! Application layer - Use cases and orchestration.
//!
//! Services here drive the embed-and-store run and the question/answer cycle.
//! They depend on domain ports (traits) rather than concrete providers.

pub mod services;

pub use services::{IngestEvent, IngestReport, IngestService, RagService, TOP_K};
