//! Ask questions about a PDF through retrieval-augmented generation.
//!
//! The `domain` layer holds entities, the chunker and the provider ports;
//! `infrastructure` implements those ports against OpenAI, Pinecone and
//! `pdf-extract`; `application` orchestrates embedding runs and answers;
//! `cli` drives the interactive session.

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;

#[cfg(test)]
mod testing;
