use clap::Parser;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::debug;

use super::Console;
use crate::domain::{Document, DomainError};

#[derive(Parser, Debug, Default)]
#[command(
    name = "pdf-rag",
    version,
    about = "Embed a PDF into a Pinecone index and ask questions about it"
)]
pub struct Args {
    /// Path to the PDF file
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Reuse vectors already stored in the index instead of embedding the PDF
    #[arg(short = 's', long)]
    pub skip_embedding: bool,

    /// PDF path, used when --file is not given
    #[arg(value_name = "PDF")]
    pub path: Option<PathBuf>,
}

/// Where the PDF path came from, in lookup priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSource {
    Flag,
    Positional,
    Prompt,
}

impl PathSource {
    pub const CHAIN: [PathSource; 3] = [Self::Flag, Self::Positional, Self::Prompt];

    fn lookup<R: BufRead, W: Write>(
        self,
        args: &Args,
        console: &mut Console<R, W>,
    ) -> std::io::Result<Option<PathBuf>> {
        match self {
            Self::Flag => Ok(args.file.clone()),
            Self::Positional => Ok(args.path.clone()),
            Self::Prompt => Ok(console
                .prompt("Enter the path to the PDF file: ")?
                .map(|answer| answer.trim().to_string())
                .filter(|answer| !answer.is_empty())
                .map(PathBuf::from)),
        }
    }
}

/// Walks [`PathSource::CHAIN`] and returns the first path found.
pub fn resolve_pdf_path<R: BufRead, W: Write>(
    args: &Args,
    console: &mut Console<R, W>,
) -> Result<(PathBuf, PathSource), DomainError> {
    for source in PathSource::CHAIN {
        if let Some(path) = source.lookup(args, console)? {
            debug!(?source, path = %path.display(), "resolved pdf path");
            return Ok((path, source));
        }
    }
    Err(DomainError::validation("no PDF file path given"))
}

/// Fails with `NotFound` unless `path` names an existing file.
pub fn open_document(path: PathBuf) -> Result<Document, DomainError> {
    if !path.is_file() {
        return Err(DomainError::not_found(format!(
            "PDF file does not exist: {}",
            path.display()
        )));
    }
    Ok(Document::new(path))
}
