use std::io::{BufRead, Write};
use std::sync::Arc;
use tracing::{error, warn};

use super::Console;
use crate::application::{IngestEvent, IngestService, RagService};
use crate::domain::{Answer, Document, DomainError};

pub const QUESTION_PROMPT: &str = "\nQuestion (or 'exit' to quit): ";
const RULE: &str = "================================================";

/// How the session gets vectors for the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupMode {
    /// Extract, chunk, embed and store the PDF.
    Embed,
    /// Trust the namespace already holds this PDF's vectors.
    Attach,
}

/// Result of one prompt/answer cycle; [`Session::run`] decides from it
/// whether to keep going.
#[derive(Debug)]
pub enum TurnOutcome {
    Answered(Answer),
    Failed(DomainError),
    Skipped,
    Exit,
}

pub fn is_exit_command(input: &str) -> bool {
    let input = input.trim();
    input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit")
}

pub struct Session<R, W> {
    console: Console<R, W>,
    rag: Arc<RagService>,
    ingest: Arc<IngestService>,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(console: Console<R, W>, rag: Arc<RagService>, ingest: Arc<IngestService>) -> Self {
        Self {
            console,
            rag,
            ingest,
        }
    }

    pub fn console(&self) -> &Console<R, W> {
        &self.console
    }

    /// Either embeds `document` into the namespace or attaches to what is
    /// already there. Errors here end the program.
    pub async fn initialize(
        &mut self,
        document: &Document,
        mode: StartupMode,
    ) -> Result<(), DomainError> {
        match mode {
            StartupMode::Embed => self.embed(document).await,
            StartupMode::Attach => self.attach().await,
        }
    }

    async fn embed(&mut self, document: &Document) -> Result<(), DomainError> {
        self.console
            .line(format!("Loading {} ...", document.path.display()))?;

        let console = &mut self.console;
        let mut write_failure = None;
        let result = self
            .ingest
            .ingest_with_progress(document, |event| {
                let line = match event {
                    IngestEvent::Loaded { pages } => format!("Loaded {pages} page(s)."),
                    IngestEvent::Chunked { chunks } => format!("Split into {chunks} chunk(s)."),
                    IngestEvent::BatchStored {
                        batch,
                        batches,
                        records,
                    } => format!("Stored batch {batch}/{batches} ({records} vectors)."),
                };
                if let Err(e) = console.line(line) {
                    write_failure.get_or_insert(e);
                }
            })
            .await;

        if let Some(e) = write_failure {
            return Err(e.into());
        }
        let report = result?;
        self.console.line(format!(
            "Embedded {} chunk(s) from {} page(s) into namespace '{}'.",
            report.records_written,
            report.pages,
            self.rag.namespace()
        ))?;
        Ok(())
    }

    async fn attach(&mut self) -> Result<(), DomainError> {
        let namespace = self.rag.namespace().to_string();
        let records = self.rag.indexed_records().await?;
        self.console.line(format!(
            "Using existing vectors in namespace '{namespace}' ({records} stored)."
        ))?;
        if records == 0 {
            warn!(namespace = %namespace, "namespace is empty");
            self.console.line(
                "Warning: the namespace is empty; answers will have no document context.",
            )?;
        }
        Ok(())
    }

    /// Question loop. Returns `Ok` when the operator exits; provider errors
    /// are reported and the loop continues.
    pub async fn run(&mut self) -> Result<(), DomainError> {
        self.console
            .line("Ready. Ask a question about the document.")?;

        loop {
            match self.turn().await {
                TurnOutcome::Exit => {
                    self.console.line("Goodbye.")?;
                    return Ok(());
                }
                TurnOutcome::Skipped => continue,
                TurnOutcome::Answered(answer) => self.print_answer(&answer)?,
                TurnOutcome::Failed(DomainError::Io(e)) => return Err(DomainError::Io(e)),
                TurnOutcome::Failed(err) => {
                    if err.is_provider_error() {
                        warn!(error = %err, "question failed");
                    } else {
                        error!(error = %err, "question failed");
                    }
                    self.console.line(format!("Error: {err}"))?;
                }
            }
        }
    }

    async fn turn(&mut self) -> TurnOutcome {
        let input = match self.console.prompt(QUESTION_PROMPT) {
            Ok(Some(input)) => input,
            Ok(None) => return TurnOutcome::Exit,
            Err(e) => return TurnOutcome::Failed(e.into()),
        };

        let question = input.trim();
        if is_exit_command(question) {
            return TurnOutcome::Exit;
        }
        if question.is_empty() {
            return TurnOutcome::Skipped;
        }

        match self.rag.answer(question).await {
            Ok(answer) => TurnOutcome::Answered(answer),
            Err(e) => TurnOutcome::Failed(e),
        }
    }

    fn print_answer(&mut self, answer: &Answer) -> Result<(), DomainError> {
        let c = &mut self.console;
        c.line(format!("\n{} ANSWER {}", &RULE[..20], &RULE[..20]))?;
        c.line(&answer.text)?;
        c.line(RULE)?;

        if !answer.sources.is_empty() {
            c.line("Sources:")?;
            for (i, source) in answer.sources.iter().enumerate() {
                let meta = &source.chunk.metadata;
                let origin = match (&meta.source, meta.page) {
                    (Some(name), Some(page)) => format!("{name} p.{page}"),
                    (Some(name), None) => name.clone(),
                    (None, Some(page)) => format!("p.{page}"),
                    (None, None) => "unknown".to_string(),
                };
                c.line(format!(
                    "  [{}] {} (score {:.3}): {}",
                    i + 1,
                    origin,
                    source.score,
                    snippet(&source.chunk.content, 80)
                ))?;
            }
        }
        Ok(())
    }
}

fn snippet(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let mut cut: String = flat.chars().take(max_chars).collect();
    cut.push('…');
    cut
}
