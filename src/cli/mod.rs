//! Interactive session: argument parsing, prompts and the question loop.

mod args;
mod console;
mod session;

pub use args::{open_document, resolve_pdf_path, Args, PathSource};
pub use console::Console;
pub use session::{is_exit_command, Session, StartupMode, TurnOutcome, QUESTION_PROMPT};

use std::io::{BufRead, Write};

/// `--skip-embedding` attaches straight away; otherwise the operator is
/// asked. End of input counts as "no" so nothing is written to the index.
pub fn choose_mode<R: BufRead, W: Write>(
    args: &Args,
    console: &mut Console<R, W>,
) -> std::io::Result<StartupMode> {
    if args.skip_embedding {
        return Ok(StartupMode::Attach);
    }
    Ok(match console.confirm("Process and embed the PDF?")? {
        Some(true) => StartupMode::Embed,
        Some(false) | None => StartupMode::Attach,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn console(input: &str) -> Console<Cursor<Vec<u8>>, Vec<u8>> {
        Console::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_skip_flag_never_prompts() {
        let args = Args {
            skip_embedding: true,
            ..Args::default()
        };
        let mut c = console("y\n");
        assert_eq!(choose_mode(&args, &mut c).unwrap(), StartupMode::Attach);
        assert!(c.output().is_empty());
    }

    #[test]
    fn test_prompted_mode() {
        let args = Args::default();
        assert_eq!(choose_mode(&args, &mut console("y\n")).unwrap(), StartupMode::Embed);
        assert_eq!(choose_mode(&args, &mut console("no\n")).unwrap(), StartupMode::Attach);
        assert_eq!(choose_mode(&args, &mut console("")).unwrap(), StartupMode::Attach);
    }
}
