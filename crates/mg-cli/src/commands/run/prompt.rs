//! Operator prompt protocol for interactive runs.

use std::io::{self, BufRead, Write};

/// Question asked before each pending script
pub(crate) const SCRIPT_PROMPT: &str =
    "run script? (Y)es, (n)o, (q)uit, (d)isplay, (f)ake (no db change): ";

/// Question asked after a script failed
pub(crate) const CONTINUE_PROMPT: &str = "\ncontinue to next script? y/N: ";

/// Operator reply to [`SCRIPT_PROMPT`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Decision {
    /// Apply the script (also the reply to an empty line)
    Apply,
    /// Skip this script
    Skip,
    /// End the run
    Quit,
    /// Apply in dry-run mode
    Fake,
    /// Show the script, then ask again
    Display,
    /// Unrecognised reply, ask again
    Unknown,
}

impl Decision {
    /// Only the first character counts, case-insensitively.
    pub(crate) fn parse(reply: &str) -> Self {
        match first_char(reply) {
            None | Some('Y') => Decision::Apply,
            Some('N') => Decision::Skip,
            Some('Q') => Decision::Quit,
            Some('F') => Decision::Fake,
            Some('D') => Decision::Display,
            Some(_) => Decision::Unknown,
        }
    }
}

/// Whether a reply to [`CONTINUE_PROMPT`] means yes. The default is no.
pub(crate) fn is_yes(reply: &str) -> bool {
    first_char(reply) == Some('Y')
}

fn first_char(reply: &str) -> Option<char> {
    reply
        .trim_end_matches(['\r', '\n'])
        .chars()
        .next()
        .map(|c| c.to_ascii_uppercase())
}

/// The person answering prompts during an interactive run
pub(crate) trait Operator {
    /// Show `prompt` and read one reply line.
    ///
    /// End of input is an error of kind [`io::ErrorKind::UnexpectedEof`].
    fn ask(&mut self, prompt: &str) -> io::Result<String>;

    /// Show a script's full text
    fn show(&mut self, content: &str) -> io::Result<()>;
}

/// [`Operator`] over a reader, a prompt writer, and a display writer
pub(crate) struct Terminal<R, W, E> {
    input: R,
    pub(crate) output: W,
    pub(crate) display: E,
}

impl<R: BufRead, W: Write, E: Write> Terminal<R, W, E> {
    pub(crate) fn new(input: R, output: W, display: E) -> Self {
        Self {
            input,
            output,
            display,
        }
    }
}

impl<R: BufRead, W: Write, E: Write> Operator for Terminal<R, W, E> {
    fn ask(&mut self, prompt: &str) -> io::Result<String> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "operator input closed",
            ));
        }
        Ok(line)
    }

    fn show(&mut self, content: &str) -> io::Result<()> {
        writeln!(self.display, "{}", content)?;
        self.display.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_decision_parse() {
        assert_eq!(Decision::parse("\n"), Decision::Apply);
        assert_eq!(Decision::parse(""), Decision::Apply);
        assert_eq!(Decision::parse("y\n"), Decision::Apply);
        assert_eq!(Decision::parse("Yes please\n"), Decision::Apply);
        assert_eq!(Decision::parse("n\r\n"), Decision::Skip);
        assert_eq!(Decision::parse("Q"), Decision::Quit);
        assert_eq!(Decision::parse("fake\n"), Decision::Fake);
        assert_eq!(Decision::parse("d\n"), Decision::Display);
        assert_eq!(Decision::parse("x\n"), Decision::Unknown);
        assert_eq!(Decision::parse(" y\n"), Decision::Unknown);
    }

    #[test]
    fn test_continue_defaults_to_no() {
        assert!(is_yes("y\n"));
        assert!(is_yes("YES"));
        assert!(!is_yes("\n"));
        assert!(!is_yes("n\n"));
        assert!(!is_yes("maybe"));
    }

    #[test]
    fn test_terminal_reads_lines_then_eof() {
        let mut term = Terminal::new(Cursor::new("n\n\n"), Vec::new(), Vec::new());
        assert_eq!(term.ask("? ").unwrap(), "n\n");
        assert_eq!(term.ask("? ").unwrap(), "\n");
        let err = term.ask("? ").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        assert_eq!(String::from_utf8(term.output).unwrap(), "? ? ? ");
    }

    #[test]
    fn test_terminal_show_writes_display() {
        let mut term = Terminal::new(Cursor::new(""), Vec::new(), Vec::new());
        term.show("SELECT 1;").unwrap();
        assert_eq!(String::from_utf8(term.display).unwrap(), "SELECT 1;\n");
        assert!(term.output.is_empty());
    }
}
