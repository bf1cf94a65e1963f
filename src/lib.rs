pub mod environment;
pub mod error;
pub mod expr;
pub mod interpreter;
pub mod logger;
pub mod parser;
pub mod printer;
pub mod scanner;
pub mod stmt;
pub mod token;
pub mod value;

use std::io::Write;

use log::trace;
use thiserror::Error;

use crate::{
    interpreter::Interpreter,
    parser::Parser,
    scanner::Scanner,
};

/// Exit code for input/output failures (sysexits `EX_IOERR`).
pub const EX_IOERR: i32 = 74;

/// The first failure of a run, tagged with the stage that produced it.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("syntax error occurred: {0}")]
    Syntax(error::Error),
    #[error("parsing error occurred: {0}")]
    Parse(error::Error),
    #[error("{0}")]
    Runtime(error::Error),
}

impl RunError {
    /// Conventional sysexits code for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunError::Syntax(_) | RunError::Parse(_) => 65,
            RunError::Runtime(_) if self.is_io() => EX_IOERR,
            RunError::Runtime(_) => 70,
        }
    }

    /// Whether the run failed because its output could not be written.
    pub fn is_io(&self) -> bool {
        matches!(self, RunError::Runtime(e) if matches!(e.kind(), error::ErrorKind::Io(_)))
    }
}

/// A session: one interpreter whose globals persist across `run` calls.
pub struct Kiwi<W> {
    interpreter: Interpreter<W>,
    line: usize,
}

impl <W: Write> Kiwi<W> {
    pub fn new(out: W) -> Self {
        Self { interpreter: Interpreter::new(out), line: 0 }
    }

    /// Scans, parses and runs a whole program.
    pub fn run(&mut self, source: &str) -> Result<(), RunError> {
        self.run_scanner(Scanner::new(source))
    }

    /// Runs one line of interactive input. Lines are numbered across calls;
    /// a trailing line terminator is not counted as a new line.
    pub fn run_line(&mut self, line: &str) -> Result<(), RunError> {
        self.line += 1;
        let line = line.trim_end_matches(&['\n', '\r'][..]);
        self.run_scanner(Scanner::at_line(line, self.line))
    }

    fn run_scanner(&mut self, scanner: Scanner<'_>) -> Result<(), RunError> {
        let result = self.pipeline(scanner);
        if let Err(e) = &result {
            log::error!("{}", e);
        }
        result
    }

    fn pipeline(&mut self, scanner: Scanner<'_>) -> Result<(), RunError> {
        trace!("scanning");
        let tokens = scanner.scan_tokens().map_err(RunError::Syntax)?;

        trace!("parsing");
        let statements = Parser::new(tokens.into_iter()).parse().map_err(RunError::Parse)?;

        trace!("interpreting");
        self.interpreter.interpret(&statements).map_err(RunError::Runtime)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    struct ClosedOutput;

    impl Write for ClosedOutput {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "output closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn unwritable_output_is_an_io_failure() {
        let mut kiwi = Kiwi::new(ClosedOutput);
        let e = kiwi.run_line("print 1;").unwrap_err();
        assert!(e.is_io());
        assert_eq!(EX_IOERR, e.exit_code());

        let e = kiwi.run_line("print nope;").unwrap_err();
        assert!(!e.is_io());
        assert_eq!(70, e.exit_code());
    }

    #[test]
    fn each_stage_prefixes_its_errors() {
        let mut kiwi = Kiwi::new(std::io::sink());

        let e = kiwi.run("\"open").unwrap_err();
        assert!(matches!(e, RunError::Syntax(_)));
        assert_eq!("syntax error occurred: [line 1] Error: unterminated string", e.to_string());
        assert_eq!(65, e.exit_code());

        let e = kiwi.run("print 1").unwrap_err();
        assert!(matches!(e, RunError::Parse(_)));
        assert_eq!("parsing error occurred: [line 1] Error at end: reached end of file", e.to_string());
        assert_eq!(65, e.exit_code());

        let e = kiwi.run("y;").unwrap_err();
        assert!(matches!(e, RunError::Runtime(_)));
        assert_eq!("[line 1] Error at 'y': undefined variable: y", e.to_string());
        assert_eq!(70, e.exit_code());
    }

    #[test]
    fn lines_are_numbered_across_calls() {
        let mut kiwi = Kiwi::new(std::io::sink());
        assert!(kiwi.run_line("var a = 1;").is_ok());
        let e = kiwi.run_line("print b;").unwrap_err();
        assert_eq!("[line 2] Error at 'b': undefined variable: b", e.to_string());
    }

    #[test]
    fn line_terminators_do_not_advance_the_line() {
        let mut kiwi = Kiwi::new(std::io::sink());
        let e = kiwi.run_line("print 1\n").unwrap_err();
        assert_eq!("parsing error occurred: [line 1] Error at end: reached end of file", e.to_string());

        let e = kiwi.run_line("print 2\r\n").unwrap_err();
        assert_eq!("parsing error occurred: [line 2] Error at end: reached end of file", e.to_string());
    }
}
