use std::result;
use std::fmt::{self, Display};

use crate::token::Token;

pub type Result<T> = result::Result<T, Error>;

#[derive(Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    Lexical { line: usize },
    Syntactic { token: Token },
    UnexpectedEof { line: usize },
    Runtime { token: Token },
    Io(std::io::Error),
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: String,
}

impl Error {
    pub fn lexical<S: Into<String>>(line: usize, message: S) -> Error {
        let kind = ErrorKind::Lexical { line };
        Error { kind, message: message.into() }
    }

    pub fn syntactic<S: Into<String>>(token: Token, message: S) -> Error {
        let kind = ErrorKind::Syntactic { token };
        Error { kind, message: message.into() }
    }

    pub fn runtime<S: Into<String>>(token: Token, message: S) -> Error {
        let kind = ErrorKind::Runtime { token };
        Error { kind, message: message.into() }
    }

    pub fn unexpected_eof(line: usize) -> Error {
        let kind = ErrorKind::UnexpectedEof { line };
        Error { kind, message: "reached end of file".into() }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_runtime_error(&self) -> bool {
        matches!(self.kind(), ErrorKind::Runtime { .. })
    }

    fn loc(&self) -> String {
        use ErrorKind::*;
        match self.kind() {
            Syntactic { token } | Runtime { token } => {
                if token.is_end_of_file() {
                    " at end".to_string()
                } else {
                    format!(" at '{}'", token.lexeme)
                }
            },
            UnexpectedEof { .. } => " at end".to_string(),
            _ => "".to_string(),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self.kind() {
            ErrorKind::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use ErrorKind::*;
        let line = match self.kind() {
            Io(_) => return write!(f, "{}", self.message),
            Lexical { line } | UnexpectedEof { line } => *line,
            Syntactic { token } | Runtime { token } => token.line,
        };
        write!(f, "[line {}] Error{}: {}", line, self.loc(), self.message)
    }
}

impl From<Error> for std::io::Error {
    fn from(e: Error) -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::Other, e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        let message = format!("IO error: {}", e);
        Error { kind: ErrorKind::Io(e), message }
    }
}
