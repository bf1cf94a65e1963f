use crate::value::Value;

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) lexeme: String,
    pub(crate) line: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    LeftParen, RightParen, LeftBrace, RightBrace,
    Minus, Plus, Semicolon, Slash, Star,

    Bang, BangEqual,
    Equal, EqualEqual,
    Greater, GreaterEqual,
    Less, LessEqual,

    Identifier, String(String), Number(i64),

    And, Class, Else, False, Fn, For, If, Nil, Or,
    Print, Return, True, Var, While,

    EndOfFile,
}

impl Token {
    pub fn new<S: Into<String>>(kind: TokenKind, lexeme: S, line: usize) -> Self {
        Token { kind, lexeme: lexeme.into(), line }
    }

    pub fn end_of_file(line: usize) -> Self {
        Token::new(TokenKind::EndOfFile, "", line)
    }

    pub fn kind(&self) -> &TokenKind {
        &self.kind
    }

    pub fn lexeme(&self) -> &str {
        &self.lexeme
    }

    pub fn line(&self) -> usize {
        self.line
    }

    /// The decoded value of a STRING or NUMBER token.
    pub fn literal(&self) -> Option<Value> {
        match &self.kind {
            TokenKind::String(s) => Some(Value::String(s.clone())),
            TokenKind::Number(n) => Some(Value::Number(*n)),
            _ => None,
        }
    }

    pub(crate) fn is_end_of_file(&self) -> bool {
        self.kind == TokenKind::EndOfFile
    }
}
