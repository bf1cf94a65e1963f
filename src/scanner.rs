use crate::{
    error::{Error, Result},
    token::{Token, TokenKind},
};
use log::trace;
use peekmore::{PeekMore, PeekMoreIterator};
use phf::phf_map;
use std::str::Chars;

static KEYWORDS: phf::Map<&'static str, TokenKind> = phf_map! {
    "and" => TokenKind::And,
    "class" => TokenKind::Class,
    "else" => TokenKind::Else,
    "false" => TokenKind::False,
    "fn" => TokenKind::Fn,
    "for" => TokenKind::For,
    "if" => TokenKind::If,
    "nil" => TokenKind::Nil,
    "or" => TokenKind::Or,
    "print" => TokenKind::Print,
    "return" => TokenKind::Return,
    "true" => TokenKind::True,
    "var" => TokenKind::Var,
    "while" => TokenKind::While,
};

/// Turns source text into tokens.
///
/// Iterating a `Scanner` yields tokens without the trailing EOF marker;
/// `scan_tokens` collects them, stops at the first lexical error and appends
/// the marker.
pub struct Scanner<'a> {
    src: PeekMoreIterator<Chars<'a>>,
    lexeme_buffer: String,
    line: usize,
}

impl <'a> Iterator for Scanner<'a> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Result<Token>> {
        while self.src.peek().is_some() {
            let kind = self.next_token_kind();

            let lexeme = self.lexeme_buffer.clone();
            self.lexeme_buffer.clear();

            if let Some(kind) = kind {
                return Some(kind.map(|kind| Token {
                    kind,
                    lexeme,
                    line: self.line,
                }))
            }
        }
        None
    }
}

impl <'a> Scanner<'a> {
    pub fn new(src: &'a str) -> Self {
        Self::at_line(src, 1)
    }

    /// Scans `src` as if it started on `line`. Used for line-at-a-time input.
    pub fn at_line(src: &'a str, line: usize) -> Self {
        Self {
            src: src.chars().peekmore(),
            lexeme_buffer: String::new(),
            line,
        }
    }

    pub fn scan_tokens(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next() {
            tokens.push(token?);
        }
        tokens.push(Token::end_of_file(self.line));
        trace!("scanned {} tokens", tokens.len());
        Ok(tokens)
    }

    fn next_token_kind(&mut self) -> Option<Result<TokenKind>> {
        let next_char = self.src.next()?;
        self.lexeme_buffer.push(next_char);

        use TokenKind::*;
        match next_char {
            '(' => Some(Ok(LeftParen)),
            ')' => Some(Ok(RightParen)),
            '{' => Some(Ok(LeftBrace)),
            '}' => Some(Ok(RightBrace)),
            '-' => Some(Ok(Minus)),
            '+' => Some(Ok(Plus)),
            ';' => Some(Ok(Semicolon)),
            '*' => Some(Ok(Star)),
            '!' => Some(Ok(if self.does_next_match('=') { BangEqual } else { Bang })),
            '=' => Some(Ok(if self.does_next_match('=') { EqualEqual } else { Equal })),
            '<' => Some(Ok(if self.does_next_match('=') { LessEqual } else { Less })),
            '>' => Some(Ok(if self.does_next_match('=') { GreaterEqual } else { Greater })),
            '/' => {
                if self.does_next_match('/') { // is this a comment?
                    self.advance_until_match('\n');
                    None
                } else {
                    Some(Ok(Slash))
                }
            },
            ' ' | '\r' | '\t' => None,
            '\n' => {
                self.line += 1;
                None
            },
            '"' => Some(self.extract_string()),
            c if c.is_ascii_digit() => Some(self.extract_number()),
            c if c.is_ascii_alphabetic() => Some(Ok(self.extract_identifier())),
            c => {
                trace!("[line {}] ignoring unexpected character {:?}", self.line, c);
                None
            },
        }
    }

    fn does_next_match(&mut self, c: char) -> bool {
        match self.src.peek() {
            Some(next) if c == *next => {
                self.lexeme_buffer.push(c);
                self.src.next();
                true
            }
            _ => false,
        }
    }

    fn extract_string(&mut self) -> Result<TokenKind> {
        let mut newline_count = 0;
        self.advance_until_for_each(|n| n == &'"', |c| if c == '\n' { newline_count += 1 });
        self.line += newline_count;
        match self.src.next() {
            None => Err(Error::lexical(self.line, "unterminated string")),
            Some(q) => { // q here must be " due to advance_until
                self.lexeme_buffer.push(q);
                let contents = &self.lexeme_buffer[1..self.lexeme_buffer.len() - 1];
                Ok(TokenKind::String(contents.to_string()))
            },
        }
    }

    fn extract_number(&mut self) -> Result<TokenKind> {
        self.advance_until(|n| !n.is_ascii_digit());

        let next = self.src.peek().copied();
        let after_next = self.src.peek_nth(1).copied();
        match (next, after_next) {
            (Some(c), _) if c.is_ascii_alphabetic() => {
                return Err(Error::lexical(
                    self.line,
                    "invalid number: contains alphabetic characters"
                ))
            },
            (Some('.'), Some(d)) if d.is_ascii_digit() => {
                return Err(Error::lexical(
                    self.line,
                    "invalid number: fractional literals are not supported"
                ))
            },
            _ => {},
        }

        self.lexeme_buffer.parse()
            .map(TokenKind::Number)
            .map_err(|_| Error::lexical(self.line, "invalid number: out of range"))
    }

    fn extract_identifier(&mut self) -> TokenKind {
        self.advance_until(|n| !n.is_ascii_alphanumeric());

        match KEYWORDS.get(self.lexeme_buffer.as_str()) {
            Some(kind) => kind.clone(),
            None => TokenKind::Identifier,
        }
    }

    fn advance_until_match(&mut self, c: char) {
        self.advance_until(|n| n == &c)
    }

    fn advance_until(&mut self, should_stop: impl Fn(&char) -> bool) {
        self.advance_until_for_each(should_stop, |_| {})
    }

    fn advance_until_for_each(
        &mut self,
        should_stop: impl Fn(&char) -> bool,
        mut f: impl FnMut(char),
    ) {
        while let Some(next) = self.src.peek().copied() {
            if should_stop(&next) { break }
            self.src.next();
            self.lexeme_buffer.push(next);
            f(next);
        }
    }
}
