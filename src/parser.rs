use std::iter::Peekable;

use log::{debug, trace};

use crate::{
    error::{Error, Result},
    expr::Expr,
    printer,
    stmt::Stmt,
    token::*,
    value::Value,
};

const EQUALITY_TOKENS: &[&TokenKind] = &[
    &TokenKind::BangEqual,
    &TokenKind::EqualEqual,
];

const COMPARISON_TOKENS: &[&TokenKind] = &[
    &TokenKind::Greater,
    &TokenKind::GreaterEqual,
    &TokenKind::Less,
    &TokenKind::LessEqual,
];

const TERM_TOKENS: &[&TokenKind] = &[
    &TokenKind::Minus,
    &TokenKind::Plus,
];

const FACTOR_TOKENS: &[&TokenKind] = &[
    &TokenKind::Star,
    &TokenKind::Slash,
];

const UNARY_TOKENS: &[&TokenKind] = &[
    &TokenKind::Bang,
    &TokenKind::Minus,
];

/// Recursive-descent parser. Each precedence level is one method, and tighter
/// binding levels are called from looser ones.
///
/// The first error aborts the parse; there is no synchronisation.
pub struct Parser<T> {
    tokens: T,
    line: usize,
}

impl <T: Iterator<Item = Token>> Parser<Peekable<T>> {
    pub fn new(tokens: T) -> Self {
        let tokens = tokens.peekable();
        Parser { tokens, line: 1 }
    }

    pub fn parse(&mut self) -> Result<Vec<Stmt>> {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            let statement = self.declaration()?;
            debug!("parsed {}", printer::print_stmt(&statement));
            statements.push(statement);
        }
        trace!("parsed {} statements", statements.len());
        Ok(statements)
    }

    fn declaration(&mut self) -> Result<Stmt> {
        if self.match_single(&TokenKind::Var).is_some() {
            self.var_declaration()
        } else {
            self.statement()
        }
    }

    fn var_declaration(&mut self) -> Result<Stmt> {
        let name = self.consume(&TokenKind::Identifier, "expected variable name")?;

        let initializer = if self.match_single(&TokenKind::Equal).is_some() {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(&TokenKind::Semicolon, "expected ';' after variable declaration")?;
        Ok(Stmt::new_var(name, initializer))
    }

    fn statement(&mut self) -> Result<Stmt> {
        if self.match_single(&TokenKind::Print).is_some() {
            self.print_statement()
        } else {
            self.expression_statement()
        }
    }

    fn print_statement(&mut self) -> Result<Stmt> {
        let expression = self.expression()?;
        self.consume(&TokenKind::Semicolon, "expected ';' after value")?;
        Ok(Stmt::new_print(expression))
    }

    fn expression_statement(&mut self) -> Result<Stmt> {
        let expression = self.expression()?;
        self.consume(&TokenKind::Semicolon, "expected ';' after expression")?;
        Ok(Stmt::new_expression(expression))
    }

    fn expression(&mut self) -> Result<Expr> {
        self.assignment()
    }

    fn assignment(&mut self) -> Result<Expr> {
        let expr = self.or()?;
        if let Some(equals) = self.match_single(&TokenKind::Equal) {
            if let Expr::Variable(lhs) = expr {
                let value = self.assignment()?;
                Ok(Expr::new_assign(lhs.name, Box::new(value)))
            } else {
                Err(Error::syntactic(equals, "invalid assignment target"))
            }
        } else {
            Ok(expr)
        }
    }

    fn or(&mut self) -> Result<Expr> {
        let mut e = self.and()?;

        while let Some(op) = self.match_single(&TokenKind::Or) {
            let right = Box::new(self.and()?);
            e = Expr::new_logical(Box::new(e), op, right);
        }

        Ok(e)
    }

    fn and(&mut self) -> Result<Expr> {
        let mut e = self.equality()?;

        while let Some(op) = self.match_single(&TokenKind::And) {
            let right = Box::new(self.equality()?);
            e = Expr::new_logical(Box::new(e), op, right);
        }

        Ok(e)
    }

    fn equality(&mut self) -> Result<Expr> {
        self.match_binary_precedence_with_tokens(
            Self::comparison,
            EQUALITY_TOKENS
        )
    }

    fn comparison(&mut self) -> Result<Expr> {
        self.match_binary_precedence_with_tokens(
            Self::term,
            COMPARISON_TOKENS
        )
    }

    fn term(&mut self) -> Result<Expr> {
        self.match_binary_precedence_with_tokens(
            Self::factor,
            TERM_TOKENS
        )
    }

    fn factor(&mut self) -> Result<Expr> {
        self.match_binary_precedence_with_tokens(
            Self::unary,
            FACTOR_TOKENS
        )
    }

    fn unary(&mut self) -> Result<Expr> {
        if let Some(token) = self.match_any(UNARY_TOKENS) {
            let right = Box::new(self.unary()?);
            Ok(Expr::new_unary(token, right))
        } else {
            self.primary()
        }
    }

    fn primary(&mut self) -> Result<Expr> {
        let next = match self.advance() {
            Some(token) if !token.is_end_of_file() => token,
            _ => return Err(Error::unexpected_eof(self.line)),
        };

        match next.kind.clone() {
            TokenKind::True => Ok(Expr::new_primary(true.into())),
            TokenKind::False => Ok(Expr::new_primary(false.into())),
            TokenKind::Nil => Ok(Expr::new_primary(Value::Nil)),
            TokenKind::Number(n) => Ok(Expr::new_primary(n.into())),
            TokenKind::String(s) => Ok(Expr::new_primary(s.into())),
            TokenKind::Identifier => Ok(Expr::new_variable(next)),
            TokenKind::LeftParen => {
                let expression = Box::new(self.expression()?);
                self.consume(&TokenKind::RightParen, "expected ')' after expression")?;
                Ok(Expr::new_grouping(expression))
            },
            _ => Err(Error::syntactic(next, "expected expression")),
        }
    }

    fn is_at_end(&mut self) -> bool {
        self.tokens.peek()
            .map(Token::is_end_of_file)
            .unwrap_or(true)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.next()?;
        self.line = token.line;
        Some(token)
    }

    fn check_next(&mut self, kind: &TokenKind) -> bool {
        self.tokens.peek()
            .map(|t| &t.kind == kind)
            .unwrap_or(false)
    }

    fn consume(&mut self, kind: &TokenKind, error_msg: &str) -> Result<Token> {
        if let Some(token) = self.match_single(kind) {
            Ok(token)
        } else if self.is_at_end() {
            if let Some(t) = self.tokens.peek() {
                self.line = t.line;
            }
            Err(Error::unexpected_eof(self.line))
        } else {
            Err(match self.advance() {
                Some(t) => Error::syntactic(t, error_msg),
                None => Error::unexpected_eof(self.line),
            })
        }
    }

    fn match_binary_precedence_with_tokens(
        &mut self,
        parse: impl Fn(&mut Self) -> Result<Expr>,
        kinds: &[&TokenKind]
    ) -> Result<Expr> {
        let mut e = parse(self)?;

        while let Some(token) = self.match_any(kinds) {
            let right = Box::new(parse(self)?);
            e = Expr::new_binary(Box::new(e), token, right)
        }

        Ok(e)
    }

    fn match_single(&mut self, kind: &TokenKind) -> Option<Token> {
        if self.check_next(kind) {
            self.advance()
        } else {
            None
        }
    }

    fn match_any(&mut self, kinds: &[&TokenKind]) -> Option<Token> {
        kinds.iter().find_map(|k| self.match_single(k))
    }
}
