//! Predictive recursive-descent parser with one token of lookahead.
//!
//! The grammar is split across several `impl Parser` blocks, one per
//! sub-grammar; this file holds the token cursor they all share.

mod conditionals;
mod expressions;
mod functions;
mod imports;
mod lists;
mod loops;
mod statements;

use crate::ast::Program;
use crate::error::{AbyssError, FoundToken, Span};
use crate::lexer::{Token, TokenKind};

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, current: 0 }
    }

    pub fn parse(&mut self) -> Result<Program, AbyssError> {
        let mut statements = Vec::new();

        self.skip_separators();
        while !self.is_at_end() {
            statements.push(self.statement()?);
            self.skip_separators();
        }

        log::debug!("parsed {} top-level statements", statements.len());
        Ok(Program { statements })
    }

    /// The token under the cursor.
    pub(crate) fn current(&self) -> &Token {
        // The lexer always terminates the stream with Eof.
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.current.min(last)]
    }

    /// Kind of the token `n` positions past the cursor.
    pub(crate) fn peek_kind(&self, n: usize) -> Option<&TokenKind> {
        self.tokens.get(self.current + n).map(|token| &token.kind)
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        &self.current().kind == kind
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.check(&TokenKind::Eof)
    }

    pub(crate) fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if !self.is_at_end() {
            self.current += 1;
        }
        token
    }

    pub(crate) fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    pub(crate) fn match_kind(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consumes a token of `expected` kind or fails without recovering.
    pub(crate) fn eat(&mut self, expected: TokenKind) -> Result<Token, AbyssError> {
        if self.check(&expected) {
            Ok(self.advance())
        } else {
            Err(AbyssError::unexpected_token(self.current(), expected))
        }
    }

    pub(crate) fn eat_identifier(&mut self) -> Result<String, AbyssError> {
        Ok(self.eat(TokenKind::Identifier)?.lexeme)
    }

    /// Span from `start` through the last consumed token.
    pub(crate) fn span_from(&self, start: &Span) -> Span {
        start.to(&self.previous().span)
    }

    pub(crate) fn expected_expression(&self) -> AbyssError {
        let token = self.current();
        let help = match token.kind {
            TokenKind::RightParen => {
                "Found ')' without matching '('. Check for unbalanced parentheses."
            }
            TokenKind::RightBrace => "Found '}' without matching '{'. Check for unbalanced braces.",
            TokenKind::RightBracket => {
                "Found ']' without matching '['. Check for unbalanced brackets."
            }
            TokenKind::Eof => "Reached end of input while expecting an expression.",
            _ => "Expected a number, string, name, list or parenthesized expression here.",
        };
        let found = FoundToken::from(token);
        let mut error = AbyssError::parse_error(
            token.span.clone(),
            format!("Unexpected token: found {}, expected expression", found),
        )
        .with_help(help);
        error.token = Some(found);
        error
    }

    fn skip_separators(&mut self) {
        while self.match_kind(&TokenKind::Semicolon) {}
    }
}
