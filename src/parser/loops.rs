use super::Parser;
use crate::ast::Stmt;
use crate::error::AbyssError;
use crate::lexer::TokenKind;

impl Parser {
    /// `እያለ (cond) { body }`
    pub(crate) fn while_statement(&mut self) -> Result<Stmt, AbyssError> {
        let start = self.eat(TokenKind::While)?.span;
        let condition = self.parenthesized(Self::expression)?;
        let body = self.block()?;

        Ok(Stmt::While {
            condition,
            body,
            span: self.span_from(&start),
        })
    }

    /// `ለ (var, ከ start እስከ end) { body }`
    pub(crate) fn for_statement(&mut self) -> Result<Stmt, AbyssError> {
        let start_span = self.eat(TokenKind::For)?.span;
        self.eat(TokenKind::LeftParen)?;

        let var = self.eat_identifier()?;
        self.eat(TokenKind::Comma)?;

        self.eat(TokenKind::From)?;
        let start = self.expression()?;

        self.eat(TokenKind::To)?;
        let end = self.expression()?;

        self.eat(TokenKind::RightParen)?;
        let body = self.block()?;

        Ok(Stmt::For {
            var,
            start,
            end,
            body,
            span: self.span_from(&start_span),
        })
    }
}
