use super::Parser;
use crate::ast::{Expr, Stmt};
use crate::error::AbyssError;
use crate::lexer::TokenKind;

impl Parser {
    /// `name[index] = value`, or a bare `name[index]` expression statement.
    pub(crate) fn indexed_statement(&mut self) -> Result<Stmt, AbyssError> {
        let start = self.current().span.clone();
        let name = self.eat_identifier()?;
        let index = self.index_suffix()?;

        if self.match_kind(&TokenKind::Equal) {
            let value = self.expression()?;
            return Ok(Stmt::ListElementAssign {
                name,
                index,
                value,
                span: self.span_from(&start),
            });
        }

        let span = self.span_from(&start);
        Ok(Stmt::Expression {
            expr: Expr::Index {
                name,
                index: Box::new(index),
                span: span.clone(),
            },
            span,
        })
    }

    /// `[a, b, ...]` as an expression.
    pub(crate) fn list_literal(&mut self) -> Result<Expr, AbyssError> {
        let start = self.current().span.clone();
        let items = self.list_items()?;
        Ok(Expr::List {
            items,
            span: self.span_from(&start),
        })
    }

    /// `[ index ]`
    pub(crate) fn index_suffix(&mut self) -> Result<Expr, AbyssError> {
        self.eat(TokenKind::LeftBracket)?;
        let index = self.expression()?;
        self.eat(TokenKind::RightBracket)?;
        Ok(index)
    }

    fn list_items(&mut self) -> Result<Vec<Expr>, AbyssError> {
        self.eat(TokenKind::LeftBracket)?;

        let mut items = Vec::new();
        if !self.check(&TokenKind::RightBracket) {
            loop {
                items.push(self.expression()?);
                if !self.match_kind(&TokenKind::Comma) {
                    break;
                }
            }
        }

        self.eat(TokenKind::RightBracket)?;
        Ok(items)
    }
}
