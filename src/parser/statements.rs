use super::Parser;
use crate::ast::{Expr, Stmt};
use crate::error::AbyssError;
use crate::lexer::TokenKind;

impl Parser {
    pub(crate) fn statement(&mut self) -> Result<Stmt, AbyssError> {
        let stmt = match self.current().kind {
            TokenKind::If => self.if_statement()?,
            TokenKind::While => self.while_statement()?,
            TokenKind::For => self.for_statement()?,
            TokenKind::Fun => self.function_definition()?,
            TokenKind::Class => self.class_definition()?,
            TokenKind::Import => self.import_statement()?,
            TokenKind::Print => self.print_statement()?,
            TokenKind::Identifier => match self.peek_kind(1) {
                Some(TokenKind::Equal) => self.assignment()?,
                Some(TokenKind::LeftBracket) => self.indexed_statement()?,
                _ => self.expression_statement()?,
            },
            _ => self.expression_statement()?,
        };

        // Semicolons are optional terminators.
        self.match_kind(&TokenKind::Semicolon);
        Ok(stmt)
    }

    /// `{ statement* }`
    pub(crate) fn block(&mut self) -> Result<Vec<Stmt>, AbyssError> {
        self.eat(TokenKind::LeftBrace)?;

        let mut statements = Vec::new();
        loop {
            while self.match_kind(&TokenKind::Semicolon) {}
            if self.check(&TokenKind::RightBrace) || self.is_at_end() {
                break;
            }
            statements.push(self.statement()?);
        }

        self.eat(TokenKind::RightBrace)?;
        Ok(statements)
    }

    fn assignment(&mut self) -> Result<Stmt, AbyssError> {
        let start = self.current().span.clone();
        let name = self.eat_identifier()?;
        self.eat(TokenKind::Equal)?;

        // A bare list literal on the right keeps its own statement form.
        let value = self.expression()?;
        let span = self.span_from(&start);
        Ok(match value {
            Expr::List { items, .. } => Stmt::ListAssign { name, items, span },
            value => Stmt::Assign { name, value, span },
        })
    }

    fn print_statement(&mut self) -> Result<Stmt, AbyssError> {
        let start = self.eat(TokenKind::Print)?.span;
        let expr = self.parenthesized(Self::expression)?;
        Ok(Stmt::Print {
            expr,
            span: self.span_from(&start),
        })
    }

    fn expression_statement(&mut self) -> Result<Stmt, AbyssError> {
        let start = self.current().span.clone();
        let expr = self.expression()?;
        Ok(Stmt::Expression {
            expr,
            span: self.span_from(&start),
        })
    }

    /// `( rule )`
    pub(crate) fn parenthesized<T>(
        &mut self,
        rule: fn(&mut Self) -> Result<T, AbyssError>,
    ) -> Result<T, AbyssError> {
        self.eat(TokenKind::LeftParen)?;
        let inner = rule(self)?;
        self.eat(TokenKind::RightParen)?;
        Ok(inner)
    }
}
