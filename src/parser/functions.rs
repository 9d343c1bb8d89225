use super::Parser;
use crate::ast::{ClassDef, FunctionDef, Stmt};
use crate::error::AbyssError;
use crate::lexer::TokenKind;
use std::rc::Rc;

impl Parser {
    /// `ተግባር name(p1, p2) { body }`
    pub(crate) fn function_definition(&mut self) -> Result<Stmt, AbyssError> {
        let start = self.eat(TokenKind::Fun)?.span;
        let name = self.eat_identifier()?;
        let params = self.parenthesized(Self::parameters)?;
        let body = self.block()?;

        Ok(Stmt::FunctionDef(Rc::new(FunctionDef {
            name,
            params,
            body,
            span: self.span_from(&start),
            file: None,
        })))
    }

    /// `ክፍል Name { body }`
    pub(crate) fn class_definition(&mut self) -> Result<Stmt, AbyssError> {
        let start = self.eat(TokenKind::Class)?.span;
        let name = self.eat_identifier()?;
        let body = self.block()?;

        Ok(Stmt::ClassDef(Rc::new(ClassDef {
            name,
            body,
            span: self.span_from(&start),
        })))
    }

    fn parameters(&mut self) -> Result<Vec<String>, AbyssError> {
        let mut params = Vec::new();
        if self.check(&TokenKind::RightParen) {
            return Ok(params);
        }

        loop {
            params.push(self.eat_identifier()?);
            if !self.match_kind(&TokenKind::Comma) {
                break;
            }
        }
        Ok(params)
    }
}
