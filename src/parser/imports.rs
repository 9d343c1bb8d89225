use super::Parser;
use crate::ast::Stmt;
use crate::error::AbyssError;
use crate::lexer::TokenKind;

impl Parser {
    /// `አስገባ "path" [እንደ alias]`
    pub(crate) fn import_statement(&mut self) -> Result<Stmt, AbyssError> {
        let start = self.eat(TokenKind::Import)?.span;
        let path_token = self.eat(TokenKind::String)?;
        let path = path_token
            .literal
            .map(|value| value.to_string())
            .unwrap_or_default();

        let alias = if self.match_kind(&TokenKind::As) {
            Some(self.eat_identifier()?)
        } else {
            None
        };

        Ok(Stmt::Import {
            path,
            alias,
            span: self.span_from(&start),
        })
    }
}
