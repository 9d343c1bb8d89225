use super::Parser;
use crate::ast::Stmt;
use crate::error::AbyssError;
use crate::lexer::TokenKind;

impl Parser {
    /// `ከሆነ (cond) {..} [ካልሆነ (cond) {..}] [ሌላ {..}]`
    ///
    /// At most one else-if arm; a second `ካልሆነ` is not part of this
    /// statement.
    pub(crate) fn if_statement(&mut self) -> Result<Stmt, AbyssError> {
        let start = self.eat(TokenKind::If)?.span;
        let condition = self.parenthesized(Self::expression)?;
        let then_branch = self.block()?;

        let elseif_branch = if self.match_kind(&TokenKind::ElseIf) {
            let condition = self.parenthesized(Self::expression)?;
            Some((condition, self.block()?))
        } else {
            None
        };

        let else_branch = if self.match_kind(&TokenKind::Else) {
            Some(self.block()?)
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            elseif_branch,
            else_branch,
            span: self.span_from(&start),
        })
    }
}
