use super::Parser;
use crate::ast::{BinaryOp, Callee, Expr, LogicalOp, UnaryOp};
use crate::error::AbyssError;
use crate::lexer::TokenKind;
use crate::value::Value;

impl Parser {
    pub(crate) fn expression(&mut self) -> Result<Expr, AbyssError> {
        self.or()
    }

    fn or(&mut self) -> Result<Expr, AbyssError> {
        let mut expr = self.and()?;

        while self.match_kind(&TokenKind::Or) {
            let right = self.and()?;
            let span = expr.span().to(right.span());
            expr = Expr::Logical {
                left: Box::new(expr),
                operator: LogicalOp::Or,
                right: Box::new(right),
                span,
            };
        }

        Ok(expr)
    }

    fn and(&mut self) -> Result<Expr, AbyssError> {
        let mut expr = self.equality()?;

        while self.match_kind(&TokenKind::And) {
            let right = self.equality()?;
            let span = expr.span().to(right.span());
            expr = Expr::Logical {
                left: Box::new(expr),
                operator: LogicalOp::And,
                right: Box::new(right),
                span,
            };
        }

        Ok(expr)
    }

    fn equality(&mut self) -> Result<Expr, AbyssError> {
        self.binary_level(Self::comparison, |kind| match kind {
            TokenKind::EqualEqual => Some(BinaryOp::Equal),
            TokenKind::BangEqual => Some(BinaryOp::NotEqual),
            _ => None,
        })
    }

    fn comparison(&mut self) -> Result<Expr, AbyssError> {
        self.binary_level(Self::term, |kind| match kind {
            TokenKind::Greater => Some(BinaryOp::Greater),
            TokenKind::GreaterEqual => Some(BinaryOp::GreaterEqual),
            TokenKind::Less => Some(BinaryOp::Less),
            TokenKind::LessEqual => Some(BinaryOp::LessEqual),
            _ => None,
        })
    }

    fn term(&mut self) -> Result<Expr, AbyssError> {
        self.binary_level(Self::factor, |kind| match kind {
            TokenKind::Plus => Some(BinaryOp::Add),
            TokenKind::Minus => Some(BinaryOp::Subtract),
            _ => None,
        })
    }

    fn factor(&mut self) -> Result<Expr, AbyssError> {
        self.binary_level(Self::unary, |kind| match kind {
            TokenKind::Star => Some(BinaryOp::Multiply),
            TokenKind::Slash => Some(BinaryOp::Divide),
            _ => None,
        })
    }

    /// One left-associative precedence level.
    fn binary_level(
        &mut self,
        operand: fn(&mut Self) -> Result<Expr, AbyssError>,
        operator_for: fn(&TokenKind) -> Option<BinaryOp>,
    ) -> Result<Expr, AbyssError> {
        let mut expr = operand(self)?;

        while let Some(operator) = operator_for(&self.current().kind) {
            self.advance();
            let right = operand(self)?;
            let span = expr.span().to(right.span());
            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
                span,
            };
        }

        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr, AbyssError> {
        if self.check(&TokenKind::Minus) {
            let start = self.advance().span;
            let operand = self.unary()?;
            let span = start.to(operand.span());
            return Ok(Expr::Unary {
                operator: UnaryOp::Negate,
                operand: Box::new(operand),
                span,
            });
        }

        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, AbyssError> {
        match self.current().kind {
            TokenKind::Number | TokenKind::String => {
                let token = self.advance();
                Ok(Expr::Literal {
                    value: token.literal.unwrap_or(Value::None),
                    span: token.span,
                })
            }
            TokenKind::Identifier => self.name_expression(),
            TokenKind::Input => self.input_expression(),
            TokenKind::LeftParen => self.parenthesized(Self::expression),
            TokenKind::LeftBracket => self.list_literal(),
            _ => Err(self.expected_expression()),
        }
    }

    /// Everything that starts with a name: variables, indexing, calls and
    /// dotted member access.
    fn name_expression(&mut self) -> Result<Expr, AbyssError> {
        let start = self.current().span.clone();
        let name = self.eat_identifier()?;

        if self.check(&TokenKind::LeftBracket) {
            let index = self.index_suffix()?;
            return Ok(Expr::Index {
                name,
                index: Box::new(index),
                span: self.span_from(&start),
            });
        }

        let mut members = Vec::new();
        while self.match_kind(&TokenKind::Dot) {
            members.push(self.eat_identifier()?);
        }

        let callee = match members.len() {
            0 => Callee::Named(name),
            1 => Callee::Qualified(Box::new(Expr::ModuleAccess {
                module: name,
                member: members.remove(0),
                span: self.span_from(&start),
            })),
            _ => Callee::Qualified(Box::new(Expr::ClassCall {
                name,
                members,
                span: self.span_from(&start),
            })),
        };

        if self.check(&TokenKind::LeftParen) {
            let args = self.parenthesized(Self::arguments)?;
            return Ok(Expr::Call {
                callee,
                args,
                span: self.span_from(&start),
            });
        }

        Ok(match callee {
            Callee::Named(name) => Expr::Variable {
                name,
                span: self.span_from(&start),
            },
            Callee::Qualified(access) => *access,
        })
    }

    /// `ጠይቅ()` or `ጠይቅ(prompt)`
    fn input_expression(&mut self) -> Result<Expr, AbyssError> {
        let start = self.eat(TokenKind::Input)?.span;
        self.eat(TokenKind::LeftParen)?;
        let prompt = if self.check(&TokenKind::RightParen) {
            None
        } else {
            Some(Box::new(self.expression()?))
        };
        self.eat(TokenKind::RightParen)?;

        Ok(Expr::Input {
            prompt,
            span: self.span_from(&start),
        })
    }

    fn arguments(&mut self) -> Result<Vec<Expr>, AbyssError> {
        let mut args = Vec::new();
        if self.check(&TokenKind::RightParen) {
            return Ok(args);
        }

        loop {
            args.push(self.expression()?);
            if !self.match_kind(&TokenKind::Comma) {
                break;
            }
        }
        Ok(args)
    }
}
