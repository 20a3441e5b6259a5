//! Recursive-descent expression parser
//!
//! Precedence, lowest first: `or`, `and`, equality, relational, additive,
//! multiplicative, unary.

use super::lexer::{tokenize, Token, TokenKind};
use super::value::Value;
use crate::error::{ExpressionError, ExpressionResult};
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

/// Parsed expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    /// String literal; nested `${...}` inside it is expanded on evaluation
    Text(String),
    Property {
        name: String,
        span: Range<usize>,
    },
    Call {
        function: String,
        args: Vec<(Expr, Range<usize>)>,
        span: Range<usize>,
    },
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
}

/// Parse the text between `${` and `}`
pub fn parse(expression: &str) -> ExpressionResult<Expr> {
    let tokens = tokenize(expression)?;
    let mut parser = Parser {
        expression,
        tokens,
        pos: 0,
    };

    let expr = parser.parse_or()?;
    if parser.peek() != &TokenKind::Eof {
        return Err(parser.error("unexpected token after expression"));
    }
    Ok(expr)
}

struct Parser<'a> {
    expression: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    fn span(&self) -> Range<usize> {
        self.tokens[self.pos].span.clone()
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> ExpressionResult<Token> {
        if self.peek() == &kind {
            Ok(self.advance())
        } else {
            Err(self.error(&format!("expected {}", what)))
        }
    }

    fn error(&self, message: &str) -> ExpressionError {
        ExpressionError::Syntax {
            expression: self.expression.to_string(),
            position: self.span().start,
            message: message.to_string(),
        }
    }

    fn parse_or(&mut self) -> ExpressionResult<Expr> {
        let mut left = self.parse_and()?;
        while self.peek() == &TokenKind::Or {
            self.advance();
            let right = self.parse_and()?;
            left = Expr::Binary(BinaryOp::Or, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> ExpressionResult<Expr> {
        let mut left = self.parse_equality()?;
        while self.peek() == &TokenKind::And {
            self.advance();
            let right = self.parse_equality()?;
            left = Expr::Binary(BinaryOp::And, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> ExpressionResult<Expr> {
        let mut left = self.parse_relational()?;
        loop {
            let op = match self.peek() {
                TokenKind::Eq => BinaryOp::Eq,
                TokenKind::Ne => BinaryOp::Ne,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_relational()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
    }

    fn parse_relational(&mut self) -> ExpressionResult<Expr> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek() {
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::Le => BinaryOp::Le,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::Ge => BinaryOp::Ge,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_additive()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
    }

    fn parse_additive(&mut self) -> ExpressionResult<Expr> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
    }

    fn parse_multiplicative(&mut self) -> ExpressionResult<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Rem,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
    }

    fn parse_unary(&mut self) -> ExpressionResult<Expr> {
        match self.peek() {
            TokenKind::Minus => {
                self.advance();
                Ok(Expr::Unary(UnaryOp::Neg, Box::new(self.parse_unary()?)))
            }
            TokenKind::Not => {
                self.advance();
                Ok(Expr::Unary(UnaryOp::Not, Box::new(self.parse_unary()?)))
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> ExpressionResult<Expr> {
        let token = self.advance();
        match token.kind {
            TokenKind::Number(n) => Ok(Expr::Literal(Value::Number(n))),
            TokenKind::True => Ok(Expr::Literal(Value::Bool(true))),
            TokenKind::False => Ok(Expr::Literal(Value::Bool(false))),
            TokenKind::Str(s) => Ok(Expr::Text(s)),
            TokenKind::LParen => {
                let inner = self.parse_or()?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(inner)
            }
            TokenKind::Ident(name) => {
                if self.peek() == &TokenKind::DoubleColon {
                    self.parse_call(name, token.span)
                } else {
                    Ok(Expr::Property {
                        name,
                        span: token.span,
                    })
                }
            }
            TokenKind::Eof => {
                self.pos = self.tokens.len() - 1;
                Err(self.error("unexpected end of expression"))
            }
            _ => Err(ExpressionError::Syntax {
                expression: self.expression.to_string(),
                position: token.span.start,
                message: "expected a value".to_string(),
            }),
        }
    }

    fn parse_call(&mut self, namespace: String, start: Range<usize>) -> ExpressionResult<Expr> {
        self.advance(); // '::'
        let name = match self.advance().kind {
            TokenKind::Ident(name) => name,
            _ => return Err(self.error("expected function name after '::'")),
        };
        self.expect(TokenKind::LParen, "'(' after function name")?;

        let mut args = Vec::new();
        if self.peek() != &TokenKind::RParen {
            loop {
                let arg_start = self.span().start;
                let arg = self.parse_or()?;
                let arg_end = self.tokens[self.pos.saturating_sub(1)].span.end;
                args.push((arg, arg_start..arg_end));

                if self.peek() == &TokenKind::Comma {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        let close = self.expect(TokenKind::RParen, "')' or ','")?;

        Ok(Expr::Call {
            function: format!("{}::{}", namespace, name),
            args,
            span: start.start..close.span.end,
        })
    }
}
