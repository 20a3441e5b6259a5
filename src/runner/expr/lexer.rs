//! Expression tokenizer

use crate::error::{ExpressionError, ExpressionResult};
use std::ops::Range;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident(String),
    Str(String),
    Number(f64),
    True,
    False,
    And,
    Or,
    Not,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    LParen,
    RParen,
    Comma,
    DoubleColon,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte range in the expression text
    pub span: Range<usize>,
}

/// Tokenize the text between `${` and `}`
pub fn tokenize(expression: &str) -> ExpressionResult<Vec<Token>> {
    let chars: Vec<(usize, char)> = expression.char_indices().collect();
    let end = expression.len();
    let offset_at = |i: usize| chars.get(i).map(|(o, _)| *o).unwrap_or(end);
    let syntax = |position: usize, message: &str| ExpressionError::Syntax {
        expression: expression.to_string(),
        position,
        message: message.to_string(),
    };

    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let (start, c) = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        if c.is_ascii_alphabetic() || c == '_' {
            let mut j = i + 1;
            while j < chars.len() {
                let ch = chars[j].1;
                if is_ident_char(ch) {
                    j += 1;
                } else if (ch == '-' || ch == '.')
                    && chars.get(j + 1).map_or(false, |(_, n)| is_ident_char(*n))
                {
                    j += 2;
                } else {
                    break;
                }
            }
            let text = &expression[start..offset_at(j)];
            let kind = match text {
                "true" => TokenKind::True,
                "false" => TokenKind::False,
                "and" => TokenKind::And,
                "or" => TokenKind::Or,
                "not" => TokenKind::Not,
                _ => TokenKind::Ident(text.to_string()),
            };
            tokens.push(Token {
                kind,
                span: start..offset_at(j),
            });
            i = j;
            continue;
        }

        if c.is_ascii_digit() {
            let mut j = i + 1;
            while j < chars.len() && chars[j].1.is_ascii_digit() {
                j += 1;
            }
            if j + 1 < chars.len() && chars[j].1 == '.' && chars[j + 1].1.is_ascii_digit() {
                j += 1;
                while j < chars.len() && chars[j].1.is_ascii_digit() {
                    j += 1;
                }
            }
            let text = &expression[start..offset_at(j)];
            let number = text
                .parse::<f64>()
                .map_err(|_| syntax(start, "invalid number"))?;
            tokens.push(Token {
                kind: TokenKind::Number(number),
                span: start..offset_at(j),
            });
            i = j;
            continue;
        }

        if c == '\'' || c == '"' {
            let mut value = String::new();
            let mut j = i + 1;
            loop {
                match chars.get(j) {
                    None => return Err(syntax(start, "unterminated string literal")),
                    Some((_, ch)) if *ch == c => {
                        // a doubled quote is an escaped quote
                        if chars.get(j + 1).map(|(_, n)| *n) == Some(c) {
                            value.push(c);
                            j += 2;
                        } else {
                            j += 1;
                            break;
                        }
                    }
                    Some((_, ch)) => {
                        value.push(*ch);
                        j += 1;
                    }
                }
            }
            tokens.push(Token {
                kind: TokenKind::Str(value),
                span: start..offset_at(j),
            });
            i = j;
            continue;
        }

        let next = chars.get(i + 1).map(|(_, n)| *n);
        let (kind, width) = match (c, next) {
            ('=', Some('=')) => (TokenKind::Eq, 2),
            ('!', Some('=')) => (TokenKind::Ne, 2),
            ('<', Some('=')) => (TokenKind::Le, 2),
            ('>', Some('=')) => (TokenKind::Ge, 2),
            (':', Some(':')) => (TokenKind::DoubleColon, 2),
            ('<', _) => (TokenKind::Lt, 1),
            ('>', _) => (TokenKind::Gt, 1),
            ('!', _) => (TokenKind::Not, 1),
            ('+', _) => (TokenKind::Plus, 1),
            ('-', _) => (TokenKind::Minus, 1),
            ('*', _) => (TokenKind::Star, 1),
            ('/', _) => (TokenKind::Slash, 1),
            ('%', _) => (TokenKind::Percent, 1),
            ('(', _) => (TokenKind::LParen, 1),
            (')', _) => (TokenKind::RParen, 1),
            (',', _) => (TokenKind::Comma, 1),
            _ => return Err(syntax(start, &format!("unexpected character '{}'", c))),
        };
        tokens.push(Token {
            kind,
            span: start..offset_at(i + width),
        });
        i += width;
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        span: end..end,
    });
    Ok(tokens)
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
