//! Text syntax for [`Expr`].
//!
//! ```text
//! or      := and ( "||" and )*
//! and     := unary ( "&&" unary )*
//! unary   := "!" unary | primary
//! primary := "(" or ")" | "true" | "false" | field cmp literal
//! field   := [A-Za-z_][A-Za-z0-9_]* | "`" any-but-backtick "`"
//! cmp     := "==" | "!=" | "<" | "<=" | ">" | ">="
//! literal := int | real | 'text' | "text" | true | false | null
//! ```

use super::{CmpOp, Expr};
use fallback_types::Value;

/// Why an expression did not parse. `offset` is a byte offset into the input.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message} at offset {offset}")]
pub struct ParseError {
    pub offset: usize,
    pub message: String,
}

impl ParseError {
    fn new(offset: usize, message: impl Into<String>) -> Self {
        Self {
            offset,
            message: message.into(),
        }
    }
}

pub fn parse(input: &str) -> Result<Expr, ParseError> {
    let tokens = lex(input)?;
    let mut parser = Parser { tokens, pos: 0 };
    if parser.peek().tok == Tok::End {
        return Err(ParseError::new(0, "empty expression"));
    }
    let expr = parser.or_expr()?;
    let next = parser.peek();
    if next.tok != Tok::End {
        return Err(ParseError::new(
            next.offset,
            format!("unexpected {} after expression", next.tok.describe()),
        ));
    }
    Ok(expr)
}

#[derive(Clone, Debug, PartialEq)]
enum Tok {
    Ident(String),
    Str(String),
    Int(i64),
    Real(f64),
    True,
    False,
    Null,
    Cmp(CmpOp),
    AndAnd,
    OrOr,
    Bang,
    LParen,
    RParen,
    End,
}

impl Tok {
    fn describe(&self) -> String {
        match self {
            Tok::Ident(name) => format!("identifier '{name}'"),
            Tok::Str(_) => "string literal".to_string(),
            Tok::Int(_) | Tok::Real(_) => "number".to_string(),
            Tok::True => "'true'".to_string(),
            Tok::False => "'false'".to_string(),
            Tok::Null => "'null'".to_string(),
            Tok::Cmp(op) => format!("'{}'", op.symbol()),
            Tok::AndAnd => "'&&'".to_string(),
            Tok::OrOr => "'||'".to_string(),
            Tok::Bang => "'!'".to_string(),
            Tok::LParen => "'('".to_string(),
            Tok::RParen => "')'".to_string(),
            Tok::End => "end of input".to_string(),
        }
    }
}

#[derive(Clone, Debug)]
struct Token {
    tok: Tok,
    offset: usize,
}

fn lex(input: &str) -> Result<Vec<Token>, ParseError> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let start = i;
        let b = bytes[i];
        let next = bytes.get(i + 1).copied();

        let tok = match b {
            b' ' | b'\t' | b'\n' | b'\r' => {
                i += 1;
                continue;
            }
            b'(' => {
                i += 1;
                Tok::LParen
            }
            b')' => {
                i += 1;
                Tok::RParen
            }
            b'&' if next == Some(b'&') => {
                i += 2;
                Tok::AndAnd
            }
            b'|' if next == Some(b'|') => {
                i += 2;
                Tok::OrOr
            }
            b'!' if next == Some(b'=') => {
                i += 2;
                Tok::Cmp(CmpOp::Ne)
            }
            b'!' => {
                i += 1;
                Tok::Bang
            }
            b'=' if next == Some(b'=') => {
                i += 2;
                Tok::Cmp(CmpOp::Eq)
            }
            b'=' => return Err(ParseError::new(start, "use '==' for equality")),
            b'<' if next == Some(b'=') => {
                i += 2;
                Tok::Cmp(CmpOp::Le)
            }
            b'<' => {
                i += 1;
                Tok::Cmp(CmpOp::Lt)
            }
            b'>' if next == Some(b'=') => {
                i += 2;
                Tok::Cmp(CmpOp::Ge)
            }
            b'>' => {
                i += 1;
                Tok::Cmp(CmpOp::Gt)
            }
            b'\'' | b'"' => {
                let (text, end) = lex_string(input, start)?;
                i = end;
                Tok::Str(text)
            }
            b'`' => {
                let close = input[start + 1..]
                    .find('`')
                    .ok_or_else(|| ParseError::new(start, "unterminated quoted identifier"))?;
                let name = &input[start + 1..start + 1 + close];
                if name.is_empty() {
                    return Err(ParseError::new(start, "empty quoted identifier"));
                }
                i = start + close + 2;
                Tok::Ident(name.to_string())
            }
            b'0'..=b'9' => {
                let (tok, end) = lex_number(input, start)?;
                i = end;
                tok
            }
            b'-' if bytes.get(i + 1).is_some_and(u8::is_ascii_digit) => {
                let (tok, end) = lex_number(input, start)?;
                i = end;
                tok
            }
            b if b.is_ascii_alphabetic() || b == b'_' => {
                while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                    i += 1;
                }
                match &input[start..i] {
                    "true" => Tok::True,
                    "false" => Tok::False,
                    "null" => Tok::Null,
                    word => Tok::Ident(word.to_string()),
                }
            }
            _ => {
                let c = input[start..].chars().next().unwrap_or('?');
                return Err(ParseError::new(start, format!("unexpected character '{c}'")));
            }
        };
        tokens.push(Token { tok, offset: start });
    }

    tokens.push(Token {
        tok: Tok::End,
        offset: input.len(),
    });
    Ok(tokens)
}

/// Lex a quoted string starting at `start`; returns the text and the offset past the close quote.
fn lex_string(input: &str, start: usize) -> Result<(String, usize), ParseError> {
    let quote = input.as_bytes()[start] as char;
    let mut out = String::new();
    let mut chars = input[start + 1..].char_indices();

    while let Some((rel, c)) = chars.next() {
        match c {
            c if c == quote => return Ok((out, start + 1 + rel + 1)),
            '\\' => {
                let Some((_, escaped)) = chars.next() else { break };
                out.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    '\\' | '\'' | '"' => escaped,
                    other => {
                        return Err(ParseError::new(
                            start + 1 + rel,
                            format!("unknown escape '\\{other}'"),
                        ));
                    }
                });
            }
            c => out.push(c),
        }
    }
    Err(ParseError::new(start, "unterminated string literal"))
}

fn lex_number(input: &str, start: usize) -> Result<(Tok, usize), ParseError> {
    let bytes = input.as_bytes();
    let mut i = start;
    if bytes[i] == b'-' {
        i += 1;
    }
    let digits = |mut j: usize| {
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        j
    };
    i = digits(i);

    let mut real = false;
    if bytes.get(i) == Some(&b'.') && bytes.get(i + 1).is_some_and(u8::is_ascii_digit) {
        real = true;
        i = digits(i + 1);
    }
    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        if bytes.get(j).is_some_and(u8::is_ascii_digit) {
            real = true;
            i = digits(j);
        }
    }

    let text = &input[start..i];
    let tok = if real {
        let v: f64 = text
            .parse()
            .map_err(|_| ParseError::new(start, format!("invalid number '{text}'")))?;
        if !v.is_finite() {
            return Err(ParseError::new(start, format!("number out of range '{text}'")));
        }
        Tok::Real(v)
    } else {
        Tok::Int(
            text.parse()
                .map_err(|_| ParseError::new(start, format!("integer out of range '{text}'")))?,
        )
    };
    Ok((tok, i))
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        // The token list always ends with `End`, and `advance` never moves past it.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.tok != Tok::End {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, tok: &Tok) -> bool {
        if &self.peek().tok == tok {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn or_expr(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.and_expr()?;
        while self.eat(&Tok::OrOr) {
            let right = self.and_expr()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.unary()?;
        while self.eat(&Tok::AndAnd) {
            let right = self.unary()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        if self.eat(&Tok::Bang) {
            return Ok(Expr::Not(Box::new(self.unary()?)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.advance();
        match token.tok {
            Tok::LParen => {
                let inner = self.or_expr()?;
                let close = self.advance();
                if close.tok != Tok::RParen {
                    return Err(ParseError::new(
                        close.offset,
                        format!("expected ')' but found {}", close.tok.describe()),
                    ));
                }
                Ok(inner)
            }
            Tok::True => Ok(Expr::Literal(true)),
            Tok::False => Ok(Expr::Literal(false)),
            Tok::Ident(field) => self.comparison(field, token.offset),
            other => Err(ParseError::new(
                token.offset,
                format!("expected a column name, '(' or '!' but found {}", other.describe()),
            )),
        }
    }

    fn comparison(&mut self, field: String, field_offset: usize) -> Result<Expr, ParseError> {
        let op_token = self.advance();
        let Tok::Cmp(op) = op_token.tok else {
            return Err(ParseError::new(
                op_token.offset,
                format!(
                    "expected a comparison operator after '{field}' but found {}",
                    op_token.tok.describe()
                ),
            ));
        };

        let literal = self.advance();
        let value = match literal.tok {
            Tok::Int(i) => Value::Int(i),
            Tok::Real(r) => Value::Real(r),
            Tok::Str(s) => Value::Text(s),
            Tok::True => Value::Bool(true),
            Tok::False => Value::Bool(false),
            Tok::Null if matches!(op, CmpOp::Eq | CmpOp::Ne) => Value::Null,
            Tok::Null => {
                return Err(ParseError::new(
                    literal.offset,
                    format!("null can only be compared with '==' or '!=' (field '{field}' at {field_offset})"),
                ));
            }
            other => {
                return Err(ParseError::new(
                    literal.offset,
                    format!("expected a literal after '{}' but found {}", op.symbol(), other.describe()),
                ));
            }
        };
        Ok(Expr::compare(field, op, value))
    }
}
