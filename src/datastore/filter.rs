//! Filter expressions for the bundled data store
//!
//! A small SQL-like predicate language evaluated against in-memory records:
//!
//! ```text
//! port = 445 AND proto = 'tcp'
//! os_name LIKE 'Windows%' OR (name ILIKE '%smb%' AND state != 'closed')
//! info IS NOT NULL
//! ```
//!
//! `AND` binds tighter than `OR`. Keywords are case-insensitive. A blank
//! filter matches every record.

use crate::datastore::Record;
use crate::document::types::scalar_to_string;
use crate::error::{QueryError, QueryResult};
use regex::Regex;
use serde_yaml::Value;
use std::cmp::Ordering;

/// A parsed filter expression
#[derive(Debug, Clone)]
pub struct Filter {
    expr: Expr,
}

impl Filter {
    /// Parse a filter expression
    pub fn parse(input: &str) -> QueryResult<Self> {
        let tokens = tokenize(input)?;
        if tokens.is_empty() {
            return Ok(Filter { expr: Expr::All });
        }

        let mut parser = Parser {
            tokens,
            pos: 0,
            depth: 0,
        };
        let expr = parser.parse_or()?;
        if let Some(token) = parser.peek() {
            return Err(filter_error(format!("unexpected {}", token.describe())));
        }

        Ok(Filter { expr })
    }

    /// Whether `record` satisfies the filter
    pub fn matches(&self, record: &Record) -> bool {
        self.expr.matches(record)
    }
}

#[derive(Debug, Clone)]
enum Expr {
    All,
    Or(Vec<Expr>),
    And(Vec<Expr>),
    Compare {
        field: String,
        op: CmpOp,
        value: Literal,
    },
    Like {
        field: String,
        pattern: Regex,
    },
    IsNull {
        field: String,
        negated: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, PartialEq)]
enum Literal {
    Str(String),
    Num(f64),
    Bool(bool),
    Null,
}

impl Expr {
    fn matches(&self, record: &Record) -> bool {
        match self {
            Expr::All => true,
            Expr::Or(exprs) => exprs.iter().any(|e| e.matches(record)),
            Expr::And(exprs) => exprs.iter().all(|e| e.matches(record)),
            Expr::Compare { field, op, value } => compare(lookup(record, field), *op, value),
            Expr::Like { field, pattern } => lookup(record, field)
                .and_then(scalar_to_string)
                .map(|s| pattern.is_match(&s))
                .unwrap_or(false),
            Expr::IsNull { field, negated } => lookup(record, field).is_none() != *negated,
        }
    }
}

/// Field value, treating YAML null the same as a missing field
fn lookup<'a>(record: &'a Record, field: &str) -> Option<&'a Value> {
    record.get(field).filter(|v| !v.is_null())
}

fn compare(field: Option<&Value>, op: CmpOp, literal: &Literal) -> bool {
    let field = match (field, literal) {
        (None, Literal::Null) => return op == CmpOp::Eq,
        (Some(_), Literal::Null) => return op == CmpOp::Ne,
        (None, _) => return false,
        (Some(field), _) => field,
    };

    let ordering = match literal {
        Literal::Num(n) => as_number(field).and_then(|f| f.partial_cmp(n)),
        Literal::Bool(b) => as_bool(field).map(|f| f.cmp(b)),
        Literal::Str(s) => scalar_to_string(field).map(|f| f.as_str().cmp(s.as_str())),
        Literal::Null => None,
    };

    match ordering {
        Some(ordering) => match op {
            CmpOp::Eq => ordering == Ordering::Equal,
            CmpOp::Ne => ordering != Ordering::Equal,
            CmpOp::Lt => ordering == Ordering::Less,
            CmpOp::Le => ordering != Ordering::Greater,
            CmpOp::Gt => ordering == Ordering::Greater,
            CmpOp::Ge => ordering != Ordering::Less,
        },
        // Incomparable values are never equal
        None => op == CmpOp::Ne,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => s.trim().to_lowercase().parse().ok(),
        _ => None,
    }
}

/// Translate a LIKE pattern (`%` any run, `_` any char) into an anchored regex
fn like_pattern(pattern: &str, case_insensitive: bool) -> QueryResult<Regex> {
    let mut re = String::from(if case_insensitive { "(?is)^" } else { "(?s)^" });
    let mut buf = [0u8; 4];
    for c in pattern.chars() {
        match c {
            '%' => re.push_str(".*"),
            '_' => re.push('.'),
            c => re.push_str(&regex::escape(c.encode_utf8(&mut buf))),
        }
    }
    re.push('$');

    Regex::new(&re).map_err(|e| filter_error(format!("invalid LIKE pattern: {}", e)))
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Word(String),
    Str(String),
    Num(f64),
    Op(CmpOp),
    LParen,
    RParen,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Word(w) => format!("'{}'", w),
            Token::Str(s) => format!("string '{}'", s),
            Token::Num(n) => format!("number {}", n),
            Token::Op(op) => format!("operator {:?}", op),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
        }
    }

    fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self, Token::Word(w) if w.eq_ignore_ascii_case(keyword))
    }
}

fn tokenize(input: &str) -> QueryResult<Vec<Token>> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '\'' | '"' => {
                let quote = c;
                let mut value = String::new();
                i += 1;
                loop {
                    match chars.get(i) {
                        None => return Err(filter_error("unterminated string literal")),
                        // SQL style doubled quote
                        Some(&q) if q == quote && chars.get(i + 1) == Some(&quote) => {
                            value.push(quote);
                            i += 2;
                        }
                        Some(&q) if q == quote => {
                            i += 1;
                            break;
                        }
                        Some(&other) => {
                            value.push(other);
                            i += 1;
                        }
                    }
                }
                tokens.push(Token::Str(value));
            }
            '=' => {
                i += if chars.get(i + 1) == Some(&'=') { 2 } else { 1 };
                tokens.push(Token::Op(CmpOp::Eq));
            }
            '!' if chars.get(i + 1) == Some(&'=') => {
                tokens.push(Token::Op(CmpOp::Ne));
                i += 2;
            }
            '<' => match chars.get(i + 1) {
                Some('=') => {
                    tokens.push(Token::Op(CmpOp::Le));
                    i += 2;
                }
                Some('>') => {
                    tokens.push(Token::Op(CmpOp::Ne));
                    i += 2;
                }
                _ => {
                    tokens.push(Token::Op(CmpOp::Lt));
                    i += 1;
                }
            },
            '>' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::Op(CmpOp::Ge));
                    i += 2;
                } else {
                    tokens.push(Token::Op(CmpOp::Gt));
                    i += 1;
                }
            }
            c if c.is_ascii_digit() || (c == '-' && next_is_digit(&chars, i)) => {
                let start = i;
                i += 1;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let raw: String = chars[start..i].iter().collect();
                let number = raw
                    .parse()
                    .map_err(|_| filter_error(format!("invalid number '{}'", raw)))?;
                tokens.push(Token::Num(number));
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len()
                    && (chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '.')
                {
                    i += 1;
                }
                tokens.push(Token::Word(chars[start..i].iter().collect()));
            }
            other => {
                return Err(filter_error(format!("unexpected character '{}'", other)));
            }
        }
    }

    Ok(tokens)
}

fn next_is_digit(chars: &[char], i: usize) -> bool {
    chars.get(i + 1).map(|c| c.is_ascii_digit()).unwrap_or(false)
}

/// Deepest parenthesis nesting accepted
const MAX_DEPTH: usize = 64;

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.peek().map(|t| t.is_keyword(keyword)).unwrap_or(false) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_or(&mut self) -> QueryResult<Expr> {
        let mut terms = vec![self.parse_and()?];
        while self.eat_keyword("or") {
            terms.push(self.parse_and()?);
        }
        Ok(if terms.len() == 1 {
            terms.remove(0)
        } else {
            Expr::Or(terms)
        })
    }

    fn parse_and(&mut self) -> QueryResult<Expr> {
        let mut terms = vec![self.parse_predicate()?];
        while self.eat_keyword("and") {
            terms.push(self.parse_predicate()?);
        }
        Ok(if terms.len() == 1 {
            terms.remove(0)
        } else {
            Expr::And(terms)
        })
    }

    fn parse_predicate(&mut self) -> QueryResult<Expr> {
        let field = match self.next() {
            Some(Token::LParen) => {
                if self.depth >= MAX_DEPTH {
                    return Err(filter_error("filter nested too deeply"));
                }
                self.depth += 1;
                let expr = self.parse_or()?;
                self.depth -= 1;
                return match self.next() {
                    Some(Token::RParen) => Ok(expr),
                    _ => Err(filter_error("missing closing ')'")),
                };
            }
            Some(Token::Word(word)) if !is_reserved(&word) => word,
            Some(token) => {
                return Err(filter_error(format!(
                    "expected a field name, found {}",
                    token.describe()
                )))
            }
            None => return Err(filter_error("expected a field name, found end of input")),
        };

        if self.eat_keyword("is") {
            let negated = self.eat_keyword("not");
            if !self.eat_keyword("null") {
                return Err(filter_error(format!("expected NULL after IS in '{}'", field)));
            }
            return Ok(Expr::IsNull { field, negated });
        }

        let case_insensitive = match self.peek() {
            Some(t) if t.is_keyword("like") => Some(false),
            Some(t) if t.is_keyword("ilike") => Some(true),
            _ => None,
        };
        if let Some(case_insensitive) = case_insensitive {
            self.pos += 1;
            return match self.next() {
                Some(Token::Str(pattern)) => Ok(Expr::Like {
                    field,
                    pattern: like_pattern(&pattern, case_insensitive)?,
                }),
                _ => Err(filter_error("LIKE needs a quoted pattern")),
            };
        }

        let op = match self.next() {
            Some(Token::Op(op)) => op,
            Some(token) => {
                return Err(filter_error(format!(
                    "expected an operator after '{}', found {}",
                    field,
                    token.describe()
                )))
            }
            None => {
                return Err(filter_error(format!(
                    "expected an operator after '{}'",
                    field
                )))
            }
        };

        let value = match self.next() {
            Some(Token::Str(s)) => Literal::Str(s),
            Some(Token::Num(n)) => Literal::Num(n),
            Some(t) if t.is_keyword("true") => Literal::Bool(true),
            Some(t) if t.is_keyword("false") => Literal::Bool(false),
            Some(t) if t.is_keyword("null") => Literal::Null,
            Some(token) => {
                return Err(filter_error(format!(
                    "expected a value, found {}",
                    token.describe()
                )))
            }
            None => return Err(filter_error("expected a value, found end of input")),
        };

        Ok(Expr::Compare { field, op, value })
    }
}

fn is_reserved(word: &str) -> bool {
    ["and", "or", "like", "ilike", "is", "not", "null"]
        .iter()
        .any(|k| word.eq_ignore_ascii_case(k))
}

fn filter_error(message: impl Into<String>) -> QueryError {
    QueryError::Filter(message.into())
}
