//! A small reader for the GML dialect written by networkx.
//!
//! A document is a sequence of `key value` pairs. Values are integers, reals,
//! double-quoted strings or bracketed lists of further pairs. Keys may repeat
//! (networkx encodes list-valued attributes that way), so lists are kept as
//! ordered vectors rather than maps.

use std::iter::Peekable;
use std::str::Chars;

use crate::error::{DbError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Real(f64),
    Str(String),
    List(Vec<Entry>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub key: String,
    pub value: Value,
    /// Line of the key, for error messages.
    pub line: usize,
}

impl Value {
    pub fn as_list(&self) -> Option<&[Entry]> {
        match self {
            Value::List(entries) => Some(entries),
            _ => None,
        }
    }
}

/// All entries of `entries` with the given key, in document order.
pub fn entries_with_key<'a>(
    entries: &'a [Entry],
    key: &'a str,
) -> impl Iterator<Item = &'a Entry> + 'a {
    entries.iter().filter(move |entry| entry.key == key)
}

/// Parse a whole GML document into its top-level entries.
pub fn parse(text: &str) -> Result<Vec<Entry>> {
    let mut lexer = Lexer::new(text);
    parse_entries(&mut lexer, None)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Key(String),
    Int(i64),
    Real(f64),
    Str(String),
    Open,
    Close,
}

struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
}

impl<'a> Lexer<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            chars: text.chars().peekable(),
            line: 1,
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn skip_blank(&mut self) {
        while let Some(&c) = self.chars.peek() {
            if c.is_whitespace() {
                self.bump();
            } else if c == '#' {
                while let Some(c) = self.bump() {
                    if c == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    fn take_while(&mut self, buf: &mut String, pred: impl Fn(char) -> bool) {
        while let Some(&c) = self.chars.peek() {
            if !pred(c) {
                break;
            }
            buf.push(c);
            self.bump();
        }
    }

    /// Next token together with the line it starts on.
    fn next_token(&mut self) -> Result<Option<(Token, usize)>> {
        self.skip_blank();
        let line = self.line;
        let c = match self.chars.peek() {
            Some(&c) => c,
            None => return Ok(None),
        };
        let token = match c {
            '[' => {
                self.bump();
                Token::Open
            }
            ']' => {
                self.bump();
                Token::Close
            }
            '"' => {
                self.bump();
                let mut raw = String::new();
                loop {
                    match self.bump() {
                        Some('"') => break,
                        Some(c) => raw.push(c),
                        None => return Err(DbError::parse(line, "unterminated string")),
                    }
                }
                Token::Str(unescape(&raw))
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut word = String::new();
                self.take_while(&mut word, |c| c.is_ascii_alphanumeric() || c == '_');
                Token::Key(word)
            }
            c if c.is_ascii_digit() || matches!(c, '+' | '-' | '.') => {
                let mut number = String::new();
                self.take_while(&mut number, |c| {
                    c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')
                });
                parse_number(&number).ok_or_else(|| {
                    DbError::parse(line, format!("invalid number '{number}'"))
                })?
            }
            c => return Err(DbError::parse(line, format!("unexpected character '{c}'"))),
        };
        Ok(Some((token, line)))
    }
}

fn parse_number(text: &str) -> Option<Token> {
    let unsigned = text.trim_start_matches(['+', '-']);
    if unsigned == "INF" || unsigned == "NAN" {
        let value = if unsigned == "NAN" {
            f64::NAN
        } else if text.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
        return Some(Token::Real(value));
    }
    if !unsigned.bytes().all(|b| b.is_ascii_digit() || b"+-.eE".contains(&b)) {
        return None;
    }
    if text.contains(['.', 'e', 'E']) {
        text.parse().ok().map(Token::Real)
    } else {
        text.parse().ok().map(Token::Int)
    }
}

/// `opened_at` is the line of the enclosing `[`, or None at top level.
fn parse_entries(lexer: &mut Lexer, opened_at: Option<usize>) -> Result<Vec<Entry>> {
    let mut entries = vec![];
    loop {
        let (token, line) = match lexer.next_token()? {
            Some(next) => next,
            None => match opened_at {
                Some(open) => return Err(DbError::parse(open, "unclosed '['")),
                None => return Ok(entries),
            },
        };
        let key = match token {
            Token::Key(key) => key,
            Token::Close if opened_at.is_some() => return Ok(entries),
            Token::Close => return Err(DbError::parse(line, "unexpected ']'")),
            other => return Err(DbError::parse(line, format!("expected a key, found {other:?}"))),
        };
        let value = parse_value(lexer, &key, line)?;
        entries.push(Entry { key, value, line });
    }
}

fn parse_value(lexer: &mut Lexer, key: &str, key_line: usize) -> Result<Value> {
    let (token, line) = lexer
        .next_token()?
        .ok_or_else(|| DbError::parse(key_line, format!("key '{key}' has no value")))?;
    match token {
        Token::Int(i) => Ok(Value::Int(i)),
        Token::Real(r) => Ok(Value::Real(r)),
        Token::Str(s) => Ok(Value::Str(s)),
        Token::Open => parse_entries(lexer, Some(line)).map(Value::List),
        Token::Key(word) if word == "INF" => Ok(Value::Real(f64::INFINITY)),
        Token::Key(word) if word == "NAN" => Ok(Value::Real(f64::NAN)),
        other => Err(DbError::parse(
            line,
            format!("expected a value for key '{key}', found {other:?}"),
        )),
    }
}

/// Decode the HTML character references networkx uses to escape strings.
/// Unknown references are left as they are.
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        let decoded = rest
            .find(';')
            .and_then(|end| decode_reference(&rest[1..end]).map(|c| (c, end)));
        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_reference(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "quot" => Some('"'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "apos" => Some('\''),
        _ => {
            let code = name.strip_prefix('#')?;
            let code = match code.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}
