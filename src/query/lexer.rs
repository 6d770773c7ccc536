//! Query tokenizer
//!
//! Turns raw input into a flat token stream. The lexer never fails: input
//! typed mid-edit (an open quote, a dangling `-`) still produces tokens,
//! and the parser decides what is wrong with them.

use serde::Serialize;

/// Comparison operator written in front of (or between) range values
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Gt,
    Gte,
    Lt,
    Lte,
    /// `..` between two bounds
    Range,
}

impl CompareOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
            CompareOp::Range => "..",
        }
    }
}

/// Token kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// Filter name or bare value word
    Ident,
    /// `:` directly after a filter name
    Colon,
    Compare(CompareOp),
    /// `"..."`, escapes left in place
    Quoted { terminated: bool },
    LParen,
    RParen,
    /// The `OR` keyword, any case
    Or,
    /// Leading `-` negating the following term
    Minus,
    Whitespace,
    Eof,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Ident => write!(f, "identifier"),
            Token::Colon => write!(f, "':'"),
            Token::Compare(op) => write!(f, "'{}'", op.as_str()),
            Token::Quoted { .. } => write!(f, "quoted string"),
            Token::LParen => write!(f, "'('"),
            Token::RParen => write!(f, "')'"),
            Token::Or => write!(f, "OR"),
            Token::Minus => write!(f, "'-'"),
            Token::Whitespace => write!(f, "whitespace"),
            Token::Eof => write!(f, "end of input"),
        }
    }
}

/// A token with its source text and character offsets (`end` exclusive)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpannedToken {
    pub token: Token,
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// Characters that end a word outside of value position
pub(crate) fn ends_name(c: char) -> bool {
    c.is_whitespace() || matches!(c, '(' | ')' | '"' | ':')
}

/// Characters that end a value word; colons are allowed inside values
pub(crate) fn ends_value(c: char) -> bool {
    c.is_whitespace() || matches!(c, '(' | ')' | '"')
}

pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    /// Set after a `name:` colon until the value is finished
    in_value: bool,
    last: Option<Token>,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
            in_value: false,
            last: None,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).copied()
    }

    fn at_range_marker(&self) -> bool {
        self.peek() == Some('.') && self.peek_at(1) == Some('.')
    }

    fn skip_while(&mut self, pred: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.pos += 1;
        }
    }

    fn read_quoted(&mut self) -> Token {
        // opening quote
        self.pos += 1;
        while let Some(c) = self.peek() {
            self.pos += 1;
            match c {
                '\\' => {
                    if self.peek().is_some() {
                        self.pos += 1;
                    }
                }
                '"' => return Token::Quoted { terminated: true },
                _ => {}
            }
        }
        Token::Quoted { terminated: false }
    }

    fn read_value(&mut self) -> Token {
        match self.peek() {
            Some(c @ ('>' | '<')) => {
                self.pos += 1;
                let or_equal = self.peek() == Some('=');
                if or_equal {
                    self.pos += 1;
                }
                Token::Compare(match (c, or_equal) {
                    ('>', false) => CompareOp::Gt,
                    ('>', true) => CompareOp::Gte,
                    (_, false) => CompareOp::Lt,
                    (_, true) => CompareOp::Lte,
                })
            }
            _ if self.at_range_marker() => {
                self.pos += 2;
                Token::Compare(CompareOp::Range)
            }
            _ => {
                while let Some(c) = self.peek() {
                    if ends_value(c) || self.at_range_marker() {
                        break;
                    }
                    self.pos += 1;
                }
                Token::Ident
            }
        }
    }

    fn read_name(&mut self) -> Token {
        let start = self.pos;
        self.skip_while(|c| !ends_name(c));
        let word: String = self.chars[start..self.pos].iter().collect();
        if word.eq_ignore_ascii_case("or") && self.peek() != Some(':') {
            Token::Or
        } else {
            Token::Ident
        }
    }

    pub fn next_token(&mut self) -> SpannedToken {
        let start = self.pos;

        let token = match self.peek() {
            None => Token::Eof,
            Some(c) if c.is_whitespace() => {
                self.skip_while(char::is_whitespace);
                self.in_value = false;
                Token::Whitespace
            }
            Some('(') => {
                self.pos += 1;
                self.in_value = false;
                Token::LParen
            }
            Some(')') => {
                self.pos += 1;
                self.in_value = false;
                Token::RParen
            }
            Some('"') => {
                self.in_value = false;
                self.read_quoted()
            }
            Some(_) if self.in_value => self.read_value(),
            Some(':') => {
                self.pos += 1;
                // only a colon glued to a name opens a value
                self.in_value = self.last == Some(Token::Ident);
                Token::Colon
            }
            Some('-') => {
                self.pos += 1;
                Token::Minus
            }
            Some(_) => self.read_name(),
        };

        self.last = Some(token);
        SpannedToken {
            token,
            text: self.chars[start..self.pos].iter().collect(),
            start,
            end: self.pos,
        }
    }

    /// Tokenize the entire input; the last token is always `Eof`
    pub fn tokenize(&mut self) -> Vec<SpannedToken> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.token == Token::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }
}

pub fn tokenize(input: &str) -> Vec<SpannedToken> {
    Lexer::new(input).tokenize()
}
