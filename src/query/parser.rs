//! Recursive descent parser
//!
//! ```text
//! query      := term*                      (implicit AND)
//! term       := '-'? (clause | group)
//! group      := '(' term (OR term)* ')'
//! clause     := IDENT ':' value
//! value      := STRING | comparison | enum-word
//! comparison := ('>'|'>='|'<'|'<=') literal | literal '..' literal
//! ```
//!
//! `OR` only means something inside a group, and groups do not nest.

use super::ast::{AstNode, ClauseSpan, FilterClause, Joiner, Operator};
use super::error::{Diagnostic, ErrorCode};
use super::lexer::{CompareOp, SpannedToken, Token};

pub struct Parser {
    tokens: Vec<SpannedToken>,
    pos: usize,
    in_group: bool,
}

impl Parser {
    pub fn new(mut tokens: Vec<SpannedToken>) -> Self {
        if tokens.last().map(|t| t.token) != Some(Token::Eof) {
            let end = tokens.last().map(|t| t.end).unwrap_or(0);
            tokens.push(SpannedToken {
                token: Token::Eof,
                text: String::new(),
                start: end,
                end,
            });
        }
        Self {
            tokens,
            pos: 0,
            in_group: false,
        }
    }

    fn current(&self) -> &SpannedToken {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self) -> Token {
        self.current().token
    }

    fn advance(&mut self) -> SpannedToken {
        let current = self.current().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        current
    }

    fn skip_whitespace(&mut self) {
        while self.peek() == Token::Whitespace {
            self.advance();
        }
    }

    fn malformed(&self, message: impl Into<String>) -> Diagnostic {
        Diagnostic::at(ErrorCode::MalformedClause, self.current().start, message)
    }

    /// Parse the whole token stream into the root `And` group
    pub fn parse(&mut self) -> Result<AstNode, Diagnostic> {
        if let Some(open) = self
            .tokens
            .iter()
            .find(|t| matches!(t.token, Token::Quoted { terminated: false }))
        {
            return Err(Diagnostic::at(
                ErrorCode::UnbalancedQuotes,
                open.start,
                "Missing closing quote",
            )
            .with_suggestions(vec![format!("close the quote: {}\"", open.text)]));
        }

        let mut children = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                Token::Eof => break,
                Token::RParen => {
                    return Err(Diagnostic::at(
                        ErrorCode::UnbalancedParens,
                        self.current().start,
                        "Unmatched ')'",
                    ));
                }
                Token::Or => {
                    return Err(self
                        .malformed("OR is only allowed inside parentheses")
                        .with_suggestions(vec![
                            "group the alternatives: (tag:funny OR tag:fail)".to_string(),
                        ]));
                }
                _ => children.push(self.parse_term()?),
            }
        }

        Ok(AstNode::Group {
            children,
            joiner: Joiner::And,
        })
    }

    /// term := '-'? (clause | group)
    fn parse_term(&mut self) -> Result<AstNode, Diagnostic> {
        match self.peek() {
            Token::Minus => {
                self.advance();
                match self.peek() {
                    Token::Ident | Token::LParen => {
                        let inner = self.parse_term()?;
                        Ok(AstNode::Negated {
                            inner: Box::new(inner),
                        })
                    }
                    _ => Err(self.malformed("Expected a filter or group after '-'")),
                }
            }
            Token::LParen => self.parse_group(),
            Token::Ident => self.parse_clause(),
            Token::Colon => Err(self.malformed("Value has no filter name before ':'")),
            other => Err(self.malformed(format!(
                "Expected a filter like name:value but got {}",
                other
            ))),
        }
    }

    /// group := '(' term (OR term)* ')'
    fn parse_group(&mut self) -> Result<AstNode, Diagnostic> {
        let open = self.advance();
        if self.in_group {
            return Err(Diagnostic::at(
                ErrorCode::MalformedClause,
                open.start,
                "Nested groups are not supported",
            ));
        }

        self.skip_whitespace();
        match self.peek() {
            Token::RParen => {
                return Err(Diagnostic::at(ErrorCode::EmptyQuery, open.start, "Empty group '()'"));
            }
            Token::Eof => return Err(unclosed(&open)),
            _ => {}
        }

        self.in_group = true;
        let result = self.parse_group_body(&open);
        self.in_group = false;
        result
    }

    fn parse_group_body(&mut self, open: &SpannedToken) -> Result<AstNode, Diagnostic> {
        let mut children = vec![self.parse_term()?];
        let mut saw_or = false;

        loop {
            self.skip_whitespace();
            match self.peek() {
                Token::RParen => {
                    self.advance();
                    break;
                }
                Token::Eof => return Err(unclosed(open)),
                Token::Or => {
                    self.advance();
                    saw_or = true;
                    self.skip_whitespace();
                    if matches!(self.peek(), Token::RParen | Token::Eof | Token::Or) {
                        return Err(self.malformed("Expected a filter after OR"));
                    }
                    children.push(self.parse_term()?);
                }
                _ => {
                    return Err(self
                        .malformed("Expected OR or ')'")
                        .with_suggestions(vec!["separate alternatives with OR".to_string()]));
                }
            }
        }

        Ok(AstNode::Group {
            children,
            joiner: if saw_or { Joiner::Or } else { Joiner::And },
        })
    }

    /// clause := IDENT ':' value
    fn parse_clause(&mut self) -> Result<AstNode, Diagnostic> {
        let name = self.advance();
        if self.peek() != Token::Colon {
            return Err(Diagnostic::at(
                ErrorCode::MalformedClause,
                name.start,
                format!("Expected a filter like name:value but got '{}'", name.text),
            )
            .with_suggestions(vec![format!("{}:", name.text.to_lowercase())]));
        }
        let colon = self.advance();
        let value_start = colon.end;

        let (operator, value) = match self.peek() {
            Token::Compare(op) => {
                let operator = match op {
                    CompareOp::Gt => Operator::Gt,
                    CompareOp::Gte => Operator::Gte,
                    CompareOp::Lt => Operator::Lt,
                    CompareOp::Lte => Operator::Lte,
                    CompareOp::Range => {
                        return Err(self.malformed("Missing lower bound before '..'"));
                    }
                };
                self.advance();
                let value = self.expect_literal(op.as_str())?;
                if self.peek() == Token::Compare(CompareOp::Range) {
                    let message = format!("Cannot combine '{}' with a range", op.as_str());
                    return Err(self.malformed(message));
                }
                (operator, value)
            }
            Token::Ident | Token::Quoted { .. } => {
                let lo = self.expect_literal(":")?;
                if self.peek() == Token::Compare(CompareOp::Range) {
                    self.advance();
                    let hi = self.expect_literal("..")?;
                    if self.peek() == Token::Compare(CompareOp::Range) {
                        return Err(self.malformed("A range has exactly two bounds"));
                    }
                    let value = format!("{}..{}", lo, hi);
                    (Operator::Range { lo, hi }, value)
                } else {
                    (Operator::Eq, lo)
                }
            }
            _ => {
                return Err(self.malformed(format!("Missing value after '{}:'", name.text)));
            }
        };

        let end = self.tokens[self.pos.saturating_sub(1)].end;
        Ok(AstNode::FilterClause(FilterClause {
            name: name.text.to_lowercase(),
            operator,
            value,
            position: ClauseSpan {
                start: name.start,
                end,
                value_start,
            },
        }))
    }

    fn expect_literal(&mut self, after: &str) -> Result<String, Diagnostic> {
        match self.peek() {
            Token::Ident => Ok(self.advance().text),
            Token::Quoted { .. } => {
                let value = unescape(&self.current().text);
                if value.is_empty() {
                    return Err(self.malformed("Empty quoted value"));
                }
                self.advance();
                Ok(value)
            }
            _ => Err(self.malformed(format!("Missing value after '{}'", after))),
        }
    }
}

fn unclosed(open: &SpannedToken) -> Diagnostic {
    Diagnostic::whole_query(
        ErrorCode::UnbalancedParens,
        format!("Unclosed '(' at column {}", open.start + 1),
    )
    .with_suggestions(vec!["add ')' to close the group".to_string()])
}

/// Strip the surrounding quotes and resolve backslash escapes
fn unescape(raw: &str) -> String {
    let inner = raw.strip_prefix('"').unwrap_or(raw);
    let inner = inner.strip_suffix('"').unwrap_or(inner);
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    out
}

pub fn parse(tokens: Vec<SpannedToken>) -> Result<AstNode, Diagnostic> {
    Parser::new(tokens).parse()
}
