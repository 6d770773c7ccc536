//! Query AST
//!
//! Example queries:
//! - `game:valorant votes:>50 sort:popular`
//! - `(tag:funny OR tag:fail) -is:nsfw`
//! - `views:1000..5000 after:last_week`

use serde::Serialize;

use super::lexer::ends_value;

/// How a clause compares its value
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operator {
    /// `name:value`
    Eq,
    /// `name:>value`
    Gt,
    /// `name:>=value`
    Gte,
    /// `name:<value`
    Lt,
    /// `name:<=value`
    Lte,
    /// `name:lo..hi`
    Range { lo: String, hi: String },
}

impl Operator {
    pub fn is_comparison(&self) -> bool {
        !matches!(self, Operator::Eq)
    }
}

/// How a group combines its children
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Joiner {
    And,
    Or,
}

/// Character offsets of a clause in the source text
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
pub struct ClauseSpan {
    pub start: usize,
    pub end: usize,
    /// First character after the colon
    pub value_start: usize,
}

/// A single `name:value` term
#[derive(Debug, Clone, Serialize)]
pub struct FilterClause {
    /// Lower-cased filter name
    pub name: String,
    pub operator: Operator,
    /// Unescaped value text; `lo..hi` for ranges
    pub value: String,
    pub position: ClauseSpan,
}

// Positions are source metadata; two clauses with the same meaning are equal
// wherever they were typed.
impl PartialEq for FilterClause {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.operator == other.operator && self.value == other.value
    }
}

impl Eq for FilterClause {}

/// Node of a parsed query
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AstNode {
    FilterClause(FilterClause),
    Negated { inner: Box<AstNode> },
    Group { children: Vec<AstNode>, joiner: Joiner },
}

impl AstNode {
    pub fn is_empty(&self) -> bool {
        matches!(self, AstNode::Group { children, .. } if children.is_empty())
    }

    /// Every clause in pre-order (left-to-right, outer-to-inner)
    pub fn clauses(&self) -> Vec<&FilterClause> {
        let mut out = Vec::new();
        collect_clauses(self, &mut out);
        out
    }
}

fn collect_clauses<'a>(node: &'a AstNode, out: &mut Vec<&'a FilterClause>) {
    match node {
        AstNode::FilterClause(clause) => out.push(clause),
        AstNode::Negated { inner } => collect_clauses(inner, out),
        AstNode::Group { children, .. } => {
            for child in children {
                collect_clauses(child, out);
            }
        }
    }
}

/// Filter names used by a query, sorted and de-duplicated
pub fn filters_used(node: &AstNode) -> Vec<String> {
    let mut names: Vec<String> = node.clauses().into_iter().map(|c| c.name.clone()).collect();
    names.sort();
    names.dedup();
    names
}

fn needs_quotes(value: &str) -> bool {
    value.is_empty()
        || value.contains("..")
        || value.starts_with(['>', '<'])
        || value.chars().any(|c| ends_value(c) || c == '\\')
}

fn write_value(f: &mut std::fmt::Formatter<'_>, value: &str) -> std::fmt::Result {
    if !needs_quotes(value) {
        return write!(f, "{}", value);
    }
    write!(f, "\"")?;
    for c in value.chars() {
        if matches!(c, '"' | '\\') {
            write!(f, "\\")?;
        }
        write!(f, "{}", c)?;
    }
    write!(f, "\"")
}

impl std::fmt::Display for FilterClause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:", self.name)?;
        match &self.operator {
            Operator::Eq => write_value(f, &self.value),
            Operator::Gt => write!(f, ">").and_then(|_| write_value(f, &self.value)),
            Operator::Gte => write!(f, ">=").and_then(|_| write_value(f, &self.value)),
            Operator::Lt => write!(f, "<").and_then(|_| write_value(f, &self.value)),
            Operator::Lte => write!(f, "<=").and_then(|_| write_value(f, &self.value)),
            Operator::Range { lo, hi } => {
                write_value(f, lo)?;
                write!(f, "..")?;
                write_value(f, hi)
            }
        }
    }
}

/// Write a node in term position: groups get their parentheses back
fn write_term(f: &mut std::fmt::Formatter<'_>, node: &AstNode) -> std::fmt::Result {
    match node {
        AstNode::Group { .. } => write!(f, "({})", node),
        AstNode::Negated { inner } => {
            write!(f, "-")?;
            write_term(f, inner)
        }
        AstNode::FilterClause(clause) => write!(f, "{}", clause),
    }
}

/// Canonical query text. The root group is written without parentheses.
impl std::fmt::Display for AstNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AstNode::Group { children, joiner } => {
                let sep = match joiner {
                    Joiner::And => " ",
                    Joiner::Or => " OR ",
                };
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, "{}", sep)?;
                    }
                    write_term(f, child)?;
                }
                Ok(())
            }
            other => write_term(f, other),
        }
    }
}
