//! Shapes handed to the UI
//!
//! Engine diagnostics only know character offsets; here they are resolved
//! against the query text into line/column positions.

use serde::Serialize;

use super::ast::{filters_used, AstNode};
use super::error::{Diagnostic, ErrorPosition, QueryParseError};
use super::suggest::Suggestion;

/// Resolve a character offset into a 1-based line and column
pub fn locate(input: &str, offset: usize) -> ErrorPosition {
    let mut line = 1;
    let mut column = 1;
    for c in input.chars().take(offset) {
        if c == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    ErrorPosition { line, column, offset }
}

impl Diagnostic {
    pub fn into_error(self, input: &str) -> QueryParseError {
        QueryParseError {
            message: self.message,
            code: self.code,
            suggestions: self.suggestions,
            position: self.offset.map(|offset| locate(input, offset)),
        }
    }
}

/// Parse and validation outcome for one query
///
/// `parsed` and `valid` are separate signals: a query can parse into an AST
/// and still carry a semantic error the UI shows as an advisory.
#[derive(Debug, Clone, Serialize)]
pub struct QueryReport {
    pub parsed: bool,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ast: Option<AstNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters_used: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<QueryParseError>,
}

impl QueryReport {
    pub fn success(ast: AstNode) -> Self {
        Self {
            parsed: true,
            valid: true,
            filters_used: Some(filters_used(&ast)),
            ast: Some(ast),
            error: None,
        }
    }

    /// Parsed, but rejected by the validator
    pub fn invalid(ast: AstNode, error: QueryParseError) -> Self {
        Self {
            parsed: true,
            valid: false,
            filters_used: Some(filters_used(&ast)),
            ast: Some(ast),
            error: Some(error),
        }
    }

    pub fn syntax_error(error: QueryParseError) -> Self {
        Self {
            parsed: false,
            valid: false,
            ast: None,
            filters_used: None,
            error: Some(error),
        }
    }
}

/// Suggestion payload for the UI dropdown
#[derive(Debug, Clone, Serialize)]
pub struct SuggestionList {
    pub suggestions: Vec<Suggestion>,
}

impl From<Vec<Suggestion>> for SuggestionList {
    fn from(suggestions: Vec<Suggestion>) -> Self {
        Self { suggestions }
    }
}
