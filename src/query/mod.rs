//! Search query language
//!
//! Pipeline: raw text → [`lexer`] → [`parser`] → [`AstNode`] → [`validator`].
//! The [`suggest`] pass runs independently off the same text and cursor.
//! Every entry point is a pure function of its arguments.

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod report;
pub mod schema;
pub mod suggest;
pub mod validator;

pub use ast::{filters_used, AstNode, ClauseSpan, FilterClause, Joiner, Operator};
pub use error::{Diagnostic, ErrorCode, ErrorPosition, QueryParseError};
pub use lexer::{tokenize, SpannedToken, Token};
pub use report::{QueryReport, SuggestionList};
pub use schema::{FilterMeta, FilterRegistry, ValueKind, REGISTRY};
pub use suggest::{Suggestion, MAX_SUGGESTIONS};

/// Default clause limit, matching the search backend's query clause cap
pub const DEFAULT_MAX_CLAUSES: usize = 20;

/// Knobs for `parse_query_with` / `analyze`
#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    /// Reject queries with more filter clauses than this
    pub max_clauses: Option<usize>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_clauses: Some(DEFAULT_MAX_CLAUSES),
        }
    }
}

fn parse_syntax(query: &str, options: &ParseOptions) -> Result<AstNode, Diagnostic> {
    let ast = parser::parse(tokenize(query))?;
    if let Some(max) = options.max_clauses {
        let count = ast.clauses().len();
        if count > max {
            return Err(Diagnostic::whole_query(
                ErrorCode::TooManyClauses,
                format!("Query has {} filters; at most {} are allowed", count, max),
            ));
        }
    }
    Ok(ast)
}

/// Parse and validate a query with the default options
pub fn parse_query(query: &str) -> Result<AstNode, QueryParseError> {
    parse_query_with(query, &ParseOptions::default())
}

pub fn parse_query_with(query: &str, options: &ParseOptions) -> Result<AstNode, QueryParseError> {
    let result = parse_syntax(query, options)
        .and_then(|ast| validator::validate(&ast, &REGISTRY).map(|_| ast));
    result.map_err(|diag| {
        tracing::debug!(code = %diag.code, offset = ?diag.offset, "query rejected");
        diag.into_error(query)
    })
}

/// Parse and validate, keeping the AST when only validation fails
pub fn analyze(query: &str, options: &ParseOptions) -> QueryReport {
    let ast = match parse_syntax(query, options) {
        Ok(ast) => ast,
        Err(diag) => {
            tracing::debug!(code = %diag.code, offset = ?diag.offset, "query has syntax error");
            return QueryReport::syntax_error(diag.into_error(query));
        }
    };
    match validator::validate(&ast, &REGISTRY) {
        Ok(()) => QueryReport::success(ast),
        Err(diag) => {
            tracing::debug!(code = %diag.code, offset = ?diag.offset, "query failed validation");
            QueryReport::invalid(ast, diag.into_error(query))
        }
    }
}

/// Completion candidates for `query` with the cursor at character offset `cursor_offset`
pub fn generate_suggestions(query: &str, cursor_offset: usize) -> Vec<Suggestion> {
    suggest::suggest(query, cursor_offset)
}
