use serde::Serialize;

/// Stable error codes shown to the UI
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // syntax
    UnbalancedParens,
    UnbalancedQuotes,
    EmptyQuery,
    MalformedClause,
    TooManyClauses,
    // semantics
    UnknownFilter,
    InvalidEnumValue,
    InvalidRangeSyntax,
    InvalidDateSyntax,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::UnbalancedParens => "UNBALANCED_PARENS",
            ErrorCode::UnbalancedQuotes => "UNBALANCED_QUOTES",
            ErrorCode::EmptyQuery => "EMPTY_QUERY",
            ErrorCode::MalformedClause => "MALFORMED_CLAUSE",
            ErrorCode::TooManyClauses => "TOO_MANY_CLAUSES",
            ErrorCode::UnknownFilter => "UNKNOWN_FILTER",
            ErrorCode::InvalidEnumValue => "INVALID_ENUM_VALUE",
            ErrorCode::InvalidRangeSyntax => "INVALID_RANGE_SYNTAX",
            ErrorCode::InvalidDateSyntax => "INVALID_DATE_SYNTAX",
        }
    }

    pub fn is_syntax(&self) -> bool {
        matches!(
            self,
            ErrorCode::UnbalancedParens
                | ErrorCode::UnbalancedQuotes
                | ErrorCode::EmptyQuery
                | ErrorCode::MalformedClause
                | ErrorCode::TooManyClauses
        )
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Engine-internal failure, positioned by character offset only
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub code: ErrorCode,
    pub message: String,
    /// `None` for whole-query errors
    pub offset: Option<usize>,
    pub suggestions: Vec<String>,
}

impl Diagnostic {
    pub fn at(code: ErrorCode, offset: usize, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            offset: Some(offset),
            suggestions: Vec::new(),
        }
    }

    pub fn whole_query(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            offset: None,
            suggestions: Vec::new(),
        }
    }

    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions;
        self
    }
}

/// Location of an error in the query text (line and column are 1-based)
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct ErrorPosition {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

/// Error returned by `parse_query`
#[derive(Debug, Clone, Serialize, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct QueryParseError {
    pub message: String,
    pub code: ErrorCode,
    pub suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<ErrorPosition>,
}
