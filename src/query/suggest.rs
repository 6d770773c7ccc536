//! Autocomplete suggestions
//!
//! Runs straight off the raw text and the cursor, so it keeps working while
//! the query is half-typed and would not parse.

use serde::Serialize;

use super::schema::{FilterMeta, FilterRegistry, ValueKind, RANGE_OPERATORS, REGISTRY};

/// Upper bound on suggestions returned per call
pub const MAX_SUGGESTIONS: usize = 10;

const ISO_DATE_HINT: &str = "YYYY-MM-DD";

/// A completion candidate
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Suggestion {
    pub text: String,
    /// Display group, e.g. "Filters" or "sort values"
    pub category: String,
    pub description: String,
    /// Replaces the fragment being completed: the partial value after a
    /// colon, or the whole word (including a leading `-`) when completing a
    /// filter name. Inserted at the cursor at a fresh position. The date
    /// format hint echoes the partial value back, so accepting it is a no-op.
    pub insert_value: String,
}

impl Suggestion {
    fn new(
        text: impl Into<String>,
        category: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let text = text.into();
        Self {
            insert_value: text.clone(),
            text,
            category: category.into(),
            description: description.into(),
        }
    }

    fn with_insert_value(mut self, insert_value: impl Into<String>) -> Self {
        self.insert_value = insert_value.into();
        self
    }
}

/// Lexical situation at the cursor
#[derive(Debug)]
enum Context<'a> {
    /// After `name:` with `partial` typed so far
    Value { meta: &'static FilterMeta, partial: &'a str },
    /// Inside a word that has no colon yet
    Name { word: &'a str },
    /// Empty input or a fresh top-level position
    TopLevel,
}

/// Quote state and paren depth at the end of `before`, honouring escapes
/// inside quoted strings the same way the lexer does
fn scan(before: &[char]) -> (bool, usize) {
    let mut in_quote = false;
    let mut escaped = false;
    let mut depth = 0usize;
    for &c in before {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_quote => escaped = true,
            '"' => in_quote = !in_quote,
            '(' if !in_quote => depth += 1,
            ')' if !in_quote => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    (in_quote, depth)
}

fn detect<'a>(
    word: &'a str,
    before: &[char],
    depth: usize,
    registry: &FilterRegistry,
) -> Option<Context<'a>> {
    if let Some((name, partial)) = word.split_once(':') {
        let name = name.strip_prefix('-').unwrap_or(name);
        return registry.get(name).map(|meta| Context::Value { meta, partial });
    }
    if !word.is_empty() {
        return Some(Context::Name { word });
    }
    // a fresh term needs a separator; right after `)` it would glue onto the group
    let fresh = before.last().map_or(true, |c| c.is_whitespace());
    (depth == 0 && fresh).then_some(Context::TopLevel)
}

fn value_suggestions(meta: &FilterMeta, partial: &str) -> Vec<Suggestion> {
    let partial_lower = partial.to_lowercase();
    match meta.value_kind {
        ValueKind::Enum | ValueKind::Flag => meta
            .enum_values
            .iter()
            .filter(|v| v.starts_with(&partial_lower))
            .map(|v| {
                Suggestion::new(
                    *v,
                    format!("{} values", meta.name),
                    format!("{}: {}", meta.description, v),
                )
            })
            .collect(),
        ValueKind::Range => RANGE_OPERATORS
            .iter()
            .filter(|op| op.starts_with(partial))
            .map(|op| Suggestion::new(*op, "Comparison operators", describe_operator(op)))
            .collect(),
        ValueKind::Date => {
            let mut out: Vec<Suggestion> = meta
                .enum_values
                .iter()
                .filter(|v| v.starts_with(&partial_lower))
                .map(|v| {
                    let description = format!("{}: {}", meta.description, v.replace('_', " "));
                    Suggestion::new(*v, "Relative dates", description)
                })
                .collect();
            // format hint only: accepting it keeps what was typed
            if partial.chars().all(|c| c.is_ascii_digit() || c == '-') {
                out.push(
                    Suggestion::new(ISO_DATE_HINT, "Date format", "Calendar date, e.g. 2024-01-31")
                        .with_insert_value(partial),
                );
            }
            out
        }
        ValueKind::String => Vec::new(),
    }
}

fn describe_operator(op: &str) -> &'static str {
    match op {
        ">" => "Greater than",
        ">=" => "Greater than or equal to",
        "<" => "Less than",
        "<=" => "Less than or equal to",
        _ => "Between two values, e.g. 10..100",
    }
}

fn filter_suggestion(meta: &FilterMeta, negated: bool) -> Suggestion {
    if negated {
        Suggestion::new(
            format!("-{}:", meta.name),
            "Filters",
            format!("Exclude: {}", meta.description),
        )
    } else {
        Suggestion::new(format!("{}:", meta.name), "Filters", meta.description)
    }
}

fn name_suggestions(word: &str, registry: &FilterRegistry) -> Vec<Suggestion> {
    let (negated, prefix) = match word.strip_prefix('-') {
        Some(rest) => (true, rest.to_lowercase()),
        None => (false, word.to_lowercase()),
    };

    let mut out: Vec<Suggestion> = registry
        .filters()
        .iter()
        .filter(|f| f.name.starts_with(&prefix))
        .map(|f| filter_suggestion(f, negated))
        .collect();
    if !negated && "or".starts_with(&prefix) {
        out.push(Suggestion::new(
            "OR",
            "Keywords",
            "Match either side; only inside parentheses",
        ));
    }
    out
}

/// Suggestions for `input` with the cursor at character offset `cursor`
pub fn suggest_with(input: &str, cursor: usize, registry: &FilterRegistry) -> Vec<Suggestion> {
    let chars: Vec<char> = input.chars().collect();
    let cursor = cursor.min(chars.len());
    let before = &chars[..cursor];

    let (in_quote, depth) = scan(before);
    if in_quote {
        return Vec::new();
    }

    let word_start = before
        .iter()
        .rposition(|c| c.is_whitespace() || matches!(c, '(' | ')'))
        .map_or(0, |i| i + 1);
    let word: String = before[word_start..].iter().collect();

    let context = detect(&word, before, depth, registry);
    tracing::trace!(cursor, ?context, "suggestion context");

    let mut out = match context {
        Some(Context::Value { meta, partial }) => value_suggestions(meta, partial),
        Some(Context::Name { word }) => name_suggestions(word, registry),
        Some(Context::TopLevel) => registry
            .filters()
            .iter()
            .map(|f| filter_suggestion(f, false))
            .collect(),
        None => Vec::new(),
    };

    let mut seen = std::collections::HashSet::new();
    out.retain(|s| seen.insert(s.text.clone()));
    out.truncate(MAX_SUGGESTIONS);
    out
}

/// Suggestions against the process-wide registry
pub fn suggest(input: &str, cursor: usize) -> Vec<Suggestion> {
    suggest_with(input, cursor, &REGISTRY)
}

#[cfg(test)]
mod tests {
    use super::*;
    fn texts(input: &str, cursor: usize) -> Vec<String> {
        suggest_with(input, cursor, &REGISTRY).into_iter().map(|s| s.text).collect()
    }

    #[test]
    fn test_enum_values_after_colon() {
        assert_eq!(
            texts("sort:", 5),
            vec!["relevance", "recent", "popular", "trending", "top", "discussed"]
        );
        assert_eq!(texts("sort:re", 7), vec!["relevance", "recent"]);
        assert_eq!(texts("-is:n", 5), vec!["nsfw"]);
    }

    #[test]
    fn test_operators_after_range_filter() {
        assert_eq!(texts("votes:", 6), vec![">", ">=", "<", "<=", ".."]);
        assert_eq!(texts("votes:>", 7), vec![">", ">="]);
        assert!(texts("votes:>5", 8).is_empty());
    }

    #[test]
    fn test_date_values() {
        let out = suggest_with("after:last", 10, &REGISTRY);
        let texts: Vec<&str> = out.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["last_week", "last_month", "last_year"]);

        let out = suggest_with("after:", 6, &REGISTRY);
        assert_eq!(out.last().map(|s| s.category.as_str()), Some("Date format"));
        assert_eq!(out.len(), 6);
    }

    #[test]
    fn test_filter_name_prefix() {
        assert_eq!(texts("vo", 2), vec!["votes:"]);
        assert_eq!(texts("game:x v", 8), vec!["votes:", "views:"]);
        assert_eq!(texts("o", 1), vec!["OR"]);
    }

    #[test]
    fn test_negated_names() {
        let out = texts("-", 1);
        assert_eq!(out.len(), MAX_SUGGESTIONS);
        assert!(out.iter().all(|t| t.starts_with('-') && t.ends_with(':')));
        assert_eq!(texts("-ta", 3), vec!["-tag:"]);
    }

    #[test]
    fn test_top_level_menu() {
        let out = suggest_with("", 0, &REGISTRY);
        assert_eq!(out.len(), MAX_SUGGESTIONS);
        assert_eq!(out[0].text, "game:");
        assert_eq!(out[0].category, "Filters");
        assert_eq!(texts("game:x ", 7).len(), MAX_SUGGESTIONS);
    }

    #[test]
    fn test_no_suggestions() {
        assert!(texts("game:\"lea", 9).is_empty());
        assert!(texts("(", 1).is_empty());
        assert!(texts("game:", 5).is_empty());
        assert!(texts("gam:", 4).is_empty());
        assert!(texts("xyz", 3).is_empty());
    }

    #[test]
    fn test_escaped_quote_does_not_hide_open_group() {
        let input = r#"tag:"a\"" ("#;
        assert!(texts(input, input.chars().count()).is_empty());
        let input = r#"tag:"ab" ("#;
        assert!(texts(input, input.chars().count()).is_empty());
        // the escaped quote does not close the string
        let input = r#"tag:"a\" ("#;
        assert!(texts(input, input.chars().count()).is_empty());
        assert_eq!(scan(&r#"tag:"a\"" ("#.chars().collect::<Vec<_>>()), (false, 1));
        assert_eq!(scan(&r#"tag:"a\" ("#.chars().collect::<Vec<_>>()), (true, 0));
    }

    #[test]
    fn test_no_top_level_menu_glued_to_group() {
        assert!(texts("(tag:a)", 7).is_empty());
        assert_eq!(texts("(tag:a) ", 8).len(), MAX_SUGGESTIONS);
        assert_eq!(texts("-is:nsfw\n", 9).len(), MAX_SUGGESTIONS);
    }

    #[test]
    fn test_insert_values() {
        let inserts = |input: &str| -> Vec<String> {
            suggest_with(input, input.chars().count(), &REGISTRY)
                .into_iter()
                .map(|s| s.insert_value)
                .collect()
        };
        assert_eq!(inserts("sort:po"), vec!["popular"]);
        assert_eq!(inserts("-ta"), vec!["-tag:"]);
        assert_eq!(inserts("").first().map(String::as_str), Some("game:"));
        assert_eq!(inserts("votes:>"), vec![">", ">="]);
    }

    #[test]
    fn test_date_hint_keeps_typed_value() {
        let out = suggest_with("after:2024-0", 12, &REGISTRY);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, ISO_DATE_HINT);
        assert_eq!(out[0].insert_value, "2024-0");

        let out = suggest_with("after:", 6, &REGISTRY);
        let hint = out.iter().find(|s| s.category == "Date format").unwrap();
        assert_eq!(hint.insert_value, "");
    }

    #[test]
    fn test_cursor_in_middle_and_past_end() {
        // only the text before the cursor counts
        assert_eq!(texts("sort:popular", 6), vec!["popular"]);
        assert_eq!(texts("vo", 99), vec!["votes:"]);
    }
}
