//! Semantic validation against the filter registry
//!
//! Clauses are checked in pre-order and the first failure wins, so the same
//! query always reports the same error.

use chrono::NaiveDate;

use super::ast::{AstNode, FilterClause, Operator};
use super::error::{Diagnostic, ErrorCode};
use super::schema::{FilterMeta, FilterRegistry, ValueKind};

/// Names further than this from the typed name are never offered
const MAX_TYPO_DISTANCE: usize = 2;
const MAX_TYPO_SUGGESTIONS: usize = 3;

pub fn validate(ast: &AstNode, registry: &FilterRegistry) -> Result<(), Diagnostic> {
    match ast {
        AstNode::FilterClause(clause) => validate_clause(clause, registry),
        AstNode::Negated { inner } => validate(inner, registry),
        AstNode::Group { children, .. } => {
            children.iter().try_for_each(|child| validate(child, registry))
        }
    }
}

fn validate_clause(clause: &FilterClause, registry: &FilterRegistry) -> Result<(), Diagnostic> {
    let Some(meta) = registry.get(&clause.name) else {
        return Err(Diagnostic::at(
            ErrorCode::UnknownFilter,
            clause.position.start,
            format!("Unknown filter '{}'", clause.name),
        )
        .with_suggestions(did_you_mean(&clause.name, registry)));
    };

    match meta.value_kind {
        ValueKind::String => check_text(clause),
        ValueKind::Range => check_range(clause),
        ValueKind::Date => check_date(clause, meta),
        ValueKind::Enum | ValueKind::Flag => check_enum(clause, meta),
    }
}

/// Registry names within `MAX_TYPO_DISTANCE` edits, closest first, ties alphabetical
pub fn did_you_mean(name: &str, registry: &FilterRegistry) -> Vec<String> {
    let typed = name.to_lowercase();
    let mut ranked: Vec<(usize, &str)> = registry
        .names()
        .map(|candidate| (strsim::levenshtein(&typed, candidate), candidate))
        .filter(|(distance, _)| *distance <= MAX_TYPO_DISTANCE)
        .collect();
    ranked.sort();
    ranked
        .into_iter()
        .take(MAX_TYPO_SUGGESTIONS)
        .map(|(_, candidate)| format!("did you mean `{}:`", candidate))
        .collect()
}

fn value_error(clause: &FilterClause, code: ErrorCode, message: String) -> Diagnostic {
    Diagnostic::at(code, clause.position.value_start, message)
}

fn check_text(clause: &FilterClause) -> Result<(), Diagnostic> {
    if !clause.operator.is_comparison() {
        return Ok(());
    }
    let as_text = FilterClause {
        operator: Operator::Eq,
        ..clause.clone()
    };
    Err(value_error(
        clause,
        ErrorCode::InvalidRangeSyntax,
        format!("'{}' matches text and does not accept comparisons", clause.name),
    )
    .with_suggestions(vec![as_text.to_string()]))
}

fn range_forms(name: &str) -> Vec<String> {
    ["N", ">N", ">=N", "<N", "<=N", "N..M"]
        .iter()
        .map(|form| format!("{}:{}", name, form))
        .collect()
}

fn parse_bound(value: &str) -> Option<i64> {
    value.parse::<i64>().ok()
}

fn check_range(clause: &FilterClause) -> Result<(), Diagnostic> {
    let invalid = |message: String| -> Result<(), Diagnostic> {
        Err(value_error(clause, ErrorCode::InvalidRangeSyntax, message)
            .with_suggestions(range_forms(&clause.name)))
    };

    match &clause.operator {
        Operator::Range { lo, hi } => match (parse_bound(lo), parse_bound(hi)) {
            (Some(lo), Some(hi)) if lo <= hi => Ok(()),
            (Some(_), Some(_)) => invalid(format!(
                "Range '{}' has its lower bound above its upper bound",
                clause.value
            )),
            _ => invalid(format!("Range bounds for '{}' must be whole numbers", clause.name)),
        },
        Operator::Eq | Operator::Gt | Operator::Gte | Operator::Lt | Operator::Lte => {
            match parse_bound(&clause.value) {
                Some(_) => Ok(()),
                None => invalid(format!(
                    "'{}' expects a number, got '{}'",
                    clause.name, clause.value
                )),
            }
        }
    }
}

/// Strict `YYYY-MM-DD`; chrono alone also accepts unpadded fields
fn is_iso_date(value: &str) -> bool {
    let shaped = value.len() == 10
        && value.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        });
    shaped && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

fn is_relative_date(meta: &FilterMeta, value: &str) -> bool {
    meta.enum_values.iter().any(|v| v.eq_ignore_ascii_case(value))
}

fn check_date(clause: &FilterClause, meta: &FilterMeta) -> Result<(), Diagnostic> {
    let message = if clause.operator.is_comparison() {
        format!("'{}' takes a single date, not a comparison", clause.name)
    } else if is_relative_date(meta, &clause.value) || is_iso_date(&clause.value) {
        return Ok(());
    } else {
        format!("'{}' is not a date; use YYYY-MM-DD or a relative date", clause.value)
    };

    let mut suggestions: Vec<String> = meta
        .enum_values
        .iter()
        .map(|v| format!("{}:{}", meta.name, v))
        .collect();
    suggestions.push(format!("{}:YYYY-MM-DD", meta.name));
    Err(value_error(clause, ErrorCode::InvalidDateSyntax, message).with_suggestions(suggestions))
}

fn check_enum(clause: &FilterClause, meta: &FilterMeta) -> Result<(), Diagnostic> {
    let message = if clause.operator.is_comparison() {
        format!("'{}' takes one of a fixed set of values, not a comparison", clause.name)
    } else if meta.enum_values.iter().any(|v| v.eq_ignore_ascii_case(&clause.value)) {
        return Ok(());
    } else {
        format!("'{}' is not a valid value for '{}'", clause.value, clause.name)
    };

    let suggestions = meta
        .enum_values
        .iter()
        .map(|v| format!("{}:{}", meta.name, v))
        .collect();
    Err(value_error(clause, ErrorCode::InvalidEnumValue, message).with_suggestions(suggestions))
}
