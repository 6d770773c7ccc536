use clipper_query::query::{
    analyze, generate_suggestions, parse_query, parse_query_with, AstNode, ErrorCode, FilterClause,
    Joiner, Operator, ParseOptions, MAX_SUGGESTIONS, REGISTRY,
};

fn clause(name: &str, operator: Operator, value: &str) -> AstNode {
    AstNode::FilterClause(FilterClause {
        name: name.to_string(),
        operator,
        value: value.to_string(),
        position: Default::default(),
    })
}

#[test]
fn implicit_and_of_three_clauses() {
    let ast = parse_query("game:valorant votes:>50 sort:popular").unwrap();
    assert_eq!(
        ast,
        AstNode::Group {
            joiner: Joiner::And,
            children: vec![
                clause("game", Operator::Eq, "valorant"),
                clause("votes", Operator::Gt, "50"),
                clause("sort", Operator::Eq, "popular"),
            ],
        }
    );
}

#[test]
fn or_group_and_negation() {
    let ast = parse_query("(tag:funny OR tag:fail) -is:nsfw").unwrap();
    assert_eq!(
        ast,
        AstNode::Group {
            joiner: Joiner::And,
            children: vec![
                AstNode::Group {
                    joiner: Joiner::Or,
                    children: vec![
                        clause("tag", Operator::Eq, "funny"),
                        clause("tag", Operator::Eq, "fail"),
                    ],
                },
                AstNode::Negated {
                    inner: Box::new(clause("is", Operator::Eq, "nsfw")),
                },
            ],
        }
    );
}

#[test]
fn typo_in_filter_name() {
    let err = parse_query("gam:valorant").unwrap_err();
    assert_eq!(err.code, ErrorCode::UnknownFilter);
    assert!(err.suggestions.iter().any(|s| s.contains("game:")));
    let pos = err.position.unwrap();
    assert_eq!((pos.line, pos.column, pos.offset), (1, 1, 0));
}

#[test]
fn sort_suggestions_match_registry() {
    let expected: Vec<&str> = REGISTRY.get("sort").unwrap().enum_values.to_vec();
    let texts: Vec<String> = generate_suggestions("sort:", 5).into_iter().map(|s| s.text).collect();
    assert_eq!(texts, expected);
}

#[test]
fn votes_suggestions_are_operators() {
    let texts: Vec<String> = generate_suggestions("votes:", 6)
        .into_iter()
        .map(|s| s.text)
        .collect();
    assert_eq!(texts, vec![">", ">=", "<", "<=", ".."]);
}

#[test]
fn empty_query_is_valid() {
    for input in ["", "   ", "\t\n"] {
        let ast = parse_query(input).unwrap();
        assert!(ast.is_empty());
        assert!(analyze(input, &ParseOptions::default()).valid);
    }

    let menu = generate_suggestions("", 0);
    assert_eq!(menu.len(), MAX_SUGGESTIONS);
    let names: Vec<String> = REGISTRY
        .names()
        .take(MAX_SUGGESTIONS)
        .map(|n| format!("{}:", n))
        .collect();
    let texts: Vec<String> = menu.into_iter().map(|s| s.text).collect();
    assert_eq!(texts, names);
}

#[test]
fn suggestions_never_exceed_cap() {
    let inputs = [
        "", "-", "g", "sort:", "after:", "(", "game:x ", "\"", "votes:>", "-is:", "a b c d",
        "(tag:a OR ", "language:", "))))", "::::",
    ];
    for input in inputs {
        for cursor in 0..=input.chars().count() + 2 {
            assert!(generate_suggestions(input, cursor).len() <= MAX_SUGGESTIONS);
        }
    }
}

#[test]
fn accepted_suggestion_keeps_query_valid() {
    let query = "after:2024-01-3";
    let hint = generate_suggestions(query, query.chars().count())
        .into_iter()
        .find(|s| s.category == "Date format")
        .unwrap();
    let accepted = format!("after:{}1", hint.insert_value);
    assert!(parse_query(&accepted).is_ok());

    let query = "sort:po";
    let pick = &generate_suggestions(query, 7)[0];
    assert!(parse_query(&format!("sort:{}", pick.insert_value)).is_ok());
}

#[test]
fn parse_is_total_on_garbage() {
    let inputs = [
        "\"", "(", ")", "-", "--x", ":", "::", "a:", ":b", "OR", "or or", "(()", "a:b..", "a:..b",
        "a:>>1", "a:1..2..3", "ポケモン:ピカチュウ", "game:\"\\", "(-)", "(a:b OR)", "\u{0}",
        "votes:>\"5\"", "after:2024-13-45", "(a:b) )(",
    ];
    for input in inputs {
        if let Err(err) = parse_query(input) {
            assert!(!err.message.is_empty(), "empty message for {:?}", input);
            if let Some(pos) = err.position {
                assert!(pos.offset <= input.chars().count());
            }
        }
    }
}

#[test]
fn syntax_error_codes() {
    let cases = [
        ("(tag:a", ErrorCode::UnbalancedParens),
        ("tag:a)", ErrorCode::UnbalancedParens),
        ("game:\"valo", ErrorCode::UnbalancedQuotes),
        ("()", ErrorCode::EmptyQuery),
        ("game:", ErrorCode::MalformedClause),
        (":valorant", ErrorCode::MalformedClause),
        ("sort:best", ErrorCode::InvalidEnumValue),
        ("votes:>many", ErrorCode::InvalidRangeSyntax),
        ("after:someday", ErrorCode::InvalidDateSyntax),
    ];
    for (input, code) in cases {
        assert_eq!(parse_query(input).unwrap_err().code, code, "input {:?}", input);
    }
}

#[test]
fn round_trip_single_clauses() {
    let inputs = [
        "game:valorant",
        "GAME:Valorant",
        "game:\"league of legends\"",
        "game:\"say \\\"gg\\\"\"",
        "tag:\"a..b\"",
        "tag:\">x\"",
        "votes:>50",
        "votes:>=-3",
        "views:<100",
        "duration:<=30",
        "views:10..2000",
        "after:2024-01-31",
        "before:last_week",
        "is:featured",
        "-is:nsfw",
        "creator:or",
    ];
    for input in inputs {
        let first = parse_query(input).unwrap();
        let text = first.to_string();
        let second = parse_query(&text).unwrap();
        assert_eq!(first, second, "{:?} reserialized as {:?}", input, text);
    }
}

#[test]
fn clause_limit_is_configurable() {
    let query = (0..21).map(|i| format!("tag:t{}", i)).collect::<Vec<_>>().join(" ");
    let err = parse_query(&query).unwrap_err();
    assert_eq!(err.code, ErrorCode::TooManyClauses);
    assert!(err.position.is_none());

    let unlimited = ParseOptions { max_clauses: None };
    assert!(parse_query_with(&query, &unlimited).is_ok());
}

#[test]
fn analyze_separates_parse_and_validity() {
    let report = analyze("sort:best game:x", &ParseOptions::default());
    assert!(report.parsed);
    assert!(!report.valid);
    assert_eq!(report.filters_used, Some(vec!["game".to_string(), "sort".to_string()]));
    assert_eq!(report.error.unwrap().code, ErrorCode::InvalidEnumValue);

    let report = analyze("sort:", &ParseOptions::default());
    assert!(!report.parsed);
    assert!(report.ast.is_none());
}

#[test]
fn same_input_same_output() {
    let a = parse_query("(tag:a OR gam:b) sort:x").unwrap_err();
    let b = parse_query("(tag:a OR gam:b) sort:x").unwrap_err();
    assert_eq!(a, b);
    assert_eq!(generate_suggestions("-t", 2), generate_suggestions("-t", 2));
}
