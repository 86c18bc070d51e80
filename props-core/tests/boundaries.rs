//! Boundary tests: EOF at every position
//!
//! Tests that the grammars handle:
//! 1. EOF at every character boundary of every fixture input
//! 2. Text whose meaning changes once more input arrives
//!
//! These tests catch issues like:
//! - Premature commitment (e.g., "3" settling as an integer before "1/2" arrives)
//! - Incomplete constructs at EOF
//! - Matches that are not stable when the input is cut at the match end

mod common;

use common::{flatten, load_fixtures_by_name};
use pretty_assertions::assert_eq;
use props_core::{Context, Grammar, Node, PairPart, ParseError, Rule, Section, Syntax};

const FIXTURES: [&str; 6] = ["sections", "values", "lists", "pairs", "comments", "errors"];

const ALL_RULES: [Rule; 10] = [
    Rule::Whitespace,
    Rule::Comment,
    Rule::Name,
    Rule::Decimal,
    Rule::Quotient,
    Rule::List,
    Rule::Pair,
    Rule::GroupedPair,
    Rule::SectionName,
    Rule::Properties,
];

/// Every prefix of `input` that ends on a character boundary
fn prefixes(input: &str) -> impl Iterator<Item = &str> {
    input
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(input.len()))
        .map(move |i| &input[..i])
}

fn events(node: &Node<'_>) -> Vec<String> {
    let mut out = Vec::new();
    flatten(node, &mut out);
    out
}

// =============================================================================
// EOF Boundary Tests
// =============================================================================

/// Every rule returns on every prefix, and never claims more than it was given.
#[test]
fn eof_doesnt_panic() {
    let syntax = Syntax::default();
    let cx = Context::new(&syntax);
    for name in FIXTURES {
        for case in load_fixtures_by_name(name) {
            for prefix in prefixes(&case.input) {
                for rule in ALL_RULES {
                    if let Ok(Some(len)) = rule.match_len(cx, prefix) {
                        assert!(
                            len <= prefix.len(),
                            "{}::{} {} claimed {} of {:?}",
                            name,
                            case.id,
                            rule,
                            len,
                            prefix
                        );
                    }
                }
                let _ = syntax.parse_document(prefix);
            }
        }
    }
}

/// A document match on any prefix is stable when cut at its own length.
#[test]
fn truncated_matches_are_stable() {
    let syntax = Syntax::default();
    let properties = syntax.properties();
    for name in FIXTURES {
        for case in load_fixtures_by_name(name) {
            for prefix in prefixes(&case.input) {
                let Ok(Some(n)) = properties.match_len(prefix) else {
                    continue;
                };
                let cut = &prefix[..n];
                assert_eq!(
                    properties.match_len(cut),
                    Ok(Some(n)),
                    "{}::{} unstable at {:?}",
                    name,
                    case.id,
                    prefix
                );
                assert!(
                    properties.parse(cut).is_ok(),
                    "{}::{} failed to parse {:?}",
                    name,
                    case.id,
                    cut
                );
            }
        }
    }
}

// =============================================================================
// Late Input Changes the Meaning
// =============================================================================

#[test]
fn integer_becomes_mixed_number() {
    let syntax = Syntax::default();
    assert_eq!(
        events(&syntax.parse_document("v: 3").unwrap()),
        vec![
            "PropertiesStart",
            "SectionStart \"v\"",
            "Quotient \"3\"",
            "SectionEnd",
            "PropertiesEnd",
        ]
    );
    assert_eq!(
        events(&syntax.parse_document("v: 3 1/2").unwrap()),
        vec![
            "PropertiesStart",
            "SectionStart \"v\"",
            "Quotient \"7/2\"",
            "SectionEnd",
            "PropertiesEnd",
        ]
    );
}

#[test]
fn name_becomes_header() {
    let syntax = Syntax::default();
    let node = syntax.parse_document("a: x next").unwrap();
    assert_eq!(node.as_sections().unwrap().len(), 1);
    let node = syntax.parse_document("a: x next:").unwrap();
    assert_eq!(node.as_sections().unwrap().len(), 2);
}

#[test]
fn pair_grows_into_chain() {
    let syntax = Syntax::default();
    let pair = syntax.pair();
    assert_eq!(pair.match_len("a = b"), Ok(Some(5)));
    assert_eq!(
        pair.match_len("a = b ="),
        Err(ParseError::EmptyPairPart {
            part: PairPart::Value,
            offset: 7,
        })
    );
    assert_eq!(pair.match_len("a = b = c"), Ok(Some(9)));
}

#[test]
fn unclosed_constructs_are_soft() {
    let syntax = Syntax::default();
    assert_eq!(syntax.list().match_len("(a, b"), Ok(None));
    assert_eq!(syntax.list().match_len("(a, # b)"), Ok(None));
    assert_eq!(syntax.grouped_pair().match_len("{a = b"), Ok(None));
    assert_eq!(syntax.pair().match_len("{a = b # }"), Ok(None));
}

#[test]
fn comment_runs_to_eof() {
    let syntax = Syntax::default();
    assert_eq!(
        syntax.parse_document("a: x # no line end"),
        Ok(Node::Properties(vec![Section {
            name: "a",
            children: vec![Node::Name("x")],
        }]))
    );
}
