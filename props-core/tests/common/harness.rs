//! Test harness for running fixtures with stochastic variations

use crate::common::{Gen, TestCase};
use props_core::{Node, PairForm, ParseError, Section, Syntax};

/// Result of running a test
#[derive(Debug)]
pub struct TestResult {
    pub passed: bool,
    pub input: String,
    pub expected: Vec<String>,
    pub actual: Vec<String>,
    pub seed: u64,
    pub errors: Vec<String>,
}

fn flatten_section(section: &Section<'_>, out: &mut Vec<String>) {
    out.push(format!("SectionStart {:?}", section.name));
    for child in &section.children {
        flatten(child, out);
    }
    out.push("SectionEnd".to_string());
}

/// Flatten a node into events, pre-order
pub fn flatten(node: &Node<'_>, out: &mut Vec<String>) {
    match node {
        Node::Whitespace => out.push("Whitespace".to_string()),
        Node::Comment(text) => out.push(format!("Comment {:?}", text)),
        Node::Empty => out.push("Empty".to_string()),
        Node::Name(name) => out.push(format!("Name {:?}", name)),
        Node::Decimal(_) => out.push(format!("Decimal {:?}", node.to_string())),
        Node::Quotient(value) => out.push(format!("Quotient {:?}", value.to_string())),
        Node::List(items) => {
            out.push("ListStart".to_string());
            for item in items {
                flatten(item, out);
            }
            out.push("ListEnd".to_string());
        }
        Node::Pair { key, value, form } => {
            let form = match form {
                PairForm::Raw => "raw",
                PairForm::Grouped => "grouped",
            };
            out.push(format!("PairStart {:?}", form));
            flatten(key, out);
            flatten(value, out);
            out.push("PairEnd".to_string());
        }
        Node::Section(section) => flatten_section(section, out),
        Node::Properties(sections) => {
            out.push("PropertiesStart".to_string());
            for section in sections {
                flatten_section(section, out);
            }
            out.push("PropertiesEnd".to_string());
        }
    }
}

/// Parse a document; the top-level sections are flattened without a wrapper.
fn collect_events(input: &str) -> Result<Vec<String>, ParseError> {
    let doc = Syntax::default().parse_document(input)?;
    let mut events = Vec::new();
    for section in doc.as_sections().unwrap_or_default() {
        flatten_section(section, &mut events);
    }
    Ok(events)
}

/// Name of the error variant, e.g. `NoMatch`
fn error_name(err: &ParseError) -> String {
    let debug = format!("{:?}", err);
    debug
        .split(|c: char| !c.is_alphanumeric())
        .next()
        .unwrap_or_default()
        .to_string()
}

fn compare(case: &TestCase, input: String, seed: u64) -> TestResult {
    let expected: Vec<String> = match &case.error {
        Some(name) => vec![format!("Error {}", name)],
        None => case.events.iter().map(|e| e.formatted()).collect(),
    };
    let actual = match collect_events(&input) {
        Ok(events) => events,
        Err(err) => vec![format!("Error {}", error_name(&err))],
    };

    let mut errors = Vec::new();
    if actual.len() != expected.len() {
        errors.push(format!(
            "Event count mismatch: expected {}, got {}",
            expected.len(),
            actual.len()
        ));
    }
    for (i, (act, exp)) in actual.iter().zip(expected.iter()).enumerate() {
        if act != exp {
            errors.push(format!("Event {}: expected '{}', got '{}'", i, exp, act));
        }
    }

    TestResult {
        passed: errors.is_empty(),
        input,
        expected,
        actual,
        seed,
        errors,
    }
}

/// Run a single test case (canonical, no variations)
pub fn run_test(case: &TestCase) -> TestResult {
    compare(case, case.input.clone(), 0)
}

/// Run test with stochastic variations
///
/// Applies independent variations, none of which change the parsed tree:
/// - 40% chance of whitespace and comments above
/// - 30% chance of one separating space becoming a line comment
/// - 40% chance of whitespace and comments below
pub fn run_with_variations(case: &TestCase, gen: &mut Gen) -> TestResult {
    let mut input = String::new();

    if gen.chance(0.4) {
        input.push_str(&gen.ignorable());
        input.push('\n');
    }

    if gen.chance(0.3) {
        input.push_str(&gen.inject_comment(&case.input));
    } else {
        input.push_str(&case.input);
    }

    if gen.chance(0.4) {
        input.push('\n');
        input.push_str(&gen.ignorable());
    }

    compare(case, input, gen.seed)
}

impl TestResult {
    /// Print detailed failure info
    pub fn print_failure(&self, case_id: &str) {
        eprintln!("\n=== FAILED: {} ===", case_id);
        eprintln!(
            "Seed: {} (set PROPS_TEST_SEED={} to reproduce)",
            self.seed, self.seed
        );
        eprintln!("\nInput:");
        eprintln!("{}", self.input);
        eprintln!("\nExpected events:");
        for (i, e) in self.expected.iter().enumerate() {
            eprintln!("  {}: {}", i, e);
        }
        eprintln!("\nActual events:");
        for (i, e) in self.actual.iter().enumerate() {
            eprintln!("  {}: {}", i, e);
        }
        eprintln!("\nErrors:");
        for e in &self.errors {
            eprintln!("  - {}", e);
        }
    }
}
