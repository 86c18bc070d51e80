//! Key/value pairs, raw and grouped.
//!
//! A raw pair `k = v` has no closing delimiter, so the value's extent comes
//! from lookahead: the first rule of `raw_values` that matches a prefix of
//! the remaining text fixes where the value ends, and the scan jumps past
//! it. A grouped pair `{k = v}` is closed by its brace.
//!
//! Chains nest left to right. `a = b = c` is `(a = b) = c`, `{a = b = c}` is
//! `{(a = b) = c}`, and `{a = b} = c` makes the group the key of a raw pair.

use std::ops::Range;

use crate::advance::{delegate_state, AdvancerState, Composite, Cursor, Step};
use crate::dag::{dag, DagState, Machine};
use crate::error::{PairPart, ParseError, Result};
use crate::grammar::{ensure_complete, skip_comments, Grammar, SectionName};
use crate::node::{Node, PairForm};
use crate::syntax::{Context, Rule};

use PairNode as N;

dag! {
    enum PairNode in "pair" {
        Start => [GroupStart, Key, Error],
        GroupStart => [GroupKey, Error],
        GroupKey => [GroupSep, Error],
        GroupSep => [GroupVal, Error],
        GroupVal => [GroupSep, GroupEnd, Error],
        GroupEnd => [Sep, End],
        Key => [Sep, Error],
        Sep => [Val, Error],
        Val => [Sep, End, Error],
        End => [],
        Error => [],
    }
    ends = [End];
    errors = [Error];
}

impl PairNode {
    /// Nesting depth at which `=`, `}` and `,` are structural.
    fn base_depth(self) -> i32 {
        match self {
            N::GroupStart | N::GroupKey | N::GroupSep | N::GroupVal => 1,
            N::GroupEnd | N::Key | N::Sep | N::Val => 0,
            N::Start | N::End | N::Error => -1,
        }
    }
}

/// Which pair shapes a [`Pair`] accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairMode {
    /// Raw pairs, groups and chains of either.
    Chained,
    /// Exactly one `{key = value}` group.
    Grouped,
}

/// A key or value span and the rule that matched it.
#[derive(Debug, Clone)]
struct Operand {
    range: Range<usize>,
    rule: Rule,
}

struct PairState<'c, 'a> {
    cursor: Cursor,
    machine: Machine<PairNode>,
    cx: Context<'c>,
    source: &'a str,
    mode: PairMode,
    braces: i32,
    parens: i32,
    /// First content character of the key or value being read.
    span_start: Option<usize>,
    span_end: usize,
    head: Option<Operand>,
    links: Vec<Operand>,
    /// Links inside the leading group.
    grouped_links: usize,
    end: usize,
}

delegate_state!(PairState<'_, '_> => cursor);

impl DagState for PairState<'_, '_> {
    type Node = PairNode;

    fn machine(&self) -> &Machine<PairNode> {
        &self.machine
    }

    fn machine_mut(&mut self) -> &mut Machine<PairNode> {
        &mut self.machine
    }
}

impl<'c, 'a> PairState<'c, 'a> {
    fn new(cx: Context<'c>, source: &'a str, mode: PairMode) -> Self {
        Self {
            cursor: Cursor::new(),
            machine: Machine::new(N::Start),
            cx,
            source,
            mode,
            braces: 0,
            parens: 0,
            span_start: None,
            span_end: 0,
            head: None,
            links: Vec::new(),
            grouped_links: 0,
            end: 0,
        }
    }

    fn depth(&self) -> i32 {
        self.braces + self.parens
    }

    fn at_base(&self) -> bool {
        self.depth() == self.node().base_depth()
    }

    fn content(&mut self, c: char) {
        let position = self.position();
        self.span_start.get_or_insert(position);
        self.span_end = position + c.len_utf8();
        self.encounter_value_char();
    }

    fn empty(&self, part: PairPart) -> Result<()> {
        Err(ParseError::EmptyPairPart {
            part,
            offset: self.position(),
        })
    }

    /// Match the span read so far against `rules`; `None` if nothing fits.
    fn close_span(&mut self, rules: &[Rule]) -> Result<Option<Operand>> {
        let (cx, source) = (self.cx, self.source);
        let Some(start) = self.span_start.take() else {
            return Ok(None);
        };
        let range = start..self.span_end;
        let rule = cx
            .exact_rule(rules, &source[range.clone()])
            .map_err(|err| err.shifted(start))?;
        self.cursor.reset_value();
        Ok(rule.map(|rule| Operand { range, rule }))
    }

    fn close_key(&mut self, rules: &[Rule], next: PairNode) -> Result<()> {
        match self.close_span(rules)? {
            Some(operand) => {
                self.head = Some(operand);
                self.transition(next)
            }
            None => self.transition(N::Error),
        }
    }

    fn close_value(&mut self, next: PairNode) -> Result<()> {
        let cx = self.cx;
        match self.close_span(&cx.syntax().group_values)? {
            Some(operand) => {
                self.links.push(operand);
                self.transition(next)
            }
            None => self.transition(N::Error),
        }
    }

    /// Find the raw value starting here and jump past it.
    ///
    /// A section header is never a value, so `k =` followed by a header is
    /// missing its value.
    fn lookahead(&mut self) -> Result<()> {
        let (cx, source) = (self.cx, self.source);
        let position = self.position();
        if SectionName::scan(&source[position..])?.is_some() {
            return self.empty(PairPart::Value);
        }
        let found = cx
            .first_prefix(&cx.syntax().raw_values, &source[position..])
            .map_err(|err| err.shifted(position))?;
        tracing::trace!(position, ?found, "raw value lookahead");
        match found {
            Some((rule, len)) => {
                self.links.push(Operand {
                    range: position..position + len,
                    rule,
                });
                self.end = position + len;
                self.transition(N::Val)?;
                self.jump_to(position + len);
                Ok(())
            }
            None => self.transition(N::Error),
        }
    }

    fn bump(&mut self, c: char) {
        if c == '{' {
            self.braces += 1;
        } else {
            self.parens += 1;
        }
    }

    /// Close a nested bracket; `false` if it was never opened.
    fn unbump(&mut self, c: char) -> bool {
        let counter = if c == '}' {
            &mut self.braces
        } else {
            &mut self.parens
        };
        if *counter == 0 {
            return false;
        }
        *counter -= 1;
        true
    }

    /// Resolve the scan at end of input.
    fn finish(&mut self) -> Result<()> {
        match self.node() {
            N::Val | N::GroupEnd => self.transition(N::End),
            N::Sep => self.empty(PairPart::Value),
            N::End | N::Error => Ok(()),
            _ => self.transition(N::Error),
        }
    }
}

fn open(c: char, s: &mut PairState<'_, '_>) -> Result<()> {
    match s.node() {
        N::Start if c == '{' => {
            s.braces = 1;
            s.transition(N::GroupStart)
        }
        N::Start if s.mode == PairMode::Grouped => s.transition(N::Error),
        N::Start => {
            s.transition(N::Key)?;
            s.bump(c);
            s.content(c);
            Ok(())
        }
        N::GroupStart | N::GroupSep => {
            let next = if s.node() == N::GroupStart {
                N::GroupKey
            } else {
                N::GroupVal
            };
            s.transition(next)?;
            s.bump(c);
            s.content(c);
            Ok(())
        }
        N::GroupKey | N::GroupVal | N::Key => {
            s.bump(c);
            s.content(c);
            Ok(())
        }
        N::Sep => s.lookahead(),
        N::GroupEnd | N::Val => s.transition(N::End),
        N::End | N::Error => Ok(()),
    }
}

fn close(c: char, s: &mut PairState<'_, '_>) -> Result<()> {
    let at_base = s.at_base();
    match s.node() {
        N::GroupSep if c == '}' => s.empty(PairPart::Value),
        N::GroupVal if at_base && c == '}' => {
            s.close_value(N::GroupEnd)?;
            if s.node() == N::GroupEnd {
                s.braces -= 1;
                s.grouped_links = s.links.len();
                s.end = s.position() + c.len_utf8();
            }
            Ok(())
        }
        N::GroupKey | N::GroupVal | N::Key if !at_base => {
            if !s.unbump(c) {
                return s.transition(N::Error);
            }
            s.content(c);
            Ok(())
        }
        N::GroupEnd | N::Val => s.transition(N::End),
        N::End | N::Error => Ok(()),
        // "{}", "{abc}" and stray closers are simply not pairs.
        _ => s.transition(N::Error),
    }
}

fn equals(c: char, s: &mut PairState<'_, '_>) -> Result<()> {
    let at_base = s.at_base();
    let syntax = s.cx.syntax();
    match s.node() {
        N::Start | N::GroupStart => s.empty(PairPart::Key),
        N::GroupSep | N::Sep => s.empty(PairPart::Value),
        N::GroupKey if at_base => s.close_key(&syntax.group_keys, N::GroupSep),
        N::Key if at_base => s.close_key(&syntax.raw_keys, N::Sep),
        N::GroupVal if at_base => s.close_value(N::GroupSep),
        N::GroupKey | N::GroupVal | N::Key => {
            s.content(c);
            Ok(())
        }
        N::GroupEnd if s.mode == PairMode::Chained => s.transition(N::Sep),
        N::GroupEnd => s.transition(N::End),
        N::Val => s.transition(N::Sep),
        N::End | N::Error => Ok(()),
    }
}

fn whitespace(_: char, s: &mut PairState<'_, '_>) -> Result<()> {
    if s.node() == N::Start {
        return s.transition(N::Error);
    }
    Ok(())
}

fn other(c: char, s: &mut PairState<'_, '_>) -> Result<()> {
    let raw_boundary = c == ',' || c == ':';
    match s.node() {
        N::Start if s.mode == PairMode::Grouped || raw_boundary => s.transition(N::Error),
        N::Start => {
            s.transition(N::Key)?;
            s.content(c);
            Ok(())
        }
        N::GroupStart => {
            s.transition(N::GroupKey)?;
            s.content(c);
            Ok(())
        }
        N::GroupSep => {
            s.transition(N::GroupVal)?;
            s.content(c);
            Ok(())
        }
        N::Key if raw_boundary && s.at_base() => s.transition(N::Error),
        N::GroupKey | N::GroupVal | N::Key => {
            s.content(c);
            Ok(())
        }
        N::Sep => s.lookahead(),
        N::GroupEnd | N::Val => s.transition(N::End),
        N::End | N::Error => Ok(()),
    }
}

fn steps<'c, 'a>() -> [Step<PairState<'c, 'a>>; 5] {
    [
        Step {
            test: |c, _| c == '{' || c == '(',
            accept: open,
        },
        Step {
            test: |c, _| c == '}' || c == ')',
            accept: close,
        },
        Step {
            test: |c, _| c == '=',
            accept: equals,
        },
        Step {
            test: |c, _| c.is_whitespace(),
            accept: whitespace,
        },
        Step {
            test: |_, _| true,
            accept: other,
        },
    ]
}

/// Operands of a matched pair, in source order.
struct Scanned {
    end: usize,
    head: Operand,
    links: Vec<Operand>,
    grouped_links: usize,
}

/// `key = value`, `{key = value}` and chains of them.
#[derive(Debug, Clone, Copy)]
pub struct Pair<'s> {
    cx: Context<'s>,
    mode: PairMode,
}

impl<'s> Pair<'s> {
    pub fn new(cx: Context<'s>, mode: PairMode) -> Self {
        Self { cx, mode }
    }

    pub fn mode(&self) -> PairMode {
        self.mode
    }

    fn scan(&self, text: &str) -> Result<Option<Scanned>> {
        let steps = steps();
        let state = PairState::new(self.cx, text, self.mode);
        let mut state = skip_comments(text, state, &Composite(&steps))?;
        state.finish()?;
        if state.node() != N::End {
            return Ok(None);
        }
        Ok(state.head.map(|head| Scanned {
            end: state.end,
            head,
            links: state.links,
            grouped_links: state.grouped_links,
        }))
    }

    fn operand<'a>(&self, text: &'a str, operand: &Operand) -> Result<Node<'a>> {
        let start = operand.range.start;
        operand
            .rule
            .parse(self.cx, &text[operand.range.clone()])
            .map_err(|err| err.shifted(start))
    }
}

impl Grammar for Pair<'_> {
    fn rule(&self) -> Rule {
        match self.mode {
            PairMode::Chained => Rule::Pair,
            PairMode::Grouped => Rule::GroupedPair,
        }
    }

    fn match_len(&self, text: &str) -> Result<Option<usize>> {
        Ok(self.scan(text)?.map(|scanned| scanned.end))
    }

    fn parse<'a>(&self, text: &'a str) -> Result<Node<'a>> {
        let scanned = self.scan(text)?;
        ensure_complete(self.rule(), text, scanned.as_ref().map(|s| s.end))?;
        let Some(scanned) = scanned else {
            return Err(ParseError::Unmatched {
                rule: self.rule(),
                len: text.len(),
                matched: None,
            });
        };
        let mut node = self.operand(text, &scanned.head)?;
        for (i, link) in scanned.links.iter().enumerate() {
            let form = if i + 1 == scanned.grouped_links {
                PairForm::Grouped
            } else {
                PairForm::Raw
            };
            node = Node::pair(node, self.operand(text, link)?, form);
        }
        tracing::debug!(links = scanned.links.len(), "parsed pair");
        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Syntax;
    use pretty_assertions::assert_eq;

    fn name(s: &str) -> Node<'_> {
        Node::Name(s)
    }

    fn raw<'a>(k: Node<'a>, v: Node<'a>) -> Node<'a> {
        Node::pair(k, v, PairForm::Raw)
    }

    fn group<'a>(k: Node<'a>, v: Node<'a>) -> Node<'a> {
        Node::pair(k, v, PairForm::Grouped)
    }

    fn len(text: &str) -> Result<Option<usize>> {
        Syntax::default().pair().match_len(text)
    }

    fn parse(text: &str) -> Node<'_> {
        let syntax = Syntax::default();
        syntax.pair().parse(text).unwrap()
    }

    #[test]
    fn test_raw() {
        assert_eq!(len("a = b"), Ok(Some(5)));
        assert_eq!(len("a=b"), Ok(Some(3)));
        assert_eq!(parse("a = b"), raw(name("a"), name("b")));
        assert_eq!(len("a = b c"), Ok(Some(5)));
        assert_eq!(len("a = b, c"), Ok(Some(5)));
    }

    #[test]
    fn test_grouped() {
        assert_eq!(len("{a = b}"), Ok(Some(7)));
        assert_eq!(len("{a = b} rest"), Ok(Some(7)));
        assert_eq!(parse("{a = b}"), group(name("a"), name("b")));
    }

    #[test]
    fn test_chain_nests_left() {
        assert_eq!(
            parse("a = b = 123 = c"),
            raw(
                raw(
                    raw(name("a"), name("b")),
                    Node::Quotient(crate::Rational::from_integer(123))
                ),
                name("c")
            )
        );
        assert_eq!(
            parse("{a = b = c}"),
            group(raw(name("a"), name("b")), name("c"))
        );
        assert_eq!(
            parse("{a = b} = c"),
            raw(group(name("a"), name("b")), name("c"))
        );
        assert_eq!(
            parse("a = {b = c}"),
            raw(name("a"), group(name("b"), name("c")))
        );
    }

    #[test]
    fn test_nested_values() {
        assert_eq!(
            parse("k = (1, 2)").to_string(),
            "k = (1, 2)"
        );
        assert_eq!(
            parse("{k = hello: a b}").to_string(),
            "{k = hello: a b}"
        );
        assert_eq!(parse("(a, b) = 1/2").to_string(), "(a, b) = 1/2");
    }

    #[test]
    fn test_grouped_mode_never_chains() {
        let syntax = Syntax::default();
        let grouped = syntax.grouped_pair();
        assert_eq!(grouped.match_len("{a = b} = c"), Ok(Some(7)));
        assert_eq!(grouped.match_len("a = b"), Ok(None));
    }

    #[test]
    fn test_not_pairs() {
        assert_eq!(len("{}"), Ok(None));
        assert_eq!(len("{abc}"), Ok(None));
        assert_eq!(len("abc"), Ok(None));
        assert_eq!(len("a b = c"), Ok(None));
        assert_eq!(len("a, b = c"), Ok(None));
        assert_eq!(len("hello: a = b"), Ok(None));
        assert_eq!(len(" a = b"), Ok(None));
        assert_eq!(len("{a = b"), Ok(None));
    }

    #[test]
    fn test_empty_parts_are_errors() {
        let empty = |part, offset| Err(ParseError::EmptyPairPart { part, offset });
        assert_eq!(len("=1"), empty(PairPart::Key, 0));
        assert_eq!(len("{=2}"), empty(PairPart::Key, 1));
        assert_eq!(len("name="), empty(PairPart::Value, 5));
        assert_eq!(len("{a=}"), empty(PairPart::Value, 3));
        assert_eq!(len("a = = b"), empty(PairPart::Value, 4));
    }

    #[test]
    fn test_header_is_never_a_raw_value() {
        let empty = Err(ParseError::EmptyPairPart {
            part: PairPart::Value,
            offset: 4,
        });
        assert_eq!(len("k =\nb: x"), empty);
        assert_eq!(len("k = b:"), empty);
        assert_eq!(len("k = b # c\n :"), empty);
        assert_eq!(len("k = v w:"), Ok(Some(5)));
        assert_eq!(len("k = v\nw: x"), Ok(Some(5)));
    }

    #[test]
    fn test_comments() {
        let text = "a # key\n = # value\n b";
        assert_eq!(len(text), Ok(Some(text.len())));
        assert_eq!(parse(text), raw(name("a"), name("b")));
    }
}
