//! Sections and the document entry point.
//!
//! At each position a section header is tried first, so a dangling `:`
//! always opens a new section. Otherwise the rules of `section_values` are
//! tried in order; ignored rules (whitespace, comments) advance without
//! producing a child.

use crate::advance::{delegate_state, AdvancerState, Cursor, Step};
use crate::dag::{dag, DagState, Machine};
use crate::error::{ParseError, Result};
use crate::grammar::{ensure_complete, skip_comments, Comment, Grammar, SectionName, Whitespace};
use crate::node::{Node, Section};
use crate::syntax::{Context, Rule, Syntax};

use PropertiesNode as N;

dag! {
    enum PropertiesNode in "properties" {
        Start => [Header, Done],
        Header => [Header, Value, Done],
        Value => [Header, Value, Done],
        Done => [],
    }
    ends = [Done];
    errors = [];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    /// Count sections and find the match length.
    Sections,
    /// Count one section's children, stopping at the next header.
    Children,
    /// Build the sections.
    Fill,
}

struct PropertiesState<'c, 'a> {
    cursor: Cursor,
    machine: Machine<PropertiesNode>,
    cx: Context<'c>,
    source: &'a str,
    pass: Pass,
    sections: usize,
    children: usize,
    /// End of the last header or value.
    end: usize,
    built: Vec<Section<'a>>,
}

delegate_state!(PropertiesState<'_, '_> => cursor);

impl DagState for PropertiesState<'_, '_> {
    type Node = PropertiesNode;

    fn machine(&self) -> &Machine<PropertiesNode> {
        &self.machine
    }

    fn machine_mut(&mut self) -> &mut Machine<PropertiesNode> {
        &mut self.machine
    }
}

impl<'c, 'a> PropertiesState<'c, 'a> {
    fn new(cx: Context<'c>, source: &'a str, pass: Pass, start: PropertiesNode) -> Self {
        Self {
            cursor: Cursor::new(),
            machine: Machine::new(start),
            cx,
            source,
            pass,
            sections: 0,
            children: 0,
            end: 0,
            built: Vec::new(),
        }
    }

    fn header(&mut self, len: usize, name: &'a str) -> Result<()> {
        if self.pass == Pass::Children {
            return self.transition(N::Done);
        }
        let position = self.position();
        self.transition(N::Header)?;
        self.sections += 1;
        self.end = position + len;
        if self.pass == Pass::Fill {
            let children = count_children(self.cx, self.source, self.end)?;
            self.built.push(Section {
                name,
                children: Vec::with_capacity(children),
            });
        }
        self.jump_to(position + len);
        Ok(())
    }

    fn value(&mut self, rule: Rule, len: usize) -> Result<()> {
        let position = self.position();
        if rule.is_ignored() {
            self.jump_to(position + len);
            return Ok(());
        }
        self.transition(N::Value)?;
        self.children += 1;
        self.end = position + len;
        if self.pass == Pass::Fill {
            let source = self.source;
            let text = &source[position..position + len];
            let child = rule
                .parse(self.cx, text)
                .map_err(|err| err.shifted(position))?;
            if let Some(section) = self.built.last_mut() {
                section.children.push(child);
            }
        }
        self.jump_to(position + len);
        Ok(())
    }
}

fn step(_: char, s: &mut PropertiesState<'_, '_>) -> Result<()> {
    let (cx, source) = (s.cx, s.source);
    let position = s.position();
    let rest = &source[position..];
    let shift = |err: ParseError| err.shifted(position);
    if let Some((len, name)) = SectionName::scan(rest).map_err(shift)? {
        let name = &rest[name];
        return s.header(len, name);
    }
    if s.node() == N::Start {
        // Values before the first header end the match.
        return s.transition(N::Done);
    }
    match cx
        .first_prefix(&cx.syntax().section_values, rest)
        .map_err(shift)?
    {
        Some((rule, len)) => s.value(rule, len),
        None => s.transition(N::Done),
    }
}

fn run<'c, 'a>(state: PropertiesState<'c, 'a>) -> Result<PropertiesState<'c, 'a>> {
    let source = state.source;
    let advancer = Step {
        test: |_, _| true,
        accept: step,
    };
    skip_comments(source, state, &advancer)
}

fn count_children(cx: Context<'_>, source: &str, from: usize) -> Result<usize> {
    let mut state = PropertiesState::new(cx, source, Pass::Children, N::Header);
    state.jump_to(from);
    Ok(run(state)?.children)
}

/// A sequence of `name: value*` sections.
#[derive(Debug, Clone, Copy)]
pub struct Properties<'s> {
    cx: Context<'s>,
}

impl<'s> Properties<'s> {
    pub fn new(cx: Context<'s>) -> Self {
        Self { cx }
    }

    /// Match length and section count.
    fn count(&self, text: &str) -> Result<Option<(usize, usize)>> {
        let state = run(PropertiesState::new(self.cx, text, Pass::Sections, N::Start))?;
        Ok((state.sections > 0).then_some((state.end, state.sections)))
    }
}

impl Grammar for Properties<'_> {
    fn rule(&self) -> Rule {
        Rule::Properties
    }

    fn match_len(&self, text: &str) -> Result<Option<usize>> {
        Ok(self.count(text)?.map(|(len, _)| len))
    }

    fn parse<'a>(&self, text: &'a str) -> Result<Node<'a>> {
        let counted = self.count(text)?;
        ensure_complete(self.rule(), text, counted.map(|(len, _)| len))?;
        let mut state = PropertiesState::new(self.cx, text, Pass::Fill, N::Start);
        state.built = Vec::with_capacity(counted.map_or(0, |(_, sections)| sections));
        let sections = run(state)?.built;
        tracing::debug!(sections = sections.len(), "parsed properties");
        Ok(Node::Properties(sections))
    }
}

/// Offset of the first byte in `text` that is not whitespace or a comment.
fn skip_ignorable(text: &str) -> Result<usize> {
    let mut offset = 0;
    while offset < text.len() {
        let rest = &text[offset..];
        match Whitespace.match_len(rest)?.or(Comment.match_len(rest)?) {
            Some(len) => offset += len,
            None => break,
        }
    }
    Ok(offset)
}

/// Parse a whole document into [`Node::Properties`].
///
/// Leading and trailing whitespace and comments are accepted; a document of
/// nothing else yields no sections. Anything no rule accepts is reported as
/// [`ParseError::NoMatch`] at its offset.
pub fn parse_document<'a>(syntax: &Syntax, text: &'a str) -> Result<Node<'a>> {
    let properties = syntax.properties();
    let Some(len) = properties.match_len(text)? else {
        let offset = skip_ignorable(text)?;
        if offset == text.len() {
            return Ok(Node::Properties(Vec::new()));
        }
        return Err(ParseError::NoMatch { offset });
    };
    let trailing = skip_ignorable(&text[len..])?;
    if len + trailing != text.len() {
        return Err(ParseError::NoMatch {
            offset: len + trailing,
        });
    }
    properties.parse(&text[..len])
}
