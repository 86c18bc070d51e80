use std::ops::Range;

use crate::advance::{delegate_state, AdvancerState, Composite, Cursor, Step};
use crate::chars::{is_name_char, is_name_start};
use crate::dag::{dag, DagState, Machine};
use crate::error::Result;
use crate::grammar::{ensure_complete, skip_comments, Grammar};
use crate::node::{Node, Section};
use crate::syntax::Rule;

use SectionNode as N;

dag! {
    enum SectionNode in "section_name" {
        Start => [FirstChar, Colon, Error],
        FirstChar => [Name, Space, Colon, Error],
        Name => [Space, Colon, Error],
        Space => [Colon, Error],
        Colon => [],
        Error => [],
    }
    ends = [Colon];
    errors = [Error];
}

struct SectionState {
    cursor: Cursor,
    machine: Machine<SectionNode>,
    name: Range<usize>,
    end: usize,
}

delegate_state!(SectionState => cursor);

impl DagState for SectionState {
    type Node = SectionNode;

    fn machine(&self) -> &Machine<SectionNode> {
        &self.machine
    }

    fn machine_mut(&mut self) -> &mut Machine<SectionNode> {
        &mut self.machine
    }
}

fn whitespace(_: char, s: &mut SectionState) -> Result<()> {
    match s.node() {
        N::FirstChar | N::Name => s.transition(N::Space),
        _ => Ok(()),
    }
}

fn colon(c: char, s: &mut SectionState) -> Result<()> {
    s.end = s.position() + c.len_utf8();
    s.transition(N::Colon)
}

fn name_char(c: char, s: &mut SectionState) -> Result<()> {
    let position = s.position();
    match s.node() {
        N::Start if is_name_start(c) => {
            s.name = position..position;
            s.transition(N::FirstChar)?;
        }
        N::FirstChar => s.transition(N::Name)?,
        N::Name => {}
        _ => return s.transition(N::Error),
    }
    s.name.end = position + c.len_utf8();
    s.encounter_value_char();
    Ok(())
}

fn other(_: char, s: &mut SectionState) -> Result<()> {
    s.transition(N::Error)
}

const STEPS: [Step<SectionState>; 4] = [
    Step {
        test: |c, _| c.is_whitespace(),
        accept: whitespace,
    },
    Step {
        test: |c, _| c == ':',
        accept: colon,
    },
    Step {
        test: |c, _| is_name_char(c),
        accept: name_char,
    },
    Step {
        test: |_, _| true,
        accept: other,
    },
];

/// `WS* NAME? WS* ':'`, the header of a section.
#[derive(Debug, Clone, Copy, Default)]
pub struct SectionName;

impl SectionName {
    /// Match length and the name's byte range.
    pub(crate) fn scan(text: &str) -> Result<Option<(usize, Range<usize>)>> {
        let state = SectionState {
            cursor: Cursor::new(),
            machine: Machine::new(N::Start),
            name: 0..0,
            end: 0,
        };
        let state = skip_comments(text, state, &Composite(&STEPS))?;
        Ok((state.node() == N::Colon).then_some((state.end, state.name)))
    }
}

impl Grammar for SectionName {
    fn rule(&self) -> Rule {
        Rule::SectionName
    }

    fn match_len(&self, text: &str) -> Result<Option<usize>> {
        Ok(Self::scan(text)?.map(|(len, _)| len))
    }

    fn parse<'a>(&self, text: &'a str) -> Result<Node<'a>> {
        let scanned = Self::scan(text)?;
        ensure_complete(self.rule(), text, scanned.as_ref().map(|(len, _)| *len))?;
        let name = scanned.map_or(0..0, |(_, name)| name);
        Ok(Node::Section(Section::new(&text[name])))
    }
}
