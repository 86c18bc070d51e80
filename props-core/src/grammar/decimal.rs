use crate::advance::{delegate_state, AdvancerState, Composite, Cursor, Step};
use crate::chars::{is_sign, is_terminator};
use crate::dag::{dag, DagState, Machine};
use crate::error::{ParseError, Result};
use crate::grammar::{ensure_complete, skip_comments, Grammar};
use crate::node::Node;
use crate::syntax::Rule;

use DecimalNode as N;

dag! {
    enum DecimalNode in "decimal" {
        Start => [Sign, DecimalSep, Int, Error],
        Sign => [DecimalSep, Int, Error],
        // '.' before any digit
        DecimalSep => [Decimal, Error],
        // '.' after digits
        IntSep => [Decimal, End, Error],
        Int => [IntSep, End, Error],
        Decimal => [End, Error],
        End => [],
        Error => [],
    }
    ends = [End];
    errors = [Error];
}

struct DecimalState {
    cursor: Cursor,
    machine: Machine<DecimalNode>,
    /// End of the last character belonging to the number.
    end: usize,
}

delegate_state!(DecimalState => cursor);

impl DagState for DecimalState {
    type Node = DecimalNode;

    fn machine(&self) -> &Machine<DecimalNode> {
        &self.machine
    }

    fn machine_mut(&mut self) -> &mut Machine<DecimalNode> {
        &mut self.machine
    }
}

impl DecimalState {
    fn new() -> Self {
        Self {
            cursor: Cursor::new(),
            machine: Machine::new(N::Start),
            end: 0,
        }
    }

    fn take(&mut self, c: char) {
        self.end = self.position() + c.len_utf8();
        self.encounter_value_char();
    }
}

fn digit(c: char, s: &mut DecimalState) -> Result<()> {
    match s.node() {
        N::Start | N::Sign => s.transition(N::Int)?,
        N::DecimalSep | N::IntSep => s.transition(N::Decimal)?,
        _ => {}
    }
    s.take(c);
    Ok(())
}

fn sign(c: char, s: &mut DecimalState) -> Result<()> {
    match s.node() {
        N::Start => {
            s.transition(N::Sign)?;
            s.take(c);
        }
        // '-' is reserved and so ends the number; '+' is not.
        N::Int | N::IntSep | N::Decimal if c == '-' => s.transition(N::End)?,
        _ => s.transition(N::Error)?,
    }
    Ok(())
}

fn point(c: char, s: &mut DecimalState) -> Result<()> {
    match s.node() {
        N::Start | N::Sign => s.transition(N::DecimalSep)?,
        N::Int => s.transition(N::IntSep)?,
        _ => return s.transition(N::Error),
    }
    s.take(c);
    Ok(())
}

fn terminator(_: char, s: &mut DecimalState) -> Result<()> {
    match s.node() {
        N::Int | N::IntSep | N::Decimal => s.transition(N::End),
        _ => s.transition(N::Error),
    }
}

fn other(_: char, s: &mut DecimalState) -> Result<()> {
    s.transition(N::Error)
}

const STEPS: [Step<DecimalState>; 5] = [
    Step {
        test: |c, _| c.is_ascii_digit(),
        accept: digit,
    },
    Step {
        test: |c, _| is_sign(c),
        accept: sign,
    },
    Step {
        test: |c, _| c == '.',
        accept: point,
    },
    Step {
        test: |c, _| is_terminator(c),
        accept: terminator,
    },
    Step {
        test: |_, _| true,
        accept: other,
    },
];

/// `SIGN? (DIGITS ('.' DIGITS?)? | '.' DIGITS)`, read as `f64`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Decimal;

impl Grammar for Decimal {
    fn rule(&self) -> Rule {
        Rule::Decimal
    }

    fn match_len(&self, text: &str) -> Result<Option<usize>> {
        let state = skip_comments(text, DecimalState::new(), &Composite(&STEPS))?;
        Ok(match state.node() {
            N::End | N::Int | N::IntSep | N::Decimal => Some(state.end),
            N::Start | N::Sign | N::DecimalSep | N::Error => None,
        })
    }

    fn parse<'a>(&self, text: &'a str) -> Result<Node<'a>> {
        let matched = self.match_len(text)?;
        ensure_complete(self.rule(), text, matched)?;
        let value = text.parse::<f64>().map_err(|_| ParseError::Unmatched {
            rule: self.rule(),
            len: text.len(),
            matched,
        })?;
        Ok(Node::Decimal(value))
    }
}
