//! Rational numbers: integers, fractions and mixed numbers.
//!
//! The first run of digits is ambiguous until something follows it: a `/`
//! makes it a numerator, a sign or a second number after whitespace makes it
//! the integer part of a mixed number, and a terminator leaves it a plain
//! integer. The scan stays in `FirstItem` until one of those arrives.

use crate::advance::{delegate_state, AdvancerState, Composite, Cursor, Step};
use crate::chars::{is_reserved, is_sign};
use crate::dag::{dag, DagState, Machine};
use crate::error::{ParseError, Result};
use crate::grammar::{ensure_complete, skip_comments, Grammar};
use crate::node::{Node, Rational};
use crate::syntax::Rule;

use QuotientNode as N;

dag! {
    enum QuotientNode in "quotient" {
        Start => [FirstSign, FirstItem, Error],
        FirstSign => [FirstItem, Error],
        FirstItem => [Integer, Numerator, End, Error],
        // Transient: the first item was an integer part.
        Integer => [SecondSign, Numerator, Error],
        SecondSign => [Numerator, Error],
        Numerator => [Denominator, Error],
        Denominator => [End, Error],
        End => [],
        Error => [],
    }
    ends = [End];
    errors = [Error];
}

#[derive(Debug)]
struct QuotientState {
    cursor: Cursor,
    machine: Machine<QuotientNode>,
    /// Digits of the component being read.
    acc: Option<u64>,
    /// The leading run of digits left `u64`; nothing can match.
    first_overflowed: bool,
    /// A later component left `u64`; only the integer can match.
    tail_overflowed: bool,
    /// Whitespace seen since the last digit.
    gap: bool,
    /// End of the first run of digits.
    first_end: usize,
    /// End of the denominator.
    end: usize,
    negative: bool,
    second_negative: bool,
    integer: Option<u64>,
    numerator: Option<u64>,
    denominator: Option<u64>,
}

delegate_state!(QuotientState => cursor);

impl DagState for QuotientState {
    type Node = QuotientNode;

    fn machine(&self) -> &Machine<QuotientNode> {
        &self.machine
    }

    fn machine_mut(&mut self) -> &mut Machine<QuotientNode> {
        &mut self.machine
    }

    fn on_transition(&mut self, from: QuotientNode, to: QuotientNode) -> Result<()> {
        match (from, to) {
            (N::FirstItem, N::Integer | N::End) => self.integer = self.acc.take(),
            (N::Numerator, N::Denominator) => self.numerator = self.acc.take(),
            (N::Denominator, N::End) => self.denominator = self.acc.take(),
            _ => {}
        }
        Ok(())
    }
}

impl QuotientState {
    fn new() -> Self {
        Self {
            cursor: Cursor::new(),
            machine: Machine::new(N::Start),
            acc: None,
            first_overflowed: false,
            tail_overflowed: false,
            gap: false,
            first_end: 0,
            end: 0,
            negative: false,
            second_negative: false,
            integer: None,
            numerator: None,
            denominator: None,
        }
    }

    fn push_digit(&mut self, c: char) {
        let digit = u64::from(c) - u64::from('0');
        match self
            .acc
            .unwrap_or(0)
            .checked_mul(10)
            .and_then(|v| v.checked_add(digit))
        {
            Some(v) => self.acc = Some(v),
            None if self.node() == N::FirstItem => self.first_overflowed = true,
            None => self.tail_overflowed = true,
        }
        self.gap = false;
        self.encounter_value_char();
    }

    fn next_offset(&self, c: char) -> usize {
        self.position() + c.len_utf8()
    }

    /// Resolve the scan at end of input.
    fn finish(&mut self) -> Result<()> {
        match self.node() {
            N::FirstItem => self.transition(N::End),
            N::Denominator if self.acc.is_some() => self.transition(N::End),
            N::End | N::Error => Ok(()),
            _ => self.transition(N::Error),
        }
    }

    /// Unsigned value of a complete fraction or mixed number.
    fn fraction(&self) -> Option<(i128, i128)> {
        if self.node() != N::End || self.tail_overflowed {
            return None;
        }
        let (n, d) = (i128::from(self.numerator?), i128::from(self.denominator?));
        let numerator = match self.integer {
            Some(i) => {
                let second: i128 = if self.second_negative { -1 } else { 1 };
                i128::from(i).checked_mul(d)?.checked_add(second * n)?
            }
            None => n,
        };
        Some((numerator, d))
    }

    /// Length and value of the match, if any.
    fn result(&self) -> Option<(usize, Rational)> {
        if self.first_overflowed {
            return None;
        }
        let sign: i128 = if self.negative { -1 } else { 1 };
        if let Some(value) = self
            .fraction()
            .and_then(|(n, d)| Rational::new(sign * n, d))
        {
            return Some((self.end, value));
        }
        // A plain integer, or a mixed-number tail that fell through.
        match (self.node(), self.integer) {
            (N::End | N::Error, Some(i)) => {
                Some((self.first_end, Rational::new(sign * i128::from(i), 1)?))
            }
            _ => None,
        }
    }
}

fn digit(c: char, s: &mut QuotientState) -> Result<()> {
    match s.node() {
        N::Start | N::FirstSign => {
            s.transition(N::FirstItem)?;
            s.push_digit(c);
            s.first_end = s.next_offset(c);
        }
        N::FirstItem if s.gap => {
            s.transition(N::Integer)?;
            s.transition(N::Numerator)?;
            s.push_digit(c);
        }
        N::FirstItem => {
            s.push_digit(c);
            s.first_end = s.next_offset(c);
        }
        N::SecondSign => {
            s.transition(N::Numerator)?;
            s.push_digit(c);
        }
        N::Numerator if s.gap => s.transition(N::Error)?,
        N::Numerator => s.push_digit(c),
        N::Denominator => {
            s.push_digit(c);
            s.end = s.next_offset(c);
        }
        N::Integer | N::End | N::Error => {}
    }
    Ok(())
}

fn sign(c: char, s: &mut QuotientState) -> Result<()> {
    match s.node() {
        N::Start => {
            s.negative = c == '-';
            s.transition(N::FirstSign)
        }
        N::FirstItem => {
            s.transition(N::Integer)?;
            s.second_negative = c == '-';
            s.gap = false;
            s.transition(N::SecondSign)
        }
        N::Denominator if s.acc.is_some() && c == '-' => s.transition(N::End),
        _ => s.transition(N::Error),
    }
}

fn slash(_: char, s: &mut QuotientState) -> Result<()> {
    match s.node() {
        N::FirstItem => {
            s.transition(N::Numerator)?;
            s.gap = false;
            s.transition(N::Denominator)
        }
        N::Numerator => {
            s.gap = false;
            s.transition(N::Denominator)
        }
        N::Denominator if s.acc.is_some() => s.transition(N::End),
        _ => s.transition(N::Error),
    }
}

fn whitespace(_: char, s: &mut QuotientState) -> Result<()> {
    match s.node() {
        N::FirstItem | N::Numerator => {
            s.gap = true;
            Ok(())
        }
        N::Denominator if s.acc.is_some() => s.transition(N::End),
        N::SecondSign | N::Denominator => Ok(()),
        _ => s.transition(N::Error),
    }
}

fn terminator(_: char, s: &mut QuotientState) -> Result<()> {
    match s.node() {
        N::FirstItem => s.transition(N::End),
        N::Denominator if s.acc.is_some() => s.transition(N::End),
        _ => s.transition(N::Error),
    }
}

fn other(_: char, s: &mut QuotientState) -> Result<()> {
    match s.node() {
        N::FirstItem if s.gap => s.transition(N::End),
        _ => s.transition(N::Error),
    }
}

const STEPS: [Step<QuotientState>; 6] = [
    Step {
        test: |c, _| c.is_ascii_digit(),
        accept: digit,
    },
    Step {
        test: |c, _| is_sign(c),
        accept: sign,
    },
    Step {
        test: |c, _| c == '/',
        accept: slash,
    },
    Step {
        test: |c, _| c.is_whitespace(),
        accept: whitespace,
    },
    Step {
        test: |c, _| is_reserved(c),
        accept: terminator,
    },
    Step {
        test: |_, _| true,
        accept: other,
    },
];

/// `3`, `-3`, `3/4`, `3 1/2`, `3 + 1/2`, `3 - 1/2`, reduced to a [`Rational`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Quotient;

impl Quotient {
    fn scan(text: &str) -> Result<Option<(usize, Rational)>> {
        let mut state = skip_comments(text, QuotientState::new(), &Composite(&STEPS))?;
        state.finish()?;
        Ok(state.result())
    }
}

impl Grammar for Quotient {
    fn rule(&self) -> Rule {
        Rule::Quotient
    }

    fn match_len(&self, text: &str) -> Result<Option<usize>> {
        Ok(Self::scan(text)?.map(|(len, _)| len))
    }

    fn parse<'a>(&self, text: &'a str) -> Result<Node<'a>> {
        let scanned = Self::scan(text)?;
        ensure_complete(self.rule(), text, scanned.map(|(len, _)| len))?;
        match scanned {
            Some((_, value)) => Ok(Node::Quotient(value)),
            None => Err(ParseError::Unmatched {
                rule: self.rule(),
                len: text.len(),
                matched: None,
            }),
        }
    }
}
