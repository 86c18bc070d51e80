use crate::advance::{delegate_state, AdvancerState, Composite, Cursor, Step};
use crate::dag::{dag, DagState, Machine};
use crate::error::{ParseError, Result};
use crate::grammar::{ensure_complete, skip_comments, Grammar};
use crate::node::Node;
use crate::syntax::{Context, Rule};

use ListNode as N;

dag! {
    enum ListNode in "list" {
        Start => [Open, Error],
        Open => [Item, Separator, Close, Error],
        Item => [Separator, Close, Error],
        Separator => [Item, Separator, Close, Error],
        Close => [],
        Error => [],
    }
    ends = [Close];
    errors = [Error];
}

struct ListState<'c, 'a> {
    cursor: Cursor,
    machine: Machine<ListNode>,
    cx: Context<'c>,
    source: &'a str,
    /// Open parentheses, including the list's own.
    depth: i32,
    braces: i32,
    /// First and last content character of the current item.
    item_start: Option<usize>,
    item_end: usize,
    count: usize,
    /// Filled on the second pass only.
    items: Option<Vec<Node<'a>>>,
    end: usize,
}

delegate_state!(ListState<'_, '_> => cursor);

impl DagState for ListState<'_, '_> {
    type Node = ListNode;

    fn machine(&self) -> &Machine<ListNode> {
        &self.machine
    }

    fn machine_mut(&mut self) -> &mut Machine<ListNode> {
        &mut self.machine
    }
}

impl<'c, 'a> ListState<'c, 'a> {
    fn new(cx: Context<'c>, source: &'a str, items: Option<Vec<Node<'a>>>) -> Self {
        Self {
            cursor: Cursor::new(),
            machine: Machine::new(N::Start),
            cx,
            source,
            depth: 0,
            braces: 0,
            item_start: None,
            item_end: 0,
            count: 0,
            items,
            end: 0,
        }
    }

    fn at_top(&self) -> bool {
        self.depth == 1 && self.braces == 0
    }

    fn content(&mut self, c: char) -> Result<()> {
        if matches!(self.node(), N::Open | N::Separator) {
            self.transition(N::Item)?;
        }
        let position = self.position();
        self.item_start.get_or_insert(position);
        self.item_end = position + c.len_utf8();
        self.encounter_value_char();
        Ok(())
    }

    /// Close the current item at a `,` or the final `)`.
    fn finish_item(&mut self) -> Result<()> {
        let (cx, source) = (self.cx, self.source);
        self.count += 1;
        match self.item_start.take() {
            Some(start) => {
                let text = &source[start..self.item_end];
                let shift = |err: ParseError| err.shifted(start);
                let Some(rule) = cx
                    .exact_rule(&cx.syntax().list_items, text)
                    .map_err(shift)?
                else {
                    return self.transition(N::Error);
                };
                if let Some(items) = self.items.as_mut() {
                    items.push(rule.parse(cx, text).map_err(shift)?);
                }
            }
            None => {
                if let Some(items) = self.items.as_mut() {
                    items.push(Node::Empty);
                }
            }
        }
        self.cursor.reset_value();
        Ok(())
    }
}

fn open(c: char, s: &mut ListState<'_, '_>) -> Result<()> {
    match s.node() {
        N::Start if c == '(' => {
            s.depth = 1;
            s.transition(N::Open)
        }
        N::Start => s.transition(N::Error),
        _ => {
            if c == '(' {
                s.depth += 1;
            } else {
                s.braces += 1;
            }
            s.content(c)
        }
    }
}

fn close(c: char, s: &mut ListState<'_, '_>) -> Result<()> {
    let position = s.position();
    match (s.node(), c) {
        (N::Start, _) => s.transition(N::Error),
        (_, '}') if s.braces == 0 => Err(ParseError::Mismatched {
            found: c,
            offset: position,
        }),
        (_, '}') => {
            s.braces -= 1;
            s.content(c)
        }
        (_, _) if s.depth == 1 && s.braces > 0 => Err(ParseError::Mismatched {
            found: c,
            offset: position,
        }),
        (node, _) if s.depth == 1 => {
            if matches!(node, N::Item | N::Separator) {
                s.finish_item()?;
            }
            if s.node() == N::Error {
                return Ok(());
            }
            s.end = position + c.len_utf8();
            s.transition(N::Close)
        }
        (_, _) => {
            s.depth -= 1;
            s.content(c)
        }
    }
}

fn separator(c: char, s: &mut ListState<'_, '_>) -> Result<()> {
    match s.node() {
        N::Start => s.transition(N::Error),
        _ if s.at_top() => {
            s.finish_item()?;
            if s.node() == N::Error {
                return Ok(());
            }
            s.transition(N::Separator)
        }
        _ => s.content(c),
    }
}

fn whitespace(_: char, s: &mut ListState<'_, '_>) -> Result<()> {
    if s.node() == N::Start {
        return s.transition(N::Error);
    }
    Ok(())
}

fn other(c: char, s: &mut ListState<'_, '_>) -> Result<()> {
    if s.node() == N::Start {
        return s.transition(N::Error);
    }
    s.content(c)
}

fn steps<'c, 'a>() -> [Step<ListState<'c, 'a>>; 5] {
    [
        Step {
            test: |c, _| c == '(' || c == '{',
            accept: open,
        },
        Step {
            test: |c, _| c == ')' || c == '}',
            accept: close,
        },
        Step {
            test: |c, _| c == ',',
            accept: separator,
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

/// `'(' item (',' item)* ')'`, each item matched exactly by one of
/// [`Syntax::list_items`](crate::Syntax::list_items).
#[derive(Debug, Clone, Copy)]
pub struct List<'s> {
    cx: Context<'s>,
}

impl<'s> List<'s> {
    pub fn new(cx: Context<'s>) -> Self {
        Self { cx }
    }

    fn scan<'a>(&self, text: &'a str, items: Option<Vec<Node<'a>>>) -> Result<ListState<'s, 'a>> {
        let steps = steps();
        let state = ListState::new(self.cx, text, items);
        skip_comments(text, state, &Composite(&steps))
    }

    /// Match length and item count.
    fn count(&self, text: &str) -> Result<Option<(usize, usize)>> {
        let state = self.scan(text, None)?;
        Ok((state.node() == N::Close).then_some((state.end, state.count)))
    }
}

impl Grammar for List<'_> {
    fn rule(&self) -> Rule {
        Rule::List
    }

    fn match_len(&self, text: &str) -> Result<Option<usize>> {
        Ok(self.count(text)?.map(|(len, _)| len))
    }

    fn parse<'a>(&self, text: &'a str) -> Result<Node<'a>> {
        let counted = self.count(text)?;
        ensure_complete(self.rule(), text, counted.map(|(len, _)| len))?;
        let capacity = counted.map_or(0, |(_, count)| count);
        let state = self.scan(text, Some(Vec::with_capacity(capacity)))?;
        let items = state.items.unwrap_or_default();
        tracing::debug!(items = items.len(), "parsed list");
        Ok(Node::List(items))
    }
}
