//! Line comments, standalone and skipped inside other grammars.

use crate::advance::{delegate_state, run_advancer, AdvancerState, CharAdvancer, Cursor};
use crate::chain::Chained;
use crate::chars::COMMENT_START;
use crate::dag::{dag, DagState, Machine};
use crate::error::Result;
use crate::grammar::{ensure_complete, Grammar};
use crate::node::Node;
use crate::syntax::Rule;

dag! {
    pub(crate) enum CommentNode in "comment" {
        OutOfComment => [InComment],
        InComment => [OutOfComment, Closed],
        Closed => [],
    }
    ends = [Closed];
    errors = [];
}

/// Comment tracking state; runs chained beside a grammar's own state.
#[derive(Debug, Clone)]
pub(crate) struct CommentState {
    cursor: Cursor,
    machine: Machine<CommentNode>,
}

impl CommentState {
    pub(crate) fn new() -> Self {
        Self {
            cursor: Cursor::new(),
            machine: Machine::new(CommentNode::OutOfComment),
        }
    }
}

delegate_state!(CommentState => cursor);

impl DagState for CommentState {
    type Node = CommentNode;

    fn machine(&self) -> &Machine<CommentNode> {
        &self.machine
    }

    fn machine_mut(&mut self) -> &mut Machine<CommentNode> {
        &mut self.machine
    }
}

/// Offset of the first CR or LF at or after `from`, or the end of `source`.
fn line_end(source: &str, from: usize) -> usize {
    memchr::memchr2(b'\n', b'\r', &source.as_bytes()[from..]).map_or(source.len(), |i| from + i)
}

/// Enter a comment at `#` and jump to the end of its line.
fn open_comment(source: &str, state: &mut CommentState) -> Result<usize> {
    state.transition(CommentNode::InComment)?;
    let end = line_end(source, state.position() + COMMENT_START.len_utf8());
    Ok(end)
}

/// Wraps `inner` so that comments are stepped over before it sees them.
///
/// The line end that closes a comment is handed to `inner` like any other
/// character, so a comment reads as whitespace.
pub(crate) struct SkipComments<'a, A> {
    pub inner: &'a A,
    pub source: &'a str,
}

impl<S, A> CharAdvancer<Chained<CommentState, S>> for SkipComments<'_, A>
where
    S: AdvancerState,
    A: CharAdvancer<S>,
{
    fn test(&self, _: char, _: &Chained<CommentState, S>) -> bool {
        true
    }

    fn accept(&self, c: char, state: &mut Chained<CommentState, S>) -> Result<()> {
        if state.first.node() == CommentNode::InComment {
            state.first.transition(CommentNode::OutOfComment)?;
        } else if c == COMMENT_START {
            let end = open_comment(self.source, &mut state.first)?;
            state.jump_to(end);
            return Ok(());
        }
        if self.inner.test(c, &state.second) {
            self.inner.accept(c, &mut state.second)?;
        }
        state.sync();
        Ok(())
    }
}

/// Run `advancer` over `source` with comments skipped, returning its final state.
pub(crate) fn skip_comments<S, A>(source: &str, inner: S, advancer: &A) -> Result<S>
where
    S: AdvancerState,
    A: CharAdvancer<S>,
{
    let mut state = Chained::new(CommentState::new(), inner);
    run_advancer(
        source,
        &mut state,
        &SkipComments {
            inner: advancer,
            source,
        },
    )?;
    Ok(state.second)
}

/// Standalone comment scan: `#` opens, the line end closes.
struct CommentScan<'a> {
    source: &'a str,
}

impl CharAdvancer<CommentState> for CommentScan<'_> {
    fn test(&self, _: char, _: &CommentState) -> bool {
        true
    }

    fn accept(&self, c: char, state: &mut CommentState) -> Result<()> {
        match state.node() {
            CommentNode::OutOfComment if c == COMMENT_START => {
                let end = open_comment(self.source, state)?;
                state.jump_to(end);
            }
            CommentNode::InComment => state.transition(CommentNode::Closed)?,
            _ => state.stop(),
        }
        Ok(())
    }
}

/// `#` followed by everything up to, not including, CR or LF.
#[derive(Debug, Clone, Copy, Default)]
pub struct Comment;

impl Grammar for Comment {
    fn rule(&self) -> Rule {
        Rule::Comment
    }

    fn match_len(&self, text: &str) -> Result<Option<usize>> {
        let mut state = CommentState::new();
        run_advancer(text, &mut state, &CommentScan { source: text })?;
        Ok(match state.node() {
            CommentNode::OutOfComment => None,
            CommentNode::InComment | CommentNode::Closed => Some(state.position()),
        })
    }

    fn parse<'a>(&self, text: &'a str) -> Result<Node<'a>> {
        ensure_complete(self.rule(), text, self.match_len(text)?)?;
        Ok(Node::Comment(&text[COMMENT_START.len_utf8()..]))
    }
}
