use crate::advance::{halt, run_advancer, AdvancerState, Cursor, Step};
use crate::error::Result;
use crate::grammar::{ensure_complete, Grammar};
use crate::node::Node;
use crate::syntax::Rule;

const STEP: Step<Cursor> = Step {
    test: |c, _| !c.is_whitespace(),
    accept: halt::<Cursor>,
};

/// A maximal run of Unicode whitespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct Whitespace;

impl Grammar for Whitespace {
    fn rule(&self) -> Rule {
        Rule::Whitespace
    }

    fn match_len(&self, text: &str) -> Result<Option<usize>> {
        let mut cursor = Cursor::new();
        run_advancer(text, &mut cursor, &STEP)?;
        let len = cursor.position();
        Ok((len > 0).then_some(len))
    }

    fn parse<'a>(&self, text: &'a str) -> Result<Node<'a>> {
        ensure_complete(self.rule(), text, self.match_len(text)?)?;
        Ok(Node::Whitespace)
    }
}
