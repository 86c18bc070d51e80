use crate::advance::{halt, run_advancer, AdvancerState, Cursor, Step};
use crate::chars::{is_name_char, is_name_start};
use crate::error::Result;
use crate::grammar::{ensure_complete, Grammar};
use crate::node::Node;
use crate::syntax::Rule;

const STEP: Step<Cursor> = Step {
    test: |c, cursor| {
        if cursor.position() == 0 {
            !is_name_start(c)
        } else {
            !is_name_char(c)
        }
    },
    accept: halt::<Cursor>,
};

/// An identifier: no whitespace, no reserved characters, no leading digit.
#[derive(Debug, Clone, Copy, Default)]
pub struct Name;

impl Grammar for Name {
    fn rule(&self) -> Rule {
        Rule::Name
    }

    fn match_len(&self, text: &str) -> Result<Option<usize>> {
        let mut cursor = Cursor::new();
        run_advancer(text, &mut cursor, &STEP)?;
        let len = cursor.position();
        Ok((len > 0).then_some(len))
    }

    fn parse<'a>(&self, text: &'a str) -> Result<Node<'a>> {
        ensure_complete(self.rule(), text, self.match_len(text)?)?;
        Ok(Node::Name(text))
    }
}
