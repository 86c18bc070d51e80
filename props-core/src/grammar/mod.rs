//! Grammar components.
//!
//! Every component implements [`Grammar`]: `match_len` reports how long a
//! prefix of the text belongs to the rule, and `parse` turns exactly such a
//! prefix into a [`Node`]. Leaf grammars are unit structs; composite grammars
//! carry a [`Context`](crate::syntax::Context) naming the rules they try.

mod comment;
mod decimal;
mod list;
mod name;
mod pair;
pub(crate) mod properties;
mod quotient;
mod section;
mod whitespace;

pub(crate) use comment::skip_comments;
pub use comment::Comment;
pub use decimal::Decimal;
pub use list::List;
pub use name::Name;
pub use pair::{Pair, PairMode};
pub use properties::Properties;
pub use quotient::Quotient;
pub use section::SectionName;
pub use whitespace::Whitespace;

use crate::error::{ParseError, Result};
use crate::node::Node;
use crate::syntax::Rule;

/// The match/parse contract shared by every grammar component.
pub trait Grammar {
    fn rule(&self) -> Rule;

    /// Length of the prefix of `text` this rule recognizes, or `None`.
    ///
    /// `Err` is reserved for input that is malformed beyond "not this rule".
    fn match_len(&self, text: &str) -> Result<Option<usize>>;

    /// Build the node for `text`, which must be matched in full.
    fn parse<'a>(&self, text: &'a str) -> Result<Node<'a>>;

    /// Match, then parse the matched prefix.
    fn parse_prefix<'a>(&self, text: &'a str) -> Result<Option<(Node<'a>, usize)>> {
        match self.match_len(text)? {
            Some(len) => Ok(Some((self.parse(&text[..len])?, len))),
            None => Ok(None),
        }
    }
}

/// Fail with [`ParseError::Unmatched`] unless `matched` covers all of `text`.
pub(crate) fn ensure_complete(rule: Rule, text: &str, matched: Option<usize>) -> Result<()> {
    if matched == Some(text.len()) {
        Ok(())
    } else {
        Err(ParseError::Unmatched {
            rule,
            len: text.len(),
            matched,
        })
    }
}
