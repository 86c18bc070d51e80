//! Props Core Parser
//!
//! Match/parse engine for a small properties DSL: comments, names, decimals,
//! rationals, lists, raw and grouped pairs, and named sections.
//!
//! ```text
//! # a document is a sequence of sections
//! size: 3 1/2 (w, h) {unit = mm}
//! scale: -0.5 ratio = 3/4 = exact
//! ```
//!
//! Every grammar exposes the same two-phase contract through [`Grammar`]:
//! `match_len` reports how long a prefix of the text belongs to the rule, and
//! `parse` turns exactly such a prefix into a [`Node`].
//!
//! # Architecture
//!
//! - **advance.rs** - Cursor state, `(test, accept)` advancers, the scan loop
//! - **chain.rs** - Two states advanced in lockstep
//! - **dag.rs** - Transition-validated state machines (`dag!`)
//! - **grammar/** - One module per grammar component
//! - **syntax.rs** - `Rule` dispatch and `Syntax` configuration
//! - **node.rs** - AST node types and canonical rendering
//! - **error.rs** - `ParseError`
//!
//! # Example
//!
//! ```
//! use props_core::{Grammar, Node, Syntax};
//!
//! let syntax = Syntax::default();
//! let doc = syntax.parse_document("hello: abc def world:").unwrap();
//! let sections = doc.as_sections().unwrap();
//! assert_eq!(sections[0].name, "hello");
//! assert_eq!(sections[0].children, vec![Node::Name("abc"), Node::Name("def")]);
//! assert!(sections[1].children.is_empty());
//!
//! assert_eq!(syntax.pair().match_len("a = b rest").unwrap(), Some(5));
//! ```

pub mod advance;
pub mod chain;
pub mod chars;
pub mod dag;
pub mod error;
pub mod grammar;
pub mod node;
pub mod syntax;

pub use error::{PairPart, ParseError, Result, UnknownRule};
pub use grammar::properties::parse_document;
pub use grammar::{
    Comment, Decimal, Grammar, List, Name, Pair, PairMode, Properties, Quotient, SectionName,
    Whitespace,
};
pub use node::{Node, PairForm, Rational, Section};
pub use syntax::{Context, Rule, Syntax};
