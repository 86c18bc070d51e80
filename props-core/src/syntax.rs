//! Rule dispatch and parser configuration.
//!
//! [`Rule`] names every grammar component. Composite grammars hold a
//! [`Context`] and try the rules listed in their [`Syntax`] in order; each
//! step into a composite rule goes one level deeper and is checked against
//! [`Syntax::max_depth`].

use std::fmt;
use std::str::FromStr;

use phf::phf_map;

use crate::error::{ParseError, Result, UnknownRule};
use crate::grammar::{
    Comment, Decimal, Grammar, List, Name, Pair, PairMode, Properties, Quotient, SectionName,
    Whitespace,
};
use crate::node::Node;

/// Every grammar component, by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Rule {
    Whitespace,
    Comment,
    Name,
    Decimal,
    Quotient,
    List,
    /// Raw or grouped pair, chains allowed.
    Pair,
    /// A single `{key = value}` group, never chained.
    GroupedPair,
    SectionName,
    Properties,
}

static RULES: phf::Map<&'static str, Rule> = phf_map! {
    "whitespace" => Rule::Whitespace,
    "comment" => Rule::Comment,
    "name" => Rule::Name,
    "decimal" => Rule::Decimal,
    "quotient" => Rule::Quotient,
    "list" => Rule::List,
    "pair" => Rule::Pair,
    "grouped_pair" => Rule::GroupedPair,
    "section_name" => Rule::SectionName,
    "properties" => Rule::Properties,
};

impl Rule {
    pub fn name(self) -> &'static str {
        match self {
            Rule::Whitespace => "whitespace",
            Rule::Comment => "comment",
            Rule::Name => "name",
            Rule::Decimal => "decimal",
            Rule::Quotient => "quotient",
            Rule::List => "list",
            Rule::Pair => "pair",
            Rule::GroupedPair => "grouped_pair",
            Rule::SectionName => "section_name",
            Rule::Properties => "properties",
        }
    }

    /// Rules whose nodes carry no value and are skipped in child lists.
    #[inline]
    pub fn is_ignored(self) -> bool {
        matches!(self, Rule::Whitespace | Rule::Comment)
    }

    pub fn match_len(self, cx: Context<'_>, text: &str) -> Result<Option<usize>> {
        match self {
            Rule::Whitespace => Whitespace.match_len(text),
            Rule::Comment => Comment.match_len(text),
            Rule::Name => Name.match_len(text),
            Rule::Decimal => Decimal.match_len(text),
            Rule::Quotient => Quotient.match_len(text),
            Rule::SectionName => SectionName.match_len(text),
            Rule::List => List::new(cx.enter()?).match_len(text),
            Rule::Pair => Pair::new(cx.enter()?, PairMode::Chained).match_len(text),
            Rule::GroupedPair => Pair::new(cx.enter()?, PairMode::Grouped).match_len(text),
            Rule::Properties => Properties::new(cx.enter()?).match_len(text),
        }
    }

    pub fn parse<'a>(self, cx: Context<'_>, text: &'a str) -> Result<Node<'a>> {
        match self {
            Rule::Whitespace => Whitespace.parse(text),
            Rule::Comment => Comment.parse(text),
            Rule::Name => Name.parse(text),
            Rule::Decimal => Decimal.parse(text),
            Rule::Quotient => Quotient.parse(text),
            Rule::SectionName => SectionName.parse(text),
            Rule::List => List::new(cx.enter()?).parse(text),
            Rule::Pair => Pair::new(cx.enter()?, PairMode::Chained).parse(text),
            Rule::GroupedPair => Pair::new(cx.enter()?, PairMode::Grouped).parse(text),
            Rule::Properties => Properties::new(cx.enter()?).parse(text),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Rule {
    type Err = UnknownRule;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        RULES.get(s).copied().ok_or_else(|| UnknownRule(s.to_owned()))
    }
}

/// Sub-rule lists and limits shared by all composite grammars.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Syntax {
    /// Tried against each list item's exact text.
    pub list_items: Vec<Rule>,
    /// Tried against the key of a `{key = value}` group.
    pub group_keys: Vec<Rule>,
    /// Tried against the value of a `{key = value}` group.
    pub group_values: Vec<Rule>,
    /// Tried against the key of a raw `key = value` pair.
    pub raw_keys: Vec<Rule>,
    /// Tried as a prefix of the text after a raw `=`; the first hit ends the value.
    pub raw_values: Vec<Rule>,
    /// Tried at each position after a section header.
    pub section_values: Vec<Rule>,
    /// Deepest nesting of composite rules before [`ParseError::TooDeep`].
    pub max_depth: usize,
}

impl Default for Syntax {
    fn default() -> Self {
        const VALUES: [Rule; 4] = [Rule::List, Rule::Quotient, Rule::Decimal, Rule::Name];
        let with = |head: &[Rule]| [head, &VALUES[..]].concat();
        Self {
            list_items: with(&[Rule::Pair]),
            group_keys: with(&[Rule::Pair]),
            group_values: with(&[Rule::Properties, Rule::Pair]),
            raw_keys: VALUES.to_vec(),
            raw_values: with(&[Rule::GroupedPair]),
            section_values: with(&[Rule::Whitespace, Rule::Comment, Rule::Pair]),
            max_depth: 64,
        }
    }
}

impl Syntax {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn list(&self) -> List<'_> {
        List::new(Context::new(self))
    }

    pub fn pair(&self) -> Pair<'_> {
        Pair::new(Context::new(self), PairMode::Chained)
    }

    pub fn grouped_pair(&self) -> Pair<'_> {
        Pair::new(Context::new(self), PairMode::Grouped)
    }

    pub fn properties(&self) -> Properties<'_> {
        Properties::new(Context::new(self))
    }

    /// Parse a whole document; see [`crate::parse_document`].
    pub fn parse_document<'a>(&self, text: &'a str) -> Result<Node<'a>> {
        crate::grammar::properties::parse_document(self, text)
    }
}

/// A [`Syntax`] plus the current nesting depth.
#[derive(Debug, Clone, Copy)]
pub struct Context<'s> {
    syntax: &'s Syntax,
    depth: usize,
}

impl<'s> Context<'s> {
    pub fn new(syntax: &'s Syntax) -> Self {
        Self { syntax, depth: 0 }
    }

    #[inline]
    pub fn syntax(&self) -> &'s Syntax {
        self.syntax
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// One level deeper, or [`ParseError::TooDeep`] past the limit.
    pub fn enter(self) -> Result<Self> {
        let limit = self.syntax.max_depth;
        if self.depth >= limit {
            tracing::warn!(limit, "nesting limit reached");
            return Err(ParseError::TooDeep { limit });
        }
        Ok(Self {
            depth: self.depth + 1,
            ..self
        })
    }

    /// The first rule matching all of `text`.
    pub fn exact_rule(self, rules: &[Rule], text: &str) -> Result<Option<Rule>> {
        for &rule in rules {
            if rule.match_len(self, text)? == Some(text.len()) {
                return Ok(Some(rule));
            }
        }
        Ok(None)
    }

    /// The first rule matching a non-empty prefix of `text`, with its length.
    pub fn first_prefix(self, rules: &[Rule], text: &str) -> Result<Option<(Rule, usize)>> {
        for &rule in rules {
            if let Some(len) = rule.match_len(self, text)? {
                if len > 0 {
                    return Ok(Some((rule, len)));
                }
            }
        }
        Ok(None)
    }
}
