//! Error types for matching and parsing.
//!
//! A soft mismatch is not an error: `match_len` returns `Ok(None)` and the
//! caller tries the next rule. Everything here is a hard failure that aborts
//! the enclosing parse.

use std::fmt;

use thiserror::Error;

use crate::syntax::Rule;

/// Result alias used throughout the crate.
pub type Result<T, E = ParseError> = std::result::Result<T, E>;

/// Which half of a pair was missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairPart {
    /// Nothing before the `=`.
    Key,
    /// Nothing after the `=`.
    Value,
}

impl fmt::Display for PairPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Key => "key",
            Self::Value => "value",
        })
    }
}

/// Hard parse failure.
///
/// Offsets are byte offsets relative to the text handed to the component
/// that reported the error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A state machine tried an edge its transition table does not declare.
    #[error("invalid {machine} transition {from} -> {to}")]
    InvalidTransition {
        machine: &'static str,
        from: &'static str,
        to: &'static str,
    },

    /// A bracket or brace closes something that was never opened.
    #[error("mismatched `{found}` at offset {offset}")]
    Mismatched { found: char, offset: usize },

    /// `=` with nothing on one side of it.
    #[error("pair has an empty {part} at offset {offset}")]
    EmptyPairPart { part: PairPart, offset: usize },

    /// `parse` was handed text that `match_len` does not accept in full.
    #[error("text is not exactly one {rule}: {len} bytes given, matched {matched:?}")]
    Unmatched {
        rule: Rule,
        len: usize,
        matched: Option<usize>,
    },

    /// Brackets, braces or nested sections go deeper than the configured limit.
    #[error("nesting exceeds the limit of {limit} levels")]
    TooDeep { limit: usize },

    /// No rule accepts the document at this offset.
    #[error("no rule matches the input at offset {offset}")]
    NoMatch { offset: usize },
}

/// A rule name that does not name any grammar component.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown rule `{0}`")]
pub struct UnknownRule(pub String);

impl ParseError {
    /// Rebase offsets reported for a sub-slice starting at `base`.
    pub fn shifted(self, base: usize) -> Self {
        match self {
            Self::Mismatched { found, offset } => Self::Mismatched {
                found,
                offset: offset + base,
            },
            Self::EmptyPairPart { part, offset } => Self::EmptyPairPart {
                part,
                offset: offset + base,
            },
            Self::NoMatch { offset } => Self::NoMatch {
                offset: offset + base,
            },
            other => other,
        }
    }

    /// Byte offset of the failure, for the variants that carry one.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::Mismatched { offset, .. }
            | Self::EmptyPairPart { offset, .. }
            | Self::NoMatch { offset } => Some(*offset),
            _ => None,
        }
    }
}
