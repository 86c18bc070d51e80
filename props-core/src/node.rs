//! AST node types.
//!
//! Nodes borrow names and comment text from the source buffer, so a parsed
//! tree lives no longer than the text it came from.

use std::fmt;

// ============================================================================
// Rational
// ============================================================================

/// A reduced fraction with a positive denominator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rational {
    numerator: i64,
    denominator: i64,
}

impl Rational {
    /// Reduce `numerator / denominator`.
    ///
    /// Returns `None` for a zero denominator or when the reduced value does
    /// not fit in `i64`.
    pub fn new(numerator: i128, denominator: i128) -> Option<Self> {
        if denominator == 0 {
            return None;
        }
        let divisor = gcd(numerator.unsigned_abs(), denominator.unsigned_abs());
        let divisor = i128::try_from(divisor).ok()?;
        let (mut numerator, mut denominator) = (numerator / divisor, denominator / divisor);
        if denominator < 0 {
            numerator = numerator.checked_neg()?;
            denominator = denominator.checked_neg()?;
        }
        Some(Self {
            numerator: i64::try_from(numerator).ok()?,
            denominator: i64::try_from(denominator).ok()?,
        })
    }

    pub fn from_integer(value: i64) -> Self {
        Self {
            numerator: value,
            denominator: 1,
        }
    }

    #[inline]
    pub fn numerator(self) -> i64 {
        self.numerator
    }

    /// Always positive.
    #[inline]
    pub fn denominator(self) -> i64 {
        self.denominator
    }

    #[inline]
    pub fn is_integer(self) -> bool {
        self.denominator == 1
    }

    pub fn to_f64(self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    // gcd(0, 0) only arises for 0/0, which `new` rejects first.
    a.max(1)
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_integer() {
            write!(f, "{}", self.numerator)
        } else {
            write!(f, "{}/{}", self.numerator, self.denominator)
        }
    }
}

// ============================================================================
// Node
// ============================================================================

/// Whether a pair was written bare or inside braces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PairForm {
    /// `key = value`
    Raw,
    /// `{key = value}`
    Grouped,
}

/// A named section and the values that follow its header.
#[derive(Debug, Clone, PartialEq)]
pub struct Section<'a> {
    pub name: &'a str,
    pub children: Vec<Node<'a>>,
}

impl<'a> Section<'a> {
    pub fn new(name: &'a str) -> Self {
        Self {
            name,
            children: Vec::new(),
        }
    }
}

/// A parsed value.
#[derive(Debug, Clone, PartialEq)]
pub enum Node<'a> {
    /// A run of whitespace.
    Whitespace,

    /// `# text` up to the line end; carries the text after `#`.
    Comment(&'a str),

    /// An empty list slot, as on both sides of `(,)`.
    Empty,

    /// Identifier.
    Name(&'a str),

    /// `1`, `-2.5`, `.5`, `3.`
    Decimal(f64),

    /// `3`, `3/4`, `-3 1/2`
    Quotient(Rational),

    /// `(a, b, c)`
    List(Vec<Node<'a>>),

    /// `key = value` or `{key = value}`.
    Pair {
        key: Box<Node<'a>>,
        value: Box<Node<'a>>,
        form: PairForm,
    },

    /// `name:` and its values.
    Section(Section<'a>),

    /// A sequence of sections.
    Properties(Vec<Section<'a>>),
}

impl<'a> Node<'a> {
    pub fn pair(key: Node<'a>, value: Node<'a>, form: PairForm) -> Self {
        Node::Pair {
            key: Box::new(key),
            value: Box::new(value),
            form,
        }
    }

    /// Number of meaningful values this node carries.
    pub fn size(&self) -> usize {
        match self {
            Node::Whitespace | Node::Comment(_) | Node::Empty => 0,
            Node::Name(_) | Node::Decimal(_) | Node::Quotient(_) => 1,
            Node::List(items) => items.len(),
            Node::Pair { .. } => 2,
            Node::Section(section) => section.children.len(),
            Node::Properties(sections) => sections.len(),
        }
    }

    /// Whitespace and comments carry no value.
    #[inline]
    pub fn ignore(&self) -> bool {
        matches!(self, Node::Whitespace | Node::Comment(_))
    }

    #[inline]
    pub fn is_empty_slot(&self) -> bool {
        matches!(self, Node::Empty)
    }

    #[inline]
    pub fn as_name(&self) -> Option<&'a str> {
        match self {
            Node::Name(name) => Some(name),
            _ => None,
        }
    }

    #[inline]
    pub fn as_decimal(&self) -> Option<f64> {
        match self {
            Node::Decimal(value) => Some(*value),
            _ => None,
        }
    }

    #[inline]
    pub fn as_rational(&self) -> Option<Rational> {
        match self {
            Node::Quotient(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Node<'a>]> {
        match self {
            Node::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_pair(&self) -> Option<(&Node<'a>, &Node<'a>, PairForm)> {
        match self {
            Node::Pair { key, value, form } => Some((key, value, *form)),
            _ => None,
        }
    }

    pub fn as_section(&self) -> Option<&Section<'a>> {
        match self {
            Node::Section(section) => Some(section),
            _ => None,
        }
    }

    pub fn as_sections(&self) -> Option<&[Section<'a>]> {
        match self {
            Node::Properties(sections) => Some(sections),
            _ => None,
        }
    }
}

// ============================================================================
// Canonical rendering
// ============================================================================

impl fmt::Display for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Whitespace => f.write_str(" "),
            Node::Comment(text) => write!(f, "#{text}"),
            Node::Empty => Ok(()),
            Node::Name(name) => f.write_str(name),
            Node::Decimal(value) => {
                let rendered = value.to_string();
                f.write_str(&rendered)?;
                if value.is_finite() && !rendered.contains('.') {
                    f.write_str(".0")?;
                }
                Ok(())
            }
            Node::Quotient(value) => write!(f, "{value}"),
            Node::List(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
            Node::Pair {
                key,
                value,
                form: PairForm::Raw,
            } => write!(f, "{key} = {value}"),
            Node::Pair {
                key,
                value,
                form: PairForm::Grouped,
            } => write!(f, "{{{key} = {value}}}"),
            Node::Section(section) => write!(f, "{section}"),
            Node::Properties(sections) => {
                for (i, section) in sections.iter().enumerate() {
                    if i > 0 {
                        f.write_str("\n")?;
                    }
                    write!(f, "{section}")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Section<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.name)?;
        for child in &self.children {
            write!(f, " {child}")?;
        }
        Ok(())
    }
}
