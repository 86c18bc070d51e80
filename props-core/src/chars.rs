//! Character classes shared by the grammars.

/// Characters that may not appear in a name, sorted for binary search.
pub const RESERVED: [char; 13] = [
    '#', '(', ')', ',', '-', '/', ':', '<', '=', '>', '[', '\\', ']',
];

/// Starts a comment that runs to the end of the line.
pub const COMMENT_START: char = '#';

#[inline]
pub fn is_reserved(c: char) -> bool {
    RESERVED.binary_search(&c).is_ok()
}

/// CR or LF.
#[inline]
pub fn is_line_end(c: char) -> bool {
    c == '\n' || c == '\r'
}

/// Whitespace or a reserved character: ends a name or a number.
#[inline]
pub fn is_terminator(c: char) -> bool {
    c.is_whitespace() || is_reserved(c)
}

#[inline]
pub fn is_name_char(c: char) -> bool {
    !c.is_whitespace() && !is_reserved(c)
}

#[inline]
pub fn is_name_start(c: char) -> bool {
    is_name_char(c) && !c.is_ascii_digit()
}

#[inline]
pub fn is_sign(c: char) -> bool {
    c == '+' || c == '-'
}

/// The character starting at byte `position`, if any.
#[inline]
pub fn char_at(text: &str, position: usize) -> Option<char> {
    text.get(position..).and_then(|rest| rest.chars().next())
}
