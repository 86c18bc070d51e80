//! Character-advancing scan primitives.
//!
//! Every grammar in this crate is a `(test, accept)` pair - or a
//! [`Composite`] of several - driven by [`run_advancer`] over a state that
//! implements [`AdvancerState`]. There is no other iteration primitive.
//!
//! Positions are byte offsets into UTF-8 text and always sit on character
//! boundaries.

use crate::error::Result;

/// Cursor bookkeeping shared by every scan state.
pub trait AdvancerState {
    /// Byte offset of the next character to read.
    fn position(&self) -> usize;

    /// Move the cursor forward to `position`. Never moves it backwards.
    fn jump_to(&mut self, position: usize);

    fn is_stopped(&self) -> bool;

    /// Stop the scan. Sticky.
    fn stop(&mut self);

    /// Whether a content character was seen since the last reset.
    fn has_value(&self) -> bool;

    /// Record a content character. Sticky until reset.
    fn encounter_value_char(&mut self);
}

/// Plain position / stopped / has-value state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    position: usize,
    stopped: bool,
    has_value: bool,
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the has-value flag, e.g. at an item boundary.
    pub fn reset_value(&mut self) {
        self.has_value = false;
    }
}

impl AdvancerState for Cursor {
    #[inline]
    fn position(&self) -> usize {
        self.position
    }

    #[inline]
    fn jump_to(&mut self, position: usize) {
        self.position = self.position.max(position);
    }

    #[inline]
    fn is_stopped(&self) -> bool {
        self.stopped
    }

    #[inline]
    fn stop(&mut self) {
        self.stopped = true;
    }

    #[inline]
    fn has_value(&self) -> bool {
        self.has_value
    }

    #[inline]
    fn encounter_value_char(&mut self) {
        self.has_value = true;
    }
}

/// Implement [`AdvancerState`] by delegating to a [`Cursor`] field.
macro_rules! delegate_state {
    ($ty:ty => $field:ident) => {
        impl $crate::advance::AdvancerState for $ty {
            #[inline]
            fn position(&self) -> usize {
                $crate::advance::AdvancerState::position(&self.$field)
            }

            #[inline]
            fn jump_to(&mut self, position: usize) {
                $crate::advance::AdvancerState::jump_to(&mut self.$field, position)
            }

            #[inline]
            fn is_stopped(&self) -> bool {
                $crate::advance::AdvancerState::is_stopped(&self.$field)
            }

            #[inline]
            fn stop(&mut self) {
                $crate::advance::AdvancerState::stop(&mut self.$field)
            }

            #[inline]
            fn has_value(&self) -> bool {
                $crate::advance::AdvancerState::has_value(&self.$field)
            }

            #[inline]
            fn encounter_value_char(&mut self) {
                $crate::advance::AdvancerState::encounter_value_char(&mut self.$field)
            }
        }
    };
}

pub(crate) use delegate_state;

/// One step of a scan: decide whether a character concerns this advancer,
/// then act on it.
pub trait CharAdvancer<S: ?Sized> {
    fn test(&self, c: char, state: &S) -> bool;

    fn accept(&self, c: char, state: &mut S) -> Result<()>;
}

impl<S: ?Sized, A: CharAdvancer<S> + ?Sized> CharAdvancer<S> for &A {
    #[inline]
    fn test(&self, c: char, state: &S) -> bool {
        (**self).test(c, state)
    }

    #[inline]
    fn accept(&self, c: char, state: &mut S) -> Result<()> {
        (**self).accept(c, state)
    }
}

/// A `(test, accept)` pair of plain functions.
pub struct Step<S> {
    pub test: fn(char, &S) -> bool,
    pub accept: fn(char, &mut S) -> Result<()>,
}

impl<S> Clone for Step<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for Step<S> {}

impl<S> CharAdvancer<S> for Step<S> {
    #[inline]
    fn test(&self, c: char, state: &S) -> bool {
        (self.test)(c, state)
    }

    #[inline]
    fn accept(&self, c: char, state: &mut S) -> Result<()> {
        (self.accept)(c, state)
    }
}

/// Ordered advancers; a character goes to the first one whose `test` holds.
///
/// This is how a grammar sorts each character into exactly one of its
/// classes, in priority order.
pub struct Composite<'a, A>(pub &'a [A]);

impl<S: ?Sized, A: CharAdvancer<S>> CharAdvancer<S> for Composite<'_, A> {
    fn test(&self, c: char, state: &S) -> bool {
        self.0.iter().any(|advancer| advancer.test(c, state))
    }

    fn accept(&self, c: char, state: &mut S) -> Result<()> {
        match self.0.iter().find(|advancer| advancer.test(c, state)) {
            Some(advancer) => advancer.accept(c, state),
            None => Ok(()),
        }
    }
}

/// Accept action that stops the scan on the current character.
pub fn halt<S: AdvancerState>(_: char, state: &mut S) -> Result<()> {
    state.stop();
    Ok(())
}

/// Drive `advancer` over `source` until the state stops or input runs out.
///
/// After `accept`:
/// - a stopped state leaves the cursor on the character that stopped it;
/// - a cursor moved by `accept` (a jump past a sub-match) is kept;
/// - otherwise the cursor steps past the character.
pub fn run_advancer<S, A>(source: &str, state: &mut S, advancer: &A) -> Result<()>
where
    S: AdvancerState + ?Sized,
    A: CharAdvancer<S> + ?Sized,
{
    while !state.is_stopped() {
        let position = state.position();
        let Some(c) = crate::chars::char_at(source, position) else {
            break;
        };
        if advancer.test(c, state) {
            advancer.accept(c, state)?;
            if state.is_stopped() {
                break;
            }
        }
        if state.position() == position {
            state.jump_to(position + c.len_utf8());
        }
    }
    Ok(())
}
