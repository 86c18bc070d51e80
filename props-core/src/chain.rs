//! Two scan states advanced in lockstep.

use crate::advance::AdvancerState;

/// A pair of states that share one cursor.
///
/// The position is the max of both halves and every jump brings the lagging
/// half up to the leader, so either side can skip ahead (a comment, a
/// sub-match) without the other re-reading those characters.
#[derive(Debug, Clone, Default)]
pub struct Chained<A, B> {
    pub first: A,
    pub second: B,
}

impl<A: AdvancerState, B: AdvancerState> Chained<A, B> {
    pub fn new(first: A, second: B) -> Self {
        let mut chained = Self { first, second };
        chained.sync();
        chained
    }

    /// Bring both halves to the furthest position either has reached.
    pub fn sync(&mut self) {
        let position = self.position();
        self.first.jump_to(position);
        self.second.jump_to(position);
    }

    pub fn into_parts(self) -> (A, B) {
        (self.first, self.second)
    }
}

impl<A: AdvancerState, B: AdvancerState> AdvancerState for Chained<A, B> {
    #[inline]
    fn position(&self) -> usize {
        self.first.position().max(self.second.position())
    }

    fn jump_to(&mut self, position: usize) {
        self.first.jump_to(position);
        self.second.jump_to(position);
    }

    #[inline]
    fn is_stopped(&self) -> bool {
        self.first.is_stopped() || self.second.is_stopped()
    }

    fn stop(&mut self) {
        self.first.stop();
        self.second.stop();
    }

    #[inline]
    fn has_value(&self) -> bool {
        self.first.has_value() || self.second.has_value()
    }

    fn encounter_value_char(&mut self) {
        self.first.encounter_value_char();
        self.second.encounter_value_char();
    }
}
