//! Transition-validated state machines.
//!
//! Each grammar declares a closed set of states with the [`dag!`] macro,
//! listing the successors allowed from every state. [`Machine`] refuses any
//! edge that is not declared, so a grammar bug surfaces as
//! [`ParseError::InvalidTransition`] rather than as a silent misparse.

use std::fmt::Debug;

use crate::advance::AdvancerState;
use crate::error::{ParseError, Result};

/// A closed state set with a static successor table.
pub trait Dag: Copy + Eq + Debug + 'static {
    /// Machine name used in errors and logs.
    const MACHINE: &'static str;
    /// States that end the scan successfully.
    const ENDS: &'static [Self];
    /// States that end the scan as a mismatch.
    const ERRORS: &'static [Self];

    fn successors(self) -> &'static [Self];

    fn name(self) -> &'static str;

    #[inline]
    fn is_end(self) -> bool {
        Self::ENDS.contains(&self)
    }

    #[inline]
    fn is_error(self) -> bool {
        Self::ERRORS.contains(&self)
    }

    #[inline]
    fn is_terminal(self) -> bool {
        self.is_end() || self.is_error()
    }

    #[inline]
    fn allows(self, next: Self) -> bool {
        self.successors().contains(&next)
    }
}

/// Declare a state enum together with its transition table.
///
/// ```ignore
/// dag! {
///     pub enum Light in "light" {
///         Red => [Green],
///         Green => [Red, Off],
///         Off => [],
///     }
///     ends = [Off];
///     errors = [];
/// }
/// ```
macro_rules! dag {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident in $machine:literal {
            $($state:ident => [$($next:ident),* $(,)?]),+ $(,)?
        }
        ends = [$($end:ident),* $(,)?];
        errors = [$($error:ident),* $(,)?];
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($state),+
        }

        impl $crate::dag::Dag for $name {
            const MACHINE: &'static str = $machine;
            const ENDS: &'static [Self] = &[$(Self::$end),*];
            const ERRORS: &'static [Self] = &[$(Self::$error),*];

            fn successors(self) -> &'static [Self] {
                match self {
                    $(Self::$state => &[$(Self::$next),*],)+
                }
            }

            fn name(self) -> &'static str {
                match self {
                    $(Self::$state => stringify!($state),)+
                }
            }
        }
    };
}

pub(crate) use dag;

/// Current node of a [`Dag`], changed only along declared edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Machine<D> {
    current: D,
}

impl<D: Dag> Machine<D> {
    pub fn new(start: D) -> Self {
        Self { current: start }
    }

    #[inline]
    pub fn current(&self) -> D {
        self.current
    }

    /// Move to `next`, returning the node that was left.
    pub fn transition(&mut self, next: D) -> Result<D> {
        let from = self.current;
        if !from.allows(next) {
            return Err(ParseError::InvalidTransition {
                machine: D::MACHINE,
                from: from.name(),
                to: next.name(),
            });
        }
        tracing::trace!(machine = D::MACHINE, from = from.name(), to = next.name(), "transition");
        self.current = next;
        Ok(from)
    }
}

/// A scan state driven by a [`Machine`].
pub trait DagState: AdvancerState {
    type Node: Dag;

    fn machine(&self) -> &Machine<Self::Node>;

    fn machine_mut(&mut self) -> &mut Machine<Self::Node>;

    /// Runs after every committed transition, before the terminal check.
    fn on_transition(&mut self, _from: Self::Node, _to: Self::Node) -> Result<()> {
        Ok(())
    }

    #[inline]
    fn node(&self) -> Self::Node {
        self.machine().current()
    }

    /// Commit `next`, run the hook and stop the scan on a terminal node.
    fn transition(&mut self, next: Self::Node) -> Result<()> {
        let from = self.machine_mut().transition(next)?;
        self.on_transition(from, next)?;
        if next.is_terminal() {
            self.stop();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advance::{delegate_state, Cursor};

    dag! {
        enum Light in "light" {
            Red => [Green, Broken],
            Green => [Red, Off],
            Off => [],
            Broken => [],
        }
        ends = [Off];
        errors = [Broken];
    }

    struct LightState {
        cursor: Cursor,
        machine: Machine<Light>,
        hops: usize,
    }

    delegate_state!(LightState => cursor);

    impl DagState for LightState {
        type Node = Light;

        fn machine(&self) -> &Machine<Light> {
            &self.machine
        }

        fn machine_mut(&mut self) -> &mut Machine<Light> {
            &mut self.machine
        }

        fn on_transition(&mut self, _from: Light, _to: Light) -> Result<()> {
            self.hops += 1;
            Ok(())
        }
    }

    #[test]
    fn test_table() {
        assert!(Light::Red.allows(Light::Green));
        assert!(!Light::Red.allows(Light::Off));
        assert!(Light::Off.is_end());
        assert!(Light::Broken.is_error());
        assert!(!Light::Green.is_terminal());
        assert_eq!(Light::Green.name(), "Green");
    }

    #[test]
    fn test_undeclared_edge() {
        let mut machine = Machine::new(Light::Red);
        let err = machine.transition(Light::Off).unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidTransition {
                machine: "light",
                from: "Red",
                to: "Off",
            }
        );
        assert_eq!(machine.current(), Light::Red);
    }

    #[test]
    fn test_terminal_stops_state() {
        let mut state = LightState {
            cursor: Cursor::new(),
            machine: Machine::new(Light::Red),
            hops: 0,
        };
        state.transition(Light::Green).unwrap();
        assert!(!state.is_stopped());
        state.transition(Light::Off).unwrap();
        assert!(state.is_stopped());
        assert_eq!(state.hops, 2);
        assert_eq!(state.node(), Light::Off);
    }
}
