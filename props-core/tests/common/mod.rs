//! Test infrastructure for the props parser
//!
//! Provides fixture loading, stochastic test generation, and assertion helpers.

#![allow(dead_code)]

mod generators;
mod harness;
mod loader;

pub use generators::Gen;
pub use harness::{flatten, run_test, run_with_variations};
pub use loader::{load_fixtures_by_name, ExpectedEvent, TestCase};
