// src/core/coverage/mod.rs
//! Test discovery against a call graph
//!
//! A test counts as a direct match when it references the entry method and
//! as a closure match when it only references a reachable callee. Each test
//! method appears once; direct matches take precedence.

mod framework;
mod test_finder;
mod test_reference;

pub use framework::FrameworkDetector;
pub use test_finder::TestFinder;
pub use test_reference::{MatchType, TestReference, TestReport};
