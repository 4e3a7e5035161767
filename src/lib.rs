//! MethodInsight: call graph, sequence diagram and matching tests for a
//! single entry method.
//!
//! The analysis in [`core`] runs against the [`core::SourceModel`] and
//! [`core::ReferenceIndex`] traits; [`core::ProjectIndex`] implements both
//! for Java sources on disk.

pub mod config;
pub mod core;
pub mod error;
