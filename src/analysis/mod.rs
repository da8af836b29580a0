//! Workload analysis pipeline.
//!
//! Normalization, frequency resolution, rollup and threshold
//! classification, wired together by [`pipeline::analyze`].

pub mod classify;
pub mod frequency;
pub mod normalize;
pub mod pipeline;
pub mod rollup;

pub use pipeline::{analyze, AnalysisOutput};
