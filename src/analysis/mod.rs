//! Analysis modules.
//!
//! Normalization of raw backend records and ranking of the merged result.

pub mod aggregator;
pub mod normalizer;

pub use aggregator::*;
pub use normalizer::*;
