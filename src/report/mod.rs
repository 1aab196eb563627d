//! Presentation of trending results.

pub mod generator;

pub use generator::*;
