//! Report rendering for the terminal and for saved files.

pub mod generator;

pub use generator::*;
