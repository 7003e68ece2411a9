//! Client-side request handling.
//!
//! `state` holds the reducer; `orchestrator` drives backend calls through it.

pub mod orchestrator;
pub mod state;

pub use orchestrator::{QueryLimits, Session};
