//! Splitfile driver: connects the pure workflow core to the I/O engine.
//!
//! Hosts embed [`WorkflowSession`] (or wire [`EffectRunner`] into their own
//! message loop) and render from the core view model.
pub mod logging;
mod runner;

pub use runner::{EffectRunner, WorkflowSession};
