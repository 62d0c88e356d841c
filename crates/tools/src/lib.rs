//! Developer Tooling: read-only scene inspection for the side panel and CLI.
//!
//! # Invariants
//! - Inspectors never mutate the scene.
//! - [`EventTally::absorb`] is the one tool that drains the scene's event log; hosts call
//!   it once per frame so the log never outlives a frame.

mod activity;
mod inspector;

pub use activity::EventTally;
pub use inspector::{SceneInspector, SceneSummary, ShapeInfo};
