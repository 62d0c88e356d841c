//! Rendering Adapter: renderer-agnostic interface.
//!
//! # Invariants
//! - Renderers read the scene; they never mutate it.
//! - Drawn colors are resolved colors, so hover is visible the frame it changes.

mod renderer;

pub use renderer::{DebugTextRenderer, RenderView, Renderer};
