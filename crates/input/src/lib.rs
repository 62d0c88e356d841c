//! Pointer Input: ray picking and hover enter/leave dispatch.
//!
//! # Invariants
//! - Only hover-reactive shapes are picked; hits are ordered front to back.
//! - A shape behind a propagation stopper never receives enter in the same pick.
//! - Every shape that loses hover receives exactly one leave.

pub mod pick;
pub mod pointer;

pub use pick::{Hit, pick};
pub use pointer::{DispatchReport, PointerDispatcher, PointerInput};
