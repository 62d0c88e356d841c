//! Shared types for the shapestage workspace.
//!
//! # Invariants
//! - Shape descriptors are plain data; arity of `args` is validated at construction.
//! - Colors compare by their 8-bit sRGB value, not by the name they were parsed from.

mod color;
mod ray;
mod shape;
mod types;

pub use color::{Color, ColorError};
pub use ray::Ray;
pub use shape::{ShapeDescriptor, ShapeError, ShapeKind};
pub use types::{ShapeId, Transform};
