//! wgpu render backend for shape scenes.
//!
//! Tessellates each shape descriptor once per distinct kind and args, draws shapes
//! lit by the scene's directional and ambient lights, and draws the light helper as
//! lines. The camera orbits a target with the mouse.
//!
//! # Invariants
//! - Renderer never mutates scene state.
//! - Camera motion is not part of the scene.
//! - A changed dimension arg re-tessellates on the next frame; stale meshes are dropped.

mod camera;
pub mod geometry;
mod gpu;
mod shaders;

pub use camera::OrbitCamera;
pub use gpu::WgpuRenderer;
