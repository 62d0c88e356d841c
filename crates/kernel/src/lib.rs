//! Scene Kernel: authoritative scene state and the per-frame update contract.
//!
//! # Invariants
//! - Each shape owns exactly one mesh handle and one hover state; nothing is shared.
//! - Transforms change only through [`animate::update`]; hover only through enter/leave.
//! - Updating an unattached handle is an error, never a silent no-op.

pub mod animate;
pub mod clock;
pub mod composer;
pub mod light;
pub mod material;
pub mod scene;

pub use animate::{Animation, FrameTime, MeshHandle};
pub use clock::FrameClock;
pub use composer::{ComposedScene, OrbitSettings, SceneVariant, UnknownVariant, compose};
pub use light::{
    AmbientLight, DirectionalLight, HelperKind, LightBinding, LightError, LightHelper, LightRig,
};
pub use material::{HoverReaction, Material, PointerEvent};
pub use scene::{Scene, SceneError, SceneEvent, ShapeData, ShapeOptions};
