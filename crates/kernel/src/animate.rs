//! Animated Mesh Updater: the per-frame rule applied to each mesh transform.

use serde::{Deserialize, Serialize};
use shapestage_common::Transform;

/// Timing handed to every update callback for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameTime {
    pub frame: u64,
    /// Seconds since the clock started.
    pub elapsed: f64,
    /// Seconds since the previous frame.
    pub delta: f64,
}

impl FrameTime {
    pub fn new(frame: u64, elapsed: f64, delta: f64) -> Self {
        Self {
            frame,
            elapsed,
            delta,
        }
    }
}

/// Per-frame update rule attached to a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Animation {
    #[default]
    Static,
    /// All three rotation angles advance by `delta`.
    Spin,
    /// Spin, plus `sin(elapsed) * delta` added to z. The drift accumulates and is
    /// never reset.
    SpinAndDrift,
}

impl Animation {
    /// Apply one frame of this rule to a transform.
    pub fn apply(self, frame: FrameTime, t: &mut Transform) {
        match self {
            Self::Static => {}
            Self::Spin => spin(frame.delta, t),
            Self::SpinAndDrift => {
                spin(frame.delta, t);
                t.position.z += frame.elapsed.sin() * frame.delta;
            }
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Spin => "spin",
            Self::SpinAndDrift => "spin+drift",
        }
    }
}

fn spin(delta: f64, t: &mut Transform) {
    t.rotation.x += delta;
    t.rotation.y += delta;
    t.rotation.z += delta;
}

/// Handle update attempted before attach or after detach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("mesh handle is not attached")]
pub struct NotAttached;

/// Engine-side reference to one mesh's transform. Starts unattached; the scene attaches
/// it when the shape mounts and detaches it on unmount.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshHandle {
    transform: Option<Transform>,
}

impl MeshHandle {
    pub fn unattached() -> Self {
        Self::default()
    }

    pub fn attached(initial: Transform) -> Self {
        Self {
            transform: Some(initial),
        }
    }

    pub fn attach(&mut self, initial: Transform) {
        self.transform = Some(initial);
    }

    pub fn detach(&mut self) -> Option<Transform> {
        self.transform.take()
    }

    pub fn is_attached(&self) -> bool {
        self.transform.is_some()
    }

    pub fn transform(&self) -> Option<&Transform> {
        self.transform.as_ref()
    }
}

/// Render-loop callback: apply `animation` for one frame to the mesh behind `handle`.
pub fn update(
    animation: Animation,
    frame: FrameTime,
    handle: &mut MeshHandle,
) -> Result<(), NotAttached> {
    let transform = handle.transform.as_mut().ok_or(NotAttached)?;
    animation.apply(frame, transform);
    Ok(())
}
