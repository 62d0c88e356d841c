use glam::{DVec3, EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Identifier of a shape within one scene. Allocated sequentially by the scene,
/// so ordering by id is scene-build order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShapeId(pub u64);

impl std::fmt::Display for ShapeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Mesh transform: position plus Euler rotation (radians, XYZ order).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: DVec3,
    pub rotation: DVec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: DVec3::ZERO,
            rotation: DVec3::ZERO,
        }
    }
}

impl Transform {
    pub fn at(position: DVec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Rotation as a quaternion, intrinsic X then Y then Z.
    pub fn quat(&self) -> Quat {
        let r = self.rotation.as_vec3();
        Quat::from_euler(EulerRot::XYZ, r.x, r.y, r.z)
    }

    /// Model matrix with the transform placed under a parent offset (group position).
    pub fn model_matrix(&self, parent_offset: DVec3) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::ONE,
            self.quat(),
            (parent_offset + self.position).as_vec3(),
        )
    }
}
