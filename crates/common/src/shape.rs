use crate::Color;
use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Errors from shape descriptor construction.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ShapeError {
    #[error("{kind} takes {expected} dimension args, got {got}")]
    Arity {
        kind: ShapeKind,
        expected: usize,
        got: usize,
    },
    #[error("{kind} dimension arg {index} must be finite and positive, got {value}")]
    InvalidArg {
        kind: ShapeKind,
        index: usize,
        value: f64,
    },
}

/// The geometry families a scene can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ShapeKind {
    /// args: width, height, depth
    Cube,
    /// args: radius, width segments, height segments
    Sphere,
    /// args: radius, tube, radial segments, tubular segments
    Torus,
    /// args: radius, tube, tubular segments, radial segments
    TorusKnot,
}

impl ShapeKind {
    pub const fn arity(self) -> usize {
        match self {
            Self::Cube | Self::Sphere => 3,
            Self::Torus | Self::TorusKnot => 4,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Cube => "cube",
            Self::Sphere => "sphere",
            Self::Torus => "torus",
            Self::TorusKnot => "torus-knot",
        }
    }
}

impl std::fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Plain description of one shape: what it is, where it starts, how big, what color.
/// Deserialization goes through [`ShapeDescriptor::new`], so args are always valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDescriptor")]
pub struct ShapeDescriptor {
    pub kind: ShapeKind,
    pub position: DVec3,
    args: Vec<f64>,
    pub color: Color,
}

impl ShapeDescriptor {
    /// Build a descriptor, validating the arity and values of `args`.
    pub fn new(
        kind: ShapeKind,
        position: DVec3,
        args: Vec<f64>,
        color: Color,
    ) -> Result<Self, ShapeError> {
        validate_args(kind, &args)?;
        Ok(Self {
            kind,
            position,
            args,
            color,
        })
    }

    pub fn cube(position: DVec3, size: [f64; 3], color: Color) -> Result<Self, ShapeError> {
        Self::new(ShapeKind::Cube, position, size.to_vec(), color)
    }

    pub fn sphere(position: DVec3, args: [f64; 3], color: Color) -> Result<Self, ShapeError> {
        Self::new(ShapeKind::Sphere, position, args.to_vec(), color)
    }

    pub fn torus(position: DVec3, args: [f64; 4], color: Color) -> Result<Self, ShapeError> {
        Self::new(ShapeKind::Torus, position, args.to_vec(), color)
    }

    pub fn torus_knot(position: DVec3, args: [f64; 4], color: Color) -> Result<Self, ShapeError> {
        Self::new(ShapeKind::TorusKnot, position, args.to_vec(), color)
    }

    pub fn args(&self) -> &[f64] {
        &self.args
    }

    /// Replace one dimension arg, keeping arity. Used when a bound parameter changes.
    pub fn set_arg(&mut self, index: usize, value: f64) -> Result<(), ShapeError> {
        let mut args = self.args.clone();
        if index >= args.len() {
            return Err(ShapeError::Arity {
                kind: self.kind,
                expected: self.kind.arity(),
                got: index + 1,
            });
        }
        args[index] = value;
        validate_args(self.kind, &args)?;
        self.args = args;
        Ok(())
    }

    /// Radius of a sphere around the shape's origin that encloses its geometry.
    pub fn bounding_radius(&self) -> f64 {
        let a = &self.args;
        match self.kind {
            ShapeKind::Cube => 0.5 * (a[0] * a[0] + a[1] * a[1] + a[2] * a[2]).sqrt(),
            ShapeKind::Sphere => a[0],
            ShapeKind::Torus => a[0] + a[1],
            // (2,3) knot curve stays within 1.5 * radius of the axis
            ShapeKind::TorusKnot => 1.5 * a[0] + a[1],
        }
    }
}

#[derive(Deserialize)]
struct RawDescriptor {
    kind: ShapeKind,
    position: DVec3,
    args: Vec<f64>,
    color: Color,
}

impl TryFrom<RawDescriptor> for ShapeDescriptor {
    type Error = ShapeError;

    fn try_from(raw: RawDescriptor) -> Result<Self, Self::Error> {
        Self::new(raw.kind, raw.position, raw.args, raw.color)
    }
}

fn validate_args(kind: ShapeKind, args: &[f64]) -> Result<(), ShapeError> {
    if args.len() != kind.arity() {
        return Err(ShapeError::Arity {
            kind,
            expected: kind.arity(),
            got: args.len(),
        });
    }
    for (index, &value) in args.iter().enumerate() {
        if !value.is_finite() || value <= 0.0 {
            return Err(ShapeError::InvalidArg { kind, index, value });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arity_per_kind() {
        assert_eq!(ShapeKind::Cube.arity(), 3);
        assert_eq!(ShapeKind::Sphere.arity(), 3);
        assert_eq!(ShapeKind::Torus.arity(), 4);
        assert_eq!(ShapeKind::TorusKnot.arity(), 4);
    }

    #[test]
    fn new_rejects_wrong_arity() {
        let err = ShapeDescriptor::new(
            ShapeKind::Torus,
            DVec3::ZERO,
            vec![0.8, 0.1, 30.0],
            Color::rgb(0, 0, 255),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ShapeError::Arity {
                kind: ShapeKind::Torus,
                expected: 4,
                got: 3
            }
        );
    }

    #[test]
    fn new_rejects_non_positive_args() {
        let err = ShapeDescriptor::new(
            ShapeKind::Cube,
            DVec3::ZERO,
            vec![1.0, 0.0, 1.0],
            Color::WHITE,
        )
        .unwrap_err();
        assert!(matches!(err, ShapeError::InvalidArg { index: 1, .. }));
    }

    #[test]
    fn set_arg_keeps_arity_and_validates() {
        let mut knot = ShapeDescriptor::torus_knot(
            DVec3::new(0.0, -2.0, 0.0),
            [0.5, 0.1, 1000.0, 50.0],
            Color::WHITE,
        )
        .unwrap();
        knot.set_arg(0, 2.0).unwrap();
        assert_eq!(knot.args(), &[2.0, 0.1, 1000.0, 50.0]);

        assert!(knot.set_arg(0, -1.0).is_err());
        assert!(knot.set_arg(9, 1.0).is_err());
        assert_eq!(knot.args()[0], 2.0);
    }

    #[test]
    fn bounding_radius_per_kind() {
        let cube = ShapeDescriptor::cube(DVec3::ZERO, [1.0, 1.0, 1.0], Color::WHITE).unwrap();
        assert!((cube.bounding_radius() - 3.0_f64.sqrt() / 2.0).abs() < 1e-12);

        let sphere = ShapeDescriptor::sphere(DVec3::ZERO, [0.7, 60.0, 60.0], Color::WHITE).unwrap();
        assert_eq!(sphere.bounding_radius(), 0.7);

        let torus = ShapeDescriptor::torus(DVec3::ZERO, [0.8, 0.1, 30.0, 30.0], Color::WHITE).unwrap();
        assert!((torus.bounding_radius() - 0.9).abs() < 1e-12);
    }

    #[test]
    fn typed_constructors_validate_values() {
        let err = ShapeDescriptor::cube(DVec3::ZERO, [0.0, -1.0, f64::NAN], Color::WHITE).unwrap_err();
        assert!(matches!(err, ShapeError::InvalidArg { index: 0, .. }));
        assert!(ShapeDescriptor::torus_knot(DVec3::ZERO, [0.5, f64::INFINITY, 10.0, 8.0], Color::WHITE).is_err());
    }

    #[test]
    fn deserialize_validates_args() {
        let short = r#"{"kind":"Cube","position":[0.0,0.0,0.0],"args":[1.0],"color":"white"}"#;
        let err = serde_json::from_str::<ShapeDescriptor>(short).unwrap_err();
        assert!(err.to_string().contains("takes 3 dimension args"));

        let negative = r#"{"kind":"Sphere","position":[0.0,0.0,0.0],"args":[-0.7,8.0,8.0],"color":"green"}"#;
        assert!(serde_json::from_str::<ShapeDescriptor>(negative).is_err());
    }

    #[test]
    fn deserialize_accepts_valid_descriptor() {
        let sphere = ShapeDescriptor::sphere(DVec3::ONE, [0.7, 60.0, 60.0], Color::GREEN).unwrap();
        let json = serde_json::to_string(&sphere).unwrap();
        let back: ShapeDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sphere);
        assert_eq!(back.bounding_radius(), 0.7);
    }
}
