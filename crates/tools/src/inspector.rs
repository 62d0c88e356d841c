use glam::DVec3;
use shapestage_common::{Color, ShapeId, ShapeKind};
use shapestage_kernel::Scene;

/// Scene inspector for developer tooling.
pub struct SceneInspector;

impl SceneInspector {
    /// Produce a summary of the scene state.
    pub fn summary(scene: &Scene) -> SceneSummary {
        let light = scene.lights().directional();
        SceneSummary {
            frame: scene.frame(),
            elapsed: scene.elapsed(),
            shape_count: scene.shape_count(),
            hovered: scene.hovered().count(),
            pending_events: scene.events().len(),
            light_intensity: light.map(|l| l.intensity),
            light_color: light.map(|l| l.color),
            helper: scene.lights().helper().is_some(),
        }
    }

    pub fn inspect_shape(scene: &Scene, id: ShapeId) -> Option<ShapeInfo> {
        scene.get(id).map(|shape| ShapeInfo {
            id,
            name: shape.name.clone(),
            kind: shape.descriptor().kind,
            position: shape.world_position(),
            rotation: shape.transform().map(|t| t.rotation),
            color: shape.resolved_color(),
            hovered: shape.material().is_hovered(),
        })
    }

    pub fn list_shapes(scene: &Scene) -> Vec<ShapeId> {
        scene.shapes().keys().copied().collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneSummary {
    pub frame: u64,
    pub elapsed: f64,
    pub shape_count: usize,
    pub hovered: usize,
    pub pending_events: usize,
    pub light_intensity: Option<f64>,
    pub light_color: Option<Color>,
    pub helper: bool,
}

impl std::fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Scene: frame={} elapsed={:.2}s shapes={} hovered={}",
            self.frame, self.elapsed, self.shape_count, self.hovered
        )?;
        match (self.light_intensity, self.light_color) {
            (Some(i), Some(c)) => write!(f, " light={c}@{i}"),
            _ => write!(f, " light=none"),
        }
    }
}

/// Detailed info about a single shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeInfo {
    pub id: ShapeId,
    pub name: String,
    pub kind: ShapeKind,
    /// World-space position; `None` once the mesh handle is detached.
    pub position: Option<DVec3>,
    pub rotation: Option<DVec3>,
    pub color: Color,
    pub hovered: bool,
}

impl std::fmt::Display for ShapeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} ({})", self.id, self.name, self.kind)?;
        if let Some(p) = self.position {
            write!(f, " pos=({:.2}, {:.2}, {:.2})", p.x, p.y, p.z)?;
        }
        write!(f, " color={}", self.color)?;
        if self.hovered {
            write!(f, " hovered")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shapestage_kernel::{FrameTime, PointerEvent, SceneVariant, compose};
    use shapestage_params::ParamStore;

    fn basic() -> Scene {
        compose(SceneVariant::Basic, &mut ParamStore::new())
            .unwrap()
            .scene
    }

    #[test]
    fn summary_fresh_scene() {
        let summary = SceneInspector::summary(&basic());
        assert_eq!(summary.frame, 0);
        assert_eq!(summary.shape_count, 7);
        assert_eq!(summary.hovered, 0);
        assert_eq!(summary.light_intensity, Some(1.5));
        assert!(!summary.helper);
    }

    #[test]
    fn summary_tracks_frames_and_hover() {
        let mut scene = basic();
        scene.step(FrameTime::new(1, 0.016, 0.016)).unwrap();
        let sphere = scene.find("sphere").unwrap();
        let mut e = PointerEvent::new(sphere, 1.0, DVec3::ZERO);
        scene.pointer_enter(sphere, &mut e).unwrap();

        let summary = SceneInspector::summary(&scene);
        assert_eq!(summary.frame, 1);
        assert_eq!(summary.hovered, 1);
        // 7 mounts, 1 tick, 1 hover change
        assert_eq!(summary.pending_events, 9);
    }

    #[test]
    fn tunable_summary_has_helper() {
        let scene = compose(SceneVariant::Tunable, &mut ParamStore::new())
            .unwrap()
            .scene;
        assert!(SceneInspector::summary(&scene).helper);
    }

    #[test]
    fn inspect_shape_found() {
        let scene = basic();
        let torus = scene.find("torus").unwrap();
        let info = SceneInspector::inspect_shape(&scene, torus).unwrap();
        assert_eq!(info.kind, ShapeKind::Torus);
        assert_eq!(info.position, Some(DVec3::new(2.0, 0.0, 0.0)));
        assert_eq!(info.color.to_string(), "blue");
    }

    #[test]
    fn inspect_shape_not_found() {
        assert!(SceneInspector::inspect_shape(&basic(), ShapeId(99)).is_none());
    }

    #[test]
    fn list_shapes_in_build_order() {
        let ids = SceneInspector::list_shapes(&basic());
        assert_eq!(ids.len(), 7);
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn summary_display() {
        let s = SceneInspector::summary(&basic()).to_string();
        assert!(s.contains("frame=0"));
        assert!(s.contains("light=white@1.5"));
    }
}
