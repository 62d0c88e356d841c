use glam::{Mat4, Vec2, Vec3};
use shapestage_common::Ray;
use shapestage_kernel::Scene;

/// Camera/view configuration for rendering and picking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, 5.0),
            target: Vec3::ZERO,
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl RenderView {
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, Vec3::Y)
    }

    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), aspect, self.near, self.far)
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection(aspect) * self.view_matrix()
    }

    /// World-space ray from the eye through a point in normalized device coordinates
    /// (x right, y up, both in [-1, 1]).
    pub fn ray_through(&self, ndc: Vec2, aspect: f32) -> Ray {
        let inverse = self.view_projection(aspect).inverse();
        let near = inverse * ndc.extend(0.0).extend(1.0);
        let far = inverse * ndc.extend(1.0).extend(1.0);
        let near = near.truncate() / near.w;
        let far = far.truncate() / far.w;
        Ray::new(self.eye.as_dvec3(), (far - near).as_dvec3())
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
pub trait Renderer {
    type Output;

    /// Render one frame from the given scene state and view.
    fn render(&self, scene: &Scene, view: &RenderView) -> Self::Output;
}

/// Produces a human-readable dump of the scene: used by the CLI and in tests.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &Scene, view: &RenderView) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "=== Scene (frame={}, elapsed={:.3}s) ===\n",
            scene.frame(),
            scene.elapsed()
        ));
        out.push_str(&format!("Shapes: {}\n", scene.shape_count()));
        out.push_str(&format!(
            "Camera: eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.0}\n",
            view.eye.x, view.eye.y, view.eye.z, view.target.x, view.target.y, view.target.z,
            view.fov_degrees
        ));

        for (id, shape) in scene.shapes() {
            let d = shape.descriptor();
            let args: Vec<String> = d.args().iter().map(|a| format!("{a}")).collect();
            out.push_str(&format!("  {id} {} {} [{}]", shape.name, d.kind, args.join(", ")));
            match (shape.world_position(), shape.transform()) {
                (Some(p), Some(t)) => out.push_str(&format!(
                    " pos=({:.3}, {:.3}, {:.3}) rot=({:.3}, {:.3}, {:.3})",
                    p.x, p.y, p.z, t.rotation.x, t.rotation.y, t.rotation.z
                )),
                _ => out.push_str(" detached"),
            }
            let material = shape.material();
            out.push_str(&format!(" color={}", shape.resolved_color()));
            if material.wireframe {
                out.push_str(" wireframe");
            }
            if material.is_hovered() {
                out.push_str(" hovered");
            }
            out.push('\n');
        }

        let lights = scene.lights();
        out.push_str(&format!(
            "Ambient: {} x{}\n",
            lights.ambient.color, lights.ambient.intensity
        ));
        match lights.directional() {
            Some(l) => out.push_str(&format!(
                "Directional: pos=({:.1}, {:.1}, {:.1}) color={} intensity={}\n",
                l.position.x, l.position.y, l.position.z, l.color, l.intensity
            )),
            None => out.push_str("Directional: none\n"),
        }
        if let Some(h) = lights.helper() {
            out.push_str(&format!(
                "Helper: {:?} scale={} color={}\n",
                h.kind, h.scale, h.color
            ));
        }

        out
    }
}
