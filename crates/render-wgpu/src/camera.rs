use glam::Vec3;
use shapestage_kernel::OrbitSettings;
use shapestage_render::RenderView;

const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

/// Orbit camera: left-drag orbits around `target`, right-drag pans, scroll zooms.
/// Camera motion lives outside the scene; it never touches scene state.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub fov_degrees: f32,
    pub enable_zoom: bool,
    pub rotate_speed: f32,
    pub pan_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            distance: 5.0,
            yaw: 0.0,
            pitch: 0.0,
            fov_degrees: 75.0,
            enable_zoom: true,
            rotate_speed: 0.005,
            pan_speed: 0.001,
            zoom_speed: 0.95,
            min_distance: 0.5,
            max_distance: 100.0,
        }
    }
}

impl OrbitCamera {
    pub fn from_settings(settings: &OrbitSettings) -> Self {
        Self {
            target: settings.target.as_vec3(),
            enable_zoom: settings.enable_zoom,
            ..Self::default()
        }
    }

    pub fn eye(&self) -> Vec3 {
        let offset = Vec3::new(
            self.pitch.cos() * self.yaw.sin(),
            self.pitch.sin(),
            self.pitch.cos() * self.yaw.cos(),
        );
        self.target + offset * self.distance
    }

    fn forward(&self) -> Vec3 {
        (self.target - self.eye()).normalize_or_zero()
    }

    /// Rotate around the target by a mouse delta in pixels.
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        self.yaw -= dx * self.rotate_speed;
        self.pitch = (self.pitch + dy * self.rotate_speed).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Move the target (and eye with it) in the view plane.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let forward = self.forward();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let up = right.cross(forward);
        let scale = self.distance * self.pan_speed;
        self.target += (-right * dx + up * dy) * scale;
    }

    /// Scroll zoom. Positive `lines` moves closer. Returns false when zoom is disabled.
    pub fn zoom(&mut self, lines: f32) -> bool {
        if !self.enable_zoom {
            return false;
        }
        self.distance =
            (self.distance * self.zoom_speed.powf(lines)).clamp(self.min_distance, self.max_distance);
        true
    }

    pub fn render_view(&self) -> RenderView {
        RenderView {
            eye: self.eye(),
            target: self.target,
            fov_degrees: self.fov_degrees,
            ..RenderView::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    const EPS: f32 = 1e-5;

    #[test]
    fn default_matches_default_view() {
        let cam = OrbitCamera::default();
        let view = cam.render_view();
        assert!((view.eye - RenderView::default().eye).length() < EPS);
        assert_eq!(view.fov_degrees, RenderView::default().fov_degrees);
    }

    #[test]
    fn orbit_keeps_distance() {
        let mut cam = OrbitCamera::default();
        cam.orbit(120.0, -40.0);
        assert!(((cam.eye() - cam.target).length() - 5.0).abs() < EPS);
        assert!(cam.eye().x < 0.0);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut cam = OrbitCamera::default();
        cam.orbit(0.0, 10_000.0);
        assert!(cam.pitch <= PITCH_LIMIT);
        assert!(cam.render_view().view_matrix().is_finite());
    }

    #[test]
    fn pan_moves_target_and_eye_together() {
        let mut cam = OrbitCamera::default();
        let offset = cam.eye() - cam.target;
        cam.pan(100.0, 0.0);
        assert!(cam.target.x < 0.0);
        assert!((cam.eye() - cam.target - offset).length() < EPS);
    }

    #[test]
    fn zoom_disabled_is_a_no_op() {
        let mut cam = OrbitCamera::from_settings(&OrbitSettings {
            enable_zoom: false,
            target: DVec3::ZERO,
        });
        assert!(!cam.zoom(3.0));
        assert_eq!(cam.distance, 5.0);
    }

    #[test]
    fn zoom_moves_closer_and_clamps() {
        let mut cam = OrbitCamera::default();
        assert!(cam.zoom(1.0));
        assert!(cam.distance < 5.0);
        cam.zoom(1000.0);
        assert_eq!(cam.distance, cam.min_distance);
    }
}
