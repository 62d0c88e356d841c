//! Light Rig: one directional light, one ambient fill, an optional debug helper.

use glam::DVec3;
use shapestage_common::Color;
use shapestage_params::ParamValues;

/// Errors from light rig operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LightError {
    #[error("no directional light is attached")]
    NoDirectionalLight,
    #[error("light intensity must be finite and non-negative, got {0}")]
    InvalidIntensity(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub position: DVec3,
    /// Point the light shines toward.
    pub target: DVec3,
    pub color: Color,
    pub intensity: f64,
}

impl DirectionalLight {
    pub fn new(position: DVec3, color: Color, intensity: f64) -> Self {
        Self {
            position,
            target: DVec3::ZERO,
            color,
            intensity,
        }
    }

    /// Unit vector from the light toward its target.
    pub fn direction(&self) -> DVec3 {
        (self.target - self.position).normalize_or_zero()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: Color,
    pub intensity: f64,
}

impl AmbientLight {
    pub fn new(intensity: f64) -> Self {
        Self {
            color: Color::WHITE,
            intensity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelperKind {
    /// Square facing the target plus a line toward it.
    Directional,
}

/// Debug gizmo that follows a directional light. Its color never follows the light's.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightHelper {
    pub kind: HelperKind,
    pub scale: f64,
    pub color: Color,
    position: DVec3,
    target: DVec3,
}

impl LightHelper {
    pub fn position(&self) -> DVec3 {
        self.position
    }

    pub fn target(&self) -> DVec3 {
        self.target
    }

    fn follow(&mut self, light: &DirectionalLight) {
        self.position = light.position;
        self.target = light.target;
    }
}

/// Parameter keys a light reads from the parameter store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LightBinding {
    pub color_key: String,
    pub intensity_key: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LightRig {
    pub ambient: AmbientLight,
    directional: Option<DirectionalLight>,
    helper: Option<LightHelper>,
}

impl LightRig {
    pub fn new(ambient: AmbientLight) -> Self {
        Self {
            ambient,
            directional: None,
            helper: None,
        }
    }

    pub fn with_directional(mut self, light: DirectionalLight) -> Self {
        self.attach_directional(light);
        self
    }

    pub fn attach_directional(&mut self, light: DirectionalLight) {
        self.directional = Some(light);
        if let Some(helper) = self.helper.as_mut() {
            helper.follow(&light);
        }
    }

    /// Remove the directional light. Its helper goes with it.
    pub fn remove_directional(&mut self) -> Option<DirectionalLight> {
        if self.helper.take().is_some() {
            tracing::debug!("light helper removed with its light");
        }
        self.directional.take()
    }

    pub fn directional(&self) -> Option<&DirectionalLight> {
        self.directional.as_ref()
    }

    pub fn helper(&self) -> Option<&LightHelper> {
        self.helper.as_ref()
    }

    /// Attach a debug helper to the directional light.
    pub fn attach_helper(
        &mut self,
        kind: HelperKind,
        scale: f64,
        color: Color,
    ) -> Result<(), LightError> {
        let light = self.directional.ok_or(LightError::NoDirectionalLight)?;
        self.helper = Some(LightHelper {
            kind,
            scale,
            color,
            position: light.position,
            target: light.target,
        });
        Ok(())
    }

    pub fn set_position(&mut self, position: DVec3) -> Result<(), LightError> {
        self.update_directional(|l| l.position = position)
    }

    pub fn set_target(&mut self, target: DVec3) -> Result<(), LightError> {
        self.update_directional(|l| l.target = target)
    }

    pub fn set_color(&mut self, color: Color) -> Result<(), LightError> {
        self.update_directional(|l| l.color = color)
    }

    pub fn set_intensity(&mut self, intensity: f64) -> Result<(), LightError> {
        if !intensity.is_finite() || intensity < 0.0 {
            return Err(LightError::InvalidIntensity(intensity));
        }
        self.update_directional(|l| l.intensity = intensity)
    }

    /// Apply bound parameter values. Keys missing from `values` are left untouched.
    pub fn bind(&mut self, binding: &LightBinding, values: &ParamValues) -> Result<(), LightError> {
        if let Some(color) = values.color(&binding.color_key) {
            self.set_color(color)?;
        }
        if let Some(intensity) = values.number(&binding.intensity_key) {
            self.set_intensity(intensity)?;
        }
        Ok(())
    }

    fn update_directional(
        &mut self,
        f: impl FnOnce(&mut DirectionalLight),
    ) -> Result<(), LightError> {
        let light = self
            .directional
            .as_mut()
            .ok_or(LightError::NoDirectionalLight)?;
        f(light);
        if let Some(helper) = self.helper.as_mut() {
            helper.follow(light);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shapestage_params::ParamValue;

    fn rig() -> LightRig {
        LightRig::new(AmbientLight::new(0.5)).with_directional(DirectionalLight::new(
            DVec3::new(0.0, 0.0, 2.0),
            Color::WHITE,
            0.5,
        ))
    }

    fn binding() -> LightBinding {
        LightBinding {
            color_key: "lightColor".into(),
            intensity_key: "lightIntensity".into(),
        }
    }

    #[test]
    fn helper_requires_directional_light() {
        let mut bare = LightRig::new(AmbientLight::new(0.5));
        assert_eq!(
            bare.attach_helper(HelperKind::Directional, 0.5, Color::WHITE),
            Err(LightError::NoDirectionalLight)
        );
    }

    #[test]
    fn helper_follows_light_position() {
        let mut rig = rig();
        rig.attach_helper(HelperKind::Directional, 0.5, Color::WHITE)
            .unwrap();
        assert_eq!(rig.helper().unwrap().position(), DVec3::new(0.0, 0.0, 2.0));

        rig.set_position(DVec3::new(3.0, 1.0, 0.0)).unwrap();
        assert_eq!(rig.helper().unwrap().position(), DVec3::new(3.0, 1.0, 0.0));

        rig.set_target(DVec3::new(0.0, -1.0, 0.0)).unwrap();
        assert_eq!(rig.helper().unwrap().target(), DVec3::new(0.0, -1.0, 0.0));
    }

    #[test]
    fn helper_color_is_independent_of_light_color() {
        let mut rig = rig();
        let red: Color = "red".parse().unwrap();
        rig.attach_helper(HelperKind::Directional, 0.5, Color::WHITE)
            .unwrap();
        rig.set_color(red).unwrap();
        assert_eq!(rig.directional().unwrap().color, red);
        assert_eq!(rig.helper().unwrap().color, Color::WHITE);
    }

    #[test]
    fn removing_light_removes_helper() {
        let mut rig = rig();
        rig.attach_helper(HelperKind::Directional, 0.5, Color::WHITE)
            .unwrap();
        assert!(rig.remove_directional().is_some());
        assert!(rig.helper().is_none());
        assert_eq!(rig.set_intensity(1.0), Err(LightError::NoDirectionalLight));
    }

    #[test]
    fn bind_applies_parameter_values() {
        let mut rig = rig();
        let mut values = ParamValues::new();
        values.insert("lightIntensity", ParamValue::Number(3.0));
        values.insert("lightColor", ParamValue::Color("hotpink".parse().unwrap()));
        rig.bind(&binding(), &values).unwrap();
        let light = rig.directional().unwrap();
        assert_eq!(light.intensity, 3.0);
        assert_eq!(light.color.to_string(), "hotpink");
    }

    #[test]
    fn bind_ignores_missing_keys() {
        let mut rig = rig();
        rig.bind(&binding(), &ParamValues::new()).unwrap();
        assert_eq!(rig.directional().unwrap().intensity, 0.5);
    }

    #[test]
    fn negative_intensity_rejected() {
        let mut rig = rig();
        assert!(matches!(
            rig.set_intensity(-1.0),
            Err(LightError::InvalidIntensity(_))
        ));
    }

    #[test]
    fn direction_points_at_target() {
        let light = DirectionalLight::new(DVec3::new(0.0, 0.0, 2.0), Color::WHITE, 1.0);
        assert_eq!(light.direction(), DVec3::NEG_Z);
    }
}
