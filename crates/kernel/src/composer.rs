//! Scene Composer: the fixed arrangement, in one of two variants.

use crate::animate::Animation;
use crate::light::{AmbientLight, DirectionalLight, HelperKind, LightBinding, LightRig};
use crate::material::{HoverReaction, Material};
use crate::scene::{Scene, SceneError, ShapeOptions};
use glam::DVec3;
use serde::{Deserialize, Serialize};
use shapestage_common::{Color, ShapeDescriptor, ShapeError, ShapeId};
use shapestage_params::{Declaration, ParamStore, ParamValues, SubscriptionId};
use std::fmt;
use std::str::FromStr;

pub const KNOT_COLOR: &str = "color";
pub const KNOT_RADIUS: &str = "radius";
pub const LIGHT_COLOR: &str = "lightColor";
pub const LIGHT_INTENSITY: &str = "lightIntensity";

const AMBIENT_INTENSITY: f64 = 0.5;
const GROUP_OFFSET: DVec3 = DVec3::new(0.0, -1.0, 0.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SceneVariant {
    /// Spinning knot, fixed light, zoomable orbit.
    #[default]
    Basic,
    /// Parameter-bound knot and light, light helper, zoom disabled.
    Tunable,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown scene variant {0:?} (expected basic or tunable)")]
pub struct UnknownVariant(pub String);

impl FromStr for SceneVariant {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "tunable" => Ok(Self::Tunable),
            _ => Err(UnknownVariant(s.to_string())),
        }
    }
}

impl fmt::Display for SceneVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Basic => "basic",
            Self::Tunable => "tunable",
        })
    }
}

/// Orbit controls the host should install.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitSettings {
    pub enable_zoom: bool,
    pub target: DVec3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Subscriptions {
    knot: SubscriptionId,
    light: SubscriptionId,
}

/// A composed scene plus the wiring that keeps it in sync with the parameter store.
#[derive(Debug, Clone)]
pub struct ComposedScene {
    pub scene: Scene,
    pub variant: SceneVariant,
    pub orbit: OrbitSettings,
    knot: ShapeId,
    sphere: ShapeId,
    light_binding: LightBinding,
    subscriptions: Option<Subscriptions>,
}

/// Build the arrangement for `variant`. The tunable variant declares its parameters in
/// `params` and applies their current values before returning.
pub fn compose(variant: SceneVariant, params: &mut ParamStore) -> Result<ComposedScene, SceneError> {
    let directional = match variant {
        SceneVariant::Basic => DirectionalLight::new(DVec3::new(0.0, 0.0, 1.0), Color::WHITE, 1.5),
        SceneVariant::Tunable => DirectionalLight::new(DVec3::new(0.0, 0.0, 2.0), Color::WHITE, 0.5),
    };
    let mut lights = LightRig::new(AmbientLight::new(AMBIENT_INTENSITY)).with_directional(directional);
    if variant == SceneVariant::Tunable {
        lights.attach_helper(HelperKind::Directional, 0.5, Color::WHITE)?;
    }

    let mut scene = Scene::new(lights);

    let cubes = [
        (DVec3::new(1.0, 0.0, 0.0), Color::GREEN),
        (DVec3::new(-1.0, 0.0, 0.0), Color::HOTPINK),
        (DVec3::new(-1.0, 2.0, 0.0), Color::ORANGE),
        (DVec3::new(1.0, 2.0, 0.0), Color::RED),
    ];
    let group = cubes
        .iter()
        .enumerate()
        .map(|(i, &(pos, color))| {
            Ok((
                ShapeDescriptor::cube(pos, [1.0, 1.0, 1.0], color)?,
                ShapeOptions::new(format!("cube-{i}"), Material::standard(color))
                    .animated(Animation::SpinAndDrift),
            ))
        })
        .collect::<Result<Vec<_>, ShapeError>>()?;
    scene.mount_group(GROUP_OFFSET, group);

    let sphere = scene.mount(
        ShapeDescriptor::sphere(DVec3::ZERO, [0.7, 60.0, 60.0], Color::GREEN)?,
        ShapeOptions::new(
            "sphere",
            Material::standard(Color::GREEN)
                .with_wireframe()
                .with_hover(HoverReaction::default()),
        ),
    );

    scene.mount(
        ShapeDescriptor::torus(DVec3::new(2.0, 0.0, 0.0), [0.8, 0.1, 30.0, 30.0], Color::BLUE)?,
        ShapeOptions::new("torus", Material::standard(Color::BLUE)),
    );

    let knot_animation = match variant {
        SceneVariant::Basic => Animation::Spin,
        SceneVariant::Tunable => Animation::Static,
    };
    let knot = scene.mount(
        ShapeDescriptor::torus_knot(DVec3::new(0.0, -2.0, 0.0), [0.5, 0.1, 1000.0, 50.0], Color::HOTPINK)?,
        ShapeOptions::new("knot", Material::standard(Color::HOTPINK)).animated(knot_animation),
    );

    let mut composed = ComposedScene {
        scene,
        variant,
        orbit: OrbitSettings {
            enable_zoom: variant == SceneVariant::Basic,
            target: DVec3::ZERO,
        },
        knot,
        sphere,
        light_binding: LightBinding {
            color_key: LIGHT_COLOR.to_string(),
            intensity_key: LIGHT_INTENSITY.to_string(),
        },
        subscriptions: None,
    };

    if variant == SceneVariant::Tunable {
        let knot_decl = Declaration::new("knot")
            .color(KNOT_COLOR, Color::LIGHTBLUE)
            .ranged(KNOT_RADIUS, 0.5, 0.1, 3.0, 0.1);
        let light_decl = Declaration::new("light")
            .color(LIGHT_COLOR, Color::WHITE)
            .ranged(LIGHT_INTENSITY, 0.5, 0.0, 5.0, 0.1);
        params.declare(&knot_decl)?;
        params.declare(&light_decl)?;
        composed.subscriptions = Some(Subscriptions {
            knot: params.subscribe(knot_decl.keys()),
            light: params.subscribe(light_decl.keys()),
        });
        composed.sync_params(params)?;
    }

    tracing::info!(%variant, shapes = composed.scene.shape_count(), "scene composed");
    Ok(composed)
}

impl ComposedScene {
    pub fn knot(&self) -> ShapeId {
        self.knot
    }

    pub fn sphere(&self) -> ShapeId {
        self.sphere
    }

    /// Apply parameter changes since the last sync. Returns whether anything was applied.
    pub fn sync_params(&mut self, params: &mut ParamStore) -> Result<bool, SceneError> {
        let Some(subs) = self.subscriptions else {
            return Ok(false);
        };
        let mut applied = false;
        if let Some(values) = params.poll(subs.knot)? {
            self.apply_knot(&values)?;
            applied = true;
        }
        if let Some(values) = params.poll(subs.light)? {
            self.scene.lights_mut().bind(&self.light_binding, &values)?;
            tracing::debug!("light parameters applied");
            applied = true;
        }
        Ok(applied)
    }

    fn apply_knot(&mut self, values: &ParamValues) -> Result<(), SceneError> {
        if let Some(color) = values.color(KNOT_COLOR) {
            self.scene.set_base_color(self.knot, color)?;
        }
        if let Some(radius) = values.number(KNOT_RADIUS) {
            self.scene.set_dimension_arg(self.knot, 0, radius)?;
        }
        tracing::debug!("knot parameters applied");
        Ok(())
    }

    /// Drop parameter subscriptions and tear the scene down.
    pub fn unmount(&mut self, params: &mut ParamStore) {
        if let Some(subs) = self.subscriptions.take() {
            params.unsubscribe(subs.knot);
            params.unsubscribe(subs.light);
        }
        self.scene.unmount();
    }
}
