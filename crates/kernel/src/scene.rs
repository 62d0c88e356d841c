use crate::animate::{self, Animation, FrameTime, MeshHandle};
use crate::light::{LightError, LightRig};
use crate::material::{Material, PointerEvent};
use glam::DVec3;
use shapestage_common::{Color, ShapeDescriptor, ShapeError, ShapeId, ShapeKind, Transform};
use shapestage_params::ParamError;
use std::collections::BTreeMap;

/// Errors from scene operations.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("shape {0}: mesh handle is not attached")]
    HandleNotAttached(ShapeId),
    #[error("shape {0} not found")]
    ShapeNotFound(ShapeId),
    #[error(transparent)]
    Shape(#[from] ShapeError),
    #[error(transparent)]
    Light(#[from] LightError),
    #[error(transparent)]
    Param(#[from] ParamError),
}

/// An event record produced by every state change a frame can observe.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    Mounted { id: ShapeId, kind: ShapeKind },
    Unmounted { id: ShapeId },
    Ticked { frame: u64, elapsed: f64, delta: f64 },
    HoverChanged { id: ShapeId, hovered: bool },
    DescriptorChanged { id: ShapeId },
}

/// How a shape is mounted: everything besides its descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeOptions {
    pub name: String,
    pub animation: Animation,
    pub material: Material,
    /// Position of the enclosing group; the mesh transform is relative to it.
    pub parent_offset: DVec3,
}

impl ShapeOptions {
    pub fn new(name: impl Into<String>, material: Material) -> Self {
        Self {
            name: name.into(),
            animation: Animation::Static,
            material,
            parent_offset: DVec3::ZERO,
        }
    }

    pub fn animated(mut self, animation: Animation) -> Self {
        self.animation = animation;
        self
    }
}

/// Per-shape data stored in the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeData {
    pub name: String,
    pub animation: Animation,
    descriptor: ShapeDescriptor,
    parent_offset: DVec3,
    mesh: MeshHandle,
    material: Material,
}

impl ShapeData {
    pub fn descriptor(&self) -> &ShapeDescriptor {
        &self.descriptor
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn mesh(&self) -> &MeshHandle {
        &self.mesh
    }

    pub fn parent_offset(&self) -> DVec3 {
        self.parent_offset
    }

    /// Current mesh transform, relative to the parent group.
    pub fn transform(&self) -> Option<&Transform> {
        self.mesh.transform()
    }

    /// Mesh origin in world space.
    pub fn world_position(&self) -> Option<DVec3> {
        self.mesh
            .transform()
            .map(|t| self.parent_offset + t.position)
    }

    pub fn resolved_color(&self) -> Color {
        self.material.resolved_color()
    }
}

/// The authoritative scene state.
///
/// Shapes are keyed by sequential ids in a BTreeMap, so iteration (and therefore the
/// order update callbacks run in) is scene-build order.
#[derive(Debug, Clone)]
pub struct Scene {
    shapes: BTreeMap<ShapeId, ShapeData>,
    next_id: u64,
    lights: LightRig,
    frame: u64,
    elapsed: f64,
    event_log: Vec<SceneEvent>,
}

impl Scene {
    pub fn new(lights: LightRig) -> Self {
        Self {
            shapes: BTreeMap::new(),
            next_id: 0,
            lights,
            frame: 0,
            elapsed: 0.0,
            event_log: Vec::new(),
        }
    }

    /// Frames stepped so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Elapsed seconds at the last step.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    pub fn shapes(&self) -> &BTreeMap<ShapeId, ShapeData> {
        &self.shapes
    }

    pub fn get(&self, id: ShapeId) -> Option<&ShapeData> {
        self.shapes.get(&id)
    }

    pub fn find(&self, name: &str) -> Option<ShapeId> {
        self.shapes
            .iter()
            .find(|(_, s)| s.name == name)
            .map(|(id, _)| *id)
    }

    pub fn lights(&self) -> &LightRig {
        &self.lights
    }

    pub fn lights_mut(&mut self) -> &mut LightRig {
        &mut self.lights
    }

    /// Drain and return the event log.
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.event_log)
    }

    /// Read-only access to the event log.
    pub fn events(&self) -> &[SceneEvent] {
        &self.event_log
    }

    /// Mount a shape; its mesh handle is attached at the descriptor's position.
    pub fn mount(&mut self, descriptor: ShapeDescriptor, options: ShapeOptions) -> ShapeId {
        let id = ShapeId(self.next_id);
        self.next_id += 1;
        let kind = descriptor.kind;
        tracing::debug!(%id, %kind, name = %options.name, "shape mounted");
        self.shapes.insert(
            id,
            ShapeData {
                name: options.name,
                animation: options.animation,
                mesh: MeshHandle::attached(Transform::at(descriptor.position)),
                descriptor,
                parent_offset: options.parent_offset,
                material: options.material,
            },
        );
        self.event_log.push(SceneEvent::Mounted { id, kind });
        id
    }

    /// Mount several shapes under one group offset.
    pub fn mount_group(
        &mut self,
        offset: DVec3,
        members: impl IntoIterator<Item = (ShapeDescriptor, ShapeOptions)>,
    ) -> Vec<ShapeId> {
        members
            .into_iter()
            .map(|(descriptor, options)| {
                self.mount(
                    descriptor,
                    ShapeOptions {
                        parent_offset: offset,
                        ..options
                    },
                )
            })
            .collect()
    }

    /// Remove a shape, releasing its handle.
    pub fn remove(&mut self, id: ShapeId) -> Option<ShapeData> {
        let mut data = self.shapes.remove(&id)?;
        data.mesh.detach();
        self.event_log.push(SceneEvent::Unmounted { id });
        Some(data)
    }

    /// Detach a shape's mesh handle without removing the shape.
    pub fn detach(&mut self, id: ShapeId) -> Result<Option<Transform>, SceneError> {
        let shape = self
            .shapes
            .get_mut(&id)
            .ok_or(SceneError::ShapeNotFound(id))?;
        Ok(shape.mesh.detach())
    }

    /// Tear the scene down: every handle detached, hover cleared, directional light
    /// (and its helper) removed.
    pub fn unmount(&mut self) {
        for (id, shape) in self.shapes.iter_mut() {
            shape.mesh.detach();
            if shape.material.on_pointer_leave() {
                self.event_log.push(SceneEvent::HoverChanged {
                    id: *id,
                    hovered: false,
                });
            }
        }
        self.lights.remove_directional();
        tracing::info!(shapes = self.shapes.len(), "scene unmounted");
    }

    /// Run every shape's update callback for one frame.
    ///
    /// All handles are checked before any transform changes, so a wiring bug rejects
    /// the whole frame instead of leaving it half applied.
    pub fn step(&mut self, frame: FrameTime) -> Result<(), SceneError> {
        if let Some((id, _)) = self.shapes.iter().find(|(_, s)| !s.mesh.is_attached()) {
            return Err(SceneError::HandleNotAttached(*id));
        }
        for (id, shape) in self.shapes.iter_mut() {
            animate::update(shape.animation, frame, &mut shape.mesh)
                .map_err(|_| SceneError::HandleNotAttached(*id))?;
        }
        self.frame = frame.frame;
        self.elapsed = frame.elapsed;
        self.event_log.push(SceneEvent::Ticked {
            frame: frame.frame,
            elapsed: frame.elapsed,
            delta: frame.delta,
        });
        Ok(())
    }

    /// Deliver pointer-enter to a shape. Returns whether its hover state changed.
    pub fn pointer_enter(
        &mut self,
        id: ShapeId,
        event: &mut PointerEvent,
    ) -> Result<bool, SceneError> {
        let shape = self
            .shapes
            .get_mut(&id)
            .ok_or(SceneError::ShapeNotFound(id))?;
        let changed = shape.material.on_pointer_enter(event);
        if changed {
            tracing::debug!(%id, "pointer enter");
            self.event_log
                .push(SceneEvent::HoverChanged { id, hovered: true });
        }
        Ok(changed)
    }

    /// Deliver pointer-leave to a shape. Returns whether its hover state changed.
    pub fn pointer_leave(&mut self, id: ShapeId) -> Result<bool, SceneError> {
        let shape = self
            .shapes
            .get_mut(&id)
            .ok_or(SceneError::ShapeNotFound(id))?;
        let changed = shape.material.on_pointer_leave();
        if changed {
            tracing::debug!(%id, "pointer leave");
            self.event_log
                .push(SceneEvent::HoverChanged { id, hovered: false });
        }
        Ok(changed)
    }

    /// Shapes that currently hold hover.
    pub fn hovered(&self) -> impl Iterator<Item = ShapeId> + '_ {
        self.shapes
            .iter()
            .filter(|(_, s)| s.material.is_hovered())
            .map(|(id, _)| *id)
    }

    /// Hover-reactive shapes with an attached mesh: id, world center, bounding radius.
    pub fn hover_targets(&self) -> impl Iterator<Item = (ShapeId, DVec3, f64)> + '_ {
        self.shapes.iter().filter_map(|(id, s)| {
            if !s.material.is_hover_reactive() {
                return None;
            }
            let center = s.world_position()?;
            Some((*id, center, s.descriptor.bounding_radius()))
        })
    }

    pub fn set_base_color(&mut self, id: ShapeId, color: Color) -> Result<(), SceneError> {
        let shape = self
            .shapes
            .get_mut(&id)
            .ok_or(SceneError::ShapeNotFound(id))?;
        if shape.material.base_color != color {
            shape.material.base_color = color;
            shape.descriptor.color = color;
            self.event_log.push(SceneEvent::DescriptorChanged { id });
        }
        Ok(())
    }

    pub fn set_dimension_arg(
        &mut self,
        id: ShapeId,
        index: usize,
        value: f64,
    ) -> Result<(), SceneError> {
        let shape = self
            .shapes
            .get_mut(&id)
            .ok_or(SceneError::ShapeNotFound(id))?;
        if shape.descriptor.args().get(index) != Some(&value) {
            shape.descriptor.set_arg(index, value)?;
            self.event_log.push(SceneEvent::DescriptorChanged { id });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::AmbientLight;
    use crate::material::HoverReaction;

    fn color(name: &str) -> Color {
        name.parse().unwrap()
    }

    fn empty() -> Scene {
        Scene::new(LightRig::new(AmbientLight::new(0.5)))
    }

    fn cube(scene: &mut Scene, x: f64) -> ShapeId {
        scene.mount(
            ShapeDescriptor::cube(DVec3::new(x, 0.0, 0.0), [1.0, 1.0, 1.0], color("red")).unwrap(),
            ShapeOptions::new("cube", Material::standard(color("red")))
                .animated(Animation::SpinAndDrift),
        )
    }

    fn sphere(scene: &mut Scene) -> ShapeId {
        scene.mount(
            ShapeDescriptor::sphere(DVec3::ZERO, [0.7, 60.0, 60.0], color("green")).unwrap(),
            ShapeOptions::new(
                "sphere",
                Material::standard(color("green"))
                    .with_wireframe()
                    .with_hover(HoverReaction::default()),
            ),
        )
    }

    #[test]
    fn ids_are_sequential() {
        let mut s = empty();
        let a = cube(&mut s, 0.0);
        let b = cube(&mut s, 1.0);
        assert_eq!(a, ShapeId(0));
        assert_eq!(b, ShapeId(1));
        assert_eq!(s.shape_count(), 2);
    }

    #[test]
    fn step_updates_every_animated_shape() {
        let mut s = empty();
        let c = cube(&mut s, 0.0);
        let sp = sphere(&mut s);
        s.step(FrameTime::new(1, 0.016, 0.016)).unwrap();
        assert_eq!(
            s.get(c).unwrap().transform().unwrap().rotation,
            DVec3::splat(0.016)
        );
        assert_eq!(s.get(sp).unwrap().transform().unwrap().rotation, DVec3::ZERO);
        assert_eq!(s.frame(), 1);
    }

    #[test]
    fn step_with_detached_handle_rejects_whole_frame() {
        let mut s = empty();
        let first = cube(&mut s, 0.0);
        let second = cube(&mut s, 1.0);
        s.detach(second).unwrap();
        let err = s.step(FrameTime::new(1, 0.1, 0.1)).unwrap_err();
        assert!(matches!(err, SceneError::HandleNotAttached(id) if id == second));
        assert_eq!(
            s.get(first).unwrap().transform().unwrap().rotation,
            DVec3::ZERO
        );
        assert_eq!(s.frame(), 0);
    }

    #[test]
    fn group_offset_applies_to_world_position() {
        let mut s = empty();
        let ids = s.mount_group(
            DVec3::new(0.0, -1.0, 0.0),
            [(
                ShapeDescriptor::cube(DVec3::new(1.0, 2.0, 0.0), [1.0, 1.0, 1.0], color("red")).unwrap(),
                ShapeOptions::new("c", Material::standard(color("red"))),
            )],
        );
        let shape = s.get(ids[0]).unwrap();
        assert_eq!(shape.world_position(), Some(DVec3::new(1.0, 1.0, 0.0)));
        assert_eq!(shape.transform().unwrap().position, DVec3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn hover_round_trip_and_events() {
        let mut s = empty();
        let sp = sphere(&mut s);
        let mut e = PointerEvent::new(sp, 1.0, DVec3::ZERO);
        assert!(s.pointer_enter(sp, &mut e).unwrap());
        assert_eq!(s.get(sp).unwrap().resolved_color(), Color::LIGHTBLUE);
        assert_eq!(s.hovered().collect::<Vec<_>>(), vec![sp]);

        assert!(s.pointer_leave(sp).unwrap());
        assert_eq!(s.get(sp).unwrap().resolved_color(), color("green"));

        let hover_events: Vec<_> = s
            .events()
            .iter()
            .filter(|e| matches!(e, SceneEvent::HoverChanged { .. }))
            .collect();
        assert_eq!(hover_events.len(), 2);
    }

    #[test]
    fn hover_targets_only_lists_reactive_shapes() {
        let mut s = empty();
        cube(&mut s, 3.0);
        let sp = sphere(&mut s);
        let targets: Vec<_> = s.hover_targets().collect();
        assert_eq!(targets, vec![(sp, DVec3::ZERO, 0.7)]);
    }

    #[test]
    fn unmount_detaches_and_clears() {
        let mut s = empty();
        cube(&mut s, 0.0);
        let sp = sphere(&mut s);
        let mut e = PointerEvent::new(sp, 1.0, DVec3::ZERO);
        s.pointer_enter(sp, &mut e).unwrap();

        s.unmount();
        assert!(s.hovered().next().is_none());
        assert!(s.shapes().values().all(|sh| !sh.mesh().is_attached()));
        assert!(s.step(FrameTime::new(1, 0.1, 0.1)).is_err());
    }

    #[test]
    fn remove_emits_event() {
        let mut s = empty();
        let c = cube(&mut s, 0.0);
        let removed = s.remove(c).unwrap();
        assert!(!removed.mesh().is_attached());
        assert!(s.remove(c).is_none());
        assert_eq!(s.events().last(), Some(&SceneEvent::Unmounted { id: c }));
    }

    #[test]
    fn unknown_shape_is_an_error() {
        let mut s = empty();
        assert!(matches!(
            s.pointer_leave(ShapeId(99)),
            Err(SceneError::ShapeNotFound(_))
        ));
    }

    #[test]
    fn descriptor_edits_log_only_real_changes() {
        let mut s = empty();
        let c = cube(&mut s, 0.0);
        s.drain_events();
        s.set_dimension_arg(c, 0, 1.0).unwrap();
        s.set_base_color(c, color("red")).unwrap();
        assert!(s.events().is_empty());

        s.set_dimension_arg(c, 0, 2.0).unwrap();
        s.set_base_color(c, color("blue")).unwrap();
        assert_eq!(s.events().len(), 2);
        assert_eq!(s.get(c).unwrap().descriptor().args()[0], 2.0);
        assert!(s.set_dimension_arg(c, 0, 0.0).is_err());
    }

    #[test]
    fn drain_events_clears_log() {
        let mut s = empty();
        cube(&mut s, 0.0);
        assert_eq!(s.drain_events().len(), 1);
        assert!(s.events().is_empty());
    }
}
