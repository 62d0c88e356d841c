use crate::pick::pick;
use shapestage_common::{Ray, ShapeId};
use shapestage_kernel::{PointerEvent, Scene, SceneError};
use std::collections::BTreeSet;

/// Raw pointer input, queued between frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerInput {
    /// Pointer moved; the ray through it in world space.
    Moved(Ray),
    /// Pointer left the canvas.
    Left,
}

/// What one flush changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub entered: Vec<ShapeId>,
    pub left: Vec<ShapeId>,
}

impl DispatchReport {
    pub fn is_empty(&self) -> bool {
        self.entered.is_empty() && self.left.is_empty()
    }
}

/// Queues pointer input and turns it into enter/leave calls on scene shapes.
#[derive(Debug, Default)]
pub struct PointerDispatcher {
    queue: Vec<PointerInput>,
}

impl PointerDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, input: PointerInput) {
        self.queue.push(input);
    }

    pub fn pointer_moved(&mut self, ray: Ray) {
        self.push(PointerInput::Moved(ray));
    }

    pub fn pointer_left(&mut self) {
        self.push(PointerInput::Left);
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Resolve queued input against `scene`, oldest first. Every input runs its own
    /// enter/leave pass, so a shape crossed between two frames still sees both.
    pub fn flush(&mut self, scene: &mut Scene) -> Result<DispatchReport, SceneError> {
        let mut report = DispatchReport::default();
        for input in std::mem::take(&mut self.queue) {
            dispatch(scene, input, &mut report)?;
        }

        if !report.is_empty() {
            tracing::debug!(entered = ?report.entered, left = ?report.left, "hover dispatched");
        }
        Ok(report)
    }
}

fn dispatch(
    scene: &mut Scene,
    input: PointerInput,
    report: &mut DispatchReport,
) -> Result<(), SceneError> {
    let mut hovered = BTreeSet::new();

    if let PointerInput::Moved(ray) = input {
        for hit in pick(scene, &ray) {
            let mut event = PointerEvent::new(hit.shape, hit.distance, hit.point);
            if scene.pointer_enter(hit.shape, &mut event)? {
                report.entered.push(hit.shape);
            }
            hovered.insert(hit.shape);
            if event.is_propagation_stopped() {
                break;
            }
        }
    }

    let stale: Vec<ShapeId> = scene.hovered().filter(|id| !hovered.contains(id)).collect();
    for id in stale {
        if scene.pointer_leave(id)? {
            report.left.push(id);
        }
    }
    Ok(())
}
