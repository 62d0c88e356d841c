//! Hover-reactive materials and the pointer event they receive.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use shapestage_common::{Color, ShapeId};

/// A pointer-enter event delivered to one shape during a pick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub shape: ShapeId,
    /// Distance from the ray origin to the hit.
    pub distance: f64,
    pub point: DVec3,
    stopped: bool,
}

impl PointerEvent {
    pub fn new(shape: ShapeId, distance: f64, point: DVec3) -> Self {
        Self {
            shape,
            distance,
            point,
            stopped: false,
        }
    }

    /// Keep shapes behind this one from receiving the event.
    pub fn stop_propagation(&mut self) {
        self.stopped = true;
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.stopped
    }
}

/// How a material reacts to hover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoverReaction {
    pub highlight: Color,
    pub stop_propagation: bool,
}

impl Default for HoverReaction {
    fn default() -> Self {
        Self {
            highlight: Color::LIGHTBLUE,
            stop_propagation: true,
        }
    }
}

/// Surface appearance of a shape, including its hover state.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub base_color: Color,
    pub wireframe: bool,
    pub hover: Option<HoverReaction>,
    hovered: bool,
}

impl Material {
    pub fn standard(base_color: Color) -> Self {
        Self {
            base_color,
            wireframe: false,
            hover: None,
            hovered: false,
        }
    }

    pub fn with_wireframe(mut self) -> Self {
        self.wireframe = true;
        self
    }

    pub fn with_hover(mut self, reaction: HoverReaction) -> Self {
        self.hover = Some(reaction);
        self
    }

    pub fn is_hover_reactive(&self) -> bool {
        self.hover.is_some()
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    /// Pointer entered this shape. Returns whether the hover state changed.
    pub fn on_pointer_enter(&mut self, event: &mut PointerEvent) -> bool {
        if self.hover.is_some_and(|h| h.stop_propagation) {
            event.stop_propagation();
        }
        let changed = !self.hovered;
        self.hovered = true;
        changed
    }

    /// Pointer left this shape. Returns whether the hover state changed.
    pub fn on_pointer_leave(&mut self) -> bool {
        let changed = self.hovered;
        self.hovered = false;
        changed
    }

    /// Color the renderer should draw this frame.
    pub fn resolved_color(&self) -> Color {
        match self.hover {
            Some(reaction) if self.hovered => reaction.highlight,
            _ => self.base_color,
        }
    }
}
