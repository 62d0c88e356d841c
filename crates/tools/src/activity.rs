use shapestage_kernel::{Scene, SceneEvent};

/// Running counts of scene events, fed by draining the scene's log each frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventTally {
    pub frames: u64,
    pub mounted: usize,
    pub unmounted: usize,
    pub hover_enters: usize,
    pub hover_leaves: usize,
    pub descriptor_changes: usize,
}

impl EventTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: &SceneEvent) {
        match event {
            SceneEvent::Mounted { .. } => self.mounted += 1,
            SceneEvent::Unmounted { .. } => self.unmounted += 1,
            SceneEvent::Ticked { .. } => self.frames += 1,
            SceneEvent::HoverChanged { hovered: true, .. } => self.hover_enters += 1,
            SceneEvent::HoverChanged { hovered: false, .. } => self.hover_leaves += 1,
            SceneEvent::DescriptorChanged { .. } => self.descriptor_changes += 1,
        }
    }

    /// Drain the scene's event log into the tally. Returns how many events were read.
    pub fn absorb(&mut self, scene: &mut Scene) -> usize {
        let events = scene.drain_events();
        for event in &events {
            self.record(event);
        }
        events.len()
    }
}

impl std::fmt::Display for EventTally {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Events: frames={} mounted={} unmounted={} hover=+{}/-{} edits={}",
            self.frames,
            self.mounted,
            self.unmounted,
            self.hover_enters,
            self.hover_leaves,
            self.descriptor_changes
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;
    use shapestage_common::Color;
    use shapestage_kernel::{FrameClock, PointerEvent, SceneVariant, compose};
    use shapestage_params::ParamStore;

    #[test]
    fn absorb_empties_the_log() {
        let mut scene = compose(SceneVariant::Basic, &mut ParamStore::new())
            .unwrap()
            .scene;
        let mut tally = EventTally::new();
        let mut clock = FrameClock::new();
        for _ in 0..1000 {
            scene.step(clock.advance(0.016)).unwrap();
            tally.absorb(&mut scene);
            assert!(scene.events().is_empty());
        }
        assert_eq!(tally.frames, 1000);
        assert_eq!(tally.mounted, 7);
    }

    #[test]
    fn counts_hover_and_edits() {
        let mut scene = compose(SceneVariant::Basic, &mut ParamStore::new())
            .unwrap()
            .scene;
        let sphere = scene.find("sphere").unwrap();
        let mut e = PointerEvent::new(sphere, 1.0, DVec3::ZERO);
        scene.pointer_enter(sphere, &mut e).unwrap();
        scene.pointer_leave(sphere).unwrap();
        scene.set_base_color(sphere, Color::rgb(1, 2, 3)).unwrap();

        let mut tally = EventTally::new();
        assert_eq!(tally.absorb(&mut scene), 10);
        assert_eq!((tally.hover_enters, tally.hover_leaves), (1, 1));
        assert_eq!(tally.descriptor_changes, 1);
    }

    #[test]
    fn display_lists_counts() {
        let mut tally = EventTally::new();
        tally.record(&SceneEvent::Ticked {
            frame: 1,
            elapsed: 0.016,
            delta: 0.016,
        });
        assert_eq!(
            tally.to_string(),
            "Events: frames=1 mounted=0 unmounted=0 hover=+0/-0 edits=0"
        );
    }
}
