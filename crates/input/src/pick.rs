use glam::DVec3;
use shapestage_common::{Ray, ShapeId};
use shapestage_kernel::Scene;

/// One ray hit against a shape's bounding sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub shape: ShapeId,
    pub distance: f64,
    pub point: DVec3,
}

/// Hover-reactive shapes under `ray`, nearest first. Ties keep scene order.
pub fn pick(scene: &Scene, ray: &Ray) -> Vec<Hit> {
    let mut hits: Vec<Hit> = scene
        .hover_targets()
        .filter_map(|(shape, center, radius)| {
            let distance = ray.intersect_sphere(center, radius)?;
            Some(Hit {
                shape,
                distance,
                point: ray.at(distance),
            })
        })
        .collect();
    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    hits
}
