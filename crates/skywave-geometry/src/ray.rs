//! Rays and intersection records.

use crate::vec3;

/// A ray with a parameter interval.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: [f32; 3],
    /// Unit direction.
    pub direction: [f32; 3],
    pub t_min: f32,
    pub t_max: f32,
}

impl Ray {
    /// A ray with the default picking interval `(0.001, 10000)`.
    pub fn new(origin: [f32; 3], direction: [f32; 3]) -> Self {
        Self {
            origin,
            direction,
            t_min: 0.001,
            t_max: 10_000.0,
        }
    }

    pub fn with_range(origin: [f32; 3], direction: [f32; 3], t_min: f32, t_max: f32) -> Self {
        Self {
            origin,
            direction,
            t_min,
            t_max,
        }
    }

    /// Point at parameter `t`.
    pub fn at(&self, t: f32) -> [f32; 3] {
        vec3::add(self.origin, vec3::scale(self.direction, t))
    }
}

/// A closest-hit result.
#[derive(Debug, Clone, Copy)]
pub struct RayHit {
    /// Ray parameter at the hit.
    pub distance: f32,
    /// World-space hit point.
    pub point: [f32; 3],
    /// Surface normal of the hit triangle.
    pub normal: [f32; 3],
    /// Stable id of the hit triangle.
    pub triangle_id: u32,
}

/// Ray-sphere intersection, returning the nearest non-negative parameter.
///
/// Used for node picking: radio nodes are rendered as spheres and picked by
/// the same camera ray that drives surface placement.
pub fn ray_sphere_intersection(
    origin: [f32; 3],
    direction: [f32; 3],
    center: [f32; 3],
    radius: f32,
) -> Option<f32> {
    let oc = vec3::sub(origin, center);
    let a = vec3::dot(direction, direction);
    let b = 2.0 * vec3::dot(oc, direction);
    let c = vec3::dot(oc, oc) - radius * radius;
    let discriminant = b * b - 4.0 * a * c;

    if discriminant < 0.0 {
        return None;
    }

    let sqrt_d = discriminant.sqrt();
    let mut t = (-b - sqrt_d) / (2.0 * a);
    if t < 0.0 {
        t = (-b + sqrt_d) / (2.0 * a);
    }
    if t < 0.0 {
        return None;
    }
    Some(t)
}
