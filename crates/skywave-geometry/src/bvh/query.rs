//! Ray queries against the BVH.

use crate::bvh::{Bvh, NodeContent};
use crate::mesh::Triangle;
use crate::ray::{Ray, RayHit};
use crate::vec3;

/// Determinant and parameter cutoff for the triangle test.
const EPSILON: f32 = 1e-7;

impl Bvh {
    /// Closest hit along `ray`, or `None` if nothing is intersected within
    /// the ray's parameter interval.
    pub fn intersect(&self, ray: &Ray) -> Option<RayHit> {
        if self.is_empty() {
            return None;
        }
        self.intersect_node(0, ray)
    }

    /// Does anything intersect `ray`? Stops at the first confirmed hit.
    pub fn intersect_any(&self, ray: &Ray) -> bool {
        if self.is_empty() {
            return false;
        }
        self.intersect_any_node(0, ray)
    }

    fn intersect_node(&self, node: u32, ray: &Ray) -> Option<RayHit> {
        let node = &self.nodes()[node as usize];
        if !node
            .bounds
            .intersects_ray(ray.origin, ray.direction, ray.t_min, ray.t_max)
        {
            return None;
        }

        match &node.content {
            NodeContent::Leaf(ids) => {
                let mut best: Option<RayHit> = None;
                let mut closest = ray.t_max;
                for &id in ids {
                    let tri = &self.triangles()[id as usize];
                    if let Some(t) = moller_trumbore(ray, tri) {
                        if t > ray.t_min && t < closest {
                            closest = t;
                            best = Some(RayHit {
                                distance: t,
                                point: ray.at(t),
                                normal: tri.normal,
                                triangle_id: tri.id,
                            });
                        }
                    }
                }
                best
            }
            NodeContent::Split { left, right } => {
                let left_hit = self.intersect_node(*left, ray);
                let right_hit = self.intersect_node(*right, ray);
                match (left_hit, right_hit) {
                    (Some(l), Some(r)) => Some(if l.distance < r.distance { l } else { r }),
                    (hit, None) | (None, hit) => hit,
                }
            }
        }
    }

    fn intersect_any_node(&self, node: u32, ray: &Ray) -> bool {
        let node = &self.nodes()[node as usize];
        if !node
            .bounds
            .intersects_ray(ray.origin, ray.direction, ray.t_min, ray.t_max)
        {
            return false;
        }

        match &node.content {
            NodeContent::Leaf(ids) => ids.iter().any(|&id| {
                moller_trumbore(ray, &self.triangles()[id as usize])
                    .is_some_and(|t| t > ray.t_min && t < ray.t_max)
            }),
            NodeContent::Split { left, right } => {
                self.intersect_any_node(*left, ray) || self.intersect_any_node(*right, ray)
            }
        }
    }
}

/// Möller-Trumbore ray-triangle test, returning the ray parameter.
///
/// Misses when the determinant magnitude is below [`EPSILON`] (ray parallel
/// to the triangle plane), when the barycentrics fall outside the triangle,
/// or when the hit is behind the epsilon cutoff.
fn moller_trumbore(ray: &Ray, tri: &Triangle) -> Option<f32> {
    let edge1 = vec3::sub(tri.v1, tri.v0);
    let edge2 = vec3::sub(tri.v2, tri.v0);
    let h = vec3::cross(ray.direction, edge2);
    let det = vec3::dot(edge1, h);

    if det > -EPSILON && det < EPSILON {
        return None;
    }

    let inv_det = 1.0 / det;
    let s = vec3::sub(ray.origin, tri.v0);
    let u = inv_det * vec3::dot(s, h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = vec3::cross(s, edge1);
    let v = inv_det * vec3::dot(ray.direction, q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = inv_det * vec3::dot(edge2, q);
    if t > EPSILON {
        Some(t)
    } else {
        None
    }
}
