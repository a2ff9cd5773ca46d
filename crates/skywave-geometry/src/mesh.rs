//! Triangle soup intake.
//!
//! The host application owns mesh parsing; this module consumes the
//! resulting `(positions, indices)` buffers and produces [`Triangle`]s with
//! derived face normals (counter-clockwise winding implies outward) and
//! stable ids equal to the triangle's position in the index stream.

use crate::bounds::Aabb;
use crate::vec3;

/// A world-space triangle with a precomputed unit normal and stable id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub v0: [f32; 3],
    pub v1: [f32; 3],
    pub v2: [f32; 3],
    pub normal: [f32; 3],
    pub id: u32,
}

impl Triangle {
    /// Build a triangle, deriving the normal from vertex order.
    pub fn new(v0: [f32; 3], v1: [f32; 3], v2: [f32; 3], id: u32) -> Self {
        let normal = vec3::normalize(vec3::cross(vec3::sub(v1, v0), vec3::sub(v2, v0)));
        Self {
            v0,
            v1,
            v2,
            normal,
            id,
        }
    }

    pub fn centroid(&self) -> [f32; 3] {
        [
            (self.v0[0] + self.v1[0] + self.v2[0]) / 3.0,
            (self.v0[1] + self.v1[1] + self.v2[1]) / 3.0,
            (self.v0[2] + self.v1[2] + self.v2[2]) / 3.0,
        ]
    }

    pub fn bounds(&self) -> Aabb {
        let mut aabb = Aabb::empty();
        aabb.expand_point(self.v0);
        aabb.expand_point(self.v1);
        aabb.expand_point(self.v2);
        aabb
    }

    /// Squared distance from `point` to the closest point on this triangle.
    ///
    /// Voronoi-region walk over vertices, edges, and face (Ericson,
    /// *Real-Time Collision Detection*, 5.1.5).
    pub fn distance_squared(&self, point: [f32; 3]) -> f32 {
        let ab = vec3::sub(self.v1, self.v0);
        let ac = vec3::sub(self.v2, self.v0);
        let ap = vec3::sub(point, self.v0);

        let d1 = vec3::dot(ab, ap);
        let d2 = vec3::dot(ac, ap);
        if d1 <= 0.0 && d2 <= 0.0 {
            return vec3::dot(ap, ap);
        }

        let bp = vec3::sub(point, self.v1);
        let d3 = vec3::dot(ab, bp);
        let d4 = vec3::dot(ac, bp);
        if d3 >= 0.0 && d4 <= d3 {
            return vec3::dot(bp, bp);
        }

        let vc = d1 * d4 - d3 * d2;
        if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
            let v = d1 / (d1 - d3);
            let diff = vec3::sub(point, vec3::add(self.v0, vec3::scale(ab, v)));
            return vec3::dot(diff, diff);
        }

        let cp = vec3::sub(point, self.v2);
        let d5 = vec3::dot(ab, cp);
        let d6 = vec3::dot(ac, cp);
        if d6 >= 0.0 && d5 <= d6 {
            return vec3::dot(cp, cp);
        }

        let vb = d5 * d2 - d1 * d6;
        if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
            let w = d2 / (d2 - d6);
            let diff = vec3::sub(point, vec3::add(self.v0, vec3::scale(ac, w)));
            return vec3::dot(diff, diff);
        }

        let va = d3 * d6 - d5 * d4;
        if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
            let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
            let bc = vec3::sub(self.v2, self.v1);
            let diff = vec3::sub(point, vec3::add(self.v1, vec3::scale(bc, w)));
            return vec3::dot(diff, diff);
        }

        let denom = 1.0 / (va + vb + vc);
        let v = vb * denom;
        let w = vc * denom;
        let closest = vec3::add(
            self.v0,
            vec3::add(vec3::scale(ab, v), vec3::scale(ac, w)),
        );
        let diff = vec3::sub(point, closest);
        vec3::dot(diff, diff)
    }
}

/// Build the triangle soup from `(positions, indices)` buffers.
///
/// `positions` is xyz-repeating; `indices` holds triples. Triples that
/// reference positions beyond the buffer are skipped.
pub fn triangles_from_buffers(positions: &[f32], indices: &[u32]) -> Vec<Triangle> {
    let vertex_count = positions.len() / 3;
    let mut triangles = Vec::with_capacity(indices.len() / 3);

    for (tri_index, triple) in indices.chunks_exact(3).enumerate() {
        let (i0, i1, i2) = (triple[0] as usize, triple[1] as usize, triple[2] as usize);
        if i0 >= vertex_count || i1 >= vertex_count || i2 >= vertex_count {
            continue;
        }
        let fetch = |i: usize| [positions[3 * i], positions[3 * i + 1], positions[3 * i + 2]];
        triangles.push(Triangle::new(
            fetch(i0),
            fetch(i1),
            fetch(i2),
            tri_index as u32,
        ));
    }

    triangles
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_triangle() -> Triangle {
        Triangle::new([0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], 0)
    }

    #[test]
    fn test_normal_from_ccw_winding() {
        let tri = unit_triangle();
        assert_relative_eq!(tri.normal[2], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_buffers_assign_sequential_ids() {
        let positions = [
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, //
            0.0, 0.0, 1.0,
        ];
        let indices = [0, 1, 2, 0, 2, 3];
        let tris = triangles_from_buffers(&positions, &indices);
        assert_eq!(tris.len(), 2);
        assert_eq!(tris[0].id, 0);
        assert_eq!(tris[1].id, 1);
        assert_eq!(tris[1].v2, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_buffers_skip_out_of_range_triples() {
        let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let indices = [0, 1, 2, 0, 1, 9];
        assert_eq!(triangles_from_buffers(&positions, &indices).len(), 1);
    }

    #[test]
    fn test_distance_face_region() {
        let tri = unit_triangle();
        // Directly above the interior: distance equals height.
        let d2 = tri.distance_squared([0.25, 0.25, 2.0]);
        assert_relative_eq!(d2, 4.0, epsilon = 1e-5);
    }

    #[test]
    fn test_distance_vertex_region() {
        let tri = unit_triangle();
        let d2 = tri.distance_squared([-3.0, -4.0, 0.0]);
        assert_relative_eq!(d2, 25.0, epsilon = 1e-5);
    }

    #[test]
    fn test_distance_edge_region() {
        let tri = unit_triangle();
        // Below the AB edge midpoint.
        let d2 = tri.distance_squared([0.5, -2.0, 0.0]);
        assert_relative_eq!(d2, 4.0, epsilon = 1e-5);
    }
}
