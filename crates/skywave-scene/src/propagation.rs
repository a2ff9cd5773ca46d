//! Geometric signal-ray overlay.
//!
//! Complements the FDTD view with a coarse coverage sketch: each active
//! transmitter shoots a Fibonacci-sphere fan of rays at the BVH, reflecting
//! specularly at hit surfaces until the bounce budget or the strength floor
//! is reached. The output is a list of polylines for an external line
//! renderer; nothing here draws.
//!
//! The per-segment attenuation squashes free-space path loss through
//! `exp(-fspl / 100)`. That expression is a tuned visual decay, not a link
//! budget; treat the strengths as display weights only.

use skywave_geometry::{vec3, Bvh, Ray};

use crate::sources::{NodeKind, SourceManager};

/// Strength below which a ray stops spawning segments.
const MIN_STRENGTH: f32 = 0.01;

/// Fraction of strength surviving a reflection.
const REFLECTION_LOSS: f32 = 0.3;

/// Offset applied along the surface normal before re-tracing.
const SURFACE_EPSILON: f32 = 0.1;

/// Tracing parameters.
#[derive(Debug, Clone, Copy)]
pub struct PropagationConfig {
    pub rays_per_source: usize,
    pub max_bounces: u32,
    pub max_distance: f32,
}

impl Default for PropagationConfig {
    fn default() -> Self {
        Self {
            rays_per_source: 64,
            max_bounces: 2,
            max_distance: 2000.0,
        }
    }
}

/// One traced polyline, ready for a line renderer.
#[derive(Debug, Clone)]
pub struct SignalRay {
    pub origin: [f32; 3],
    pub direction: [f32; 3],
    /// Display weight of the final segment.
    pub strength: f32,
    pub bounces: u32,
    /// Polyline vertices, starting at the source.
    pub points: Vec<[f32; 3]>,
}

/// Evenly distributed unit directions via the Fibonacci sphere.
pub fn fibonacci_sphere(samples: usize) -> Vec<[f32; 3]> {
    let golden_ratio = (1.0 + 5.0f32.sqrt()) / 2.0;
    let angle_increment = std::f32::consts::TAU * golden_ratio;

    (0..samples)
        .map(|i| {
            let t = i as f32 / samples as f32;
            let inclination = (1.0 - 2.0 * t).acos();
            let azimuth = angle_increment * i as f32;
            [
                inclination.sin() * azimuth.cos(),
                inclination.sin() * azimuth.sin(),
                inclination.cos(),
            ]
        })
        .collect()
}

/// Visual distance falloff for a traced segment.
///
/// Free-space path loss in dB, squashed through `exp(-fspl / 100)` so the
/// overlay fades plausibly with distance. Not physically meaningful.
pub fn path_loss(distance: f32, frequency: f32) -> f32 {
    let distance = distance.max(1.0);
    let fspl = 20.0 * distance.log10() + 20.0 * frequency.log10() - 147.55;
    (-fspl / 100.0).exp()
}

/// Trace the overlay for every active transmitter.
pub fn trace_signal_paths(
    manager: &SourceManager,
    bvh: &Bvh,
    config: &PropagationConfig,
) -> Vec<SignalRay> {
    let mut rays = Vec::new();
    let directions = fibonacci_sphere(config.rays_per_source);

    for source in manager.sources() {
        if source.kind != NodeKind::Transmitter || !source.active {
            continue;
        }

        for &direction in &directions {
            let mut ray = SignalRay {
                origin: source.position,
                direction,
                strength: 1.0,
                bounces: 0,
                points: vec![source.position],
            };
            trace_ray(
                bvh,
                config,
                source.frequency,
                source.position,
                direction,
                1.0,
                0,
                &mut ray,
            );
            if ray.points.len() > 1 {
                rays.push(ray);
            }
        }
    }

    rays
}

#[allow(clippy::too_many_arguments)]
fn trace_ray(
    bvh: &Bvh,
    config: &PropagationConfig,
    frequency: f32,
    origin: [f32; 3],
    direction: [f32; 3],
    strength: f32,
    bounce: u32,
    path: &mut SignalRay,
) {
    if bounce > config.max_bounces || strength < MIN_STRENGTH {
        return;
    }

    let ray = Ray::with_range(origin, direction, 0.1, config.max_distance);
    match bvh.intersect(&ray) {
        Some(hit) if hit.distance < config.max_distance => {
            path.points.push(hit.point);

            let new_strength = strength * path_loss(hit.distance, frequency);
            path.strength = new_strength;
            path.bounces = bounce;

            if bounce < config.max_bounces && new_strength > MIN_STRENGTH {
                let reflected = vec3::reflect(direction, hit.normal);
                let next_origin =
                    vec3::add(hit.point, vec3::scale(hit.normal, SURFACE_EPSILON));
                trace_ray(
                    bvh,
                    config,
                    frequency,
                    next_origin,
                    reflected,
                    new_strength * REFLECTION_LOSS,
                    bounce + 1,
                    path,
                );
            }
        }
        _ => {
            path.points
                .push(vec3::add(origin, vec3::scale(direction, config.max_distance)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use skywave_geometry::Triangle;

    #[test]
    fn test_fibonacci_sphere_unit_directions() {
        let directions = fibonacci_sphere(64);
        assert_eq!(directions.len(), 64);
        for d in &directions {
            assert_relative_eq!(vec3::length(*d), 1.0, epsilon = 1e-4);
        }
        // Directions should cover both hemispheres.
        assert!(directions.iter().any(|d| d[2] > 0.5));
        assert!(directions.iter().any(|d| d[2] < -0.5));
    }

    #[test]
    fn test_path_loss_decreases_with_distance() {
        let near = path_loss(10.0, 2.4e9);
        let far = path_loss(1000.0, 2.4e9);
        assert!(near > far);
        assert!(near <= 1.0 && near > 0.0);
        assert!(far > 0.0);
    }

    #[test]
    fn test_path_loss_clamps_short_distances() {
        assert_eq!(path_loss(0.1, 2.4e9), path_loss(0.5, 2.4e9));
    }

    #[test]
    fn test_rays_escape_empty_scene() {
        let bvh = Bvh::build(Vec::new());
        let mut manager = SourceManager::new();
        manager.add([0.0; 3], 2.4e9, 20.0, NodeKind::Transmitter);

        let config = PropagationConfig {
            rays_per_source: 16,
            ..Default::default()
        };
        let rays = trace_signal_paths(&manager, &bvh, &config);

        assert_eq!(rays.len(), 16);
        for ray in &rays {
            assert_eq!(ray.points.len(), 2);
            let end = ray.points[1];
            assert_relative_eq!(vec3::length(end), config.max_distance, epsilon = 1.0);
        }
    }

    #[test]
    fn test_wall_reflection_extends_path() {
        // Big wall in front of the source; rays toward it must record the
        // hit point and continue with a reflected segment.
        let wall = vec![
            Triangle::new(
                [-500.0, -500.0, 50.0],
                [500.0, -500.0, 50.0],
                [500.0, 500.0, 50.0],
                0,
            ),
            Triangle::new(
                [-500.0, -500.0, 50.0],
                [500.0, 500.0, 50.0],
                [-500.0, 500.0, 50.0],
                1,
            ),
        ];
        let bvh = Bvh::build(wall);

        let mut manager = SourceManager::new();
        manager.add([0.0; 3], 2.4e9, 20.0, NodeKind::Transmitter);

        let rays = trace_signal_paths(&manager, &bvh, &PropagationConfig::default());

        let reflected = rays
            .iter()
            .find(|r| r.points.len() >= 3)
            .expect("some ray should bounce off the wall");
        assert!(reflected.bounces >= 1 || reflected.points.len() >= 3);
        assert!((reflected.points[1][2] - 50.0).abs() < 1.0);
        assert!(reflected.strength < 1.0);
    }

    #[test]
    fn test_receivers_do_not_emit() {
        let bvh = Bvh::build(Vec::new());
        let mut manager = SourceManager::new();
        manager.add([0.0; 3], 2.4e9, 20.0, NodeKind::Receiver);
        let rays = trace_signal_paths(&manager, &bvh, &PropagationConfig::default());
        assert!(rays.is_empty());
    }
}
