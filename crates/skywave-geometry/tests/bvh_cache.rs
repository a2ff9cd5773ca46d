//! Cache round-trip tests for the BVH.
//!
//! Coverage:
//! - `load(save(bvh))` reproduces the triangles, topology, and leaf contents
//!   bitwise for a large randomised scene.
//! - Reloaded trees answer ray queries identically to the originals.
//! - Files with a foreign magic are rejected.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use skywave_geometry::bvh::NodeContent;
use skywave_geometry::{Bvh, Ray, Triangle};

fn random_point(rng: &mut StdRng) -> [f32; 3] {
    [
        rng.gen_range(-100.0f32..100.0),
        rng.gen_range(-100.0f32..100.0),
        rng.gen_range(-100.0f32..100.0),
    ]
}

fn random_offset(v: [f32; 3], rng: &mut StdRng) -> [f32; 3] {
    [
        v[0] + rng.gen_range(-5.0f32..5.0),
        v[1] + rng.gen_range(-5.0f32..5.0),
        v[2] + rng.gen_range(-5.0f32..5.0),
    ]
}

fn random_triangles(count: usize, rng: &mut StdRng) -> Vec<Triangle> {
    let mut triangles = Vec::with_capacity(count);
    for i in 0..count {
        let v0 = random_point(rng);
        let v1 = random_offset(v0, rng);
        let v2 = random_offset(v0, rng);
        triangles.push(Triangle::new(v0, v1, v2, i as u32));
    }
    triangles
}

#[test]
fn test_round_trip_is_bitwise_identical() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let bvh = Bvh::build(random_triangles(1000, &mut rng));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scene.bvh");
    bvh.save_cache(&path).unwrap();
    let loaded = Bvh::load_cache(&path).unwrap();

    assert_eq!(loaded.triangles().len(), bvh.triangles().len());
    for (a, b) in bvh.triangles().iter().zip(loaded.triangles()) {
        assert_eq!(a, b, "triangles must survive the cache bitwise");
    }

    assert_eq!(loaded.scene_bounds(), bvh.scene_bounds());
    assert_eq!(loaded.nodes().len(), bvh.nodes().len());
    for (a, b) in bvh.nodes().iter().zip(loaded.nodes()) {
        assert_eq!(a.bounds, b.bounds);
        match (&a.content, &b.content) {
            (NodeContent::Leaf(x), NodeContent::Leaf(y)) => assert_eq!(x, y),
            (
                NodeContent::Split { left: al, right: ar },
                NodeContent::Split { left: bl, right: br },
            ) => {
                assert_eq!(al, bl);
                assert_eq!(ar, br);
            }
            _ => panic!("node kind changed across the cache"),
        }
    }
}

#[test]
fn test_round_trip_preserves_query_results() {
    let mut rng = StdRng::seed_from_u64(42);
    let bvh = Bvh::build(random_triangles(1000, &mut rng));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scene.bvh");
    bvh.save_cache(&path).unwrap();
    let loaded = Bvh::load_cache(&path).unwrap();

    for _ in 0..100 {
        let origin = [
            rng.gen_range(-150.0f32..150.0),
            rng.gen_range(-150.0f32..150.0),
            rng.gen_range(-150.0f32..150.0),
        ];
        let direction = skywave_geometry::vec3::normalize([
            rng.gen_range(-1.0f32..1.0),
            rng.gen_range(-1.0f32..1.0),
            rng.gen_range(-1.0f32..1.0),
        ]);
        let ray = Ray::new(origin, direction);

        match (bvh.intersect(&ray), loaded.intersect(&ray)) {
            (None, None) => {}
            (Some(a), Some(b)) => {
                assert_eq!(a.triangle_id, b.triangle_id);
                assert!((a.distance - b.distance).abs() < 1e-6);
                for axis in 0..3 {
                    assert!((a.point[axis] - b.point[axis]).abs() < 1e-6);
                    assert!((a.normal[axis] - b.normal[axis]).abs() < 1e-6);
                }
            }
            (a, b) => panic!("hit mismatch after reload: {:?} vs {:?}", a, b),
        }
        assert_eq!(bvh.intersect_any(&ray), loaded.intersect_any(&ray));
    }
}

#[test]
fn test_bad_magic_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bogus.bvh");
    std::fs::write(&path, b"NOPE and some trailing garbage").unwrap();

    match Bvh::load_cache(&path) {
        Err(skywave_geometry::bvh::cache::CacheError::InvalidMagic) => {}
        other => panic!("expected InvalidMagic, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_load_or_build_falls_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.bvh");

    let mut rng = StdRng::seed_from_u64(7);
    let triangles = random_triangles(64, &mut rng);
    let bvh = skywave_geometry::bvh::cache::load_or_build(&path, || triangles.clone());
    assert_eq!(bvh.triangles().len(), 64);

    // The fallback build must have written a loadable cache.
    let reloaded = Bvh::load_cache(&path).unwrap();
    assert_eq!(reloaded.triangles().len(), 64);
}

#[test]
fn test_empty_tree_round_trips() {
    let bvh = Bvh::build(Vec::new());
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.bvh");
    bvh.save_cache(&path).unwrap();

    let loaded = Bvh::load_cache(&path).unwrap();
    assert!(loaded.is_empty());
    assert!(loaded.triangles().is_empty());
}
