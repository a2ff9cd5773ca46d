//! Radio node catalogue and source injection.
//!
//! The [`SourceManager`] owns the ordered list of radio nodes. Ids come
//! from a monotonically increasing counter and are never reused within a
//! process; removal is O(n) and does not reorder the list, so hosts may
//! keep index-based UI bindings alive across edits.
//!
//! Each simulation sub-step, every active transmitter writes one sample of
//! its oscillation into the solver's current block. The oscillation runs on
//! a visualisation clock that advances by [`VIS_TIME_STEP`] per sub-step,
//! decoupled from the Courant time step, so a 2.4 GHz node visibly
//! oscillates instead of aliasing against the picosecond physics step.

use serde::{Deserialize, Serialize};

use skywave_core::{FieldStore, GridDescriptor};
use skywave_geometry::ray::ray_sphere_intersection;
use skywave_geometry::{vec3, Bvh, Ray};

/// Visualisation-clock advance per simulation sub-step (s).
pub const VIS_TIME_STEP: f32 = 1.0e-11;

/// Pick-sphere radius around a node (world units).
pub const PICK_RADIUS: f32 = 10.0;

/// Placement offset along the hit normal (world units).
pub const PLACEMENT_OFFSET: f32 = 5.0;

/// Free-space placement distance when the placement ray misses the scene.
pub const PLACEMENT_FALLBACK_RANGE: f32 = 500.0;

/// The role of a radio node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    Transmitter,
    Receiver,
    Relay,
}

impl NodeKind {
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Transmitter => "Transmitter",
            NodeKind::Receiver => "Receiver",
            NodeKind::Relay => "Relay",
        }
    }

    /// Numeric tag used by the scene file format.
    pub fn to_index(self) -> u32 {
        match self {
            NodeKind::Transmitter => 0,
            NodeKind::Receiver => 1,
            NodeKind::Relay => 2,
        }
    }

    pub fn from_index(index: u32) -> Self {
        match index {
            1 => NodeKind::Receiver,
            2 => NodeKind::Relay,
            _ => NodeKind::Transmitter,
        }
    }
}

/// A radio node placed in world space.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RadioSource {
    pub id: u32,
    pub name: String,
    pub kind: NodeKind,
    /// World position (m).
    pub position: [f32; 3],
    /// Carrier frequency (Hz).
    pub frequency: f32,
    /// Transmit power (dBm). Reported only; injection amplitude is the
    /// driver's emission strength.
    pub power: f32,
    pub active: bool,
    pub visible: bool,
}

impl RadioSource {
    pub fn new(id: u32, position: [f32; 3], frequency: f32, power: f32, kind: NodeKind) -> Self {
        Self {
            id,
            name: format!("Node_{}", id),
            kind,
            position,
            frequency,
            power,
            active: true,
            visible: true,
        }
    }
}

/// Ordered catalogue of radio nodes with stable ids.
pub struct SourceManager {
    sources: Vec<RadioSource>,
    next_id: u32,
    clock: f32,
}

impl Default for SourceManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceManager {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            next_id: 1,
            clock: 0.0,
        }
    }

    /// Add a node and return its fresh id.
    pub fn add(&mut self, position: [f32; 3], frequency: f32, power: f32, kind: NodeKind) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.sources
            .push(RadioSource::new(id, position, frequency, power, kind));
        id
    }

    /// Remove the node with `id`, preserving the order of the rest.
    pub fn remove(&mut self, id: u32) {
        self.sources.retain(|s| s.id != id);
    }

    /// Remove every node. Ids are not reused afterwards.
    pub fn clear(&mut self) {
        self.sources.clear();
    }

    pub fn get(&self, id: u32) -> Option<&RadioSource> {
        self.sources.iter().find(|s| s.id == id)
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut RadioSource> {
        self.sources.iter_mut().find(|s| s.id == id)
    }

    pub fn sources(&self) -> &[RadioSource] {
        &self.sources
    }

    pub fn sources_mut(&mut self) -> &mut [RadioSource] {
        &mut self.sources
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Current value of the visualisation clock (s).
    pub fn clock(&self) -> f32 {
        self.clock
    }

    /// World-space bounding box of the active transmitters, if any.
    pub fn transmitter_bounds(&self) -> Option<([f32; 3], [f32; 3])> {
        let mut min = [f32::INFINITY; 3];
        let mut max = [f32::NEG_INFINITY; 3];
        let mut any = false;

        for source in &self.sources {
            if source.kind != NodeKind::Transmitter || !source.active {
                continue;
            }
            any = true;
            for axis in 0..3 {
                min[axis] = min[axis].min(source.position[axis]);
                max[axis] = max[axis].max(source.position[axis]);
            }
        }

        any.then_some((min, max))
    }

    /// Advance the oscillation clock by one sub-step and write the current
    /// sample of every active transmitter into the grid.
    ///
    /// Positions outside the volume clamp to the boundary voxel; the writes
    /// happen before the stepper's E-update reads them.
    pub fn inject_currents(
        &mut self,
        fields: &mut FieldStore,
        grid: &GridDescriptor,
        strength: f32,
    ) {
        self.clock += VIS_TIME_STEP;

        for source in &self.sources {
            if source.kind != NodeKind::Transmitter || !source.active {
                continue;
            }
            let omega = std::f32::consts::TAU * source.frequency;
            let sample = strength * (omega * self.clock).sin();
            let [x, y, z] = grid.world_to_voxel(source.position);
            fields.add_emission(x, y, z, sample);
        }
    }

    /// Pick the nearest visible node whose pick sphere the ray hits.
    pub fn pick_node(
        &self,
        origin: [f32; 3],
        direction: [f32; 3],
        max_distance: f32,
    ) -> Option<u32> {
        let mut closest = max_distance;
        let mut picked = None;

        for source in &self.sources {
            if !source.visible {
                continue;
            }
            if let Some(t) =
                ray_sphere_intersection(origin, direction, source.position, PICK_RADIUS)
            {
                if t < closest {
                    closest = t;
                    picked = Some(source.id);
                }
            }
        }

        picked
    }
}

/// Resolve a placement ray against the scene.
///
/// Returns the placement position and whether geometry was hit: on a hit
/// the node sits [`PLACEMENT_OFFSET`] along the surface normal; on a miss
/// it floats [`PLACEMENT_FALLBACK_RANGE`] down the ray.
pub fn place_on_surface(bvh: &Bvh, origin: [f32; 3], direction: [f32; 3]) -> ([f32; 3], bool) {
    let ray = Ray::with_range(origin, direction, 0.1, 10_000.0);
    match bvh.intersect(&ray) {
        Some(hit) => (
            vec3::add(hit.point, vec3::scale(hit.normal, PLACEMENT_OFFSET)),
            true,
        ),
        None => (
            vec3::add(origin, vec3::scale(direction, PLACEMENT_FALLBACK_RANGE)),
            false,
        ),
    }
}
