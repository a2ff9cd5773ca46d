//! Plain-text scene persistence.
//!
//! Scenes are stored as `[Section]` blocks of `key=value` lines: `[Camera]`,
//! `[Grid]`, `[Visualization]`, a `[Nodes]` block carrying `count=`, and one
//! `[NodeK]` block per radio node. Vec3 values are three comma-separated
//! floats; booleans are `true`/`false`; `#` starts a comment line.
//!
//! Loading clears the node catalogue before repopulating it, so a loaded
//! scene replaces rather than merges.

use std::fmt::Write as _;
use std::path::Path;

use thiserror::Error;

use crate::sources::{NodeKind, SourceManager};

/// Errors during scene save/load.
#[derive(Debug, Error)]
pub enum SceneFileError {
    #[error("Failed to access scene file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}: {message}")]
    FormatError { line: usize, message: String },
}

/// Host-side scene state that travels with the node list.
#[derive(Debug, Clone, Copy)]
pub struct SceneData {
    pub camera_position: [f32; 3],
    pub camera_yaw: f32,
    pub camera_pitch: f32,
    pub grid_half_extent: [f32; 3],
    pub voxel_spacing: f32,
    pub gradient_color_low: [f32; 3],
    pub gradient_color_high: [f32; 3],
    pub show_emission_source: bool,
    pub show_geometry_edges: bool,
}

impl Default for SceneData {
    fn default() -> Self {
        Self {
            camera_position: [0.0, 100.0, 300.0],
            camera_yaw: -90.0,
            camera_pitch: 0.0,
            grid_half_extent: [200.0; 3],
            voxel_spacing: 5.0,
            gradient_color_low: [0.0, 0.0, 1.0],
            gradient_color_high: [1.0, 0.0, 0.0],
            show_emission_source: true,
            show_geometry_edges: true,
        }
    }
}

fn format_vec3(v: [f32; 3]) -> String {
    format!("{:.6},{:.6},{:.6}", v[0], v[1], v[2])
}

/// Serialise the scene to `path`.
pub fn save_scene(
    path: &Path,
    manager: &SourceManager,
    data: &SceneData,
) -> Result<(), SceneFileError> {
    let mut out = String::new();

    out.push_str("# Skywave scene file\n\n");

    out.push_str("[Camera]\n");
    let _ = writeln!(out, "position={}", format_vec3(data.camera_position));
    let _ = writeln!(out, "yaw={:.6}", data.camera_yaw);
    let _ = writeln!(out, "pitch={:.6}\n", data.camera_pitch);

    out.push_str("[Grid]\n");
    let _ = writeln!(out, "halfSize={}", format_vec3(data.grid_half_extent));
    let _ = writeln!(out, "voxelSpacing={:.6}\n", data.voxel_spacing);

    out.push_str("[Visualization]\n");
    let _ = writeln!(out, "gradientColorLow={}", format_vec3(data.gradient_color_low));
    let _ = writeln!(out, "gradientColorHigh={}", format_vec3(data.gradient_color_high));
    let _ = writeln!(out, "showEmissionSource={}", data.show_emission_source);
    let _ = writeln!(out, "showGeometryEdges={}\n", data.show_geometry_edges);

    out.push_str("[Nodes]\n");
    let _ = writeln!(out, "count={}\n", manager.len());

    for (i, node) in manager.sources().iter().enumerate() {
        let _ = writeln!(out, "[Node{}]", i);
        let _ = writeln!(out, "id={}", node.id);
        let _ = writeln!(out, "name={}", node.name);
        let _ = writeln!(out, "type={}", node.kind.to_index());
        let _ = writeln!(out, "active={}", node.active);
        let _ = writeln!(out, "position={}", format_vec3(node.position));
        let _ = writeln!(out, "frequency={:.6}", node.frequency);
        let _ = writeln!(out, "power={:.6}", node.power);
        let _ = writeln!(out, "visible={}\n", node.visible);
    }

    std::fs::write(path, out)?;
    log::info!("scene saved to {}", path.display());
    Ok(())
}

struct PendingNode {
    name: Option<String>,
    kind: NodeKind,
    active: bool,
    position: [f32; 3],
    frequency: f32,
    power: f32,
    visible: bool,
}

impl PendingNode {
    fn fresh() -> Self {
        Self {
            name: None,
            kind: NodeKind::Transmitter,
            active: true,
            position: [0.0; 3],
            frequency: 2.4e9,
            power: 20.0,
            visible: true,
        }
    }
}

/// Load a scene from `path`, replacing the node catalogue and filling
/// `data` with the stored settings.
pub fn load_scene(
    path: &Path,
    manager: &mut SourceManager,
    data: &mut SceneData,
) -> Result<(), SceneFileError> {
    let content = std::fs::read_to_string(path)?;

    let mut section = String::new();
    let mut pending: Vec<PendingNode> = Vec::new();
    let mut current: Option<PendingNode> = None;

    for (line_no, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            if let Some(node) = current.take() {
                pending.push(node);
            }
            section = line[1..line.len() - 1].to_string();
            if section.starts_with("Node") && section != "Nodes" {
                current = Some(PendingNode::fresh());
            }
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let (key, value) = (key.trim(), value.trim());
        let line_no = line_no + 1;

        match section.as_str() {
            "Camera" => match key {
                "position" => data.camera_position = parse_vec3(value, line_no)?,
                "yaw" => data.camera_yaw = parse_f32(value, line_no)?,
                "pitch" => data.camera_pitch = parse_f32(value, line_no)?,
                _ => {}
            },
            "Grid" => match key {
                "halfSize" => data.grid_half_extent = parse_vec3(value, line_no)?,
                "voxelSpacing" => data.voxel_spacing = parse_f32(value, line_no)?,
                _ => {}
            },
            "Visualization" => match key {
                "gradientColorLow" => data.gradient_color_low = parse_vec3(value, line_no)?,
                "gradientColorHigh" => data.gradient_color_high = parse_vec3(value, line_no)?,
                "showEmissionSource" => data.show_emission_source = value == "true",
                "showGeometryEdges" => data.show_geometry_edges = value == "true",
                _ => {}
            },
            "Nodes" => {}
            _ => {
                if let Some(node) = current.as_mut() {
                    match key {
                        "name" => node.name = Some(value.to_string()),
                        "type" => {
                            node.kind = NodeKind::from_index(parse_f32(value, line_no)? as u32)
                        }
                        "active" => node.active = value == "true",
                        "position" => node.position = parse_vec3(value, line_no)?,
                        "frequency" => node.frequency = parse_f32(value, line_no)?,
                        "power" => node.power = parse_f32(value, line_no)?,
                        "visible" => node.visible = value == "true",
                        _ => {}
                    }
                }
            }
        }
    }
    if let Some(node) = current.take() {
        pending.push(node);
    }

    // Replace the catalogue. Loaded nodes get fresh ids; the stored id is
    // only a hint for diffing files.
    manager.clear();
    let count = pending.len();
    for node in pending {
        let id = manager.add(node.position, node.frequency, node.power, node.kind);
        if let Some(loaded) = manager.get_mut(id) {
            if let Some(name) = node.name {
                loaded.name = name;
            }
            loaded.active = node.active;
            loaded.visible = node.visible;
        }
    }

    log::info!("scene loaded from {} ({} nodes)", path.display(), count);
    Ok(())
}

fn parse_f32(value: &str, line: usize) -> Result<f32, SceneFileError> {
    value.parse().map_err(|_| SceneFileError::FormatError {
        line,
        message: format!("expected a number, found '{}'", value),
    })
}

fn parse_vec3(value: &str, line: usize) -> Result<[f32; 3], SceneFileError> {
    let mut parts = value.split(',');
    let mut out = [0.0f32; 3];
    for component in &mut out {
        let part = parts.next().ok_or_else(|| SceneFileError::FormatError {
            line,
            message: format!("expected three comma-separated floats, found '{}'", value),
        })?;
        *component = parse_f32(part.trim(), line)?;
    }
    Ok(out)
}
