//! TOML configuration deserialisation for headless runs.

use serde::Deserialize;

/// Top-level job configuration.
#[derive(Debug, Deserialize)]
pub struct JobConfig {
    pub simulation: SimulationConfig,
    pub grid: GridConfig,
    pub scene: SceneConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Simulation parameters from TOML.
#[derive(Debug, Deserialize)]
pub struct SimulationConfig {
    /// Number of driver frames to run.
    pub frames: usize,
    #[serde(default = "default_simulation_speed")]
    pub simulation_speed: u32,
    #[serde(default = "default_emission_strength")]
    pub emission_strength: f32,
}

fn default_simulation_speed() -> u32 {
    1
}
fn default_emission_strength() -> f32 {
    0.5
}

/// Grid placement from TOML. A scene file's `[Grid]` section, when present,
/// overrides the spacing and half-extent given here.
#[derive(Debug, Deserialize)]
pub struct GridConfig {
    #[serde(default = "default_spacing")]
    pub spacing: f32,
    #[serde(default)]
    pub center: [f32; 3],
    #[serde(default = "default_half_extent")]
    pub half_extent: [f32; 3],
    #[serde(default = "default_true")]
    pub auto_center: bool,
    #[serde(default = "default_material_permittivity")]
    pub material_permittivity: f32,
    #[serde(default)]
    pub ground_level: f32,
}

fn default_spacing() -> f32 {
    5.0
}
fn default_half_extent() -> [f32; 3] {
    [200.0; 3]
}
fn default_material_permittivity() -> f32 {
    50.0
}
fn default_true() -> bool {
    true
}

/// Scene inputs.
#[derive(Debug, Deserialize)]
pub struct SceneConfig {
    /// Path to a `.bvh` cache; the cached triangles are the scene geometry.
    pub bvh_cache: String,
    /// Optional scene file providing nodes and grid settings.
    #[serde(default)]
    pub scene_file: Option<String>,
}

/// Output configuration.
#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// Output directory (default: "./output").
    #[serde(default = "default_output_dir")]
    pub directory: String,
    /// Write per-frame total field energy as CSV (default: true).
    #[serde(default = "default_true")]
    pub save_energy: bool,
    /// Write the final mid-plane Ez slice as CSV (default: false).
    #[serde(default)]
    pub save_field_slice: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            save_energy: true,
            save_field_slice: false,
        }
    }
}

fn default_output_dir() -> String {
    "./output".into()
}

/// Load and parse a TOML job configuration file.
pub fn load_config(path: &std::path::Path) -> anyhow::Result<JobConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: JobConfig = toml::from_str(&content)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_fills_defaults() {
        let config: JobConfig = toml::from_str(
            r#"
            [simulation]
            frames = 100

            [grid]

            [scene]
            bvh_cache = "city.bvh"
            "#,
        )
        .unwrap();

        assert_eq!(config.simulation.frames, 100);
        assert_eq!(config.simulation.simulation_speed, 1);
        assert_eq!(config.grid.spacing, 5.0);
        assert_eq!(config.grid.half_extent, [200.0; 3]);
        assert!(config.grid.auto_center);
        assert!(config.scene.scene_file.is_none());
        assert!(config.output.save_energy);
        assert!(!config.output.save_field_slice);
    }

    #[test]
    fn test_full_config_round_trip() {
        let config: JobConfig = toml::from_str(
            r#"
            [simulation]
            frames = 50
            simulation_speed = 4
            emission_strength = 1.25

            [grid]
            spacing = 2.5
            center = [0.0, 100.0, 0.0]
            half_extent = [150.0, 150.0, 150.0]
            auto_center = false
            material_permittivity = 25.0
            ground_level = -10.0

            [scene]
            bvh_cache = "city.bvh"
            scene_file = "downtown.scene"

            [output]
            directory = "./runs/a"
            save_energy = false
            save_field_slice = true
            "#,
        )
        .unwrap();

        assert_eq!(config.simulation.simulation_speed, 4);
        assert_eq!(config.grid.center[1], 100.0);
        assert_eq!(config.grid.material_permittivity, 25.0);
        assert_eq!(config.scene.scene_file.as_deref(), Some("downtown.scene"));
        assert!(config.output.save_field_slice);
    }
}
