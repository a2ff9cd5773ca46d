//! Skywave command-line interface.
//!
//! Run headless simulations from TOML job files:
//! ```sh
//! skywave-cli run job.toml
//! skywave-cli validate job.toml
//! skywave-cli info city.bvh
//! ```

mod config;
mod runner;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "skywave-cli")]
#[command(about = "Skywave: urban RF propagation workbench")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a headless simulation from a TOML job file.
    Run {
        /// Path to the job configuration file.
        config: PathBuf,
        /// Output directory (overrides config file setting).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a job file without running the simulation.
    Validate {
        /// Path to the job configuration file.
        config: PathBuf,
    },
    /// Print statistics for a BVH cache file.
    Info {
        /// Path to the `.bvh` cache.
        cache: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, output } => {
            println!("Skywave FDTD Runner");
            println!("===================");
            let mut job = config::load_config(&config)?;
            println!("Configuration: {}", config.display());

            if let Some(dir) = output {
                job.output.directory = dir.display().to_string();
            }

            let result = runner::run_simulation(&job)?;
            println!(
                "Simulation complete: {} frames at N={}",
                result.energy.len(),
                result.grid_cells
            );
            Ok(())
        }
        Commands::Validate { config } => {
            let _job = config::load_config(&config)?;
            println!("Configuration is valid: {}", config.display());
            Ok(())
        }
        Commands::Info { cache } => {
            let bvh = skywave_geometry::Bvh::load_cache(&cache)?;
            let bounds = bvh.scene_bounds();
            println!("BVH cache: {}", cache.display());
            println!("  Triangles: {}", bvh.triangles().len());
            println!("  Nodes:     {}", bvh.nodes().len());
            println!(
                "  Extent:    {:.1} x {:.1} x {:.1} m",
                bounds.max[0] - bounds.min[0],
                bounds.max[1] - bounds.min[1],
                bounds.max[2] - bounds.min[2]
            );
            Ok(())
        }
    }
}
