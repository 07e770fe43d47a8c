// cli.rs - Command-line interface configuration
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "particle-morph")]
#[command(about = "Scroll-driven particle morphing between 3D models", long_about = None)]
pub struct Cli {
    /// Disable per-tick console output
    #[arg(long = "no-ui", default_value = "false", global = true)]
    pub no_ui: bool,

    /// JSON file overriding the default tunables
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Seed for buffer padding, particle sizes and fireworks
    #[arg(long, default_value_t = 0, global = true)]
    pub seed: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Load models and run a headless morph session
    Morph {
        /// Model files (.gltf / .glb), in morph order
        #[arg(required = true, num_args = 2..)]
        models: Vec<String>,

        /// Directory the model paths are relative to
        #[arg(long)]
        base_dir: Option<PathBuf>,

        /// JSON list of `{ "tick": n, "kind": ..., ... }` inputs to replay
        #[arg(long)]
        script: Option<PathBuf>,

        /// Wheel delta sent every tick when no script is given
        #[arg(long, default_value_t = 40.0)]
        wheel: f32,

        #[arg(long, default_value_t = 600)]
        ticks: u32,

        /// Pace ticks against the wall clock instead of running flat out
        #[arg(long)]
        realtime: bool,

        #[arg(long, default_value_t = 60.0)]
        hz: f32,

        /// Tween the camera onto this model slot before the first tick
        #[arg(long)]
        focus: Option<usize>,

        /// Print one JSON object per tick
        #[arg(long)]
        json: bool,
    },

    /// Generate random firework bursts and summarize their layouts
    Firework {
        #[arg(long, default_value_t = 1)]
        bursts: u32,
    },
}
