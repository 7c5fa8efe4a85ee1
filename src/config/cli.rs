use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::data::gradients::{DEFAULT_B0_THRESHOLD, DEFAULT_BVECS_TOL};

#[derive(Debug, Parser)]
#[command(name = "dwiflow")]
#[command(about = "Diffusion-MRI I/O workflows: inspect, fetch and split imaging datasets")]
pub struct Cli {
    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Write log records to this file")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print information about NIfTI volumes and gradient files
    Info {
        /// Image (.nii/.nii.gz), bvals and bvecs files, in any order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// b-values at or below this threshold count as b0
        #[arg(long, default_value_t = DEFAULT_B0_THRESHOLD)]
        b0_threshold: f64,

        /// Tolerance on the norm of unit direction vectors
        #[arg(long, default_value_t = DEFAULT_BVECS_TOL)]
        bvecs_tol: f64,

        /// Print the collected summary as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Download and cache named dataset bundles
    Fetch {
        /// Bundle names to fetch
        #[arg(required = true)]
        bundles: Vec<String>,

        /// Fetch into this directory instead of the cache home
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// TOML registry file overriding the builtin bundle list
        #[arg(long)]
        registry: Option<PathBuf>,
    },

    /// Split a 4D volume into 3D sub-volumes
    Split {
        /// Input 4D image (.nii/.nii.gz)
        input: PathBuf,

        /// Index of the volume to extract (defaults to 0)
        #[arg(long, conflicts_with = "all")]
        vol_idx: Option<usize>,

        /// Write every 3D frame instead of a single one
        #[arg(long)]
        all: bool,

        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        /// Overwrite existing output files
        #[arg(long)]
        force: bool,
    },
}
