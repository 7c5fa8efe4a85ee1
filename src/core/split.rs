//! `SplitFlow`: slice a 4D volume into 3D sub-volumes.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use ndarray::Axis;

use crate::core::workflow::{FlowState, Workflow};
use crate::data::nifti;
use crate::utils::error::{FlowError, Result};

#[derive(Debug, Clone)]
pub struct SplitArgs {
    pub input: PathBuf,
    /// Volume to extract; `None` means the first one.
    pub vol_idx: Option<usize>,
    /// Write every frame instead of a single one.
    pub all: bool,
    pub out_dir: PathBuf,
}

impl SplitArgs {
    pub fn new(input: impl Into<PathBuf>, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            vol_idx: None,
            all: false,
            out_dir: out_dir.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct SplitFlow {
    pub state: FlowState,
}

impl SplitFlow {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Input file name without the `.nii`/`.nii.gz` extension.
fn output_stem(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "volume".to_string());
    if let Some(stem) = name.strip_suffix(".nii.gz") {
        return stem.to_string();
    }
    if let Some(stem) = name.strip_suffix(".nii") {
        return stem.to_string();
    }
    name
}

#[async_trait]
impl Workflow for SplitFlow {
    type Args = SplitArgs;

    fn name(&self) -> &'static str {
        "split"
    }

    async fn run(&mut self, args: &Self::Args) -> Result<()> {
        self.state.clear();

        let img = nifti::load(&args.input)?;
        if img.ndim() != 4 {
            return Err(FlowError::InvalidInput {
                message: format!(
                    "{}: expected a 4D volume, got {}D",
                    args.input.display(),
                    img.ndim()
                ),
            });
        }
        let nvols = img.data.len_of(Axis(3));
        let stem = output_stem(&args.input);
        fs::create_dir_all(&args.out_dir)?;

        if args.all {
            for idx in 0..nvols {
                let out_path = args
                    .out_dir
                    .join(format!("{}_split_{:03}.nii.gz", stem, idx));
                self.state.check_overwrite(&out_path)?;
                nifti::save(&img.frame(idx)?, &out_path)?;
                self.state.record(format!("out_split_{:03}", idx), out_path);
            }
            tracing::info!("Split all {} volumes of {}", nvols, args.input.display());
        } else {
            let idx = args.vol_idx.unwrap_or(0);
            let out_path = args.out_dir.join(format!("{}_split.nii.gz", stem));
            self.state.check_overwrite(&out_path)?;
            nifti::save(&img.frame(idx)?, &out_path)?;
            tracing::info!(
                "Volume {} of {} written to {}",
                idx,
                nvols,
                out_path.display()
            );
            self.state.record("out_split", out_path);
        }

        Ok(())
    }

    fn last_generated_outputs(&self) -> &HashMap<String, PathBuf> {
        self.state.outputs()
    }
}
