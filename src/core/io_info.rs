//! `IoInfoFlow`: inspect NIfTI volumes and gradient tables, logging
//! descriptive statistics per input file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;

use crate::core::workflow::{FlowState, Workflow};
use crate::data::gradients::{
    read_bvals, read_bvecs, unit_bvec_count, GradientTable, DEFAULT_B0_THRESHOLD,
    DEFAULT_BVECS_TOL,
};
use crate::data::nifti;
use crate::utils::error::Result;

#[derive(Debug, Clone)]
pub struct IoInfoArgs {
    pub files: Vec<PathBuf>,
    pub b0_threshold: f64,
    pub bvecs_tol: f64,
}

impl Default for IoInfoArgs {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            b0_threshold: DEFAULT_B0_THRESHOLD,
            bvecs_tol: DEFAULT_BVECS_TOL,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageInfo {
    pub path: PathBuf,
    pub shape: Vec<usize>,
    pub voxel_size: Vec<f32>,
    pub min: f32,
    pub max: f32,
    pub mean: f32,
}

/// Everything the flow logged, in structured form.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IoInfoSummary {
    pub images: Vec<ImageInfo>,
    pub bval_count: Option<usize>,
    pub b0_count: Option<usize>,
    pub unit_bvec_count: Option<usize>,
}

#[derive(Debug, Default)]
pub struct IoInfoFlow {
    pub state: FlowState,
    pub summary: IoInfoSummary,
}

enum FileKind {
    Image,
    Bvals,
    Bvecs,
    Unknown,
}

fn classify(path: &Path) -> FileKind {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if name.ends_with(".nii") || name.ends_with(".nii.gz") {
        FileKind::Image
    } else if name.ends_with(".bval") || name.ends_with(".bvals") || name.ends_with("bvals.txt") {
        FileKind::Bvals
    } else if name.ends_with(".bvec") || name.ends_with(".bvecs") || name.ends_with("bvecs.txt") {
        FileKind::Bvecs
    } else {
        FileKind::Unknown
    }
}

impl IoInfoFlow {
    pub fn new() -> Self {
        Self::default()
    }

    fn inspect_image(&mut self, path: &Path) -> Result<()> {
        let img = nifti::load(path)?;

        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        let mut sum = 0.0f64;
        for &v in img.data.iter() {
            min = min.min(v);
            max = max.max(v);
            sum += v as f64;
        }
        let mean = if img.data.is_empty() {
            0.0
        } else {
            (sum / img.data.len() as f64) as f32
        };

        tracing::info!("Data size {:?}", img.shape());
        tracing::info!("Voxel size {:?}", img.voxel_size);
        tracing::info!("Data min {} max {} mean {}", min, max, mean);
        for row in 0..4 {
            let r = &img.affine[row * 4..row * 4 + 4];
            tracing::info!("Affine row {}: [{}, {}, {}, {}]", row, r[0], r[1], r[2], r[3]);
        }

        self.summary.images.push(ImageInfo {
            path: path.to_path_buf(),
            shape: img.shape().to_vec(),
            voxel_size: img.voxel_size.clone(),
            min,
            max,
            mean,
        });
        Ok(())
    }
}

#[async_trait]
impl Workflow for IoInfoFlow {
    type Args = IoInfoArgs;

    fn name(&self) -> &'static str {
        "io_info"
    }

    async fn run(&mut self, args: &Self::Args) -> Result<()> {
        self.state.clear();
        self.summary = IoInfoSummary::default();

        let mut bvals: Option<Vec<f64>> = None;
        let mut bvecs: Option<Vec<[f64; 3]>> = None;

        for path in &args.files {
            tracing::info!("-----------------");
            tracing::info!("Looking at {}", path.display());
            match classify(path) {
                FileKind::Image => self.inspect_image(path)?,
                FileKind::Bvals => {
                    let values = read_bvals(path)?;
                    tracing::info!("Total number of b-values {}", values.len());
                    bvals = Some(values);
                }
                FileKind::Bvecs => {
                    let vecs = read_bvecs(path)?;
                    tracing::info!("Total number of bvectors {}", vecs.len());
                    bvecs = Some(vecs);
                }
                FileKind::Unknown => {
                    tracing::warn!("Unrecognized file type: {}", path.display());
                }
            }
        }

        // b0 classification needs the paired b-values.
        if let (Some(bvals), Some(bvecs)) = (bvals.as_ref(), bvecs.as_ref()) {
            let table = GradientTable::new(bvals.clone(), bvecs.clone())?;
            let b0s = table.b0_count(args.b0_threshold);

            tracing::info!("b-values {:?}", table.unique_bvals());
            tracing::info!(
                "Number of b0s {} (b0_threshold {})",
                b0s,
                args.b0_threshold
            );

            self.summary.bval_count = Some(table.len());
            self.summary.b0_count = Some(b0s);
        }

        // The unit-vector count needs only the directions themselves.
        if let Some(bvecs) = &bvecs {
            let units = unit_bvec_count(bvecs, args.bvecs_tol);
            tracing::info!("Total number of unit bvectors {}", units);
            self.summary.unit_bvec_count = Some(units);
        }

        Ok(())
    }

    fn last_generated_outputs(&self) -> &HashMap<String, PathBuf> {
        self.state.outputs()
    }
}
