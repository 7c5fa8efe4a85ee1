//! Shared fixtures: synthesizes small datasets on disk, standing in for
//! the canned sample files a full install would ship.
#![allow(dead_code)]

use std::f64::consts::PI;
use std::fs;
use std::path::{Path, PathBuf};

use ndarray::{ArrayD, IxDyn};

use dwiflow::data::nifti::{self, NiftiImage};

pub const TEST_AFFINE: [f64; 16] = [
    2.0, 0.0, 0.0, -10.0, //
    0.0, 2.0, 0.0, -20.0, //
    0.0, 0.0, 2.0, -30.0, //
    0.0, 0.0, 0.0, 1.0,
];

pub fn synthetic_image(shape: &[usize]) -> NiftiImage {
    let len: usize = shape.iter().product();
    let data = ArrayD::from_shape_vec(
        IxDyn(shape),
        (0..len).map(|i| (i % 251) as f32 * 0.25).collect(),
    )
    .unwrap();
    let mut voxel_size = vec![2.0f32; shape.len().min(4)];
    if voxel_size.len() == 4 {
        voxel_size[3] = 1.0;
    }
    NiftiImage {
        data,
        affine: TEST_AFFINE,
        voxel_size,
    }
}

/// 25 distinct unit vectors spread over the sphere.
pub fn unit_directions(n: usize) -> Vec<[f64; 3]> {
    let golden = PI * (3.0 - 5.0f64.sqrt());
    (0..n)
        .map(|k| {
            let z = 1.0 - 2.0 * (k as f64 + 0.5) / n as f64;
            let r = (1.0 - z * z).sqrt();
            let phi = golden * k as f64;
            [r * phi.cos(), r * phi.sin(), z]
        })
        .collect()
}

/// Writes a 26-frame 4D volume (1 b0 + 25 diffusion directions) plus
/// matching bvals/bvecs files, returning their paths.
pub fn write_small_25(dir: &Path) -> (PathBuf, PathBuf, PathBuf) {
    let img = synthetic_image(&[4, 4, 4, 26]);
    let fimg = dir.join("small_25.nii.gz");
    nifti::save(&img, &fimg).unwrap();

    let mut bvals = vec![0.0f64];
    bvals.extend(std::iter::repeat(1000.0).take(25));
    let fbval = dir.join("small_25.bval");
    let bval_line: Vec<String> = bvals.iter().map(|b| format!("{}", b)).collect();
    fs::write(&fbval, format!("{}\n", bval_line.join(" "))).unwrap();

    let mut bvecs = vec![[0.0f64; 3]];
    bvecs.extend(unit_directions(25));
    let fbvec = dir.join("small_25.bvec");
    // FSL layout: one row per component.
    let mut rows = String::new();
    for axis in 0..3 {
        let row: Vec<String> = bvecs.iter().map(|v| format!("{:.6}", v[axis])).collect();
        rows.push_str(&row.join(" "));
        rows.push('\n');
    }
    fs::write(&fbvec, rows).unwrap();

    (fimg, fbval, fbvec)
}
