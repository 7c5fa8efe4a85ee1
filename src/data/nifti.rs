//! NIfTI-1 volume I/O.
//!
//! Reading goes through the `nifti` crate and yields an n-dimensional `f32`
//! array (scl_slope/scl_inter applied by the reader). Writing emits a fixed
//! FLOAT32 NIfTI-1 layout directly, gzip-compressed when the target path
//! ends in `.nii.gz`.

use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use ndarray::{ArrayD, Axis};
use nifti::volume::ndarray::IntoNdArray;
use nifti::{InMemNiftiObject, NiftiHeader, NiftiObject};

use crate::utils::error::{FlowError, Result};

/// A volume loaded from a NIfTI-1 file, converted to `f32`.
#[derive(Debug, Clone)]
pub struct NiftiImage {
    pub data: ArrayD<f32>,
    /// 4x4 voxel-to-world matrix, row-major.
    pub affine: [f64; 16],
    /// Voxel sizes in mm, one per axis (the 4th entry is the TR for 4D data).
    pub voxel_size: Vec<f32>,
}

impl NiftiImage {
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn ndim(&self) -> usize {
        self.data.ndim()
    }

    /// Extracts one 3D frame along the last axis.
    pub fn frame(&self, idx: usize) -> Result<NiftiImage> {
        let last = self.ndim() - 1;
        if idx >= self.data.len_of(Axis(last)) {
            return Err(FlowError::InvalidInput {
                message: format!(
                    "volume index {} out of range (last axis has {} entries)",
                    idx,
                    self.data.len_of(Axis(last))
                ),
            });
        }
        let data = self.data.index_axis(Axis(last), idx).to_owned();
        let voxel_size = self.voxel_size.iter().copied().take(3).collect();
        Ok(NiftiImage {
            data,
            affine: self.affine,
            voxel_size,
        })
    }
}

fn is_gzip(bytes: &[u8]) -> bool {
    bytes.len() >= 2 && bytes[0] == 0x1f && bytes[1] == 0x8b
}

/// Reads a `.nii` or `.nii.gz` volume (gzip is auto-detected from the bytes).
pub fn load_from_bytes(bytes: &[u8]) -> Result<NiftiImage> {
    let obj: InMemNiftiObject = if is_gzip(bytes) {
        InMemNiftiObject::from_reader(GzDecoder::new(Cursor::new(bytes)))?
    } else {
        InMemNiftiObject::from_reader(Cursor::new(bytes))?
    };

    let header = obj.header().clone();
    let affine = affine_from_header(&header);

    let data: ArrayD<f32> = obj.into_volume().into_ndarray()?;
    if data.ndim() < 3 {
        return Err(FlowError::InvalidInput {
            message: format!("expected at least a 3D volume, got {}D", data.ndim()),
        });
    }

    let naxes = data.ndim().min(7);
    let voxel_size: Vec<f32> = header.pixdim[1..=naxes].to_vec();

    Ok(NiftiImage {
        data,
        affine,
        voxel_size,
    })
}

pub fn load(path: &Path) -> Result<NiftiImage> {
    let bytes = fs::read(path)?;
    load_from_bytes(&bytes)
}

/// Serializes the image as an uncompressed NIfTI-1 file.
pub fn save_to_bytes(img: &NiftiImage) -> Result<Vec<u8>> {
    let shape = img.data.shape();
    if shape.len() < 3 || shape.len() > 7 {
        return Err(FlowError::InvalidInput {
            message: format!("cannot write a {}D volume as NIfTI-1", shape.len()),
        });
    }

    let mut header = [0u8; 348];

    // sizeof_hdr = 348
    header[0..4].copy_from_slice(&348i32.to_le_bytes());

    // dim[0..8]
    let mut dim = [1i16; 8];
    dim[0] = shape.len() as i16;
    for (i, &d) in shape.iter().enumerate() {
        dim[i + 1] = i16::try_from(d).map_err(|_| FlowError::InvalidInput {
            message: format!("axis {} size {} exceeds the NIfTI-1 limit", i, d),
        })?;
    }
    for (i, &d) in dim.iter().enumerate() {
        let offset = 40 + i * 2;
        header[offset..offset + 2].copy_from_slice(&d.to_le_bytes());
    }

    // datatype = 16 (FLOAT32), bitpix = 32
    header[70..72].copy_from_slice(&16i16.to_le_bytes());
    header[72..74].copy_from_slice(&32i16.to_le_bytes());

    // pixdim[0..8]
    let mut pixdim = [1.0f32; 8];
    for (i, &v) in img.voxel_size.iter().take(7).enumerate() {
        pixdim[i + 1] = v;
    }
    for (i, &p) in pixdim.iter().enumerate() {
        let offset = 76 + i * 4;
        header[offset..offset + 4].copy_from_slice(&p.to_le_bytes());
    }

    // vox_offset = 352 (header + 4-byte extension flag)
    header[108..112].copy_from_slice(&352.0f32.to_le_bytes());

    // scl_slope = 1.0, scl_inter = 0.0
    header[112..116].copy_from_slice(&1.0f32.to_le_bytes());
    header[116..120].copy_from_slice(&0.0f32.to_le_bytes());

    // sform_code = 1 (scanner anat)
    header[254..256].copy_from_slice(&1i16.to_le_bytes());

    // srow_x, srow_y, srow_z
    for row in 0..3 {
        for col in 0..4 {
            let offset = 280 + row * 16 + col * 4;
            let value = img.affine[row * 4 + col] as f32;
            header[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
        }
    }

    // magic = "n+1\0" (single-file NIfTI-1)
    header[344..348].copy_from_slice(b"n+1\0");

    let mut buffer = Vec::with_capacity(352 + img.data.len() * 4);
    buffer.extend_from_slice(&header);
    buffer.extend_from_slice(&[0u8; 4]);

    // Data section in Fortran order: first axis varies fastest.
    let reversed: Vec<usize> = (0..img.data.ndim()).rev().collect();
    for &value in img.data.view().permuted_axes(reversed).iter() {
        buffer.extend_from_slice(&value.to_le_bytes());
    }

    Ok(buffer)
}

/// Writes the image to `path`, gzipping when the name ends in `.nii.gz`.
pub fn save(img: &NiftiImage, path: &Path) -> Result<()> {
    let bytes = save_to_bytes(img)?;
    let out = if path.to_string_lossy().ends_with(".nii.gz") {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&bytes)?;
        encoder.finish()?
    } else {
        bytes
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, out)?;
    Ok(())
}

/// Voxel-to-world matrix: sform when set, pixdim scaling otherwise.
fn affine_from_header(header: &NiftiHeader) -> [f64; 16] {
    if header.sform_code > 0 {
        let x = &header.srow_x;
        let y = &header.srow_y;
        let z = &header.srow_z;
        [
            x[0] as f64, x[1] as f64, x[2] as f64, x[3] as f64,
            y[0] as f64, y[1] as f64, y[2] as f64, y[3] as f64,
            z[0] as f64, z[1] as f64, z[2] as f64, z[3] as f64,
            0.0, 0.0, 0.0, 1.0,
        ]
    } else {
        let vx = header.pixdim[1] as f64;
        let vy = header.pixdim[2] as f64;
        let vz = header.pixdim[3] as f64;
        [
            vx, 0.0, 0.0, 0.0,
            0.0, vy, 0.0, 0.0,
            0.0, 0.0, vz, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ]
    }
}
