pub mod download;
pub mod gradients;
pub mod nifti;
