//! Parsing of bvals/bvecs text files into a gradient table.
//!
//! Both the FSL layout (3 rows of N columns) and the column layout
//! (N rows of 3 values) are accepted for bvecs.

use std::fs;
use std::path::Path;

use crate::utils::error::{FlowError, Result};

pub const DEFAULT_B0_THRESHOLD: f64 = 50.0;
pub const DEFAULT_BVECS_TOL: f64 = 0.01;

#[derive(Debug, Clone)]
pub struct GradientTable {
    pub bvals: Vec<f64>,
    pub bvecs: Vec<[f64; 3]>,
}

impl GradientTable {
    pub fn new(bvals: Vec<f64>, bvecs: Vec<[f64; 3]>) -> Result<Self> {
        if bvals.len() != bvecs.len() {
            return Err(FlowError::Gradient {
                message: format!(
                    "bvals has {} entries but bvecs has {}",
                    bvals.len(),
                    bvecs.len()
                ),
            });
        }
        Ok(Self { bvals, bvecs })
    }

    pub fn len(&self) -> usize {
        self.bvals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bvals.is_empty()
    }

    /// Number of acquisitions whose b-value falls below the b0 threshold.
    pub fn b0_count(&self, b0_threshold: f64) -> usize {
        self.bvals.iter().filter(|&&b| b <= b0_threshold).count()
    }

    /// Number of direction vectors with a norm within `bvecs_tol` of 1.0.
    pub fn unit_bvec_count(&self, bvecs_tol: f64) -> usize {
        unit_bvec_count(&self.bvecs, bvecs_tol)
    }

    /// Distinct b-values, sorted ascending (tolerance-free comparison).
    pub fn unique_bvals(&self) -> Vec<f64> {
        let mut sorted = self.bvals.clone();
        sorted.sort_by(|a, b| a.total_cmp(b));
        sorted.dedup();
        sorted
    }
}

fn norm(v: &[f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

/// Number of direction vectors with a norm within `bvecs_tol` of 1.0.
/// Needs only the vectors, no paired b-values.
pub fn unit_bvec_count(bvecs: &[[f64; 3]], bvecs_tol: f64) -> usize {
    bvecs
        .iter()
        .filter(|v| (norm(v) - 1.0).abs() <= bvecs_tol)
        .count()
}

pub fn read_bvals(path: &Path) -> Result<Vec<f64>> {
    let text = fs::read_to_string(path)?;
    parse_numbers(&text).map_err(|message| FlowError::Gradient {
        message: format!("{}: {}", path.display(), message),
    })
}

pub fn read_bvecs(path: &Path) -> Result<Vec<[f64; 3]>> {
    let text = fs::read_to_string(path)?;
    parse_bvecs(&text).map_err(|message| FlowError::Gradient {
        message: format!("{}: {}", path.display(), message),
    })
}

fn parse_numbers(text: &str) -> std::result::Result<Vec<f64>, String> {
    text.split_whitespace()
        .map(|tok| {
            tok.parse::<f64>()
                .map_err(|_| format!("invalid number '{}'", tok))
        })
        .collect()
}

fn parse_bvecs(text: &str) -> std::result::Result<Vec<[f64; 3]>, String> {
    let rows: Vec<Vec<f64>> = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_numbers)
        .collect::<std::result::Result<_, _>>()?;

    if rows.is_empty() {
        return Err("no gradient directions found".to_string());
    }

    let width = rows[0].len();
    if rows.iter().any(|row| row.len() != width) {
        return Err("rows have inconsistent lengths".to_string());
    }

    if rows.len() == 3 {
        // FSL layout: one row per component, one column per acquisition.
        Ok((0..width)
            .map(|i| [rows[0][i], rows[1][i], rows[2][i]])
            .collect())
    } else if width == 3 {
        Ok(rows.iter().map(|row| [row[0], row[1], row[2]]).collect())
    } else {
        Err(format!(
            "expected 3 rows or 3 columns, got {} rows of {} values",
            rows.len(),
            width
        ))
    }
}
