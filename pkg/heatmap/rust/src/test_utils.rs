// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

#![allow(clippy::unwrap_used)]
#![allow(clippy::indexing_slicing)]

use std::fs::File;
use std::path::Path;
use std::time::{Duration, SystemTime};

use crate::frame::{GRID_SIZE, Matrix};

/// Zero matrix with the given `((row, col), value)` cells set, applied in order.
pub fn with_cells(cells: &[((usize, usize), f64)]) -> Matrix {
    let mut matrix = Matrix::zeroed();
    for &((row, col), value) in cells {
        matrix.row_mut(row).unwrap()[col] = value;
    }
    matrix
}

/// A uniform 4x4 block of `value` at the top-left corner: 16 contiguous
/// cells, enough to count toward the peak pressure index.
pub fn blob(value: f64) -> Matrix {
    Matrix::from_fn(|r, c| if r < 4 && c < 4 { value } else { 0.0 })
}

/// Deterministic xorshift-filled matrix with readings in `[0, 64)` and a
/// sprinkling of zeros.
pub fn pseudo_random_matrix(seed: u64) -> Matrix {
    let mut state = seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) | 1;
    Matrix::from_fn(|_, _| {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        let v = (state % 6400) as f64 / 100.0;
        if state % 3 == 0 { 0.0 } else { v }
    })
}

pub fn uniform_line(value: f64) -> String {
    format!("{}\n", vec![value.to_string(); GRID_SIZE].join(","))
}

/// Renders a matrix as 32 CSV lines.
pub fn frame_text(matrix: &Matrix) -> String {
    matrix
        .rows()
        .map(|row| {
            let fields: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            format!("{}\n", fields.join(","))
        })
        .collect()
}

pub fn write_frames(path: &Path, frames: &[Matrix]) {
    let text: String = frames.iter().map(frame_text).collect();
    std::fs::write(path, text).unwrap();
}

/// Sets an explicit modification time so tests do not depend on filesystem
/// timestamp granularity.
pub fn set_mtime(path: &Path, secs_since_epoch: u64) {
    let file = File::options().write(true).open(path).unwrap();
    file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs_since_epoch))
        .unwrap();
}
