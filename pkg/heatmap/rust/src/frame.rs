// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use serde::{Serialize, Serializer};

use crate::metrics::{Metrics, MetricsParams};

/// Sensor mat edge length, in cells.
pub const GRID_SIZE: usize = 32;
pub const GRID_CELLS: usize = GRID_SIZE * GRID_SIZE;

/// A 32x32 grid of pressure readings, stored row-major.
///
/// Serializes as an array of 32 rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    cells: Box<[f64]>,
}

impl Matrix {
    pub fn zeroed() -> Self {
        Self {
            cells: vec![0.0; GRID_CELLS].into_boxed_slice(),
        }
    }

    /// Builds a matrix by calling `f(row, col)` for every cell.
    pub fn from_fn(mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let cells = (0..GRID_CELLS)
            .map(|i| f(i / GRID_SIZE, i % GRID_SIZE))
            .collect();
        Self { cells }
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= GRID_SIZE || col >= GRID_SIZE {
            return None;
        }
        self.cells.get(row * GRID_SIZE + col).copied()
    }

    pub(crate) fn row_mut(&mut self, row: usize) -> Option<&mut [f64]> {
        self.cells.chunks_exact_mut(GRID_SIZE).nth(row)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.cells.chunks_exact(GRID_SIZE)
    }

    /// All cells, row-major. This is the flat layout the viewer consumes.
    pub fn as_slice(&self) -> &[f64] {
        &self.cells
    }

    /// Unfiltered maximum reading.
    pub fn peak(&self) -> f64 {
        self.cells.iter().copied().fold(f64::MIN, f64::max)
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl Serialize for Matrix {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.rows())
    }
}

/// A parsed grid together with the metrics computed for it at load time.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    matrix: Matrix,
    metrics: Metrics,
}

impl Frame {
    pub fn new(matrix: Matrix, params: &MetricsParams) -> Self {
        let metrics = Metrics::compute(&matrix, params);
        Self { matrix, metrics }
    }

    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}
