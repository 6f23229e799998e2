// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Per-frame clinical metrics.
//!
//! The peak pressure index (PPI) only considers readings that belong to a
//! contiguous region of at least `min_cluster_size` cells at or above
//! `lower_threshold`. Contiguity is 4-connected (no diagonals). Isolated spikes
//! still show up in the raw `peak_pressure`.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::frame::{GRID_CELLS, GRID_SIZE, Matrix};

pub const DEFAULT_LOWER_THRESHOLD: f64 = 5.0;
pub const DEFAULT_MIN_CLUSTER_SIZE: usize = 10;

/// PPI at which the risk becomes `Medium`.
const MEDIUM_RISK_PPI: f64 = 20.0;
/// PPI at which the risk becomes `High`.
const HIGH_RISK_PPI: f64 = 40.0;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_ppi(ppi: f64) -> Self {
        if ppi < MEDIUM_RISK_PPI {
            Self::Low
        } else if ppi < HIGH_RISK_PPI {
            Self::Medium
        } else {
            Self::High
        }
    }

    /// Low=0, Medium=1, High=2.
    pub fn rank(self) -> u8 {
        match self {
            Self::Low => 0,
            Self::Medium => 1,
            Self::High => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricsParams {
    pub lower_threshold: f64,
    pub min_cluster_size: usize,
}

impl Default for MetricsParams {
    fn default() -> Self {
        Self {
            lower_threshold: DEFAULT_LOWER_THRESHOLD,
            min_cluster_size: DEFAULT_MIN_CLUSTER_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metrics {
    pub peak_pressure: f64,
    pub peak_pressure_index: f64,
    /// Share of cells at or above the contact threshold, 0-100.
    pub contact_area_percent: f64,
    pub risk_level: RiskLevel,
}

impl Metrics {
    pub fn compute(matrix: &Matrix, params: &MetricsParams) -> Self {
        let threshold = params.lower_threshold;

        let contact_cells = matrix
            .as_slice()
            .iter()
            .filter(|&&v| v >= threshold)
            .count();
        let contact_area_percent = contact_cells as f64 / GRID_CELLS as f64 * 100.0;

        let peak_pressure_index = find_clusters(matrix, threshold)
            .iter()
            .filter(|cluster| cluster.size >= params.min_cluster_size)
            .map(|cluster| cluster.peak)
            .fold(0.0, f64::max);

        Self {
            peak_pressure: matrix.peak(),
            peak_pressure_index,
            contact_area_percent,
            risk_level: RiskLevel::from_ppi(peak_pressure_index),
        }
    }
}

/// A 4-connected region of cells at or above the threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cluster {
    pub size: usize,
    pub peak: f64,
}

/// Breadth-first flood fill over every qualifying cell, in row-major order of
/// the cluster's first cell. Each cell is visited at most once.
pub fn find_clusters(matrix: &Matrix, threshold: f64) -> Vec<Cluster> {
    let cells = matrix.as_slice();
    let qualifies = |index: usize| cells.get(index).is_some_and(|&v| v >= threshold);

    let mut visited = vec![false; cells.len()];
    let mut queue = VecDeque::new();
    let mut clusters = Vec::new();

    for start in 0..cells.len() {
        if !qualifies(start) || !claim(&mut visited, start) {
            continue;
        }

        let mut size = 0;
        let mut peak = 0.0_f64;
        queue.push_back(start);

        while let Some(index) = queue.pop_front() {
            size += 1;
            if let Some(&value) = cells.get(index) {
                peak = peak.max(value);
            }

            for next in neighbors(index) {
                if qualifies(next) && claim(&mut visited, next) {
                    queue.push_back(next);
                }
            }
        }

        clusters.push(Cluster { size, peak });
    }

    clusters
}

/// Marks `index` visited; false if it already was.
fn claim(visited: &mut [bool], index: usize) -> bool {
    match visited.get_mut(index) {
        Some(seen) if !*seen => {
            *seen = true;
            true
        }
        _ => false,
    }
}

fn neighbors(index: usize) -> impl Iterator<Item = usize> {
    let (row, col) = (index / GRID_SIZE, index % GRID_SIZE);
    [
        (row > 0).then(|| index - GRID_SIZE),
        (row + 1 < GRID_SIZE).then(|| index + GRID_SIZE),
        (col > 0).then(|| index - 1),
        (col + 1 < GRID_SIZE).then(|| index + 1),
    ]
    .into_iter()
    .flatten()
}
