// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Query entry point used by viewers.
//!
//! Every query goes through the file cache, so repeated queries against an
//! unchanged file never re-read it. Frame indices are signed and clamped into
//! the valid range; single-frame queries on a file without any complete frame
//! fail with [`Error::NoFrames`].

use std::path::Path;

use serde::Serialize;

use crate::cache::{CacheEntry, FileCache, FsSource, FrameSource};
use crate::config::EngineConfig;
use crate::errors::{Error, Result};
use crate::frame::{Frame, Matrix};
use crate::metrics::{Metrics, RiskLevel};
use crate::window::{PlaybackWindow, clamp_index};

/// Worst risk observed from the first frame up to a given frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MaxRisk {
    pub risk_level: RiskLevel,
    /// Earliest frame at which `risk_level` was reached.
    pub frame_index: usize,
    pub metrics: Metrics,
}

/// One frame as the viewer consumes it: metrics plus the flat grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameSnapshot {
    pub frame_index: usize,
    pub peak_pressure: f64,
    pub peak_pressure_index: f64,
    pub contact_area_percent: f64,
    pub risk_level: RiskLevel,
    /// 1024 readings, row-major.
    pub matrix: Vec<f64>,
}

/// Everything the dashboard shows for one playback position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub frame_index: usize,
    /// Frames inside the playback window.
    pub total_frames: usize,
    pub metrics: Metrics,
    /// Worst risk seen so far in the recording, not just in this frame.
    pub risk_level: RiskLevel,
    pub risk_frame_index: usize,
    pub peak_history: Vec<f64>,
    pub frame_warning: Option<String>,
}

pub struct HeatmapEngine<S = FsSource> {
    cache: FileCache<S>,
    frames_per_minute: usize,
}

impl HeatmapEngine<FsSource> {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::with_cache(
            FileCache::with_capacity(config.metrics_params(), config.cache_capacity),
            config.frames_per_minute,
        )
    }
}

impl<S: FrameSource> HeatmapEngine<S> {
    pub fn with_cache(cache: FileCache<S>, frames_per_minute: usize) -> Self {
        Self {
            cache,
            frames_per_minute,
        }
    }

    pub fn cache(&self) -> &FileCache<S> {
        &self.cache
    }

    pub fn total_frames(&self, path: &Path) -> Result<usize> {
        Ok(self.cache.get_or_load(path)?.frame_count())
    }

    pub fn load_frame(&self, path: &Path, index: i64) -> Result<Matrix> {
        let entry = self.cache.get_or_load(path)?;
        let (_, frame) = clamped_frame(&entry, index)?;
        Ok(frame.matrix().clone())
    }

    pub fn frame_metrics(&self, path: &Path, index: i64) -> Result<Metrics> {
        let entry = self.cache.get_or_load(path)?;
        let (_, frame) = clamped_frame(&entry, index)?;
        Ok(*frame.metrics())
    }

    /// Peak pressure index of the first `max_frames` frames, in order.
    pub fn peak_history(&self, path: &Path, max_frames: usize) -> Result<Vec<f64>> {
        let entry = self.cache.get_or_load(path)?;
        Ok(peak_history(&entry, max_frames))
    }

    /// Scans frames `0..=index` (clamped) for the highest risk level. Ties keep
    /// the earliest frame and the scan stops at the first `High`.
    pub fn max_risk_up_to_frame(&self, path: &Path, index: i64) -> Result<MaxRisk> {
        let entry = self.cache.get_or_load(path)?;
        let (last, _) = clamped_frame(&entry, index)?;
        max_risk_up_to(&entry, last).ok_or_else(|| no_frames(&entry))
    }

    /// One frame for the viewer. `index` is clamped into the same playback
    /// window `dashboard` uses, so both agree on the frame shown.
    pub fn snapshot(&self, path: &Path, index: i64, range_minutes: usize) -> Result<FrameSnapshot> {
        let entry = self.cache.get_or_load(path)?;
        let window = self.window(&entry, range_minutes);
        let frame_index = window.clamp(index).ok_or_else(|| no_frames(&entry))?;
        let frame = entry.frame(frame_index).ok_or_else(|| no_frames(&entry))?;
        let metrics = frame.metrics();

        Ok(FrameSnapshot {
            frame_index,
            peak_pressure: metrics.peak_pressure,
            peak_pressure_index: metrics.peak_pressure_index,
            contact_area_percent: metrics.contact_area_percent,
            risk_level: metrics.risk_level,
            matrix: frame.matrix().as_slice().to_vec(),
        })
    }

    /// Builds the dashboard for `frame` within the first `range_minutes` of the
    /// recording. All values come from the same cache entry.
    pub fn dashboard(&self, path: &Path, frame: i64, range_minutes: usize) -> Result<DashboardView> {
        let entry = self.cache.get_or_load(path)?;
        let window = self.window(&entry, range_minutes);

        let frame_index = window.clamp(frame).ok_or_else(|| no_frames(&entry))?;
        let metrics = *entry
            .frame(frame_index)
            .ok_or_else(|| no_frames(&entry))?
            .metrics();
        let worst = max_risk_up_to(&entry, frame_index).ok_or_else(|| no_frames(&entry))?;

        Ok(DashboardView {
            frame_index,
            total_frames: window.effective_frames,
            metrics,
            risk_level: worst.risk_level,
            risk_frame_index: worst.frame_index,
            peak_history: peak_history(&entry, window.effective_frames),
            frame_warning: window.shortfall_warning(),
        })
    }

    fn window(&self, entry: &CacheEntry, range_minutes: usize) -> PlaybackWindow {
        PlaybackWindow::new(entry.frame_count(), range_minutes, self.frames_per_minute)
    }
}

fn clamped_frame(entry: &CacheEntry, index: i64) -> Result<(usize, &Frame)> {
    let index = clamp_index(index, entry.frame_count()).ok_or_else(|| no_frames(entry))?;
    let frame = entry.frame(index).ok_or_else(|| no_frames(entry))?;
    Ok((index, frame))
}

fn peak_history(entry: &CacheEntry, max_frames: usize) -> Vec<f64> {
    entry
        .frames()
        .iter()
        .take(max_frames)
        .map(|frame| frame.metrics().peak_pressure_index)
        .collect()
}

fn max_risk_up_to(entry: &CacheEntry, last: usize) -> Option<MaxRisk> {
    worst_risk(
        entry
            .frames()
            .iter()
            .take(last.saturating_add(1))
            .map(Frame::metrics),
    )
}

/// First occurrence of the highest risk level in `metrics`. Stops consuming
/// the iterator once `High` is seen.
fn worst_risk<'a>(metrics: impl IntoIterator<Item = &'a Metrics>) -> Option<MaxRisk> {
    let mut worst: Option<MaxRisk> = None;

    for (frame_index, frame_metrics) in metrics.into_iter().enumerate() {
        if worst.is_none_or(|w| frame_metrics.risk_level > w.risk_level) {
            worst = Some(MaxRisk {
                risk_level: frame_metrics.risk_level,
                frame_index,
                metrics: *frame_metrics,
            });
            if frame_metrics.risk_level == RiskLevel::High {
                break;
            }
        }
    }

    worst
}

fn no_frames(entry: &CacheEntry) -> Error {
    Error::NoFrames {
        path: entry.path().to_path_buf(),
    }
}
