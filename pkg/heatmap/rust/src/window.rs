// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use serde::Serialize;

/// The mat records one frame per second.
pub const DEFAULT_FRAMES_PER_MINUTE: usize = 60;
pub const DEFAULT_RANGE_MINUTES: usize = 60;

/// Clamps a possibly negative or too large index into `[0, len - 1]`.
/// `None` when there is nothing to clamp into.
pub fn clamp_index(index: i64, len: usize) -> Option<usize> {
    let last = len.checked_sub(1)?;
    let last = i64::try_from(last).unwrap_or(i64::MAX);
    usize::try_from(index.clamp(0, last)).ok()
}

/// The part of a recording the viewer may play back: the first
/// `range_minutes` worth of frames, or fewer if the recording is shorter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlaybackWindow {
    pub total_frames: usize,
    pub requested_frames: usize,
    pub effective_frames: usize,
    #[serde(skip)]
    frames_per_minute: usize,
}

impl PlaybackWindow {
    pub fn new(total_frames: usize, range_minutes: usize, frames_per_minute: usize) -> Self {
        let frames_per_minute = frames_per_minute.max(1);
        let requested_frames = range_minutes.saturating_mul(frames_per_minute);
        Self {
            total_frames,
            requested_frames,
            effective_frames: total_frames.min(requested_frames),
            frames_per_minute,
        }
    }

    pub fn clamp(&self, frame: i64) -> Option<usize> {
        clamp_index(frame, self.effective_frames)
    }

    pub fn available_minutes(&self) -> f64 {
        self.effective_frames as f64 / self.frames_per_minute as f64
    }

    pub fn is_short(&self) -> bool {
        self.effective_frames < self.requested_frames
    }

    pub fn shortfall_warning(&self) -> Option<String> {
        self.is_short().then(|| {
            format!(
                "Only {:.1} minutes of data are available for this date.",
                self.available_minutes()
            )
        })
    }
}
