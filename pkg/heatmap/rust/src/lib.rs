// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Pressure-mat recording analysis.
//!
//! A recording is a text file of 32x32 pressure grids. [`HeatmapEngine`]
//! parses each file once per modification time, computes per-frame
//! [`Metrics`], and answers frame, history and worst-risk queries from the
//! cached result.

// Correctness
#![deny(clippy::indexing_slicing)]
#![deny(clippy::string_slice)]
#![deny(clippy::cast_possible_wrap)]
#![deny(clippy::undocumented_unsafe_blocks)]
// Panicking code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::unimplemented)]
#![deny(clippy::todo)]
// Debug code that shouldn't be in production
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]

pub mod cache;
pub mod config;
mod engine;
mod errors;
mod frame;
pub mod metrics;
pub mod parser;
mod window;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-export the public API
pub use cache::{CacheEntry, CacheStats, FileCache, FrameSource, FsSource};
pub use config::EngineConfig;
pub use engine::{DashboardView, FrameSnapshot, HeatmapEngine, MaxRisk};
pub use errors::{Error, Result};
pub use frame::{Frame, GRID_CELLS, GRID_SIZE, Matrix};
pub use metrics::{Metrics, MetricsParams, RiskLevel};
pub use window::{DEFAULT_FRAMES_PER_MINUTE, DEFAULT_RANGE_MINUTES, PlaybackWindow, clamp_index};
