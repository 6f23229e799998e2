// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use heatmap::DEFAULT_RANGE_MINUTES;

/// Query pressure-mat recordings. Every command prints JSON.
#[derive(Debug, Parser)]
#[command(name = "heatmap", version)]
pub struct Cli {
    /// YAML config file (defaults to $TRACECARE_HEATMAP_CONFIG, then
    /// /etc/tracecare/heatmap.yaml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Overrides the configured log level
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, PartialEq, Subcommand)]
pub enum Command {
    /// Number of complete frames in the file
    Frames { file: PathBuf },
    /// Raw readings of one frame, as 32 rows
    Frame {
        file: PathBuf,
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        index: i64,
    },
    /// Metrics of one frame
    Metrics {
        file: PathBuf,
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        index: i64,
    },
    /// Peak pressure index per frame
    History {
        file: PathBuf,
        /// Stop after this many frames
        #[arg(long)]
        max_frames: Option<usize>,
    },
    /// Worst risk level from the first frame up to --index
    MaxRisk {
        file: PathBuf,
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        index: i64,
    },
    /// One frame with its metrics and a flat matrix, clamped to the playback
    /// window
    Snapshot {
        file: PathBuf,
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        index: i64,
        #[arg(long, default_value_t = DEFAULT_RANGE_MINUTES)]
        range_minutes: usize,
    },
    /// Dashboard data for a playback position
    Dashboard {
        file: PathBuf,
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        frame: i64,
        #[arg(long, default_value_t = DEFAULT_RANGE_MINUTES)]
        range_minutes: usize,
    },
}
