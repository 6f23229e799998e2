// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

// Correctness
#![deny(clippy::indexing_slicing)]
#![deny(clippy::string_slice)]
#![deny(clippy::cast_possible_wrap)]
// Panicking code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
// Debug code that shouldn't be in production
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]

use std::io::Write;

use anyhow::{Context, Result};
use clap::Parser;
use heatmap::config;
use heatmap::{FrameSource, HeatmapEngine};
use log::{LevelFilter, debug, info, warn};
use serde_json::Value;
use tracecare_log::LogConfig;

mod cli;

use cli::{Cli, Command};

fn execute<S: FrameSource>(engine: &HeatmapEngine<S>, command: &Command) -> Result<Value> {
    let value = match command {
        Command::Frames { file } => serde_json::to_value(engine.total_frames(file)?)?,
        Command::Frame { file, index } => serde_json::to_value(engine.load_frame(file, *index)?)?,
        Command::Metrics { file, index } => {
            serde_json::to_value(engine.frame_metrics(file, *index)?)?
        }
        Command::History { file, max_frames } => serde_json::to_value(
            engine.peak_history(file, max_frames.unwrap_or(usize::MAX))?,
        )?,
        Command::MaxRisk { file, index } => {
            serde_json::to_value(engine.max_risk_up_to_frame(file, *index)?)?
        }
        Command::Snapshot {
            file,
            index,
            range_minutes,
        } => serde_json::to_value(engine.snapshot(file, *index, *range_minutes)?)?,
        Command::Dashboard {
            file,
            frame,
            range_minutes,
        } => serde_json::to_value(engine.dashboard(file, *frame, *range_minutes)?)?,
    };
    Ok(value)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = config::config_path(cli.config.clone());
    let loaded = config::load_config(&config_path)?;
    let config = loaded.clone().unwrap_or_default();

    let level = config::log_level(cli.log_level.as_deref(), &config);
    tracecare_log::init(LogConfig {
        level: level.as_ref().copied().unwrap_or(LevelFilter::Info),
        ..LogConfig::default()
    })?;

    if let Err(name) = &level {
        warn!("Unknown log level {name:?}, falling back to info");
    }

    if loaded.is_none() {
        warn!(
            "Config file not found at {}. Using defaults.",
            config_path.display()
        );
    } else {
        info!("Loaded config from {}", config_path.display());
    }
    debug!("{config:?}");

    let engine = HeatmapEngine::from_config(&config);
    let value = execute(&engine, &cli.command)?;

    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &value).context("writing result")?;
    writeln!(stdout).context("writing result")?;
    Ok(())
}
