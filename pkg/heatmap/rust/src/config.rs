// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use log::LevelFilter;
use serde::Deserialize;

use crate::cache::DEFAULT_CACHE_CAPACITY;
use crate::metrics::{DEFAULT_LOWER_THRESHOLD, DEFAULT_MIN_CLUSTER_SIZE, MetricsParams};
use crate::window::DEFAULT_FRAMES_PER_MINUTE;

const DEFAULT_CONFIG_PATH: &str = "/etc/tracecare/heatmap.yaml";

pub const CONFIG_PATH_ENV: &str = "TRACECARE_HEATMAP_CONFIG";
pub const LOG_LEVEL_ENV: &str = "TRACECARE_LOG_LEVEL";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub lower_threshold: f64,
    pub min_cluster_size: usize,
    /// Maximum number of cached files; 0 keeps every file.
    pub cache_capacity: usize,
    pub frames_per_minute: usize,
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lower_threshold: DEFAULT_LOWER_THRESHOLD,
            min_cluster_size: DEFAULT_MIN_CLUSTER_SIZE,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            frames_per_minute: DEFAULT_FRAMES_PER_MINUTE,
            log_level: "info".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn metrics_params(&self) -> MetricsParams {
        MetricsParams {
            lower_threshold: self.lower_threshold,
            min_cluster_size: self.min_cluster_size,
        }
    }

    fn validate(&self) -> Result<()> {
        if !self.lower_threshold.is_finite() {
            bail!("lower_threshold must be a finite number");
        }
        if self.frames_per_minute == 0 {
            bail!("frames_per_minute must be greater than zero");
        }
        Ok(())
    }
}

/// Config file location: explicit path, then `TRACECARE_HEATMAP_CONFIG`, then
/// the system default.
pub fn config_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Loads and validates the YAML config. Returns `Ok(None)` when the file does
/// not exist so the caller can fall back to defaults.
pub fn load_config(path: &Path) -> Result<Option<EngineConfig>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;

    // An empty document deserializes as unit, not as an empty mapping.
    let config: EngineConfig = if contents.trim().is_empty() {
        EngineConfig::default()
    } else {
        serde_yaml::from_str(&contents).with_context(|| format!("parsing {}", path.display()))?
    };

    config
        .validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(Some(config))
}

/// Resolves the log level: explicit override, then `TRACECARE_LOG_LEVEL`, then
/// the config value. An unknown name is handed back so the caller can report
/// it once logging is up.
pub fn log_level(
    explicit: Option<&str>,
    config: &EngineConfig,
) -> std::result::Result<LevelFilter, String> {
    let env_level = std::env::var(LOG_LEVEL_ENV).ok();
    let name = explicit
        .or(env_level.as_deref())
        .unwrap_or(config.log_level.as_str());
    tracecare_log::parse_level(name).ok_or_else(|| name.to_string())
}
