// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Process-wide `log` backend writing lines in the agent log layout:
//!
//! ```text
//! 2026-01-02 15:04:05 UTC | HEATMAP | INFO | (src/cache.rs:42 in heatmap::cache) | message
//! ```

// Panicking code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
// Debug code that shouldn't be in production
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Mutex;

use log::{LevelFilter, Log, Metadata, Record};
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

#[derive(Error, Debug)]
pub enum InitError {
    #[error("could not open log file {}: {source}", .path.display())]
    OpenLogFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("a logger is already installed")]
    AlreadyInstalled(#[from] log::SetLoggerError),
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Short component name shown in the second column.
    pub logger_name: String,
    pub level: LevelFilter,
    /// Optional file the lines are appended to, in addition to stderr.
    pub log_file: Option<PathBuf>,
    pub to_stderr: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            logger_name: "HEATMAP".to_string(),
            level: LevelFilter::Info,
            log_file: None,
            to_stderr: true,
        }
    }
}

pub struct Logger {
    name: String,
    level: LevelFilter,
    file: Option<Mutex<File>>,
    to_stderr: bool,
}

impl Logger {
    pub fn new(config: LogConfig) -> Result<Self, InitError> {
        let file = match config.log_file {
            Some(path) => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&path)
                    .map_err(|source| InitError::OpenLogFile { path, source })?;
                Some(Mutex::new(file))
            }
            None => None,
        };

        Ok(Self {
            name: config.logger_name.to_uppercase(),
            level: config.level,
            file,
            to_stderr: config.to_stderr,
        })
    }

    pub fn level(&self) -> LevelFilter {
        self.level
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = format_line(OffsetDateTime::now_utc(), &self.name, record);

        if self.to_stderr {
            // Nothing sensible to do if stderr is gone.
            let _ = writeln!(io::stderr().lock(), "{line}");
        }
        if let Some(file) = &self.file
            && let Ok(mut file) = file.lock()
        {
            let _ = writeln!(file, "{line}");
        }
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
        if let Some(file) = &self.file
            && let Ok(mut file) = file.lock()
        {
            let _ = file.flush();
        }
    }
}

/// Formats one record. The timestamp falls back to unix seconds if it cannot
/// be rendered.
pub fn format_line(now: OffsetDateTime, logger_name: &str, record: &Record) -> String {
    let timestamp = now
        .format(TIMESTAMP_FORMAT)
        .unwrap_or_else(|_| now.unix_timestamp().to_string());

    let file = record.file().unwrap_or("<unknown>");
    let location = match record.line() {
        Some(line) => format!("{file}:{line}"),
        None => file.to_string(),
    };
    let module = record.module_path().unwrap_or("<unknown>");

    format!(
        "{timestamp} UTC | {logger_name} | {} | ({location} in {module}) | {}",
        record.level(),
        record.args()
    )
}

/// Parses a level name the way agent configuration spells them. Accepts the
/// `log` crate names plus `warning` and `critical`.
pub fn parse_level(value: &str) -> Option<LevelFilter> {
    match value.trim().to_lowercase().as_str() {
        "warning" => Some(LevelFilter::Warn),
        "critical" => Some(LevelFilter::Error),
        other => LevelFilter::from_str(other).ok(),
    }
}

/// Installs the logger for the whole process. Fails if a logger has already
/// been installed.
pub fn init(config: LogConfig) -> Result<(), InitError> {
    let logger = Logger::new(config)?;
    let level = logger.level();
    log::set_boxed_logger(Box::new(logger))?;
    log::set_max_level(level);
    Ok(())
}
