// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Parsed-file cache keyed by path and validated by modification time.
//!
//! The map lock is only held to look up or swap an `Arc<CacheEntry>`; reading,
//! parsing and metric computation happen outside of it, so a slow load never
//! blocks queries for other files. Two callers missing on the same path at the
//! same time both load it and the last one to finish wins.

use std::io;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Instant, SystemTime};

use log::{debug, info};
use lru::LruCache;
use serde::Serialize;

use crate::errors::{Error, Result};
use crate::frame::Frame;
use crate::metrics::MetricsParams;
use crate::parser;

pub const DEFAULT_CACHE_CAPACITY: usize = 64;

/// Where pressure files come from. The filesystem in production, stubs in
/// tests.
pub trait FrameSource: Send + Sync {
    fn modified(&self, path: &Path) -> io::Result<SystemTime>;
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FsSource;

impl FrameSource for FsSource {
    fn modified(&self, path: &Path) -> io::Result<SystemTime> {
        std::fs::metadata(path)?.modified()
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }
}

/// Every frame of one file as of `modified`. Never mutated once built.
#[derive(Debug)]
pub struct CacheEntry {
    path: PathBuf,
    modified: SystemTime,
    frames: Vec<Frame>,
}

impl CacheEntry {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn modified(&self) -> SystemTime {
        self.modified
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    loads: AtomicU64,
    evictions: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub loads: u64,
    pub evictions: u64,
    pub entries: usize,
}

pub struct FileCache<S = FsSource> {
    source: S,
    params: MetricsParams,
    entries: Mutex<LruCache<String, Arc<CacheEntry>>>,
    counters: Counters,
}

impl FileCache<FsSource> {
    pub fn new(params: MetricsParams) -> Self {
        Self::with_capacity(params, DEFAULT_CACHE_CAPACITY)
    }

    /// `capacity` of 0 disables eviction.
    pub fn with_capacity(params: MetricsParams, capacity: usize) -> Self {
        Self::with_source(FsSource, params, capacity)
    }
}

impl<S: FrameSource> FileCache<S> {
    pub fn with_source(source: S, params: MetricsParams, capacity: usize) -> Self {
        let entries = NonZeroUsize::new(capacity).map_or_else(LruCache::unbounded, LruCache::new);
        Self {
            source,
            params,
            entries: Mutex::new(entries),
            counters: Counters::default(),
        }
    }

    pub fn params(&self) -> &MetricsParams {
        &self.params
    }

    /// Returns the entry for `path`, loading it if it is absent or if the
    /// file's modification time differs from the cached one.
    pub fn get_or_load(&self, path: &Path) -> Result<Arc<CacheEntry>> {
        let modified = self
            .source
            .modified(path)
            .map_err(|source| not_readable(path, source))?;
        let key = cache_key(path);

        {
            let mut entries = self.entries();
            if let Some(entry) = entries.get(&key)
                && entry.modified == modified
            {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                debug!("cache hit for {}", path.display());
                return Ok(Arc::clone(entry));
            }
        }

        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        let entry = Arc::new(self.load(path, modified)?);

        let displaced = self.entries().push(key.clone(), Arc::clone(&entry));
        if let Some((displaced_key, displaced_entry)) = displaced
            && displaced_key != key
        {
            self.counters.evictions.fetch_add(1, Ordering::Relaxed);
            info!(
                "evicted {} from the frame cache",
                displaced_entry.path.display()
            );
        }

        Ok(entry)
    }

    fn load(&self, path: &Path, modified: SystemTime) -> Result<CacheEntry> {
        let started = Instant::now();
        let bytes = self
            .source
            .read(path)
            .map_err(|source| not_readable(path, source))?;
        let parsed = parser::parse(&String::from_utf8_lossy(&bytes));

        if parsed.malformed_cells > 0 {
            debug!(
                "{}: read {} malformed cell(s) as 0.0",
                path.display(),
                parsed.malformed_cells
            );
        }
        if parsed.dropped_lines > 0 {
            debug!(
                "{}: ignored {} line(s) after the last complete frame",
                path.display(),
                parsed.dropped_lines
            );
        }

        let frames: Vec<Frame> = parsed
            .frames
            .into_iter()
            .map(|matrix| Frame::new(matrix, &self.params))
            .collect();

        self.counters.loads.fetch_add(1, Ordering::Relaxed);
        info!(
            "loaded {} frame(s) from {} in {:?}",
            frames.len(),
            path.display(),
            started.elapsed()
        );

        Ok(CacheEntry {
            path: path.to_path_buf(),
            modified,
            frames,
        })
    }

    /// Drops the entry for `path`. Returns whether one was cached.
    pub fn invalidate(&self, path: &Path) -> bool {
        self.entries().pop(&cache_key(path)).is_some()
    }

    pub fn clear(&self) {
        self.entries().clear();
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            loads: self.counters.loads.load(Ordering::Relaxed),
            evictions: self.counters.evictions.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }

    // Entries are swapped whole, so a panic while the lock was held cannot
    // leave one half-built.
    fn entries(&self) -> MutexGuard<'_, LruCache<String, Arc<CacheEntry>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Paths are compared case-insensitively.
fn cache_key(path: &Path) -> String {
    path.to_string_lossy().to_lowercase()
}

fn not_readable(path: &Path, source: io::Error) -> Error {
    Error::FileNotReadable {
        path: path.to_path_buf(),
        source,
    }
}
