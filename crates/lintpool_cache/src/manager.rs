//! Cache manager for file-level caching.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use lintpool_diagnostic::LintResult;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{CacheEntry, CacheError, CachedLintResult, FileFingerprint};

/// How a cached entry decides that a file is unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStrategy {
    /// Size and modification time.
    #[default]
    Metadata,
    /// BLAKE3 hash of the file content.
    Content,
}

impl CacheStrategy {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "metadata" => Some(Self::Metadata),
            "content" => Some(Self::Content),
            _ => None,
        }
    }
}

/// Manages the lint cache for all files.
pub struct CacheManager {
    /// Cache file location.
    location: PathBuf,
    strategy: CacheStrategy,
    /// In-memory cache entries.
    entries: HashMap<String, CacheEntry>,
}

impl CacheManager {
    /// Creates a new, empty cache manager persisting to `location`.
    pub fn new(location: impl Into<PathBuf>, strategy: CacheStrategy) -> Self {
        Self {
            location: location.into(),
            strategy,
            entries: HashMap::new(),
        }
    }

    /// Creates a cache manager and loads any existing cache file.
    ///
    /// A corrupted file is discarded rather than failing the run.
    pub fn open(location: impl Into<PathBuf>, strategy: CacheStrategy) -> Result<Self, CacheError> {
        let mut manager = Self::new(location, strategy);
        match manager.load() {
            Ok(()) => Ok(manager),
            Err(CacheError::Corrupted(reason)) => {
                debug!("Discarding corrupted cache {}: {}", manager.location.display(), reason);
                manager.clear();
                Ok(manager)
            }
            Err(e) => Err(e),
        }
    }

    fn key(path: &Path) -> String {
        path.to_string_lossy().to_string()
    }

    /// Reads the current fingerprint of `path` under the configured strategy.
    pub fn fingerprint(&self, path: &Path) -> std::io::Result<FileFingerprint> {
        let metadata = fs::metadata(path)?;
        let mtime_ms = metadata
            .modified()
            .ok()
            .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        let content_hash = match self.strategy {
            CacheStrategy::Metadata => String::new(),
            CacheStrategy::Content => {
                let bytes = fs::read(path)?;
                blake3::hash(&bytes).to_hex().to_string()
            }
        };
        Ok(FileFingerprint {
            size: metadata.len(),
            mtime_ms,
            content_hash,
        })
    }

    fn matches(&self, cached: &FileFingerprint, current: &FileFingerprint) -> bool {
        match self.strategy {
            CacheStrategy::Metadata => {
                cached.size == current.size && cached.mtime_ms == current.mtime_ms
            }
            CacheStrategy::Content => cached.content_hash == current.content_hash,
        }
    }

    /// Returns the cached result for `path` if the file and its configuration
    /// are unchanged since it was stored.
    pub fn get_cached_lint_results(
        &self,
        path: &Path,
        config_hash: &str,
    ) -> Option<CachedLintResult> {
        let entry = self.entries.get(&Self::key(path))?;
        if entry.config_hash != config_hash {
            debug!("Cache miss for {}: configuration changed", path.display());
            return None;
        }
        let current = self.fingerprint(path).ok()?;
        if !self.matches(&entry.fingerprint, &current) {
            debug!("Cache miss for {}: file changed", path.display());
            return None;
        }
        Some(entry.result.clone())
    }

    /// Stores `result` for `path`. Paths that no longer exist on disk
    /// (e.g. stdin input) are skipped.
    pub fn set_cached_lint_results(&mut self, path: &Path, config_hash: &str, result: &LintResult) {
        let fingerprint = match self.fingerprint(path) {
            Ok(fingerprint) => fingerprint,
            Err(e) => {
                debug!("Not caching {}: {}", path.display(), e);
                return;
            }
        };
        self.entries.insert(
            Self::key(path),
            CacheEntry::new(
                fingerprint,
                config_hash.to_string(),
                CachedLintResult::from_result(result),
            ),
        );
    }

    /// Drops entries for files that no longer exist, then saves.
    pub fn reconcile(&mut self) -> Result<(), CacheError> {
        let before = self.entries.len();
        self.entries.retain(|key, _| Path::new(key).exists());
        let dropped = before - self.entries.len();
        if dropped > 0 {
            debug!("Dropped {} cache entries for vanished files", dropped);
        }
        self.save()
    }

    /// Clears all cache entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Loads cache from disk.
    pub fn load(&mut self) -> Result<(), CacheError> {
        if !self.location.exists() {
            debug!("No cache file found at {}", self.location.display());
            return Ok(());
        }

        let content = fs::read(&self.location)?;
        let entries: HashMap<String, CacheEntry> =
            rkyv::from_bytes::<_, rkyv::rancor::Error>(&content)
                .map_err(|e| CacheError::corrupted(e.to_string()))?;

        info!("Loaded {} cache entries", entries.len());
        self.entries = entries;

        Ok(())
    }

    /// Saves cache to disk.
    pub fn save(&self) -> Result<(), CacheError> {
        if let Some(parent) = self.location.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let bytes = rkyv::to_bytes::<rkyv::rancor::Error>(&self.entries)
            .map_err(|e| CacheError::serialization(e.to_string()))?;

        fs::write(&self.location, bytes)?;

        info!(
            "Saved {} cache entries to {}",
            self.entries.len(),
            self.location.display()
        );

        Ok(())
    }

    /// Deletes a cache file left over from a run with caching enabled.
    ///
    /// A missing file is fine. A read-only filesystem is fine as long as
    /// the file is confirmed absent. Returns true if a file was removed.
    pub fn remove_stale(location: &Path) -> Result<bool, CacheError> {
        match fs::remove_file(location) {
            Ok(()) => {
                debug!("Deleted stale cache file {}", location.display());
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) if e.kind() == ErrorKind::ReadOnlyFilesystem && !location.exists() => {
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Returns the number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
