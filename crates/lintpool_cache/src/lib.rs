//! # lintpool_cache
//!
//! File-entry cache. One entry per linted file, validated either by the
//! file's metadata or by a BLAKE3 hash of its content, plus a hash of the
//! resolved configuration. Entries are persisted to a single rkyv file.

mod entry;
mod error;
mod manager;

pub use entry::{CacheEntry, CachedLintResult, FileFingerprint};
pub use error::CacheError;
pub use manager::{CacheManager, CacheStrategy};
