//! On-disk message store with time-based expiration.
//!
//! Layout under the cache root:
//!
//! ```text
//! <root>/entries/<fingerprint>.json   one CacheEntry per file
//! <root>/index.json                   fingerprint -> metadata, for stats
//! ```
//!
//! Entries are immutable once written; regenerating under the same
//! fingerprint overwrites the file. Failures on the hot path (lookup/store)
//! never propagate: a broken entry is a miss, a failed write means the
//! message simply is not cached this time. Only the explicit maintenance
//! operations (`stats`, `clear`) report errors.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cache::Fingerprint;
use crate::error::CacheError;

/// Maximum entry age, in hours, before lookup treats it as absent.
pub const TTL_HOURS: i64 = 24;

/// Maximum entry age before lookup treats it as absent.
pub fn ttl() -> Duration {
    Duration::hours(TTL_HOURS)
}

/// A cached generation result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub fingerprint: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub preset: String,
    pub diff_size: usize,
}

/// Per-entry metadata kept in the index file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexRecord {
    preset: String,
    created_at: DateTime<Utc>,
    diff_size: usize,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheIndex {
    entries: BTreeMap<String, IndexRecord>,
}

/// Aggregate view over the stored entries.
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub entries: usize,
    pub total_size_bytes: u64,
    pub oldest: Option<DateTime<Utc>>,
    pub newest: Option<DateTime<Utc>>,
    /// Entry count per preset/settings identifier.
    pub presets: BTreeMap<String, usize>,
}

/// Handle to the on-disk cache. Passed explicitly to the driver.
pub struct MessageCache {
    root: PathBuf,
    entries_dir: PathBuf,
    index_path: PathBuf,
}

impl MessageCache {
    /// Open (creating if needed) a cache rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let root = root.into();
        let entries_dir = root.join("entries");
        std::fs::create_dir_all(&entries_dir).map_err(|e| CacheError::CreateDir {
            path: entries_dir.display().to_string(),
            source: e,
        })?;

        Ok(MessageCache {
            index_path: root.join("index.json"),
            entries_dir,
            root,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn entries_dir(&self) -> &Path {
        &self.entries_dir
    }

    fn entry_path(&self, fingerprint: &Fingerprint) -> PathBuf {
        self.entries_dir.join(format!("{fingerprint}.json"))
    }

    /// Look up a previously generated message.
    ///
    /// Expired entries are treated as absent but left on disk for `clear` to
    /// collect. Corrupt or unreadable entries degrade to a miss.
    pub fn lookup(&self, fingerprint: &Fingerprint) -> Option<String> {
        let path = self.entry_path(fingerprint);

        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Unreadable cache entry {}: {e}", path.display());
                return None;
            }
        };

        let entry: CacheEntry = match serde_json::from_str(&content) {
            Ok(e) => e,
            Err(e) => {
                warn!("Corrupt cache entry {}: {e}", path.display());
                return None;
            }
        };

        if Utc::now() - entry.created_at >= ttl() {
            debug!("Cache entry {fingerprint} expired");
            return None;
        }

        Some(entry.message)
    }

    /// Write an entry, superseding any previous one with the same fingerprint.
    ///
    /// Failures are logged and swallowed: a message that cannot be cached is
    /// still a perfectly good message.
    pub fn store(&self, fingerprint: &Fingerprint, message: &str, preset: &str, diff_size: usize) {
        let entry = CacheEntry {
            fingerprint: fingerprint.to_string(),
            message: message.to_string(),
            created_at: Utc::now(),
            preset: preset.to_string(),
            diff_size,
        };

        let json = match serde_json::to_string_pretty(&entry) {
            Ok(j) => j,
            Err(e) => {
                warn!("Could not serialize cache entry: {e}");
                return;
            }
        };

        let path = self.entry_path(fingerprint);
        if let Err(e) = std::fs::write(&path, json) {
            warn!("Could not write cache entry {}: {e}", path.display());
            return;
        }

        let mut index = self.load_index();
        index.entries.insert(
            entry.fingerprint,
            IndexRecord {
                preset: entry.preset,
                created_at: entry.created_at,
                diff_size: entry.diff_size,
            },
        );
        if let Err(e) = self.write_index(&index) {
            warn!("Could not update cache index: {e}");
        }
    }

    /// Aggregate stats over the stored entries.
    ///
    /// Counts and sizes come from the entry files themselves; the preset
    /// breakdown comes from the index. Corrupt entries are counted by size
    /// but contribute no timestamps.
    pub fn stats(&self) -> Result<CacheStats, CacheError> {
        let mut entries = 0usize;
        let mut total_size_bytes = 0u64;
        let mut oldest: Option<DateTime<Utc>> = None;
        let mut newest: Option<DateTime<Utc>> = None;

        for path in self.entry_files()? {
            entries += 1;
            if let Ok(meta) = std::fs::metadata(&path) {
                total_size_bytes += meta.len();
            }
            if let Some(entry) = read_entry(&path) {
                oldest = Some(oldest.map_or(entry.created_at, |o| o.min(entry.created_at)));
                newest = Some(newest.map_or(entry.created_at, |n| n.max(entry.created_at)));
            }
        }

        let mut presets: BTreeMap<String, usize> = BTreeMap::new();
        for record in self.load_index().entries.values() {
            *presets.entry(record.preset.clone()).or_default() += 1;
        }

        Ok(CacheStats {
            entries,
            total_size_bytes,
            oldest,
            newest,
            presets,
        })
    }

    /// Delete entries older than `older_than`; `None` deletes everything.
    ///
    /// Corrupt entries are always deleted. Returns the number of entries
    /// removed.
    pub fn clear(&self, older_than: Option<Duration>) -> Result<usize, CacheError> {
        let cutoff = older_than.map(|age| Utc::now() - age);
        let mut removed = 0usize;
        let mut index = self.load_index();

        for path in self.entry_files()? {
            let delete = match (read_entry(&path), cutoff) {
                (Some(entry), Some(cutoff)) => entry.created_at < cutoff,
                (Some(_), None) => true,
                // Unreadable entries would never hit on lookup; reclaim them.
                (None, _) => true,
            };

            if !delete {
                continue;
            }

            std::fs::remove_file(&path).map_err(|e| CacheError::DeleteEntry {
                path: path.display().to_string(),
                source: e,
            })?;
            removed += 1;

            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                index.entries.remove(stem);
            }
        }

        if let Err(e) = self.write_index(&index) {
            warn!("Could not update cache index after clear: {e}");
        }

        Ok(removed)
    }

    /// Paths of all entry files currently on disk.
    fn entry_files(&self) -> Result<Vec<PathBuf>, CacheError> {
        let read_dir =
            std::fs::read_dir(&self.entries_dir).map_err(|e| CacheError::ReadDir {
                path: self.entries_dir.display().to_string(),
                source: e,
            })?;

        let mut paths: Vec<PathBuf> = read_dir
            .filter_map(|res| res.ok())
            .map(|dirent| dirent.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();
        Ok(paths)
    }

    /// Load the metadata index; a missing or corrupt index is an empty one.
    fn load_index(&self) -> CacheIndex {
        match std::fs::read_to_string(&self.index_path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!("Corrupt cache index, rebuilding: {e}");
                CacheIndex::default()
            }),
            Err(_) => CacheIndex::default(),
        }
    }

    /// Rewrite the index atomically: write to a temp file in the cache root,
    /// then persist over the old index.
    fn write_index(&self, index: &CacheIndex) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(index)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&self.root)?;
        tmp.write_all(json.as_bytes())?;
        tmp.persist(&self.index_path).map_err(|e| e.error)?;
        Ok(())
    }
}

fn read_entry(path: &Path) -> Option<CacheEntry> {
    let content = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
}
