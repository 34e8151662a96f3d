use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempo_core::{CacheEntry, ReportCache};
use tracing::warn;

pub fn tempo_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("TEMPO_HOME") {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".tempo"))
}

pub fn ensure_tempo_home() -> Result<PathBuf> {
    let dir = tempo_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn tasks_path() -> Result<PathBuf> {
    Ok(ensure_tempo_home()?.join("tasks.json"))
}

pub fn insights_cache_path() -> Result<PathBuf> {
    Ok(ensure_tempo_home()?.join("insights-cache.json"))
}

/// JSON-file backed cache of insight texts, keyed by cache key.
///
/// The whole file is rewritten on every store. An unreadable file is treated as
/// empty so a corrupt cache never blocks a report.
pub struct FileCache {
    path: PathBuf,
    entries: BTreeMap<String, CacheEntry<String>>,
}

impl FileCache {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let s = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
            serde_json::from_str(&s).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "discarding unreadable insights cache");
                BTreeMap::new()
            })
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
        }
        let s = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, s).with_context(|| format!("write {}", self.path.display()))?;
        Ok(())
    }
}

impl ReportCache<String> for FileCache {
    fn load(&self, key: &str) -> Option<CacheEntry<String>> {
        self.entries.get(key).cloned()
    }

    fn store(&mut self, key: &str, entry: CacheEntry<String>) -> Result<()> {
        self.entries.insert(key.to_string(), entry);
        self.flush()
    }

    fn evict(&mut self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use tempo_core::{cached_or_compute, CachePolicy};

    #[test]
    fn entries_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache").join("insights-cache.json");
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();

        let mut cache = FileCache::open(&path).unwrap();
        let (v, hit) = cached_or_compute(&mut cache, "insights:gemini", "fp", CachePolicy::default(), now, || {
            Ok("Keep mornings for deep work.".to_string())
        })
        .unwrap();
        assert!(!hit);
        assert!(path.exists());

        let mut reopened = FileCache::open(&path).unwrap();
        let (again, hit) = cached_or_compute(
            &mut reopened,
            "insights:gemini",
            "fp",
            CachePolicy::default(),
            now + Duration::hours(2),
            || Ok("unused".to_string()),
        )
        .unwrap();
        assert!(hit);
        assert_eq!(again, v);

        reopened.evict("insights:gemini").unwrap();
        assert!(FileCache::open(&path).unwrap().load("insights:gemini").is_none());
    }

    #[test]
    fn corrupt_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("insights-cache.json");
        fs::write(&path, "{ not json").unwrap();
        let cache = FileCache::open(&path).unwrap();
        assert!(cache.load("anything").is_none());
        assert_eq!(cache.path(), path.as_path());
    }
}
