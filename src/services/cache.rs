use crate::error::{AppError, Result};
use crate::models::PriceSeries;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// One cached fetch: the full series plus the moment it was fetched.
/// Overwritten whole on every successful re-fetch, never partially mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub series: PriceSeries,
    pub fetched_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Freshness is a wall-clock difference in seconds, so validity is
    /// correct across midnight boundaries.
    pub fn is_fresh(&self, now: DateTime<Utc>, window_secs: i64) -> bool {
        (now - self.fetched_at).num_seconds() < window_secs
    }
}

/// Persistent ticker -> (series, fetch timestamp) map. The only persisted
/// state in the system: loaded at start, saved after the scan loop and
/// before any externally-fallible step.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PriceCache {
    entries: HashMap<String, CacheEntry>,
}

impl PriceCache {
    /// Load the cache from disk. A missing or corrupt file yields an empty
    /// cache; a cold cache is a valid starting state, never an error.
    pub fn load(path: &Path) -> Self {
        let data = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) => {
                info!(path = %path.display(), error = %e, "No usable cache file, starting cold");
                return Self::default();
            }
        };

        match serde_json::from_str::<Self>(&data) {
            Ok(cache) => {
                info!(path = %path.display(), entries = cache.len(), "Loaded price cache");
                cache
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Cache file is corrupt, starting cold");
                Self::default()
            }
        }
    }

    /// Save the cache atomically (write temp, then rename) so an
    /// interrupted run never leaves a torn file behind.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string(self)?;

        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, json)
            .map_err(|e| AppError::Io(format!("Failed to write cache temp file: {}", e)))?;
        fs::rename(&temp_path, path)
            .map_err(|e| AppError::Io(format!("Failed to rename cache temp file: {}", e)))?;

        info!(path = %path.display(), entries = self.len(), "Saved price cache");
        Ok(())
    }

    pub fn get(&self, code: &str) -> Option<&CacheEntry> {
        self.entries.get(code)
    }

    /// Unconditional overwrite
    pub fn put(&mut self, code: &str, series: PriceSeries, fetched_at: DateTime<Utc>) {
        self.entries
            .insert(code.to_string(), CacheEntry { series, fetched_at });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &CacheEntry)> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Bar;
    use chrono::{Duration, NaiveDate, TimeZone};

    fn sample_series() -> PriceSeries {
        vec![
            Bar::new(
                NaiveDate::from_ymd_opt(2026, 8, 20).unwrap(),
                100.0,
                105.0,
                99.0,
                104.0,
                12_000,
            ),
            Bar::new(
                NaiveDate::from_ymd_opt(2026, 8, 21).unwrap(),
                104.0,
                110.0,
                103.0,
                109.5,
                15_000,
            ),
        ]
    }

    #[test]
    fn test_freshness_window_boundaries() {
        let fetched_at = Utc.with_ymd_and_hms(2026, 8, 21, 23, 30, 0).unwrap();
        let entry = CacheEntry {
            series: sample_series(),
            fetched_at,
        };

        // Fresh one second inside the window, stale one second outside,
        // even though the later check crosses midnight.
        assert!(entry.is_fresh(fetched_at + Duration::seconds(3599), 3600));
        assert!(!entry.is_fresh(fetched_at + Duration::seconds(3601), 3600));
    }

    #[test]
    fn test_put_overwrites_existing_entry() {
        let mut cache = PriceCache::default();
        let t0 = Utc.with_ymd_and_hms(2026, 8, 21, 9, 0, 0).unwrap();
        let t1 = t0 + Duration::hours(2);

        cache.put("7203.T", sample_series(), t0);
        cache.put("7203.T", sample_series()[..1].to_vec(), t1);

        assert_eq!(cache.len(), 1);
        let entry = cache.get("7203.T").unwrap();
        assert_eq!(entry.fetched_at, t1);
        assert_eq!(entry.series.len(), 1);
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");

        let mut cache = PriceCache::default();
        let t0 = Utc.with_ymd_and_hms(2026, 8, 21, 9, 0, 0).unwrap();
        cache.put("7203.T", sample_series(), t0);
        cache.put("6758.T", sample_series(), t0 + Duration::minutes(5));
        cache.save(&path).unwrap();

        let loaded = PriceCache::load(&path);
        assert_eq!(loaded.len(), 2);
        for (code, entry) in cache.iter() {
            let restored = loaded.get(code).unwrap();
            assert_eq!(restored.series, entry.series);
            assert_eq!(restored.fetched_at, entry.fetched_at);
        }
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PriceCache::load(&dir.path().join("does_not_exist.json"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_load_corrupt_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, "{not valid json").unwrap();

        let cache = PriceCache::load(&path);
        assert!(cache.is_empty());
    }
}
