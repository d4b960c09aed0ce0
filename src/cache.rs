use crate::analysis::FullReport;
use crate::error::AppError;
use crate::model::NormalizedMatch;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::PathBuf;

/// One cached report plus enough metadata to list and prune entries.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedReport {
    pub player: String,
    pub key: String,
    pub created_at: DateTime<Utc>,
    pub report: FullReport,
}

/// JSON report cache keyed by a content hash of the match history. A changed
/// history (or a new engine version) produces a new key, so entries never go
/// stale in place and need no TTL.
pub struct ReportCache {
    dir: PathBuf,
}

impl ReportCache {
    /// Cache under the user's home directory; falls back to the working
    /// directory when no home is available.
    pub fn open() -> Self {
        let dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".league_analytics");
        ReportCache { dir }
    }

    pub fn at(dir: impl Into<PathBuf>) -> Self {
        ReportCache { dir: dir.into() }
    }

    /// Digest of the player, the engine version, and every match id in
    /// order. Match ids are unique and the history is sorted, so this pins
    /// the exact input set.
    pub fn key(puuid: &str, matches: &[NormalizedMatch]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(puuid.as_bytes());
        hasher.update(env!("CARGO_PKG_VERSION").as_bytes());
        for m in matches {
            hasher.update(m.match_id.as_bytes());
        }

        let digest = hasher.finalize();
        let mut key = String::with_capacity(digest.len() * 2);
        for byte in digest {
            key.push_str(&format!("{:02x}", byte));
        }
        key
    }

    pub fn load(&self, key: &str) -> Result<Option<CachedReport>, AppError> {
        let path = self.entry_path(key);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(_) => return Ok(None),
        };

        let cached: CachedReport = serde_json::from_str(&content)
            .map_err(|e| AppError::CacheError(format!("Failed to parse cache entry: {}", e)))?;

        if cached.key != key {
            return Err(AppError::CacheError(format!(
                "Cache entry {} carries mismatched key {}",
                key, cached.key
            )));
        }
        Ok(Some(cached))
    }

    pub fn store(&self, key: &str, player: &str, report: &FullReport) -> Result<PathBuf, AppError> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| AppError::CacheError(format!("Failed to create cache dir: {}", e)))?;

        let entry = CachedReport {
            player: player.to_string(),
            key: key.to_string(),
            created_at: Utc::now(),
            report: report.clone(),
        };
        let json = serde_json::to_string_pretty(&entry)
            .map_err(|e| AppError::CacheError(format!("Failed to serialize report: {}", e)))?;

        let path = self.entry_path(key);
        fs::write(&path, json)
            .map_err(|e| AppError::CacheError(format!("Failed to write cache entry: {}", e)))?;
        Ok(path)
    }

    pub fn clear(&self) -> Result<usize, AppError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(_) => return Ok(0),
        };

        let mut removed = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                fs::remove_file(&path)
                    .map_err(|e| AppError::CacheError(format!("Failed to remove entry: {}", e)))?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Default for ReportCache {
    fn default() -> Self {
        ReportCache::open()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::AnalysisEngine;
    use crate::model::{QueueType, Role};
    use chrono::TimeZone;

    fn stub_match(idx: usize, win: bool) -> NormalizedMatch {
        NormalizedMatch {
            match_id: format!("M{:03}", idx),
            played_at: Utc
                .timestamp_opt(1_700_000_000 + idx as i64 * 3600, 0)
                .unwrap(),
            duration_secs: 1800,
            queue: QueueType::RankedSolo,
            role: Role::Mid,
            champion_id: 103,
            champion_name: "Ahri".to_string(),
            win,
            kills: 5,
            deaths: 3,
            assists: 7,
            cs: 200,
            gold: 11_000,
            damage_to_champions: 20_000,
            vision_score: 40,
            enemy_champions: vec![238, 202, 64, 111, 22],
        }
    }

    #[test]
    fn key_tracks_history_content() {
        let matches: Vec<_> = (0..5).map(|i| stub_match(i, true)).collect();

        let a = ReportCache::key("puuid-1", &matches);
        let b = ReportCache::key("puuid-1", &matches);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);

        let other_player = ReportCache::key("puuid-2", &matches);
        assert_ne!(a, other_player);

        let shorter = ReportCache::key("puuid-1", &matches[..4]);
        assert_ne!(a, shorter);
    }

    #[test]
    fn store_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ReportCache::at(dir.path());

        let matches: Vec<_> = (0..12).map(|i| stub_match(i, i % 2 == 0)).collect();
        let report = AnalysisEngine::default().full_report(&matches).unwrap();
        let key = ReportCache::key("puuid-1", &matches);

        assert!(cache.load(&key).unwrap().is_none());

        cache.store(&key, "Player#EUW", &report).unwrap();
        let cached = cache.load(&key).unwrap().unwrap();
        assert_eq!(cached.player, "Player#EUW");
        assert_eq!(cached.key, key);
        assert_eq!(cached.report.season.games, report.season.games);
        assert_eq!(cached.report.anchor, report.anchor);
    }

    #[test]
    fn clear_removes_entries() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ReportCache::at(dir.path());

        let matches: Vec<_> = (0..10).map(|i| stub_match(i, true)).collect();
        let report = AnalysisEngine::default().full_report(&matches).unwrap();
        cache.store("aaaa", "P1", &report).unwrap();
        cache.store("bbbb", "P2", &report).unwrap();

        assert_eq!(cache.clear().unwrap(), 2);
        assert!(cache.load("aaaa").unwrap().is_none());
        assert_eq!(cache.clear().unwrap(), 0);
    }
}
