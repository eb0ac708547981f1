use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{normalize, rank_popular, rank_recent, SearchStatsStore, StatsError};
use crate::state::SearchStat;

type StatsMap = BTreeMap<String, SearchStat>;

/// JSON file keyed by normalized name. Writes are serialized through a lock
/// so concurrent records never lose a count.
pub struct LocalStatsStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl LocalStatsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `record` with an explicit timestamp in unix milliseconds.
    pub async fn record_at(&self, name: &str, at: i64) -> Result<(), StatsError> {
        let Some(query) = normalize(name) else {
            return Ok(());
        };
        let _guard = self.lock.lock().await;
        let mut stats = self.load().await?;
        let entry = stats.entry(query.clone()).or_insert(SearchStat {
            query,
            count: 0,
            last_searched: at,
        });
        entry.count += 1;
        entry.last_searched = at;
        self.store(&stats).await
    }

    async fn load(&self) -> Result<StatsMap, StatsError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(json) if json.trim().is_empty() => Ok(StatsMap::new()),
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(StatsMap::new()),
            Err(error) => Err(error.into()),
        }
    }

    async fn store(&self, stats: &StatsMap) -> Result<(), StatsError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(stats)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }

    async fn snapshot(&self) -> Result<Vec<SearchStat>, StatsError> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.into_values().collect())
    }
}

#[async_trait]
impl SearchStatsStore for LocalStatsStore {
    fn backend(&self) -> &'static str {
        "local"
    }

    async fn record(&self, name: &str) -> Result<(), StatsError> {
        self.record_at(name, chrono::Utc::now().timestamp_millis())
            .await
    }

    async fn top(&self, limit: usize) -> Result<Vec<SearchStat>, StatsError> {
        Ok(rank_popular(self.snapshot().await?, limit))
    }

    async fn recent(&self, limit: usize) -> Result<Vec<SearchStat>, StatsError> {
        Ok(rank_recent(self.snapshot().await?, limit))
    }

    async fn clear(&self) -> Result<(), StatsError> {
        let _guard = self.lock.lock().await;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn store_in(dir: &tempfile::TempDir) -> LocalStatsStore {
        LocalStatsStore::new(dir.path().join("nested").join("search-stats.json"))
    }

    #[tokio::test]
    async fn test_record_creates_then_increments() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);

        store.record_at("Pikachu", 100).await.expect("record");
        store.record_at(" pikachu ", 250).await.expect("record");

        let top = store.top(10).await.expect("top");
        assert_eq!(
            top,
            vec![SearchStat {
                query: "pikachu".into(),
                count: 2,
                last_searched: 250,
            }]
        );
    }

    #[tokio::test]
    async fn test_blank_name_is_ignored() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);

        store.record_at("   ", 1).await.expect("record");
        assert!(store.top(10).await.expect("top").is_empty());
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_stats_survive_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        store_in(&dir).record_at("mew", 1).await.expect("record");
        store_in(&dir).record_at("eevee", 2).await.expect("record");
        store_in(&dir).record_at("eevee", 3).await.expect("record");

        let reopened = store_in(&dir);
        let top: Vec<_> = reopened
            .top(10)
            .await
            .expect("top")
            .into_iter()
            .map(|stat| (stat.query, stat.count))
            .collect();
        assert_eq!(top, vec![("eevee".to_string(), 2), ("mew".to_string(), 1)]);

        let recent = reopened.recent(1).await.expect("recent");
        assert_eq!(recent[0].query, "eevee");
    }

    #[tokio::test]
    async fn test_file_uses_camel_case_timestamp() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        store.record_at("abra", 42).await.expect("record");

        let json = std::fs::read_to_string(store.path()).expect("stats file");
        assert!(json.contains("\"lastSearched\": 42"), "{json}");
    }

    #[tokio::test]
    async fn test_clear_removes_everything() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        store.record_at("abra", 1).await.expect("record");

        store.clear().await.expect("clear");
        store.clear().await.expect("clear twice");
        assert!(store.recent(5).await.expect("recent").is_empty());
    }
}
