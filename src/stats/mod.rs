//! Search statistics: how often each Pokemon's detail view was opened.

mod local;
mod remote;

use std::cmp::Reverse;

use async_trait::async_trait;
use tracing::warn;

pub use local::LocalStatsStore;
pub use remote::RemoteStatsStore;

use crate::config::StatsBackend;
use crate::state::SearchStat;

#[derive(thiserror::Error, Debug)]
pub enum StatsError {
    #[error("stats file: {0}")]
    Io(#[from] std::io::Error),
    #[error("stats data is not valid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("stats request failed: {0}")]
    Request(#[from] reqwest::Error),
}

#[async_trait]
pub trait SearchStatsStore: Send + Sync {
    /// Short name shown in the status bar.
    fn backend(&self) -> &'static str;

    /// Counts one visit; blank names are ignored.
    async fn record(&self, name: &str) -> Result<(), StatsError>;

    /// Most visited first.
    async fn top(&self, limit: usize) -> Result<Vec<SearchStat>, StatsError>;

    /// Most recently visited first.
    async fn recent(&self, limit: usize) -> Result<Vec<SearchStat>, StatsError>;

    async fn clear(&self) -> Result<(), StatsError>;
}

pub fn store_for(backend: StatsBackend) -> Box<dyn SearchStatsStore> {
    match backend {
        StatsBackend::Local { path } => Box::new(LocalStatsStore::new(path)),
        StatsBackend::Remote {
            url,
            api_key,
            fallback_path,
        } => Box::new(FallbackStatsStore::new(
            Box::new(RemoteStatsStore::new(url, api_key)),
            Box::new(LocalStatsStore::new(fallback_path)),
        )),
    }
}

/// Stats keys are trimmed lowercase names.
pub fn normalize(name: &str) -> Option<String> {
    let name = name.trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_lowercase())
    }
}

/// Ties on count go to the most recent, then alphabetical.
pub fn rank_popular(mut stats: Vec<SearchStat>, limit: usize) -> Vec<SearchStat> {
    stats.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then(b.last_searched.cmp(&a.last_searched))
            .then(a.query.cmp(&b.query))
    });
    stats.truncate(limit);
    stats
}

pub fn rank_recent(mut stats: Vec<SearchStat>, limit: usize) -> Vec<SearchStat> {
    stats.sort_by_key(|stat| (Reverse(stat.last_searched), stat.query.clone()));
    stats.truncate(limit);
    stats
}

/// Uses `primary` and falls back to `fallback` whenever a call fails.
pub struct FallbackStatsStore {
    primary: Box<dyn SearchStatsStore>,
    fallback: Box<dyn SearchStatsStore>,
}

impl FallbackStatsStore {
    pub fn new(primary: Box<dyn SearchStatsStore>, fallback: Box<dyn SearchStatsStore>) -> Self {
        Self { primary, fallback }
    }

    fn note_failure(&self, operation: &str, error: &StatsError) {
        warn!(
            backend = self.primary.backend(),
            operation,
            %error,
            "stats backend failed, using local store"
        );
    }
}

#[async_trait]
impl SearchStatsStore for FallbackStatsStore {
    fn backend(&self) -> &'static str {
        self.primary.backend()
    }

    async fn record(&self, name: &str) -> Result<(), StatsError> {
        match self.primary.record(name).await {
            Ok(()) => Ok(()),
            Err(error) => {
                self.note_failure("record", &error);
                self.fallback.record(name).await
            }
        }
    }

    async fn top(&self, limit: usize) -> Result<Vec<SearchStat>, StatsError> {
        match self.primary.top(limit).await {
            Ok(stats) => Ok(stats),
            Err(error) => {
                self.note_failure("top", &error);
                self.fallback.top(limit).await
            }
        }
    }

    async fn recent(&self, limit: usize) -> Result<Vec<SearchStat>, StatsError> {
        match self.primary.recent(limit).await {
            Ok(stats) => Ok(stats),
            Err(error) => {
                self.note_failure("recent", &error);
                self.fallback.recent(limit).await
            }
        }
    }

    async fn clear(&self) -> Result<(), StatsError> {
        let primary = self.primary.clear().await;
        let fallback = self.fallback.clear().await;
        if let Err(error) = &primary {
            self.note_failure("clear", error);
            return fallback;
        }
        primary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn stat(query: &str, count: u32, last_searched: i64) -> SearchStat {
        SearchStat {
            query: query.to_string(),
            count,
            last_searched,
        }
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  Pikachu "), Some("pikachu".to_string()));
        assert_eq!(normalize("   "), None);
    }

    #[test]
    fn test_rank_popular_orders_by_count() {
        let ranked = rank_popular(
            vec![stat("eevee", 2, 10), stat("mew", 5, 1), stat("abra", 2, 30)],
            2,
        );
        let names: Vec<_> = ranked.iter().map(|s| s.query.as_str()).collect();
        assert_eq!(names, vec!["mew", "abra"]);
    }

    #[test]
    fn test_rank_recent_orders_by_time() {
        let ranked = rank_recent(
            vec![stat("eevee", 9, 10), stat("mew", 1, 40), stat("abra", 2, 30)],
            5,
        );
        let names: Vec<_> = ranked.iter().map(|s| s.query.as_str()).collect();
        assert_eq!(names, vec!["mew", "abra", "eevee"]);
    }

    struct Broken;

    #[async_trait]
    impl SearchStatsStore for Broken {
        fn backend(&self) -> &'static str {
            "broken"
        }
        async fn record(&self, _name: &str) -> Result<(), StatsError> {
            Err(std::io::Error::other("down").into())
        }
        async fn top(&self, _limit: usize) -> Result<Vec<SearchStat>, StatsError> {
            Err(std::io::Error::other("down").into())
        }
        async fn recent(&self, _limit: usize) -> Result<Vec<SearchStat>, StatsError> {
            Err(std::io::Error::other("down").into())
        }
        async fn clear(&self) -> Result<(), StatsError> {
            Err(std::io::Error::other("down").into())
        }
    }

    #[tokio::test]
    async fn test_fallback_records_locally() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FallbackStatsStore::new(
            Box::new(Broken),
            Box::new(LocalStatsStore::new(dir.path().join("stats.json"))),
        );

        store.record("Bulbasaur").await.expect("fallback record");
        let top = store.top(10).await.expect("fallback top");

        assert_eq!(top.len(), 1);
        assert_eq!(top[0].query, "bulbasaur");
        assert_eq!(store.backend(), "broken");
    }
}
