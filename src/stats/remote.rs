use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::{normalize, SearchStatsStore, StatsError};
use crate::state::SearchStat;

const TABLE: &str = "search_history";

/// One row of the hosted `search_history` table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct SearchRow {
    pokemon_name: String,
    search_count: u32,
    last_searched_at: String,
}

impl SearchRow {
    fn into_stat(self) -> SearchStat {
        let last_searched = DateTime::parse_from_rfc3339(&self.last_searched_at)
            .map(|at| at.timestamp_millis())
            .unwrap_or_default();
        SearchStat {
            query: self.pokemon_name,
            count: self.search_count,
            last_searched,
        }
    }
}

fn http_client() -> &'static reqwest::Client {
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new())
    })
}

/// Key-count table behind a PostgREST endpoint (e.g. a Supabase project).
pub struct RemoteStatsStore {
    base_url: String,
    api_key: String,
}

impl RemoteStatsStore {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{TABLE}", self.base_url)
    }

    fn request(&self, method: reqwest::Method) -> reqwest::RequestBuilder {
        http_client()
            .request(method, self.table_url())
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn rows(&self, order: &str, limit: usize) -> Result<Vec<SearchStat>, StatsError> {
        let rows: Vec<SearchRow> = self
            .request(reqwest::Method::GET)
            .query(&[
                ("select", "pokemon_name,search_count,last_searched_at".to_string()),
                ("order", order.to_string()),
                ("limit", limit.to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(rows.into_iter().map(SearchRow::into_stat).collect())
    }

    async fn find(&self, name: &str) -> Result<Option<SearchRow>, StatsError> {
        let rows: Vec<SearchRow> = self
            .request(reqwest::Method::GET)
            .query(&[("select", "*".to_string()), ("pokemon_name", format!("eq.{name}"))])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(rows.into_iter().next())
    }
}

fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[async_trait]
impl SearchStatsStore for RemoteStatsStore {
    fn backend(&self) -> &'static str {
        "remote"
    }

    async fn record(&self, name: &str) -> Result<(), StatsError> {
        let Some(name) = normalize(name) else {
            return Ok(());
        };
        let now = timestamp_now();
        match self.find(&name).await? {
            Some(existing) => {
                self.request(reqwest::Method::PATCH)
                    .query(&[("pokemon_name", format!("eq.{name}"))])
                    .json(&serde_json::json!({
                        "search_count": existing.search_count + 1,
                        "last_searched_at": now,
                    }))
                    .send()
                    .await?
                    .error_for_status()?;
            }
            None => {
                self.request(reqwest::Method::POST)
                    .json(&SearchRow {
                        pokemon_name: name,
                        search_count: 1,
                        last_searched_at: now,
                    })
                    .send()
                    .await?
                    .error_for_status()?;
            }
        }
        Ok(())
    }

    async fn top(&self, limit: usize) -> Result<Vec<SearchStat>, StatsError> {
        self.rows("search_count.desc,last_searched_at.desc", limit)
            .await
    }

    async fn recent(&self, limit: usize) -> Result<Vec<SearchStat>, StatsError> {
        self.rows("last_searched_at.desc", limit).await
    }

    async fn clear(&self) -> Result<(), StatsError> {
        // PostgREST refuses an unfiltered delete.
        self.request(reqwest::Method::DELETE)
            .query(&[("pokemon_name", "not.is.null")])
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
