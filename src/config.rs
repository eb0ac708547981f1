//! Command-line and environment configuration

use std::path::PathBuf;

use crate::api::DEFAULT_ENDPOINT;
use crate::query::RouteQuery;

const APP_DIR: &str = "pokedex";
const STATS_FILE: &str = "search-stats.json";
const LOG_FILE: &str = "pokedex.log";

#[derive(clap::Args, Debug, Clone)]
pub struct AppArgs {
    /// PokeAPI GraphQL endpoint
    #[arg(long, env = "POKEDEX_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Start from a shared route, e.g. "?name=char&type=Fire"
    #[arg(long, default_value = "")]
    pub route: String,

    /// Hosted search stats base URL (PostgREST / Supabase project URL)
    #[arg(long, env = "POKEDEX_STATS_URL")]
    pub stats_url: Option<String>,

    /// API key for the hosted search stats table
    #[arg(long, env = "POKEDEX_STATS_KEY", hide_env_values = true)]
    pub stats_key: Option<String>,

    /// Directory for the local stats file and the log
    #[arg(long, env = "POKEDEX_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Do not fetch the first page before the UI starts
    #[arg(long)]
    pub no_prefetch: bool,
}

impl Default for AppArgs {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            route: String::new(),
            stats_url: None,
            stats_key: None,
            data_dir: None,
            log_level: "info".to_string(),
            no_prefetch: false,
        }
    }
}

/// Where search statistics live.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StatsBackend {
    Local {
        path: PathBuf,
    },
    Remote {
        url: String,
        api_key: String,
        fallback_path: PathBuf,
    },
}

impl StatsBackend {
    pub fn label(&self) -> &'static str {
        match self {
            StatsBackend::Local { .. } => "local",
            StatsBackend::Remote { .. } => "remote",
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub endpoint: String,
    pub route: RouteQuery,
    pub data_dir: PathBuf,
    pub log_file: PathBuf,
    pub log_level: String,
    pub stats: StatsBackend,
    pub prefetch: bool,
}

impl AppConfig {
    pub fn from_args(args: AppArgs) -> Self {
        let data_dir = args.data_dir.unwrap_or_else(default_data_dir);
        let local_stats = data_dir.join(STATS_FILE);
        let stats = match (non_blank(args.stats_url), non_blank(args.stats_key)) {
            (Some(url), Some(api_key)) => StatsBackend::Remote {
                url,
                api_key,
                fallback_path: local_stats,
            },
            _ => StatsBackend::Local { path: local_stats },
        };
        Self {
            endpoint: args.endpoint,
            route: RouteQuery::parse(&args.route),
            log_file: data_dir.join(LOG_FILE),
            data_dir,
            log_level: args.log_level,
            stats,
            prefetch: !args.no_prefetch,
        }
    }
}

pub fn default_data_dir() -> PathBuf {
    dirs_next::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_stats_by_default() {
        let config = AppConfig::from_args(AppArgs {
            data_dir: Some(PathBuf::from("/tmp/dex")),
            ..AppArgs::default()
        });
        assert_eq!(
            config.stats,
            StatsBackend::Local {
                path: PathBuf::from("/tmp/dex/search-stats.json")
            }
        );
        assert_eq!(config.log_file, PathBuf::from("/tmp/dex/pokedex.log"));
        assert!(config.prefetch);
    }

    #[test]
    fn test_remote_stats_need_url_and_key() {
        let half = AppConfig::from_args(AppArgs {
            stats_url: Some("https://x.supabase.co".into()),
            stats_key: Some("  ".into()),
            data_dir: Some(PathBuf::from("/tmp/dex")),
            ..AppArgs::default()
        });
        assert_eq!(half.stats.label(), "local");

        let full = AppConfig::from_args(AppArgs {
            stats_url: Some("https://x.supabase.co".into()),
            stats_key: Some("anon".into()),
            data_dir: Some(PathBuf::from("/tmp/dex")),
            ..AppArgs::default()
        });
        assert_eq!(full.stats.label(), "remote");
    }

    #[test]
    fn test_route_is_parsed() {
        let config = AppConfig::from_args(AppArgs {
            route: "?name=char&type=fire".into(),
            ..AppArgs::default()
        });
        assert_eq!(config.route.name.as_deref(), Some("char"));
        assert_eq!(config.route.type_name.as_deref(), Some("Fire"));
    }
}
