//! TMDb movie search used to backfill backdrops. Responses are cached for a
//! long window (the artwork for a given film rarely changes), and the whole
//! client is absent when no API key is configured.

use crate::reel::config::ImagesConfig;
use crate::reel::enrich::BackdropLookup;
use crate::reel::fetch::CachedFetcher;
use anyhow::{Context, Result};
use serde_json::Value;
use std::env;
use std::path::Path;
use std::time::Duration;

pub struct TmdbClient {
    api_key: String,
    base_url: String,
    file_base: String,
    fetcher: CachedFetcher,
    cache_max_age: Duration,
}

impl TmdbClient {
    /// `None` when lookups are disabled or `TMDB_API_KEY` is unset; the
    /// caller reports that and proceeds with overrides only.
    pub fn from_env(cfg: &ImagesConfig, cache_dir: &Path) -> Result<Option<TmdbClient>> {
        if !cfg.enabled {
            return Ok(None);
        }
        let Ok(api_key) = env::var("TMDB_API_KEY") else {
            return Ok(None);
        };
        let api_key = api_key.trim().to_string();
        if api_key.is_empty() {
            return Ok(None);
        }

        Ok(Some(TmdbClient {
            api_key,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            file_base: cfg.file_base.trim_end_matches('/').to_string(),
            fetcher: CachedFetcher::new(cache_dir)?,
            cache_max_age: Duration::from_secs(cfg.cache_days.saturating_mul(24 * 3600)),
        }))
    }

    fn search(&self, title: &str, year: Option<&str>) -> Result<Option<String>> {
        let mut params = vec![
            ("api_key", self.api_key.as_str()),
            ("query", title),
        ];
        if let Some(year) = year {
            params.push(("year", year));
        }
        let url = reqwest::Url::parse_with_params(
            &format!("{}/search/movie", self.base_url),
            &params,
        )
        .context("failed to build the search URL")?;

        let body = self.fetcher.get_text(url.as_str(), self.cache_max_age)?;
        let parsed: Value =
            serde_json::from_str(&body).context("search response is not JSON")?;
        let backdrop = parsed
            .get("results")
            .and_then(Value::as_array)
            .and_then(|results| results.first())
            .and_then(|first| first.get("backdrop_path"))
            .and_then(Value::as_str)
            .filter(|path| !path.is_empty())
            .map(|path| format!("{}{}", self.file_base, path));
        Ok(backdrop)
    }
}

impl BackdropLookup for TmdbClient {
    fn backdrop_url(&self, title: &str, year: &str) -> Result<Option<String>> {
        // Year-qualified search is more accurate; fall back to title alone.
        if !year.trim().is_empty()
            && let Some(url) = self.search(title, Some(year.trim()))?
        {
            return Ok(Some(url));
        }
        self.search(title, None)
    }
}
