use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Member name used for review links and anything derived from it.
    pub username: String,
    /// Shaped-record feed endpoint; empty means "no live feed configured".
    pub url: String,
    pub cache_hours: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            username: "bayf".to_string(),
            url: String::new(),
            cache_hours: 24,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagesConfig {
    pub enabled: bool,
    pub cache_days: u64,
    /// Lookup service root.
    pub base_url: String,
    /// Prefix turning a backdrop path into a full image URL.
    pub file_base: String,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cache_days: 30,
            base_url: "https://api.themoviedb.org/3".to_string(),
            file_base: "https://image.tmdb.org/t/p/w1280".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ReelConfig {
    pub feed: FeedConfig,
    pub images: ImagesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialReelConfig {
    feed: Option<FeedConfig>,
    images: Option<ImagesConfig>,
}

fn env_or_u64(var: &str, fallback: u64) -> u64 {
    match env::var(var) {
        Ok(v) => v.trim().parse::<u64>().ok().unwrap_or(fallback),
        Err(_) => fallback,
    }
}

fn env_or_bool(var: &str, fallback: bool) -> bool {
    match env::var(var) {
        Ok(v) => match v.trim() {
            "1" | "true" | "TRUE" | "yes" | "on" => true,
            "0" | "false" | "FALSE" | "no" | "off" => false,
            _ => fallback,
        },
        Err(_) => fallback,
    }
}

fn env_or_string(var: &str, fallback: &str) -> String {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => fallback.to_string(),
    }
}

fn env_or_string_first(vars: &[&str], fallback: &str) -> String {
    for var in vars {
        if let Ok(v) = env::var(var) {
            let trimmed = v.trim();
            if !trimmed.is_empty() {
                return trimmed.to_string();
            }
        }
    }
    fallback.to_string()
}

fn validate(cfg: &ReelConfig) -> Result<()> {
    if cfg.feed.username.trim().is_empty() {
        return Err(anyhow!("invalid feed username: cannot be empty"));
    }
    if cfg.feed.cache_hours == 0 {
        return Err(anyhow!("invalid feed cache hours: must be >= 1"));
    }
    if !cfg.feed.url.is_empty()
        && !cfg.feed.url.starts_with("http://")
        && !cfg.feed.url.starts_with("https://")
    {
        return Err(anyhow!("invalid feed url: must be http(s)"));
    }
    if cfg.images.cache_days == 0 {
        return Err(anyhow!("invalid image cache days: must be >= 1"));
    }
    if cfg.images.base_url.trim().is_empty() {
        return Err(anyhow!("invalid image lookup base url: cannot be empty"));
    }
    if cfg.images.file_base.trim().is_empty() {
        return Err(anyhow!("invalid image file base: cannot be empty"));
    }
    Ok(())
}

fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(custom) = env::var("REELGRID_CONFIG_PATH") {
        let trimmed = custom.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }

    let home = dirs::home_dir()?;
    Some(home.join(".reelgrid").join("reelgrid.toml"))
}

fn merge_file_config(base: &mut ReelConfig) -> Result<()> {
    let Some(path) = resolve_config_path() else {
        return Ok(());
    };
    if !path.exists() {
        return Ok(());
    }

    let raw = fs::read_to_string(&path)?;
    let parsed: PartialReelConfig = toml::from_str(&raw)
        .map_err(|err| anyhow!("failed to parse config {}: {err}", path.display()))?;
    if let Some(feed) = parsed.feed {
        base.feed = feed;
    }
    if let Some(images) = parsed.images {
        base.images = images;
    }
    Ok(())
}

pub fn load_config() -> Result<ReelConfig> {
    let mut cfg = ReelConfig::default();
    merge_file_config(&mut cfg)?;

    cfg.feed.username = env_or_string_first(
        &["REELGRID_FEED_USERNAME", "LETTERBOXD_USERNAME"],
        &cfg.feed.username,
    );
    cfg.feed.url = env_or_string("REELGRID_FEED_URL", &cfg.feed.url);
    cfg.feed.cache_hours = env_or_u64("REELGRID_FEED_CACHE_HOURS", cfg.feed.cache_hours);
    cfg.images.enabled = env_or_bool("REELGRID_IMAGES_ENABLED", cfg.images.enabled);
    cfg.images.cache_days = env_or_u64("REELGRID_IMAGES_CACHE_DAYS", cfg.images.cache_days);

    validate(&cfg)?;
    Ok(cfg)
}
