//! Cached blocking HTTP fetches for the live feed and image lookups.
//!
//! Responses land in the cache directory under a digest of the URL; a cached
//! body younger than the caller's freshness window short-circuits the network
//! entirely, and a stale body is served when the remote side fails.

use crate::reel::warn;
use anyhow::{Context, Result};
use reqwest::blocking::Client;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const REQUEST_TIMEOUT_SECS: u64 = 30;

pub struct CachedFetcher {
    cache_dir: PathBuf,
    client: Client,
}

impl CachedFetcher {
    pub fn new(cache_dir: &Path) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("failed to build the HTTP client")?;
        Ok(Self {
            cache_dir: cache_dir.to_path_buf(),
            client,
        })
    }

    pub fn get_text(&self, url: &str, max_age: Duration) -> Result<String> {
        let cache_path = self.cache_dir.join(cache_key(url));
        if is_fresh(&cache_path, max_age) {
            return fs::read_to_string(&cache_path)
                .with_context(|| format!("failed to read cache {}", cache_path.display()));
        }

        match self.fetch(url) {
            Ok(body) => {
                if let Err(err) = self.store(&cache_path, &body) {
                    warn::emit("CACHE_WRITE_FAILED", "fetch", url, "cache-store", &format!("{err:#}"));
                }
                Ok(body)
            }
            Err(err) => {
                // Serve the stale body rather than dropping a source outright.
                if cache_path.exists() {
                    warn::emit("STALE_CACHE_SERVED", "fetch", url, "remote-failed", &format!("{err:#}"));
                    return fs::read_to_string(&cache_path).with_context(|| {
                        format!("failed to read stale cache {}", cache_path.display())
                    });
                }
                Err(err)
            }
        }
    }

    fn fetch(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("request to {url} failed"))?;
        if !response.status().is_success() {
            anyhow::bail!("request to {url} returned {}", response.status());
        }
        response
            .text()
            .with_context(|| format!("failed to read the body from {url}"))
    }

    fn store(&self, cache_path: &Path, body: &str) -> Result<()> {
        fs::create_dir_all(&self.cache_dir)
            .with_context(|| format!("failed to create {}", self.cache_dir.display()))?;
        fs::write(cache_path, body)
            .with_context(|| format!("failed to write {}", cache_path.display()))?;
        Ok(())
    }
}

fn cache_key(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    format!("{:x}.cache", hasher.finalize())
}

fn is_fresh(path: &Path, max_age: Duration) -> bool {
    if max_age.is_zero() {
        return false;
    }
    let Ok(meta) = fs::metadata(path) else {
        return false;
    };
    let Ok(modified) = meta.modified() else {
        return false;
    };
    match modified.elapsed() {
        Ok(age) => age <= max_age,
        // A modification time in the future counts as fresh.
        Err(_) => true,
    }
}
