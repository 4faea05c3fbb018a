//! The live incremental feed: the most recent slice of the member's diary,
//! fetched on every build and merged over the historical snapshot.
//!
//! The upstream extraction layer serves the feed as an array of shaped
//! candidate records keyed by `link`; this module only fetches, filters to
//! actual film watches, and validates. Feed completeness is never assumed —
//! only recency precedence at merge time.

use crate::reel::fetch::CachedFetcher;
use crate::reel::record::{self, RawRecord, SkipTally, WatchRecord};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Default)]
pub struct FeedOutcome {
    pub records: Vec<WatchRecord>,
    pub skipped: SkipTally,
    /// Entries dropped because they are not film watches (lists, etc).
    pub non_film: usize,
}

pub fn fetch_feed(fetcher: &CachedFetcher, url: &str, cache_hours: u64) -> Result<FeedOutcome> {
    let max_age = Duration::from_secs(cache_hours.saturating_mul(3600));
    let body = fetcher.get_text(url, max_age)?;
    parse_feed(&body)
}

pub fn read_feed_file(path: &Path) -> Result<FeedOutcome> {
    let body =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    parse_feed(&body)
}

pub fn parse_feed(body: &str) -> Result<FeedOutcome> {
    let raws: Vec<RawRecord> =
        serde_json::from_str(body).context("feed payload is not a candidate-record array")?;

    let mut out = FeedOutcome::default();
    let mut film_entries = Vec::with_capacity(raws.len());
    for raw in raws {
        if !raw.link.contains("/film/") {
            out.non_film += 1;
            continue;
        }
        film_entries.push(raw);
    }

    let (records, skipped) = record::validate_batch(film_entries);
    out.records = records;
    out.skipped = skipped;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_film_entries_are_filtered_out() {
        let body = r#"[
            {"title": "Arrival", "year": "2016",
             "link": "https://letterboxd.com/bayf/film/arrival/",
             "date": "2024-03-02", "rating": 4.5},
            {"title": "Best of 2024",
             "link": "https://letterboxd.com/bayf/list/best-of-2024/",
             "date": "2024-12-31"}
        ]"#;
        let outcome = parse_feed(body).expect("parse");
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.non_film, 1);
        assert_eq!(outcome.records[0].title, "Arrival");
        assert_eq!(outcome.records[0].rating, 4.5);
    }

    #[test]
    fn malformed_members_skip_without_aborting_the_feed() {
        let body = r#"[
            {"title": "Arrival", "year": "2016",
             "link": "https://letterboxd.com/bayf/film/arrival/",
             "date": "2024-03-02"},
            {"title": "", "link": "https://letterboxd.com/bayf/film/mystery/",
             "date": "2024-03-03"},
            {"title": "Heat", "link": "https://letterboxd.com/bayf/film/heat/",
             "date": "not-a-date"}
        ]"#;
        let outcome = parse_feed(body).expect("parse");
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.skipped.total(), 2);
    }

    #[test]
    fn a_non_array_payload_is_an_error() {
        assert!(parse_feed("{\"items\": []}").is_err());
        assert!(parse_feed("<rss></rss>").is_err());
    }
}
