//! The canonical watch record and candidate validation.

use crate::error::SkipReason;
use crate::reel::civil;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A candidate record as shaped by the extraction layer: every field present,
/// empty strings for absent values, the date still a raw string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawRecord {
    pub title: String,
    pub year: String,
    pub rating: f64,
    pub link: String,
    pub review_link: String,
    pub date: String,
    pub image: String,
    pub poster: String,
    pub backdrop: String,
    pub description: String,
    pub rewatch: bool,
    pub tags: Vec<String>,
    pub review_text: String,
}

/// One logged watch event. `link` is the identity key: the stable URI the
/// source assigned to this entry. `review_text` is the annotation; empty
/// string means "no annotation", never null.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchRecord {
    pub title: String,
    pub year: String,
    pub rating: f64,
    pub link: String,
    pub review_link: String,
    pub date: DateTime<Utc>,
    pub image: String,
    pub poster: String,
    pub backdrop: String,
    pub description: String,
    pub rewatch: bool,
    pub tags: Vec<String>,
    pub review_text: String,
}

impl WatchRecord {
    /// Validate a candidate. Missing identity link, title, or date — or an
    /// unparsable date — drops the candidate with a reason; nothing here is
    /// fatal to the batch.
    pub fn from_raw(raw: RawRecord) -> Result<WatchRecord, SkipReason> {
        let title = raw.title.trim().to_string();
        let link = raw.link.trim().to_string();

        if link.is_empty() {
            return Err(SkipReason::MissingLink);
        }
        if raw.date.trim().is_empty() {
            return Err(SkipReason::MissingDate);
        }
        if title.is_empty() {
            return Err(SkipReason::MissingTitle);
        }
        let date = civil::parse_instant(&raw.date).map_err(|_| SkipReason::InvalidInstant)?;

        let mut record = WatchRecord {
            title,
            year: raw.year.trim().to_string(),
            rating: raw.rating,
            link,
            review_link: raw.review_link,
            date,
            image: raw.image,
            poster: raw.poster,
            backdrop: raw.backdrop,
            description: raw.description,
            rewatch: raw.rewatch,
            tags: normalize_tags(raw.tags),
            review_text: raw.review_text,
        };
        record.resolve_image();
        Ok(record)
    }

    pub fn has_review(&self) -> bool {
        !self.review_text.trim().is_empty()
    }

    /// Settle the display image: backdrop preferred over poster, an already
    /// resolved image left alone.
    pub fn resolve_image(&mut self) {
        if self.image.is_empty() {
            self.image = if !self.backdrop.is_empty() {
                self.backdrop.clone()
            } else {
                self.poster.clone()
            };
        }
    }

    /// The film slug out of an identity link like `…/film/the-slug/`.
    pub fn film_slug(&self) -> Option<&str> {
        let tail = self.link.split("/film/").nth(1)?;
        let slug = tail.trim_end_matches('/');
        if slug.is_empty() { None } else { Some(slug) }
    }

    pub fn title_year_key(&self) -> String {
        format!("{}|{}", self.title, self.year)
    }

    pub fn consolidation_key(&self) -> String {
        format!(
            "{}|{}|{}",
            self.title,
            self.year,
            civil::civil_date(&self.date).date_string
        )
    }

    /// Merge-stage key: the identity link when present, else a title+instant
    /// composite. Exact string match only; no civil normalization here.
    pub fn merge_key(&self) -> String {
        if !self.link.is_empty() {
            self.link.clone()
        } else {
            format!("{}-{}", self.title, self.date.to_rfc3339())
        }
    }
}

/// Rewrite a film URI into the member's review page for it.
pub fn review_link_for(link: &str, username: &str) -> String {
    link.replace(
        "https://letterboxd.com/film/",
        &format!("https://letterboxd.com/{username}/film/"),
    )
}

fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::new();
    for tag in tags {
        let trimmed = tag.trim();
        if trimmed.is_empty() {
            continue;
        }
        if seen.insert(trimmed.to_string()) {
            out.push(trimmed.to_string());
        }
    }
    out
}

/// Per-reason skip counts for one batch.
#[derive(Debug, Clone, Default)]
pub struct SkipTally {
    counts: BTreeMap<&'static str, usize>,
}

impl SkipTally {
    pub fn note(&mut self, reason: SkipReason) {
        *self.counts.entry(reason.as_str()).or_insert(0) += 1;
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn summarize(&self) -> String {
        if self.counts.is_empty() {
            return "none".to_string();
        }
        self.counts
            .iter()
            .map(|(reason, count)| format!("{reason}={count}"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Validate a whole candidate batch, keeping order and counting skips.
pub fn validate_batch(raws: Vec<RawRecord>) -> (Vec<WatchRecord>, SkipTally) {
    let mut records = Vec::with_capacity(raws.len());
    let mut tally = SkipTally::default();
    for raw in raws {
        match WatchRecord::from_raw(raw) {
            Ok(record) => records.push(record),
            Err(reason) => tally.note(reason),
        }
    }
    (records, tally)
}

#[cfg(test)]
pub(crate) fn sample_record(title: &str, year: &str, date: &str) -> WatchRecord {
    WatchRecord::from_raw(RawRecord {
        title: title.to_string(),
        year: year.to_string(),
        link: format!(
            "https://letterboxd.com/film/{}/",
            title.to_lowercase().replace(' ', "-")
        ),
        date: date.to_string(),
        ..RawRecord::default()
    })
    .expect("sample record is valid")
}
