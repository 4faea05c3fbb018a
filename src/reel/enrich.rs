//! Backdrop enrichment for records that arrived without imagery.
//!
//! Precedence is fixed: a hand-picked backdrop for the film's slug always
//! beats the automatic lookup, and the lookup is not even consulted on an
//! override hit. Lookup failures degrade to "no image" — never an error.

use crate::reel::record::WatchRecord;
use crate::reel::warn;
use anyhow::Result;
use std::collections::BTreeMap;

pub trait BackdropLookup {
    /// Full backdrop URL for a work, or `None` when the service has nothing.
    fn backdrop_url(&self, title: &str, year: &str) -> Result<Option<String>>;
}

/// Stand-in when automatic lookup is switched off or unconfigured; custom
/// overrides still apply.
pub struct DisabledLookup;

impl BackdropLookup for DisabledLookup {
    fn backdrop_url(&self, _title: &str, _year: &str) -> Result<Option<String>> {
        Ok(None)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EnrichOutcome {
    pub scanned: usize,
    pub enriched: usize,
    pub overridden: usize,
    pub failed: usize,
}

pub fn enrich_missing_backdrops(
    records: &mut [WatchRecord],
    overrides: &BTreeMap<String, String>,
    lookup: &dyn BackdropLookup,
) -> EnrichOutcome {
    let mut out = EnrichOutcome::default();

    for record in records.iter_mut() {
        out.scanned += 1;
        if !record.image.is_empty() || !record.backdrop.is_empty() {
            continue;
        }

        if let Some(url) = record.film_slug().and_then(|slug| overrides.get(slug)) {
            record.backdrop = url.clone();
            record.resolve_image();
            out.overridden += 1;
            out.enriched += 1;
            continue;
        }

        match lookup.backdrop_url(&record.title, &record.year) {
            Ok(Some(url)) => {
                record.backdrop = url;
                record.resolve_image();
                out.enriched += 1;
            }
            Ok(None) => {}
            Err(err) => {
                out.failed += 1;
                warn::emit(
                    "BACKDROP_LOOKUP_FAILED",
                    "enrich",
                    &record.title,
                    "lookup-failed",
                    &format!("{err:#}"),
                );
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reel::record::sample_record;
    use std::cell::Cell;

    struct StubLookup {
        url: Option<String>,
        calls: Cell<usize>,
    }

    impl StubLookup {
        fn returning(url: Option<&str>) -> Self {
            Self {
                url: url.map(str::to_string),
                calls: Cell::new(0),
            }
        }
    }

    impl BackdropLookup for StubLookup {
        fn backdrop_url(&self, _title: &str, _year: &str) -> Result<Option<String>> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.url.clone())
        }
    }

    #[test]
    fn custom_override_beats_the_lookup_and_skips_it() {
        let mut records = vec![sample_record("Arrival", "2016", "2024-03-02")];
        let mut overrides = BTreeMap::new();
        overrides.insert(
            "arrival".to_string(),
            "https://example.test/custom.jpg".to_string(),
        );
        let lookup = StubLookup::returning(Some("https://example.test/auto.jpg"));

        let outcome = enrich_missing_backdrops(&mut records, &overrides, &lookup);
        assert_eq!(records[0].backdrop, "https://example.test/custom.jpg");
        assert_eq!(records[0].image, "https://example.test/custom.jpg");
        assert_eq!(outcome.overridden, 1);
        assert_eq!(lookup.calls.get(), 0);
    }

    #[test]
    fn lookup_fills_records_without_an_override() {
        let mut records = vec![sample_record("Heat", "1995", "2024-01-10")];
        let overrides = BTreeMap::new();
        let lookup = StubLookup::returning(Some("https://example.test/auto.jpg"));

        let outcome = enrich_missing_backdrops(&mut records, &overrides, &lookup);
        assert_eq!(records[0].image, "https://example.test/auto.jpg");
        assert_eq!(outcome.enriched, 1);
        assert_eq!(outcome.overridden, 0);
        assert_eq!(lookup.calls.get(), 1);
    }

    #[test]
    fn records_with_imagery_are_left_alone() {
        let mut record = sample_record("Heat", "1995", "2024-01-10");
        record.poster = "poster.jpg".to_string();
        record.resolve_image();
        let mut records = vec![record];

        let overrides = BTreeMap::new();
        let lookup = StubLookup::returning(Some("https://example.test/auto.jpg"));
        let outcome = enrich_missing_backdrops(&mut records, &overrides, &lookup);

        assert_eq!(records[0].image, "poster.jpg");
        assert_eq!(outcome.enriched, 0);
        assert_eq!(lookup.calls.get(), 0);
    }

    #[test]
    fn a_service_miss_leaves_the_record_bare() {
        let mut records = vec![sample_record("Tampopo", "1985", "2024-02-01")];
        let overrides = BTreeMap::new();
        let lookup = StubLookup::returning(None);

        let outcome = enrich_missing_backdrops(&mut records, &overrides, &lookup);
        assert!(records[0].image.is_empty());
        assert_eq!(outcome.enriched, 0);
        assert_eq!(outcome.failed, 0);
    }
}
