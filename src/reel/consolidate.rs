//! Exact-identity consolidation: one surviving record per
//! `title|year|civil-date` key.

use crate::reel::record::WatchRecord;
use std::collections::BTreeMap;

/// Where a candidate batch came from, in fixed priority order. Later sources
/// supplement the earlier ones; the ratings catalog is a fallback that never
/// overrides diary or review data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Diary,
    Reviews,
    Ratings,
}

impl SourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Diary => "diary",
            Self::Reviews => "reviews",
            Self::Ratings => "ratings",
        }
    }

    pub fn batch_file(self) -> &'static str {
        match self {
            Self::Diary => "diary.json",
            Self::Reviews => "reviews.json",
            Self::Ratings => "ratings.json",
        }
    }

    fn is_fallback_catalog(self) -> bool {
        matches!(self, Self::Ratings)
    }
}

/// The conflict-resolution policy for two records sharing a consolidation
/// key, kept as a tagged decision so it can be audited and tested on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Drop the incoming record, keep what is stored.
    Keep,
    /// The incoming record supersedes the stored one field-for-field; its
    /// annotation and identity link travel with it.
    Replace,
}

pub fn resolve(incoming: &WatchRecord, source: SourceKind) -> Resolution {
    if source.is_fallback_catalog() {
        return Resolution::Keep;
    }
    if incoming.has_review() {
        Resolution::Replace
    } else {
        Resolution::Keep
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConsolidateOutcome {
    pub records: Vec<WatchRecord>,
    pub scanned: usize,
    /// Key collisions resolved either way; each removes one record.
    pub exact_duplicates: usize,
    /// The subset of collisions where an annotated record superseded the
    /// stored one.
    pub annotated_wins: usize,
}

/// Fold the batches, in the order given, into one record per key.
pub fn consolidate(batches: Vec<(SourceKind, Vec<WatchRecord>)>) -> ConsolidateOutcome {
    let mut order: Vec<WatchRecord> = Vec::new();
    let mut index: BTreeMap<String, usize> = BTreeMap::new();
    let mut out = ConsolidateOutcome::default();

    for (source, batch) in batches {
        for record in batch {
            out.scanned += 1;
            let key = record.consolidation_key();
            match index.get(&key) {
                None => {
                    index.insert(key, order.len());
                    order.push(record);
                }
                Some(&slot) => {
                    out.exact_duplicates += 1;
                    if resolve(&record, source) == Resolution::Replace {
                        out.annotated_wins += 1;
                        order[slot] = record;
                    }
                }
            }
        }
    }

    out.records = order;
    out
}
