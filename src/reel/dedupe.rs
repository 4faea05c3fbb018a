//! Fuzzy deduplication: the same watch logged twice with a nominal date
//! shifted by one calendar day (source-local time vs. the reference zone)
//! collapses to a single record.

use crate::reel::civil;
use crate::reel::consolidate::{self, SourceKind};
use crate::reel::record::WatchRecord;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct DedupeOutcome {
    pub records: Vec<WatchRecord>,
    pub fuzzy_merged: usize,
}

/// Collapse adjacent-day duplicates within each `title|year` group.
///
/// Groups are scanned ascending by instant with a current anchor. Records at
/// most one civil day from the anchor fold into its window; the first record
/// beyond that closes the window and becomes the next anchor. Consumption is
/// strictly left-to-right — a record one day past the anchor and another one
/// day past *that* sit in separate windows. The survivor of a window is the
/// last annotated record in it, else the anchor itself.
pub fn collapse_adjacent(records: Vec<WatchRecord>) -> DedupeOutcome {
    let mut groups: BTreeMap<String, Vec<WatchRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(record.title_year_key()).or_default().push(record);
    }

    let mut out = DedupeOutcome::default();
    for (_, mut group) in groups {
        group.sort_by_key(|record| record.date);
        let mut consumed = vec![false; group.len()];

        for i in 0..group.len() {
            if consumed[i] {
                continue;
            }
            let mut survivor = i;
            for j in (i + 1)..group.len() {
                if consumed[j] {
                    continue;
                }
                if civil::day_distance(&group[i].date, &group[j].date) > 1 {
                    // Sorted ascending, so every later record is further out.
                    break;
                }
                consumed[j] = true;
                out.fuzzy_merged += 1;
                if group[j].has_review() {
                    survivor = j;
                }
            }
            consumed[i] = true;
            out.records.push(group[survivor].clone());
        }
    }

    // Most recent first for every downstream consumer.
    out.records.sort_by(|a, b| b.date.cmp(&a.date));
    out
}

/// End-of-pipeline counts for one dedup run.
#[derive(Debug, Clone, Copy, Default)]
pub struct DedupSummary {
    pub scanned: usize,
    pub exact_removed: usize,
    /// Exact collisions where the annotated record superseded the stored one.
    pub annotated_wins: usize,
    pub fuzzy_removed: usize,
    pub kept: usize,
}

impl DedupSummary {
    pub fn removed(&self) -> usize {
        self.exact_removed + self.fuzzy_removed
    }

    pub fn reduction_percent(&self) -> f64 {
        if self.scanned == 0 {
            return 0.0;
        }
        (self.removed() as f64) / (self.scanned as f64) * 100.0
    }
}

/// The full dedup pipeline: exact consolidation, then the fuzzy window pass.
/// Re-running it over its own output removes nothing.
pub fn dedupe_history(
    batches: Vec<(SourceKind, Vec<WatchRecord>)>,
) -> (Vec<WatchRecord>, DedupSummary) {
    let consolidated = consolidate::consolidate(batches);
    let fuzzy = collapse_adjacent(consolidated.records);

    let summary = DedupSummary {
        scanned: consolidated.scanned,
        exact_removed: consolidated.exact_duplicates,
        annotated_wins: consolidated.annotated_wins,
        fuzzy_removed: fuzzy.fuzzy_merged,
        kept: fuzzy.records.len(),
    };
    (fuzzy.records, summary)
}
