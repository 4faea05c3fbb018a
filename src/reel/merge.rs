//! Combine the historical timeline with the live feed. Live records are the
//! more current truth — an edited rating or a review added after the fact —
//! so they overwrite on exact key collision. No fuzzy matching happens here.

use crate::reel::record::WatchRecord;
use std::collections::BTreeMap;

pub fn merge(historical: Vec<WatchRecord>, live: Vec<WatchRecord>) -> Vec<WatchRecord> {
    let mut order: Vec<WatchRecord> = Vec::with_capacity(historical.len() + live.len());
    let mut index: BTreeMap<String, usize> = BTreeMap::new();

    for record in historical.into_iter().chain(live) {
        let key = record.merge_key();
        match index.get(&key) {
            Some(&slot) => order[slot] = record,
            None => {
                index.insert(key, order.len());
                order.push(record);
            }
        }
    }

    // Stable sort: ties keep insertion order.
    order.sort_by(|a, b| b.date.cmp(&a.date));
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reel::record::sample_record;

    #[test]
    fn live_record_overwrites_historical_on_key_collision() {
        let mut historical = sample_record("Arrival", "2016", "2024-03-02");
        historical.link = "https://letterboxd.com/film/x/".to_string();
        historical.rating = 3.0;

        let mut live = sample_record("Arrival", "2016", "2024-03-02");
        live.link = "https://letterboxd.com/film/x/".to_string();
        live.rating = 5.0;
        live.review_text = "rewatched, even better".to_string();

        let merged = merge(vec![historical], vec![live]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].rating, 5.0);
        assert_eq!(merged[0].review_text, "rewatched, even better");
    }

    #[test]
    fn linkless_records_fall_back_to_title_and_instant() {
        let mut historical = sample_record("Arrival", "2016", "2024-03-02");
        historical.link = String::new();
        historical.rating = 3.0;

        let mut live = historical.clone();
        live.rating = 4.0;

        let merged = merge(vec![historical], vec![live]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].rating, 4.0);
    }

    #[test]
    fn disjoint_keys_union_and_sort_descending() {
        let older = sample_record("Heat", "1995", "2024-01-10");
        let newer = sample_record("Tampopo", "1985", "2024-04-04");
        let newest = sample_record("Arrival", "2016", "2024-06-01");

        let merged = merge(vec![older, newest], vec![newer]);
        let titles: Vec<&str> = merged.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Arrival", "Tampopo", "Heat"]);
    }

    #[test]
    fn same_work_on_different_days_is_not_collapsed_here() {
        let first = sample_record("Arrival", "2016", "2024-03-02");
        let mut second = sample_record("Arrival", "2016", "2024-03-03");
        second.link = "https://letterboxd.com/film/arrival/2/".to_string();

        let merged = merge(vec![first], vec![second]);
        assert_eq!(merged.len(), 2);
    }
}
