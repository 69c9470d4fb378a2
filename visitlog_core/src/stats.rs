//! Aggregate statistics over the visitor log.
//!
//! All functions are pure and take the full record sequence in file order.

use crate::VisitRecord;
use chrono::{NaiveDate, Timelike};
use std::collections::{BTreeMap, HashMap};

pub fn total_count(records: &[VisitRecord]) -> usize {
    records.len()
}

/// Records whose entry happened on `today`
pub fn count_today(records: &[VisitRecord], today: NaiveDate) -> usize {
    records.iter().filter(|r| r.entry_date == today).count()
}

/// Visitors currently on-site (records without an exit)
pub fn present_count(records: &[VisitRecord]) -> usize {
    records.iter().filter(|r| r.is_open()).count()
}

/// Entries per calendar day, ascending by date
pub fn counts_by_day(records: &[VisitRecord]) -> BTreeMap<NaiveDate, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(record.entry_date).or_insert(0) += 1;
    }
    counts
}

/// Entries per hour of day (0-23), ascending; hours without entries are absent
pub fn counts_by_hour(records: &[VisitRecord]) -> BTreeMap<u32, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(record.entry_time.hour()).or_insert(0) += 1;
    }
    counts
}

/// Count occurrences of a text key, most frequent first
///
/// Ties keep the order in which keys were first encountered.
fn ranked_counts<'a, F>(records: &'a [VisitRecord], key: F) -> Vec<(String, usize)>
where
    F: Fn(&'a VisitRecord) -> &'a str,
{
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();

    for record in records {
        let k = key(record);
        match positions.get(k) {
            Some(&i) => counts[i].1 += 1,
            None => {
                positions.insert(k, counts.len());
                counts.push((k.to_string(), 1));
            }
        }
    }

    // sort_by is stable
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Entries per destination, every distinct destination included
pub fn counts_by_destination(records: &[VisitRecord]) -> Vec<(String, usize)> {
    ranked_counts(records, |r| r.destination.as_str())
}

/// The `n` companies with the most entries
pub fn top_companies(records: &[VisitRecord], n: usize) -> Vec<(String, usize)> {
    let mut ranked = ranked_counts(records, |r| r.company.as_str());
    ranked.truncate(n);
    ranked
}

/// Percentage of `count` over `total`, 0.0 for an empty total
pub fn share(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 * 100.0 / total as f64
    }
}

/// The last `n` records in file order
pub fn latest(records: &[VisitRecord], n: usize) -> &[VisitRecord] {
    &records[records.len().saturating_sub(n)..]
}
