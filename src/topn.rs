use std::{cmp::Ordering, collections::BinaryHeap};

use chrono::{Datelike, NaiveDate};

use crate::models::{CatalogRecord, SortKey};

/// Release date format, eg: "Nov 1, 2000".
const RELEASE_DATE_FMT: &str = "%b %d, %Y";

/// Convert a release date to `yyyymmdd`. Anything that doesn't parse is 0 (oldest).
pub fn date_to_int(s: &str) -> i64 {
    match NaiveDate::parse_from_str(s, RELEASE_DATE_FMT) {
        Ok(d) => d.year() as i64 * 10000 + d.month() as i64 * 100 + d.day() as i64,
        Err(_) => 0,
    }
}

/// Ranking key of a record. Missing or non-finite values are 0.
pub fn key_of(r: &CatalogRecord, key: SortKey) -> f64 {
    let v = match key {
        SortKey::Price => r.price.unwrap_or(0.0),
        SortKey::Score => r.score.unwrap_or(0.0),
        SortKey::ReleaseDate => r.release_date.as_deref().map(date_to_int).unwrap_or(0) as f64,
    };

    if v.is_finite() {
        v
    } else {
        0.0
    }
}

struct HeapEntry<'a> {
    key: f64,
    seq: usize,
    descending: bool,
    record: &'a CatalogRecord,
}

impl Ord for HeapEntry<'_> {
    /// The "greatest" entry is the one to pop next: the best key in the requested
    /// direction, then the lowest sequence number.
    fn cmp(&self, other: &Self) -> Ordering {
        let by_key = self.key.total_cmp(&other.key);
        let by_key = if self.descending {
            by_key
        } else {
            by_key.reverse()
        };
        by_key.then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for HeapEntry<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for HeapEntry<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapEntry<'_> {}

/// Heap over a record list that yields records best-first on demand.
///
/// Construction heapifies in O(N); each `next()` costs O(log N), so taking
/// the first `n` items never sorts the whole list.
pub struct TopN<'a> {
    heap: BinaryHeap<HeapEntry<'a>>,
}

impl<'a> TopN<'a> {
    pub fn new(records: &'a [CatalogRecord], key: SortKey, descending: bool) -> Self {
        let entries: Vec<HeapEntry<'a>> = records
            .iter()
            .enumerate()
            .map(|(seq, record)| HeapEntry {
                key: key_of(record, key),
                seq,
                descending,
                record,
            })
            .collect();

        Self {
            heap: BinaryHeap::from(entries),
        }
    }
}

impl<'a> Iterator for TopN<'a> {
    type Item = &'a CatalogRecord;

    fn next(&mut self) -> Option<Self::Item> {
        self.heap.pop().map(|e| e.record)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.heap.len(), Some(self.heap.len()))
    }
}

impl ExactSizeIterator for TopN<'_> {}

/// Pick the best `limit` records by `key`. Equal keys keep list order.
pub fn select(
    records: &[CatalogRecord],
    key: SortKey,
    descending: bool,
    limit: usize,
) -> Vec<&CatalogRecord> {
    if limit == 0 {
        return Vec::new();
    }
    TopN::new(records, key, descending).take(limit).collect()
}
