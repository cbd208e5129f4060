use std::collections::HashMap;

use chrono::NaiveDateTime;

use crate::models::{CallRecord, Direction};
use crate::phone;

/// How the caller side of a candidate record must match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FromMatch {
    /// Exact normalized-digits equality. Used for the agent's own line,
    /// which appears in the same log on both sides of a call.
    Exact(String),
    /// Last-10-digit comparison, tolerant of country-code prefixes.
    Suffix(String),
}

impl FromMatch {
    fn matches(&self, from_number: &str) -> bool {
        match self {
            FromMatch::Exact(digits) => phone::normalize(from_number) == *digits,
            FromMatch::Suffix(suffix) => phone::suffix10(from_number) == *suffix,
        }
    }
}

type Bucket = Vec<u32>;

/// Read-only queryable view over one agent's full record set. Built once
/// per data set; callback searches then run against the buckets instead of
/// rescanning the whole table per anchor call.
pub struct CallIndex {
    records: Vec<CallRecord>,
    by_to_suffix: HashMap<(Direction, String), Bucket>,
    by_from_number: HashMap<(Direction, String), Bucket>,
}

impl CallIndex {
    pub fn build(mut records: Vec<CallRecord>) -> CallIndex {
        // Total order over record content: query results must not depend
        // on the row order of the source CSV.
        records.sort_by(|a, b| {
            (a.start_time, a.duration_seconds, &a.from_number, &a.to_number).cmp(&(
                b.start_time,
                b.duration_seconds,
                &b.from_number,
                &b.to_number,
            ))
        });

        let mut by_to_suffix: HashMap<(Direction, String), Bucket> = HashMap::new();
        let mut by_from_number: HashMap<(Direction, String), Bucket> = HashMap::new();

        // Records are sorted ascending, so pushing in order leaves every
        // bucket sorted by start time as well.
        for (idx, record) in records.iter().enumerate() {
            by_to_suffix
                .entry((record.direction, phone::suffix10(&record.to_number)))
                .or_default()
                .push(idx as u32);
            by_from_number
                .entry((record.direction, phone::normalize(&record.from_number)))
                .or_default()
                .push(idx as u32);
        }

        CallIndex {
            records,
            by_to_suffix,
            by_from_number,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Chronologically earliest record matching the given direction, callee
    /// suffix, caller predicate, inclusive time window and minimum duration.
    /// Returns `None` when nothing qualifies.
    pub fn find_earliest(
        &self,
        direction: Direction,
        to_suffix: &str,
        from: &FromMatch,
        window_start: NaiveDateTime,
        window_end: NaiveDateTime,
        min_duration: u32,
    ) -> Option<&CallRecord> {
        let to_bucket = self.by_to_suffix.get(&(direction, to_suffix.to_string()))?;

        // An exact caller number is also an index key, so scan whichever
        // of the two buckets is smaller and filter on the other side.
        let bucket = match from {
            FromMatch::Exact(digits) => {
                let from_bucket = self.by_from_number.get(&(direction, digits.clone()))?;
                if from_bucket.len() < to_bucket.len() {
                    from_bucket
                } else {
                    to_bucket
                }
            }
            FromMatch::Suffix(_) => to_bucket,
        };

        let lower = bucket.partition_point(|&i| self.records[i as usize].start_time < window_start);
        bucket[lower..]
            .iter()
            .map(|&i| &self.records[i as usize])
            .take_while(|record| record.start_time <= window_end)
            .find(|record| {
                record.duration_seconds >= min_duration
                    && phone::suffix10(&record.to_number) == to_suffix
                    && from.matches(&record.from_number)
            })
    }
}
