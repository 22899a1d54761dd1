use std::collections::{hash_map::Entry, HashMap};

use crate::classify::LogRecord;

/// Which side of the filter boundary a record fell on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    /// Strictly before the filter window.
    Prior,
    /// Inside the filter window, or everything when no filter is set.
    Matched,
}

#[derive(Debug)]
struct Slot {
    bucket: Bucket,
    record: LogRecord,
}

/// Records kept once per identifier per bucket.
///
/// Records live in a single arena in insertion order; each bucket is an
/// identifier to slot index map. The first record seen for an identifier
/// in a bucket wins and is never replaced or moved.
#[derive(Debug, Default)]
pub struct RecordStore {
    slots: Vec<Slot>,
    prior: HashMap<String, usize>,
    matched: HashMap<String, usize>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn index(&self, bucket: Bucket) -> &HashMap<String, usize> {
        match bucket {
            Bucket::Prior => &self.prior,
            Bucket::Matched => &self.matched,
        }
    }

    /// Stores `record` unless its identifier is already in `bucket`.
    /// Returns whether it was stored.
    pub fn insert(&mut self, bucket: Bucket, record: LogRecord) -> bool {
        let index = match bucket {
            Bucket::Prior => &mut self.prior,
            Bucket::Matched => &mut self.matched,
        };
        match index.entry(record.identifier.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(self.slots.len());
                self.slots.push(Slot { bucket, record });
                true
            }
        }
    }

    pub fn contains(&self, bucket: Bucket, identifier: &str) -> bool {
        self.index(bucket).contains_key(identifier)
    }

    #[cfg(test)]
    pub(crate) fn get(&self, bucket: Bucket, identifier: &str) -> Option<&LogRecord> {
        self.index(bucket)
            .get(identifier)
            .map(|&i| &self.slots[i].record)
    }

    pub fn len(&self, bucket: Bucket) -> usize {
        self.index(bucket).len()
    }

    /// Records of `bucket` in the order they were first seen.
    pub fn iter(&self, bucket: Bucket) -> impl Iterator<Item = &LogRecord> {
        self.slots
            .iter()
            .filter(move |slot| slot.bucket == bucket)
            .map(|slot| &slot.record)
    }
}
