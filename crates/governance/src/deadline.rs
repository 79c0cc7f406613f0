//! Proposal expiry
//!
//! Proposals are bucketed by the epoch at which they expire. A hash sits
//! in exactly one bucket until it resolves or its bucket is purged.

use std::collections::{BTreeMap, HashMap};

use synergy_crypto::Hash;

#[derive(Debug, Default)]
pub struct Deadlines {
    buckets: BTreeMap<u64, Vec<Hash>>,
    due: HashMap<Hash, u64>,
}

impl Deadlines {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `hash` to expire at `epoch`, moving it if already scheduled
    pub fn set(&mut self, epoch: u64, hash: Hash) {
        self.clear(&hash);
        self.buckets.entry(epoch).or_default().push(hash);
        self.due.insert(hash, epoch);
    }

    /// Forget `hash`; no-op if it is not scheduled
    pub fn clear(&mut self, hash: &Hash) {
        let Some(epoch) = self.due.remove(hash) else {
            return;
        };
        if let Some(bucket) = self.buckets.get_mut(&epoch) {
            bucket.retain(|scheduled| scheduled != hash);
            if bucket.is_empty() {
                self.buckets.remove(&epoch);
            }
        }
    }

    /// Remove and return every hash due at or before `epoch`
    pub fn expire(&mut self, epoch: u64) -> Vec<Hash> {
        let later = match epoch.checked_add(1) {
            Some(next) => self.buckets.split_off(&next),
            None => BTreeMap::new(),
        };
        let due = std::mem::replace(&mut self.buckets, later);
        let expired: Vec<Hash> = due.into_values().flatten().collect();
        for hash in &expired {
            self.due.remove(hash);
        }
        expired
    }

    pub fn deadline(&self, hash: &Hash) -> Option<u64> {
        self.due.get(hash).copied()
    }

    pub fn len(&self) -> usize {
        self.due.len()
    }

    pub fn is_empty(&self) -> bool {
        self.due.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expire_purges_past_buckets_only() {
        let mut deadlines = Deadlines::new();
        let (a, b, c) = (Hash::of(b"a"), Hash::of(b"b"), Hash::of(b"c"));
        deadlines.set(10, a);
        deadlines.set(12, b);
        deadlines.set(20, c);
        assert!(deadlines.expire(9).is_empty());
        let mut expired = deadlines.expire(12);
        expired.sort();
        let mut expected = vec![a, b];
        expected.sort();
        assert_eq!(expired, expected);
        assert_eq!(deadlines.len(), 1);
        assert!(deadlines.expire(12).is_empty());
        assert_eq!(deadlines.expire(u64::MAX), vec![c]);
    }

    #[test]
    fn test_clear_and_reschedule() {
        let mut deadlines = Deadlines::new();
        let a = Hash::of(b"a");
        deadlines.set(10, a);
        deadlines.set(15, a);
        assert_eq!(deadlines.deadline(&a), Some(15));
        assert!(deadlines.expire(10).is_empty());
        deadlines.clear(&a);
        assert!(deadlines.is_empty());
        assert!(deadlines.expire(100).is_empty());
    }
}
