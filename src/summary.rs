//! Per-collection allocation summaries
//!
//! Each garbage collection can report one aggregate record per class:
//! reachable and unreachable instance and byte counts. The summary keeps the
//! records in arrival order (no dedup — double-reporting a class is the
//! caller's mistake and both records are kept) and exposes them as a
//! snapshot sorted by descending reachable bytes.

use crate::domain::{ClassId, CollectionId, Counter, Timestamp};

/// Aggregate allocation counts for one class within one collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AllocationClassData {
    pub class: ClassId,
    pub reachable_instances: u32,
    pub reachable_bytes: u32,
    pub unreachable_instances: u32,
    pub unreachable_bytes: u32,
}

/// Allocation aggregates for one collection.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AllocationSummary {
    collection: CollectionId,
    start_counter: Counter,
    start_time: Timestamp,
    end_counter: Counter,
    end_time: Timestamp,
    data: Vec<AllocationClassData>,
}

impl AllocationSummary {
    /// Start a summary. The end counter and timestamp start out equal to the
    /// start values and are fixed up by [`close`](Self::close) when the
    /// summary-end event arrives.
    #[must_use]
    pub fn new(collection: CollectionId, start_counter: Counter, start_time: Timestamp) -> Self {
        Self {
            collection,
            start_counter,
            start_time,
            end_counter: start_counter,
            end_time: start_time,
            data: Vec::new(),
        }
    }

    #[must_use]
    pub fn collection(&self) -> CollectionId {
        self.collection
    }

    #[must_use]
    pub fn start_counter(&self) -> Counter {
        self.start_counter
    }

    #[must_use]
    pub fn start_time(&self) -> Timestamp {
        self.start_time
    }

    #[must_use]
    pub fn end_counter(&self) -> Counter {
        self.end_counter
    }

    #[must_use]
    pub fn end_time(&self) -> Timestamp {
        self.end_time
    }

    /// Append one class record.
    pub fn record(
        &mut self,
        class: ClassId,
        reachable_instances: u32,
        reachable_bytes: u32,
        unreachable_instances: u32,
        unreachable_bytes: u32,
    ) {
        self.data.push(AllocationClassData {
            class,
            reachable_instances,
            reachable_bytes,
            unreachable_instances,
            unreachable_bytes,
        });
    }

    /// Fix the end counter and timestamp at summary end.
    pub fn close(&mut self, end_counter: Counter, end_time: Timestamp) {
        self.end_counter = end_counter;
        self.end_time = end_time;
    }

    /// Snapshot of the class records, sorted by descending reachable bytes.
    /// The sort is stable, so ties keep insertion order.
    #[must_use]
    pub fn data(&self) -> Vec<AllocationClassData> {
        let mut sorted = self.data.clone();
        sorted.sort_by(|a, b| b.reachable_bytes.cmp(&a.reachable_bytes));
        sorted
    }

    /// Number of class records, in O(1).
    #[must_use]
    pub fn class_count(&self) -> usize {
        self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_sorted_by_reachable_bytes_descending() {
        let mut summary = AllocationSummary::new(CollectionId(1), Counter(10), Timestamp(1_000));
        summary.record(ClassId(1), 1, 10, 0, 0);
        summary.record(ClassId(2), 5, 50, 0, 0);
        summary.record(ClassId(3), 3, 30, 0, 0);

        let bytes: Vec<u32> = summary.data().iter().map(|d| d.reachable_bytes).collect();
        assert_eq!(bytes, vec![50, 30, 10]);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let mut summary = AllocationSummary::new(CollectionId(1), Counter(10), Timestamp(1_000));
        summary.record(ClassId(7), 1, 20, 0, 0);
        summary.record(ClassId(8), 1, 20, 0, 0);

        let classes: Vec<ClassId> = summary.data().iter().map(|d| d.class).collect();
        assert_eq!(classes, vec![ClassId(7), ClassId(8)]);
    }

    #[test]
    fn test_no_dedup() {
        let mut summary = AllocationSummary::new(CollectionId(2), Counter(10), Timestamp(1_000));
        summary.record(ClassId(1), 1, 10, 0, 0);
        summary.record(ClassId(1), 2, 20, 0, 0);
        assert_eq!(summary.class_count(), 2);
    }

    #[test]
    fn test_close_fixes_end_fields() {
        let mut summary = AllocationSummary::new(CollectionId(1), Counter(10), Timestamp(1_000));
        assert_eq!(summary.end_counter(), Counter(10));
        assert_eq!(summary.end_time(), Timestamp(1_000));

        summary.close(Counter(99), Timestamp(9_000));
        assert_eq!(summary.end_counter(), Counter(99));
        assert_eq!(summary.end_time(), Timestamp(9_000));
    }
}
