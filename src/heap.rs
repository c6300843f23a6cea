//! Heap snapshot graph engine
//!
//! One [`HeapSnapshot`] owns the object graph of a single collection. The
//! graph is built in two phases:
//!
//! 1. **Open** — [`HeapSnapshot::new_heap_object`] ingests objects as the
//!    report stream mentions them. An object referenced before it is
//!    reported gets a placeholder entry (no class yet); each incoming edge
//!    bumps the target's pending in-degree so finalization knows roughly how
//!    much fan-in to expect.
//! 2. **Sealed** — one [`HeapSnapshot::initialize_back_references`] call
//!    prunes objects that never got a class ("bad objects": mentioned as a
//!    reference target, never reported), drops forward edges into them, and
//!    fills an exactly-sized back-reference list per surviving object.
//!
//! The table is the single owner of all nodes, keyed by [`ObjectId`]; edges
//! are stored as IDs into that table, so cyclic graphs need no ownership
//! tricks. Back-reference data is only meaningful once sealed; ingesting
//! after sealing is a protocol error, not a data error.

use std::collections::HashMap;

use log::{info, warn};

use crate::domain::{ClassId, CollectionId, Counter, HeapError, ObjectId, Timestamp};

/// One object in a snapshot's graph.
#[derive(Debug)]
pub struct HeapObject {
    id: ObjectId,
    /// `None` while the object is only known as a reference target. Still
    /// `None` at finalization marks it as a bad object.
    class: Option<ClassId>,
    size: u32,
    references: Vec<ObjectId>,
    back_references: Vec<ObjectId>,
    /// In-degree accrued during ingestion. Superseded at finalization,
    /// which recounts over surviving edges only.
    pending_back_refs: usize,
}

impl HeapObject {
    fn placeholder(id: ObjectId) -> Self {
        Self {
            id,
            class: None,
            size: 0,
            references: Vec::new(),
            back_references: Vec::new(),
            pending_back_refs: 0,
        }
    }

    #[must_use]
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// The object's class, if it has been fully reported.
    #[must_use]
    pub fn class(&self) -> Option<ClassId> {
        self.class
    }

    #[must_use]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Forward references. Valid as soon as ingested; after finalization the
    /// list contains only surviving objects.
    #[must_use]
    pub fn references(&self) -> &[ObjectId] {
        &self.references
    }

    /// Objects holding a forward reference to this one. Empty until the
    /// owning snapshot is finalized.
    #[must_use]
    pub fn back_references(&self) -> &[ObjectId] {
        &self.back_references
    }
}

/// The object graph of one collection's heap report.
#[derive(Debug)]
pub struct HeapSnapshot {
    collection: CollectionId,
    start_counter: Counter,
    start_time: Timestamp,
    end_counter: Counter,
    end_time: Timestamp,
    record_snapshot: bool,
    objects: HashMap<ObjectId, HeapObject>,
    sealed: bool,
}

impl HeapSnapshot {
    #[must_use]
    pub fn new(
        collection: CollectionId,
        start_counter: Counter,
        start_time: Timestamp,
        end_counter: Counter,
        end_time: Timestamp,
        record_snapshot: bool,
    ) -> Self {
        Self {
            collection,
            start_counter,
            start_time,
            end_counter,
            end_time,
            record_snapshot,
            objects: HashMap::new(),
            sealed: false,
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

    /// Whether this snapshot materializes an object graph at all.
    #[must_use]
    pub fn record_snapshot(&self) -> bool {
        self.record_snapshot
    }

    /// True once `initialize_back_references` has run.
    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Ingest one reported object.
    ///
    /// Resolves or creates the entry for `id` and for every referenced ID,
    /// bumps each target's pending in-degree, and overwrites `id`'s class,
    /// size and forward-reference list (last write wins, so a placeholder
    /// created by an earlier mention gets fully populated here).
    ///
    /// Returns `Ok(None)` without touching anything when the snapshot does
    /// not record an object graph.
    ///
    /// # Errors
    /// [`HeapError::SealedSnapshot`] when called after finalization; that is
    /// a defect in the integration, not a data problem.
    pub fn new_heap_object(
        &mut self,
        id: ObjectId,
        class: ClassId,
        size: u32,
        reference_ids: &[ObjectId],
    ) -> Result<Option<ObjectId>, HeapError> {
        if self.sealed {
            return Err(HeapError::SealedSnapshot(self.collection));
        }
        if !self.record_snapshot {
            return Ok(None);
        }

        for &target in reference_ids {
            self.resolve_or_create(target).pending_back_refs += 1;
        }
        let object = self.resolve_or_create(id);
        object.class = Some(class);
        object.size = size;
        object.references = reference_ids.to_vec();
        Ok(Some(id))
    }

    fn resolve_or_create(&mut self, id: ObjectId) -> &mut HeapObject {
        self.objects.entry(id).or_insert_with(|| HeapObject::placeholder(id))
    }

    /// Seal the snapshot: prune bad objects and compute exact back edges.
    ///
    /// Objects never reported with a class are removed from the table, and
    /// forward edges into them are dropped from every survivor. Back
    /// references are then rebuilt from the surviving edges alone, so each
    /// object's list is exactly its final in-degree — pending counters from
    /// ingestion over-count by edges whose source or duplicate report was
    /// discarded, and are not trusted here.
    ///
    /// # Errors
    /// [`HeapError::AlreadyFinalized`] on a second call.
    pub fn initialize_back_references(&mut self) -> Result<(), HeapError> {
        if self.sealed {
            return Err(HeapError::AlreadyFinalized(self.collection));
        }

        let bad: Vec<ObjectId> =
            self.objects.values().filter(|o| o.class.is_none()).map(|o| o.id).collect();
        for id in &bad {
            self.objects.remove(id);
        }
        if !bad.is_empty() {
            warn!("{}: pruned {} undefined heap objects", self.collection, bad.len());
        }

        // Drop edges into pruned objects and collect the surviving edge set.
        let ids: Vec<ObjectId> = self.objects.keys().copied().collect();
        let mut edges: Vec<(ObjectId, ObjectId)> = Vec::new();
        for &id in &ids {
            let references = match self.objects.get(&id) {
                Some(object) => object.references.clone(),
                None => continue,
            };
            let surviving: Vec<ObjectId> =
                references.into_iter().filter(|t| self.objects.contains_key(t)).collect();
            for &target in &surviving {
                edges.push((id, target));
            }
            if let Some(object) = self.objects.get_mut(&id) {
                object.references = surviving;
            }
        }

        // Recount in-degrees over the surviving edges, then allocate
        // exact-size back-reference lists from them.
        for object in self.objects.values_mut() {
            object.pending_back_refs = 0;
        }
        for &(_, target) in &edges {
            if let Some(object) = self.objects.get_mut(&target) {
                object.pending_back_refs += 1;
            }
        }
        for object in self.objects.values_mut() {
            object.back_references = Vec::with_capacity(object.pending_back_refs);
        }
        for (source, target) in edges {
            if let Some(object) = self.objects.get_mut(&target) {
                object.back_references.push(source);
            }
        }

        self.sealed = true;
        info!("{}: sealed with {} heap objects", self.collection, self.objects.len());
        Ok(())
    }

    /// Look up an object by identity. Forward-reference data is valid as
    /// soon as ingested; back references only once sealed.
    #[must_use]
    pub fn get_heap_object(&self, id: ObjectId) -> Option<&HeapObject> {
        self.objects.get(&id)
    }

    /// All objects in the table, in no particular order.
    pub fn heap_objects(&self) -> impl Iterator<Item = &HeapObject> {
        self.objects.values()
    }

    #[must_use]
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(record: bool) -> HeapSnapshot {
        HeapSnapshot::new(
            CollectionId(1),
            Counter(100),
            Timestamp(1_000_000),
            Counter(200),
            Timestamp(2_000_000),
            record,
        )
    }

    fn back_refs_sorted(snapshot: &HeapSnapshot, id: ObjectId) -> Vec<ObjectId> {
        let mut refs = snapshot
            .get_heap_object(id)
            .map(|o| o.back_references().to_vec())
            .unwrap_or_default();
        refs.sort();
        refs
    }

    #[test]
    fn test_cycle_back_references() {
        let mut snap = snapshot(true);
        let (a, b, c) = (ObjectId(1), ObjectId(2), ObjectId(3));
        snap.new_heap_object(a, ClassId(1), 16, &[b]).unwrap();
        snap.new_heap_object(b, ClassId(1), 16, &[c]).unwrap();
        snap.new_heap_object(c, ClassId(1), 16, &[a]).unwrap();
        snap.initialize_back_references().unwrap();

        assert_eq!(snap.object_count(), 3);
        assert_eq!(back_refs_sorted(&snap, a), vec![c]);
        assert_eq!(back_refs_sorted(&snap, b), vec![a]);
        assert_eq!(back_refs_sorted(&snap, c), vec![b]);
    }

    #[test]
    fn test_placeholder_populated_later() {
        let mut snap = snapshot(true);
        // object 2 mentions object 1 before object 1 is reported
        snap.new_heap_object(ObjectId(2), ClassId(1), 32, &[ObjectId(1)]).unwrap();
        snap.new_heap_object(ObjectId(1), ClassId(2), 8, &[]).unwrap();
        snap.initialize_back_references().unwrap();

        let one = snap.get_heap_object(ObjectId(1)).unwrap();
        assert_eq!(one.class(), Some(ClassId(2)));
        assert_eq!(one.size(), 8);
        assert_eq!(one.back_references(), &[ObjectId(2)]);
    }

    #[test]
    fn test_bad_object_pruned() {
        let mut snap = snapshot(true);
        // object 9 is only ever a dangling reference target
        snap.new_heap_object(ObjectId(1), ClassId(1), 16, &[ObjectId(9), ObjectId(2)]).unwrap();
        snap.new_heap_object(ObjectId(2), ClassId(1), 16, &[]).unwrap();
        snap.initialize_back_references().unwrap();

        assert_eq!(snap.object_count(), 2);
        assert!(snap.get_heap_object(ObjectId(9)).is_none());
        let one = snap.get_heap_object(ObjectId(1)).unwrap();
        assert_eq!(one.references(), &[ObjectId(2)]);
    }

    #[test]
    fn test_back_ref_sizes_match_surviving_edges() {
        let mut snap = snapshot(true);
        // 2 -> 7 where 7 is never reported; 3 -> 1
        snap.new_heap_object(ObjectId(2), ClassId(1), 16, &[ObjectId(7)]).unwrap();
        snap.new_heap_object(ObjectId(1), ClassId(1), 16, &[]).unwrap();
        snap.new_heap_object(ObjectId(3), ClassId(1), 16, &[ObjectId(1)]).unwrap();
        snap.initialize_back_references().unwrap();

        assert!(snap.get_heap_object(ObjectId(7)).is_none());
        assert!(snap.get_heap_object(ObjectId(2)).unwrap().references().is_empty());
        let one = snap.get_heap_object(ObjectId(1)).unwrap();
        assert_eq!(one.back_references(), &[ObjectId(3)]);
    }

    #[test]
    fn test_last_write_wins() {
        let mut snap = snapshot(true);
        snap.new_heap_object(ObjectId(1), ClassId(1), 16, &[ObjectId(2)]).unwrap();
        snap.new_heap_object(ObjectId(2), ClassId(1), 8, &[]).unwrap();
        snap.new_heap_object(ObjectId(3), ClassId(1), 8, &[]).unwrap();
        // re-report object 1 with different attributes
        snap.new_heap_object(ObjectId(1), ClassId(2), 32, &[ObjectId(3)]).unwrap();
        snap.initialize_back_references().unwrap();

        let one = snap.get_heap_object(ObjectId(1)).unwrap();
        assert_eq!(one.class(), Some(ClassId(2)));
        assert_eq!(one.size(), 32);
        assert_eq!(one.references(), &[ObjectId(3)]);
        // object 2's stale in-degree from the first report is corrected
        assert!(snap.get_heap_object(ObjectId(2)).unwrap().back_references().is_empty());
        assert_eq!(snap.get_heap_object(ObjectId(3)).unwrap().back_references(), &[ObjectId(1)]);
    }

    #[test]
    fn test_not_recording_is_noop() {
        let mut snap = snapshot(false);
        let created = snap.new_heap_object(ObjectId(1), ClassId(1), 16, &[ObjectId(2)]).unwrap();
        assert!(created.is_none());
        snap.initialize_back_references().unwrap();
        assert_eq!(snap.object_count(), 0);
        assert_eq!(snap.heap_objects().count(), 0);
    }

    #[test]
    fn test_ingest_after_seal_is_error() {
        let mut snap = snapshot(true);
        snap.initialize_back_references().unwrap();
        let err = snap.new_heap_object(ObjectId(1), ClassId(1), 16, &[]).unwrap_err();
        assert!(matches!(err, HeapError::SealedSnapshot(CollectionId(1))));
    }

    #[test]
    fn test_double_finalize_is_error() {
        let mut snap = snapshot(true);
        snap.initialize_back_references().unwrap();
        let err = snap.initialize_back_references().unwrap_err();
        assert!(matches!(err, HeapError::AlreadyFinalized(CollectionId(1))));
    }

    #[test]
    fn test_self_reference() {
        let mut snap = snapshot(true);
        snap.new_heap_object(ObjectId(1), ClassId(1), 16, &[ObjectId(1)]).unwrap();
        snap.initialize_back_references().unwrap();

        let one = snap.get_heap_object(ObjectId(1)).unwrap();
        assert_eq!(one.references(), &[ObjectId(1)]);
        assert_eq!(one.back_references(), &[ObjectId(1)]);
    }
}
