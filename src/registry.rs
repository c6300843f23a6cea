//! Registry of loaded program elements
//!
//! [`LoadedElements`] owns every entity the event stream reports: classes,
//! methods, unmanaged functions and executable memory regions are indexed by
//! their source-assigned ID in sparse growable arrays, regions additionally
//! by address in an explicitly sorted list. Heap snapshots and allocation
//! summaries are appended to plain lists and handed back by handle.
//!
//! ID lookup is direct indexing; enumeration yields only populated slots.
//! Address lookup binary-searches the sorted region order, which is only
//! rebuilt on an explicit [`LoadedElements::sort_executable_memory_regions`]
//! call — callers must re-sort after a batch of insertions before relying on
//! address queries.

use log::{debug, info, warn};

use crate::domain::{
    Address, ClassId, CollectionId, Counter, FunctionId, MethodId, RegionId, SnapshotHandle,
    Timestamp,
};
use crate::elements::ElementFactory;
use crate::heap::HeapSnapshot;
use crate::region::ExecutableRegion;
use crate::summary::AllocationSummary;

/// Starting capacities for the ID indexes. Typical profiled programs load a
/// few hundred classes and a few thousand methods before the first resize.
const INITIAL_CLASS_SLOTS: usize = 1000;
const INITIAL_METHOD_SLOTS: usize = 5000;
const INITIAL_FUNCTION_SLOTS: usize = 1000;

/// Sparse array keyed by source-assigned numeric ID.
///
/// Inserting past the current capacity grows the backing storage to
/// `(id + 1) * 2` slots, so arbitrary out-of-range IDs are handled by growth
/// rather than error. `len` counts populated slots, independent of capacity.
#[derive(Debug)]
pub struct SparseVec<T> {
    slots: Vec<Option<T>>,
    len: usize,
}

impl<T> SparseVec<T> {
    #[must_use]
    pub fn new() -> Self {
        Self { slots: Vec::new(), len: 0 }
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let mut slots = Vec::new();
        slots.resize_with(capacity, || None);
        Self { slots, len: 0 }
    }

    /// Store `value` at `id`, growing if needed. Returns the stored value.
    /// Re-inserting an occupied ID replaces the previous entry.
    pub fn insert(&mut self, id: u32, value: T) -> &mut T {
        let index = id as usize;
        if index >= self.slots.len() {
            self.slots.resize_with((index + 1) * 2, || None);
        }
        let slot = &mut self.slots[index];
        if slot.is_none() {
            self.len += 1;
        }
        slot.insert(value)
    }

    #[must_use]
    pub fn get(&self, id: u32) -> Option<&T> {
        self.slots.get(id as usize).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut T> {
        self.slots.get_mut(id as usize).and_then(Option::as_mut)
    }

    /// Number of populated slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate over populated entries only.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().filter_map(Option::as_ref)
    }
}

impl<T> Default for SparseVec<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// The indexed store of everything the event stream has loaded.
///
/// Attribute construction is delegated to the injected [`ElementFactory`];
/// the registry only indexes what the factory produces.
pub struct LoadedElements<F: ElementFactory> {
    factory: F,
    classes: SparseVec<F::Class>,
    methods: SparseVec<F::Method>,
    functions: SparseVec<F::Function>,
    regions: SparseVec<F::Region>,
    /// Region IDs in start-address order; only valid after
    /// `sort_executable_memory_regions`.
    address_order: Vec<RegionId>,
    snapshots: Vec<HeapSnapshot>,
    summaries: Vec<AllocationSummary>,
}

impl<F: ElementFactory> LoadedElements<F> {
    #[must_use]
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            classes: SparseVec::with_capacity(INITIAL_CLASS_SLOTS),
            methods: SparseVec::with_capacity(INITIAL_METHOD_SLOTS),
            functions: SparseVec::with_capacity(INITIAL_FUNCTION_SLOTS),
            regions: SparseVec::new(),
            address_order: Vec::new(),
            snapshots: Vec::new(),
            summaries: Vec::new(),
        }
    }

    pub fn new_class(&mut self, id: ClassId, name: &str, size: u32) -> &F::Class {
        debug!("class loaded: {id} {name} ({size} bytes)");
        let class = self.factory.new_class(id, name, size);
        self.classes.insert(id.0, class)
    }

    #[must_use]
    pub fn get_class(&self, id: ClassId) -> Option<&F::Class> {
        self.classes.get(id.0)
    }

    pub fn classes(&self) -> impl Iterator<Item = &F::Class> {
        self.classes.iter()
    }

    pub fn new_method(&mut self, id: MethodId, class: ClassId, name: &str) -> &F::Method {
        debug!("method loaded: {id} {name} in {class}");
        let method = self.factory.new_method(id, class, name);
        self.methods.insert(id.0, method)
    }

    #[must_use]
    pub fn get_method(&self, id: MethodId) -> Option<&F::Method> {
        self.methods.get(id.0)
    }

    pub fn methods(&self) -> impl Iterator<Item = &F::Method> {
        self.methods.iter()
    }

    pub fn new_unmanaged_function(
        &mut self,
        id: FunctionId,
        name: &str,
        region: RegionId,
    ) -> &F::Function {
        debug!("unmanaged function resolved: {id} {name} in {region}");
        let function = self.factory.new_unmanaged_function(id, name, region);
        self.functions.insert(id.0, function)
    }

    #[must_use]
    pub fn get_unmanaged_function(&self, id: FunctionId) -> Option<&F::Function> {
        self.functions.get(id.0)
    }

    pub fn unmanaged_functions(&self) -> impl Iterator<Item = &F::Function> {
        self.functions.iter()
    }

    pub fn new_executable_memory_region(
        &mut self,
        id: RegionId,
        file_name: &str,
        file_offset: u32,
        start_address: Address,
        end_address: Address,
    ) -> &F::Region {
        debug!("region mapped: {id} {file_name} {start_address}-{end_address}");
        let region = self.factory.new_executable_memory_region(
            id,
            file_name,
            file_offset,
            start_address,
            end_address,
        );
        self.address_order.push(id);
        self.regions.insert(id.0, region)
    }

    #[must_use]
    pub fn get_executable_memory_region(&self, id: RegionId) -> Option<&F::Region> {
        self.regions.get(id.0)
    }

    pub fn get_executable_memory_region_mut(&mut self, id: RegionId) -> Option<&mut F::Region> {
        self.regions.get_mut(id.0)
    }

    pub fn executable_memory_regions(&self) -> impl Iterator<Item = &F::Region> {
        self.regions.iter()
    }

    /// Rebuild the start-address order of the region list.
    ///
    /// Sorting is not automatic on insert; call this after a batch of region
    /// insertions and before any [`region_at_address`](Self::region_at_address)
    /// query.
    pub fn sort_executable_memory_regions(&mut self) {
        let mut order = std::mem::take(&mut self.address_order);
        order.sort_by_key(|id| {
            self.regions.get(id.0).map_or(u64::MAX, |r| r.start_address().0)
        });
        self.address_order = order;
    }

    /// Find the region whose `[start_address, end_address]` range contains
    /// `address`. Inclusive on both ends; `None` for gaps and unmapped
    /// addresses.
    #[must_use]
    pub fn region_at_address(&self, address: Address) -> Option<&F::Region> {
        let mut low = 0;
        let mut high = self.address_order.len();
        while low < high {
            let mid = low + (high - low) / 2;
            let region = self.regions.get(self.address_order[mid].0)?;
            if address < region.start_address() {
                high = mid;
            } else if address > region.end_address() {
                low = mid + 1;
            } else {
                return Some(region);
            }
        }
        None
    }

    /// Drop a region from the address order (module unload). The region
    /// stays resolvable by ID for historical lookups.
    pub fn invalidate_executable_memory_region(&mut self, id: RegionId) {
        let before = self.address_order.len();
        self.address_order.retain(|r| *r != id);
        if self.address_order.len() == before {
            warn!("invalidating {id}: not in the address index");
        }
    }

    pub fn new_heap_snapshot(
        &mut self,
        collection: CollectionId,
        start_counter: Counter,
        start_time: Timestamp,
        end_counter: Counter,
        end_time: Timestamp,
    ) -> SnapshotHandle {
        info!("heap snapshot for {collection} at {start_time}");
        let snapshot = self.factory.new_heap_snapshot(
            collection,
            start_counter,
            start_time,
            end_counter,
            end_time,
        );
        self.snapshots.push(snapshot);
        SnapshotHandle(self.snapshots.len() - 1)
    }

    #[must_use]
    pub fn heap_snapshot(&self, handle: SnapshotHandle) -> Option<&HeapSnapshot> {
        self.snapshots.get(handle.0)
    }

    pub fn heap_snapshot_mut(&mut self, handle: SnapshotHandle) -> Option<&mut HeapSnapshot> {
        self.snapshots.get_mut(handle.0)
    }

    #[must_use]
    pub fn heap_snapshots(&self) -> &[HeapSnapshot] {
        &self.snapshots
    }

    pub fn new_allocation_summary(
        &mut self,
        collection: CollectionId,
        start_counter: Counter,
        start_time: Timestamp,
    ) -> &mut AllocationSummary {
        debug!("allocation summary for {collection}");
        self.summaries.push(AllocationSummary::new(collection, start_counter, start_time));
        // just pushed, so the list is non-empty
        let last = self.summaries.len() - 1;
        &mut self.summaries[last]
    }

    #[must_use]
    pub fn allocation_summaries(&self) -> &[AllocationSummary] {
        &self.summaries
    }

    pub fn last_allocation_summary_mut(&mut self) -> Option<&mut AllocationSummary> {
        self.summaries.last_mut()
    }

    /// Whether snapshots created from here on materialize an object graph.
    #[must_use]
    pub fn record_heap_snapshots(&self) -> bool {
        self.factory.record_heap_snapshots()
    }

    pub fn set_record_heap_snapshots(&mut self, record: bool) {
        self.factory.set_record_heap_snapshots(record);
    }
}
