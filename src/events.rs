//! The profiler event protocol
//!
//! [`ProfilerEventHandler`] is the contract an upstream log reader drives:
//! one ordered, single-threaded stream of callbacks covering the whole
//! session. Paired phases are expected to nest correctly (session brackets
//! blocks, a GC brackets its mark/sweep/world phases, a heap report brackets
//! its object events); the model does not validate nesting — a malformed
//! sequence from the reader is the reader's bug.
//!
//! Every event method has a default no-op body, so a consumer overrides only
//! the events it cares about. Entities are passed by ID newtype and resolved
//! against the handler's [`LoadedElements`] registry; heap snapshots by the
//! [`SnapshotHandle`] the registry returned when the snapshot was created.
//!
//! [`BasicEventHandler`] is the ready-made base: it owns a registry and
//! overrides nothing.

use crate::domain::{
    Address, ClassId, CollectionId, Counter, FunctionId, MethodId, ObjectId, ProfilerFlags,
    RegionId, SnapshotHandle, ThreadId, Timestamp,
};
use crate::elements::ElementFactory;
use crate::registry::LoadedElements;

/// Ordered callback contract for one profiling session.
#[allow(unused_variables)]
pub trait ProfilerEventHandler {
    type Factory: ElementFactory;

    /// The registry collecting everything this session loads.
    fn loaded_elements(&self) -> &LoadedElements<Self::Factory>;

    fn loaded_elements_mut(&mut self) -> &mut LoadedElements<Self::Factory>;

    // --- session ---

    fn start(
        &mut self,
        version: u32,
        runtime_file: &str,
        flags: ProfilerFlags,
        start_counter: Counter,
        start_time: Timestamp,
    ) {
    }

    fn end(&mut self, version: u32, end_counter: Counter, end_time: Timestamp) {}

    // --- per-thread event blocks ---

    fn start_block(&mut self, start_counter: Counter, start_time: Timestamp, thread: ThreadId) {}

    fn end_block(&mut self, end_counter: Counter, end_time: Timestamp, thread: ThreadId) {}

    // --- loader events ---

    fn module_loaded(
        &mut self,
        thread: ThreadId,
        start_counter: Counter,
        end_counter: Counter,
        name: &str,
        success: bool,
    ) {
    }

    fn module_unloaded(
        &mut self,
        thread: ThreadId,
        start_counter: Counter,
        end_counter: Counter,
        name: &str,
    ) {
    }

    fn assembly_loaded(
        &mut self,
        thread: ThreadId,
        start_counter: Counter,
        end_counter: Counter,
        name: &str,
        success: bool,
    ) {
    }

    fn assembly_unloaded(
        &mut self,
        thread: ThreadId,
        start_counter: Counter,
        end_counter: Counter,
        name: &str,
    ) {
    }

    fn application_domain_loaded(
        &mut self,
        thread: ThreadId,
        start_counter: Counter,
        end_counter: Counter,
        name: &str,
        success: bool,
    ) {
    }

    fn application_domain_unloaded(
        &mut self,
        thread: ThreadId,
        start_counter: Counter,
        end_counter: Counter,
        name: &str,
    ) {
    }

    fn set_current_thread(&mut self, thread: ThreadId) {}

    // --- class lifecycle ---

    fn class_start_load(&mut self, class: ClassId, counter: Counter) {}

    fn class_end_load(&mut self, class: ClassId, counter: Counter, success: bool) {}

    fn class_start_unload(&mut self, class: ClassId, counter: Counter) {}

    fn class_end_unload(&mut self, class: ClassId, counter: Counter) {}

    // --- allocation and exceptions ---

    fn allocation(&mut self, class: ClassId, size: u32) {}

    fn exception(&mut self, class: ClassId, counter: Counter) {}

    // --- method lifecycle ---

    fn method_enter(&mut self, method: MethodId, counter: Counter) {}

    fn method_exit(&mut self, method: MethodId, counter: Counter) {}

    fn method_jit_start(&mut self, method: MethodId, counter: Counter) {}

    fn method_jit_end(&mut self, method: MethodId, counter: Counter, success: bool) {}

    fn method_freed(&mut self, method: MethodId, counter: Counter) {}

    // --- statistical samples ---

    fn method_statistical_hit(&mut self, method: MethodId) {}

    fn unknown_method_statistical_hit(&mut self) {}

    /// Hit attributed to an unmanaged function resolved by absolute ID.
    fn unmanaged_function_statistical_hit(&mut self, function: FunctionId) {}

    /// Hit attributed to a function resolved within a region's sorted list.
    fn region_function_statistical_hit(&mut self, region: RegionId, offset: u32) {}

    /// Hit inside a known region at an offset no function covers.
    fn unknown_region_statistical_hit(&mut self, region: RegionId, offset: u32) {}

    /// Hit at an address outside every known region.
    fn unknown_address_statistical_hit(&mut self, address: Address) {}

    /// Announces that the next `depth` hits form one sampled call chain.
    fn statistical_call_chain_start(&mut self, depth: u32) {}

    // --- threads ---

    fn thread_start(&mut self, thread: ThreadId, counter: Counter) {}

    fn thread_end(&mut self, thread: ThreadId, counter: Counter) {}

    // --- garbage collection ---

    fn garbage_collection_start(&mut self, collection: CollectionId, generation: u32, counter: Counter) {
    }

    fn garbage_collection_end(&mut self, collection: CollectionId, generation: u32, counter: Counter) {
    }

    fn garbage_collection_mark_start(
        &mut self,
        collection: CollectionId,
        generation: u32,
        counter: Counter,
    ) {
    }

    fn garbage_collection_mark_end(
        &mut self,
        collection: CollectionId,
        generation: u32,
        counter: Counter,
    ) {
    }

    fn garbage_collection_sweep_start(
        &mut self,
        collection: CollectionId,
        generation: u32,
        counter: Counter,
    ) {
    }

    fn garbage_collection_sweep_end(
        &mut self,
        collection: CollectionId,
        generation: u32,
        counter: Counter,
    ) {
    }

    /// Unpaired: the heap was resized during the collection.
    fn garbage_collection_resize(&mut self, collection: CollectionId, new_size: u64) {}

    fn garbage_collection_stop_world_start(
        &mut self,
        collection: CollectionId,
        generation: u32,
        counter: Counter,
    ) {
    }

    fn garbage_collection_stop_world_end(
        &mut self,
        collection: CollectionId,
        generation: u32,
        counter: Counter,
    ) {
    }

    fn garbage_collection_start_world_start(
        &mut self,
        collection: CollectionId,
        generation: u32,
        counter: Counter,
    ) {
    }

    fn garbage_collection_start_world_end(
        &mut self,
        collection: CollectionId,
        generation: u32,
        counter: Counter,
    ) {
    }

    // --- heap report ---

    /// `snapshot` must be the handle returned by the registry's
    /// `new_heap_snapshot` for this report.
    fn heap_report_start(&mut self, snapshot: SnapshotHandle) {}

    fn heap_object_unreachable(&mut self, class: ClassId, size: u32) {}

    fn heap_object_reachable(&mut self, object: ObjectId) {}

    fn heap_report_end(&mut self, snapshot: SnapshotHandle) {}

    // --- allocation summary ---

    fn allocation_summary_start(
        &mut self,
        collection: CollectionId,
        start_counter: Counter,
        start_time: Timestamp,
    ) {
    }

    fn class_allocation_summary(
        &mut self,
        class: ClassId,
        reachable_instances: u32,
        reachable_bytes: u32,
        unreachable_instances: u32,
        unreachable_bytes: u32,
    ) {
    }

    fn allocation_summary_end(
        &mut self,
        collection: CollectionId,
        end_counter: Counter,
        end_time: Timestamp,
    ) {
    }
}

/// Event handler that reacts to nothing.
///
/// Owns the registry the reader populates between callbacks and keeps every
/// event at its default no-op, so consumers can embed it (or copy its shape)
/// and override only the events relevant to them.
pub struct BasicEventHandler<F: ElementFactory> {
    elements: LoadedElements<F>,
}

impl<F: ElementFactory> BasicEventHandler<F> {
    #[must_use]
    pub fn new(factory: F) -> Self {
        Self { elements: LoadedElements::new(factory) }
    }
}

impl<F: ElementFactory> ProfilerEventHandler for BasicEventHandler<F> {
    type Factory = F;

    fn loaded_elements(&self) -> &LoadedElements<F> {
        &self.elements
    }

    fn loaded_elements_mut(&mut self) -> &mut LoadedElements<F> {
        &mut self.elements
    }
}
