//! Entity records for loaded program elements
//!
//! Every element the profiled runtime reports (classes, jitted methods,
//! unmanaged functions) is a small immutable record carrying the identity the
//! runtime assigned to it. Kinds are distinguished by composition rather
//! than an inheritance chain: the [`LoadedElement`] trait is the one shared
//! capability (numeric identity plus a display name), and cross-entity links
//! are stored as ID newtypes resolved through the registry.
//!
//! Construction is delegated to an [`ElementFactory`], an injected strategy
//! that lets an integration substitute enriched element representations
//! without touching the registry's indexing or search logic.

use crate::domain::{
    Address, ClassId, CollectionId, Counter, FunctionId, MethodId, RegionId, Timestamp,
};
use crate::heap::HeapSnapshot;
use crate::region::{ExecutableRegion, MappedRegion, NullInspector, RegionInspector};

/// Shared identity of every loaded program element.
pub trait LoadedElement {
    /// The raw numeric ID assigned by the profiled runtime.
    fn element_id(&self) -> u32;

    /// Human-readable name (class name, method name, symbol, file path).
    fn name(&self) -> &str;
}

/// A class loaded by the profiled runtime.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LoadedClass {
    pub id: ClassId,
    pub name: String,
    /// Instance size in bytes.
    pub size: u32,
}

impl LoadedElement for LoadedClass {
    fn element_id(&self) -> u32 {
        self.id.0
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// A managed method, linked back to its owning class by ID.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LoadedMethod {
    pub id: MethodId,
    pub class: ClassId,
    pub name: String,
}

impl LoadedElement for LoadedMethod {
    fn element_id(&self) -> u32 {
        self.id.0
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// An unmanaged function resolved by absolute ID rather than by
/// region + offset, linked back to the region it lives in.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct UnmanagedFunction {
    pub id: FunctionId,
    pub name: String,
    pub region: RegionId,
}

impl LoadedElement for UnmanagedFunction {
    fn element_id(&self) -> u32 {
        self.id.0
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Injected construction strategy for the entities the registry stores.
///
/// The factory is a pure construction capability: it holds no index state.
/// The associated types carry only the bounds the registry's indexing and
/// address search actually need, so an implementation can return enriched
/// records (say, classes annotated with source metadata) and the registry
/// will store and search them unchanged.
pub trait ElementFactory {
    type Class: LoadedElement;
    type Method: LoadedElement;
    type Function: LoadedElement;
    type Region: ExecutableRegion;

    fn new_class(&mut self, id: ClassId, name: &str, size: u32) -> Self::Class;

    fn new_method(&mut self, id: MethodId, class: ClassId, name: &str) -> Self::Method;

    fn new_unmanaged_function(&mut self, id: FunctionId, name: &str, region: RegionId)
        -> Self::Function;

    fn new_executable_memory_region(
        &mut self,
        id: RegionId,
        file_name: &str,
        file_offset: u32,
        start_address: Address,
        end_address: Address,
    ) -> Self::Region;

    fn new_heap_snapshot(
        &mut self,
        collection: CollectionId,
        start_counter: Counter,
        start_time: Timestamp,
        end_counter: Counter,
        end_time: Timestamp,
    ) -> HeapSnapshot {
        HeapSnapshot::new(
            collection,
            start_counter,
            start_time,
            end_counter,
            end_time,
            self.record_heap_snapshots(),
        )
    }

    /// Whether snapshots created from here on materialize an object graph.
    fn record_heap_snapshots(&self) -> bool;

    fn set_record_heap_snapshots(&mut self, record: bool);
}

/// Factory producing the plain entity records in this module.
///
/// Region construction consults the injected [`RegionInspector`] so a new
/// region starts out with whatever named functions the mapped file's symbol
/// table yields (zero is fine).
pub struct DefaultFactory {
    inspector: Box<dyn RegionInspector>,
    record_heap_snapshots: bool,
}

impl DefaultFactory {
    #[must_use]
    pub fn new(inspector: Box<dyn RegionInspector>) -> Self {
        Self { inspector, record_heap_snapshots: true }
    }
}

impl Default for DefaultFactory {
    fn default() -> Self {
        Self::new(Box::new(NullInspector))
    }
}

impl ElementFactory for DefaultFactory {
    type Class = LoadedClass;
    type Method = LoadedMethod;
    type Function = UnmanagedFunction;
    type Region = MappedRegion;

    fn new_class(&mut self, id: ClassId, name: &str, size: u32) -> LoadedClass {
        LoadedClass { id, name: name.to_string(), size }
    }

    fn new_method(&mut self, id: MethodId, class: ClassId, name: &str) -> LoadedMethod {
        LoadedMethod { id, class, name: name.to_string() }
    }

    fn new_unmanaged_function(
        &mut self,
        id: FunctionId,
        name: &str,
        region: RegionId,
    ) -> UnmanagedFunction {
        UnmanagedFunction { id, name: name.to_string(), region }
    }

    fn new_executable_memory_region(
        &mut self,
        id: RegionId,
        file_name: &str,
        file_offset: u32,
        start_address: Address,
        end_address: Address,
    ) -> MappedRegion {
        let mut region = MappedRegion::new(id, file_name, file_offset, start_address, end_address);
        for (name, offset) in self.inspector.functions(file_name, file_offset, region.size()) {
            region.new_function(&name, offset);
        }
        region
    }

    fn record_heap_snapshots(&self) -> bool {
        self.record_heap_snapshots
    }

    fn set_record_heap_snapshots(&mut self, record: bool) {
        self.record_heap_snapshots = record;
    }
}
