//! # Profiler Model - In-Memory Decoding Model for Profiler Event Streams
//!
//! This crate assembles a runtime profiler's typed event stream (class and
//! method lifecycle, GC phases, thread activity, statistical samples, heap
//! snapshots, allocation summaries) into a queryable object model. It never
//! touches raw bytes: an external log reader tokenizes the binary log and
//! drives the [`events::ProfilerEventHandler`] protocol with already-decoded
//! IDs, strings, counters and timestamps.
//!
//! ## Architecture Overview
//!
//! ```text
//! external log reader
//!         │  ProfilerEventHandler calls
//!         ▼
//! ┌──────────────────┐   ElementFactory   ┌──────────────────┐
//! │  LoadedElements  │◀───────────────────│  DefaultFactory  │
//! │  (ID + address   │                    │  (+ inspector-   │
//! │   indexes)       │                    │   seeded regions)│
//! └────────┬─────────┘                    └──────────────────┘
//!          │ owns
//!          ▼
//! ┌──────────────────┐      ┌──────────────────────┐
//! │  HeapSnapshot    │      │  AllocationSummary   │
//! │  (object graph,  │      │  (per-class counts,  │
//! │   back refs on   │      │   sorted by bytes)   │
//! │   finalization)  │      └──────────────────────┘
//! └──────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! - [`domain`]: ID newtypes, counters, timestamps, flags, and error types
//! - [`elements`]: entity records and the injected [`elements::ElementFactory`]
//! - [`region`]: executable memory regions with sorted native-function ranges
//! - [`registry`]: the sparse ID-indexed store with address-ordered region search
//! - [`heap`]: the two-phase heap object graph (ingest, then seal with exact
//!   back references and bad-object pruning)
//! - [`summary`]: per-collection allocation aggregates
//! - [`events`]: the event protocol trait with default no-op bodies
//! - [`inspect`]: ELF symbol inspector seeding region function lists
//!
//! ## Concurrency
//!
//! The model is single-threaded by design: one event source delivers one
//! ordered stream of calls and nothing here blocks, suspends or spawns.
//! Distinct heap snapshots are independent and may be built on separate
//! threads if never shared; that is a caller-level arrangement.

pub mod domain;
pub mod elements;
pub mod events;
pub mod heap;
pub mod inspect;
pub mod region;
pub mod registry;
pub mod summary;

pub use domain::{
    Address, ClassId, CollectionId, Counter, FunctionId, HeapError, MethodId, ObjectId,
    ProfilerFlags, RegionId, SnapshotHandle, ThreadId, Timestamp,
};
pub use elements::{DefaultFactory, ElementFactory, LoadedClass, LoadedElement, LoadedMethod,
    UnmanagedFunction};
pub use events::{BasicEventHandler, ProfilerEventHandler};
pub use heap::{HeapObject, HeapSnapshot};
pub use inspect::ElfInspector;
pub use region::{ExecutableRegion, MappedRegion, NullInspector, RegionFunction, RegionInspector};
pub use registry::LoadedElements;
pub use summary::{AllocationClassData, AllocationSummary};
