//! Domain model for the profiler event decoder
//!
//! This module contains core domain types and errors that provide:
//! - Compile-time safety via newtype pattern
//! - Self-documenting function signatures
//! - Structured error handling

pub mod errors;
pub mod types;

// Re-export common types for convenience
pub use types::{
    Address, ClassId, CollectionId, Counter, FunctionId, MethodId, ObjectId, ProfilerFlags,
    RegionId, SnapshotHandle, ThreadId, Timestamp,
};

pub use errors::HeapError;
