//! Domain types providing compile-time safety and self-documentation
//!
//! These newtype wrappers prevent common bugs like passing a method ID where
//! a class ID is expected, and make function signatures more expressive. All
//! identifiers are assigned by the profiled runtime and delivered through the
//! event stream; the model never invents them.

use std::fmt;

/// Identifier of a loaded class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ClassId(pub u32);

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "class:{}", self.0)
    }
}

/// Identifier of a loaded (managed) method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MethodId(pub u32);

impl fmt::Display for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "method:{}", self.0)
    }
}

/// Identifier of an unmanaged function resolved by absolute ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FunctionId(pub u32);

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn:{}", self.0)
    }
}

/// Identifier of an executable memory region (a mapped native module).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RegionId(pub u32);

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "region:{}", self.0)
    }
}

/// Identity of a heap object within one snapshot (its address in the
/// profiled process, so 64 bits wide unlike the other IDs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ObjectId(pub u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "obj:0x{:x}", self.0)
    }
}

/// Absolute address in the profiled process's address space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Address(pub u64);

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

/// Raw cycle-counter value recorded by the profiler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Counter(pub u64);

/// Wall-clock timestamp in nanoseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// Convert to seconds (f64)
    #[must_use]
    pub fn as_seconds(self) -> f64 {
        self.0 as f64 / 1_000_000_000.0
    }

    /// Convert to milliseconds (f64)
    #[must_use]
    pub fn as_millis(self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s", self.as_seconds())
    }
}

/// Garbage-collection cycle number, monotonically increasing per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CollectionId(pub u32);

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GC#{}", self.0)
    }
}

/// Thread ID as reported by the profiled runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ThreadId(pub u64);

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TID:{}", self.0)
    }
}

/// Handle to a heap snapshot held by the registry.
///
/// Unlike the ID newtypes above this is not a source-assigned identifier;
/// it is the position handed out by
/// [`LoadedElements::new_heap_snapshot`](crate::registry::LoadedElements::new_heap_snapshot)
/// and is only meaningful against the registry that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SnapshotHandle(pub usize);

/// Capability flags the profiler ran with, delivered with the session
/// start event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ProfilerFlags(pub u32);

impl ProfilerFlags {
    pub const APP_DOMAIN_EVENTS: ProfilerFlags = ProfilerFlags(1);
    pub const ASSEMBLY_EVENTS: ProfilerFlags = ProfilerFlags(1 << 1);
    pub const MODULE_EVENTS: ProfilerFlags = ProfilerFlags(1 << 2);
    pub const CLASS_EVENTS: ProfilerFlags = ProfilerFlags(1 << 3);
    pub const JIT_COMPILATION: ProfilerFlags = ProfilerFlags(1 << 4);
    pub const METHOD_ENTER_EXIT: ProfilerFlags = ProfilerFlags(1 << 5);
    pub const ALLOCATIONS: ProfilerFlags = ProfilerFlags(1 << 6);
    pub const GC_EVENTS: ProfilerFlags = ProfilerFlags(1 << 7);
    pub const HEAP_SNAPSHOT: ProfilerFlags = ProfilerFlags(1 << 8);
    pub const STATISTICAL_SAMPLING: ProfilerFlags = ProfilerFlags(1 << 9);

    /// Returns true if every flag in `other` is set in `self`.
    #[must_use]
    pub fn contains(self, other: ProfilerFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Union of two flag sets.
    #[must_use]
    pub fn union(self, other: ProfilerFlags) -> ProfilerFlags {
        ProfilerFlags(self.0 | other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display() {
        assert_eq!(ClassId(7).to_string(), "class:7");
        assert_eq!(MethodId(12).to_string(), "method:12");
        assert_eq!(ObjectId(0xdead).to_string(), "obj:0xdead");
        assert_eq!(Address(0x7f00).to_string(), "0x7f00");
        assert_eq!(CollectionId(3).to_string(), "GC#3");
    }

    #[test]
    fn test_timestamp_conversions() {
        let ts = Timestamp(1_500_000_000); // 1.5 seconds
        assert_eq!(ts.as_seconds(), 1.5);
        assert_eq!(ts.as_millis(), 1500.0);
    }

    #[test]
    fn test_profiler_flags() {
        let flags = ProfilerFlags::GC_EVENTS.union(ProfilerFlags::HEAP_SNAPSHOT);
        assert!(flags.contains(ProfilerFlags::GC_EVENTS));
        assert!(flags.contains(ProfilerFlags::HEAP_SNAPSHOT));
        assert!(!flags.contains(ProfilerFlags::ALLOCATIONS));
        assert!(flags.contains(ProfilerFlags::default()));
    }
}
