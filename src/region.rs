//! Executable memory regions and their native function ranges
//!
//! A region is one mapped block of native code (a loaded shared library or
//! the runtime binary itself) with an absolute address range and an ordered
//! set of named functions addressed by offset within the region.
//!
//! Function ranges arrive incrementally: each reported function starts out
//! as the single-point range `[offset, offset]`. Once every function for the
//! region is known, one explicit [`MappedRegion::sort_functions`] call sorts
//! the list by start offset and rewrites the end offsets so the ranges form
//! a contiguous partition (each end is the next start minus one, the last
//! end is the region's byte size). Offset lookups binary-search that sorted
//! order and treat both boundaries as inclusive.

use crate::domain::{Address, RegionId};
use crate::elements::LoadedElement;

/// Supplies the initial set of named functions for a freshly mapped region.
///
/// This is the boundary to the binary/file inspector collaborator: given the
/// mapped file and the region's position within it, yield zero or more
/// `(symbol name, offset within region)` pairs. See
/// [`ElfInspector`](crate::inspect::ElfInspector) for the ELF-backed
/// implementation.
pub trait RegionInspector {
    fn functions(&self, file_name: &str, file_offset: u32, size: u32) -> Vec<(String, u32)>;
}

/// Inspector that knows nothing; every region starts empty.
pub struct NullInspector;

impl RegionInspector for NullInspector {
    fn functions(&self, _file_name: &str, _file_offset: u32, _size: u32) -> Vec<(String, u32)> {
        Vec::new()
    }
}

/// A named native function within a region, addressed by offset.
///
/// `end_offset` is provisional (equal to `start_offset`) until the owning
/// region's `sort_functions` rewrites the ranges to be contiguous.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RegionFunction {
    pub name: String,
    pub start_offset: u32,
    pub end_offset: u32,
}

/// Address-range capability the registry needs from any region type.
pub trait ExecutableRegion: LoadedElement {
    fn start_address(&self) -> Address;
    fn end_address(&self) -> Address;
}

/// An executable memory region backed by a mapped file.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MappedRegion {
    id: RegionId,
    file_name: String,
    file_offset: u32,
    start_address: Address,
    end_address: Address,
    functions: Vec<RegionFunction>,
}

impl MappedRegion {
    #[must_use]
    pub fn new(
        id: RegionId,
        file_name: &str,
        file_offset: u32,
        start_address: Address,
        end_address: Address,
    ) -> Self {
        Self {
            id,
            file_name: file_name.to_string(),
            file_offset,
            start_address,
            end_address,
            functions: Vec::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> RegionId {
        self.id
    }

    #[must_use]
    pub fn file_offset(&self) -> u32 {
        self.file_offset
    }

    /// Region size in bytes. A malformed range with `end < start` counts
    /// as size 0 rather than panicking.
    #[must_use]
    pub fn size(&self) -> u32 {
        u32::try_from(self.end_address.0.saturating_sub(self.start_address.0)).unwrap_or(u32::MAX)
    }

    /// Append a function with the provisional single-point range
    /// `[offset, offset]`. Ranges stay provisional until
    /// [`sort_functions`](Self::sort_functions).
    pub fn new_function(&mut self, name: &str, offset: u32) -> &RegionFunction {
        self.functions.push(RegionFunction {
            name: name.to_string(),
            start_offset: offset,
            end_offset: offset,
        });
        // just pushed, so the list is non-empty
        &self.functions[self.functions.len() - 1]
    }

    /// Sort the function list by start offset and rewrite the end offsets so
    /// the ranges are contiguous: each function ends where the next one
    /// starts, and the last one ends at the region's byte size.
    ///
    /// Symbol tables routinely carry aliases at the same address
    /// (`memcpy`/`__memcpy`); only the first name at each start offset is
    /// kept, so the rewritten ranges stay well-formed.
    ///
    /// Must be called once all functions for the region are known; offset
    /// lookups are only meaningful afterwards.
    pub fn sort_functions(&mut self) {
        self.functions.sort_by_key(|f| f.start_offset);
        self.functions.dedup_by_key(|f| f.start_offset);
        let size = self.size();
        let count = self.functions.len();
        for i in 1..count {
            let next_start = self.functions[i].start_offset;
            self.functions[i - 1].end_offset = next_start - 1;
        }
        if let Some(last) = self.functions.last_mut() {
            last.end_offset = size;
        }
    }

    /// Find the function whose range contains `offset`, if any.
    ///
    /// Binary search over the sorted order established by
    /// [`sort_functions`](Self::sort_functions); a candidate matches when
    /// `start_offset <= offset <= end_offset`. Offsets below the first
    /// function or in a gap return `None`.
    #[must_use]
    pub fn get_function(&self, offset: u32) -> Option<&RegionFunction> {
        let mut low = 0;
        let mut high = self.functions.len();
        while low < high {
            let mid = low + (high - low) / 2;
            let function = &self.functions[mid];
            if offset < function.start_offset {
                high = mid;
            } else if offset > function.end_offset {
                low = mid + 1;
            } else {
                return Some(function);
            }
        }
        None
    }

    /// The function list in its current order.
    #[must_use]
    pub fn functions(&self) -> &[RegionFunction] {
        &self.functions
    }
}

impl LoadedElement for MappedRegion {
    fn element_id(&self) -> u32 {
        self.id.0
    }

    fn name(&self) -> &str {
        &self.file_name
    }
}

impl ExecutableRegion for MappedRegion {
    fn start_address(&self) -> Address {
        self.start_address
    }

    fn end_address(&self) -> Address {
        self.end_address
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn region_with(offsets: &[u32]) -> MappedRegion {
        let mut region =
            MappedRegion::new(RegionId(1), "/usr/lib/libtest.so", 0, Address(0x1000), Address(0x1000 + 0x4000));
        for (i, &offset) in offsets.iter().enumerate() {
            region.new_function(&format!("fn_{i}"), offset);
        }
        region
    }

    #[test]
    fn test_sort_rewrites_contiguous_ranges() {
        let mut region = region_with(&[0x300, 0x100, 0x200]);
        region.sort_functions();

        let functions = region.functions();
        assert_eq!(functions.len(), 3);
        assert_eq!(functions[0].start_offset, 0x100);
        assert_eq!(functions[0].end_offset, 0x1FF);
        assert_eq!(functions[1].start_offset, 0x200);
        assert_eq!(functions[1].end_offset, 0x2FF);
        assert_eq!(functions[2].start_offset, 0x300);
        assert_eq!(functions[2].end_offset, region.size());
    }

    #[test]
    fn test_sort_keeps_first_name_of_aliased_offsets() {
        // symbol aliases share an address, including at offset 0
        let mut region = region_with(&[]);
        region.new_function("memcpy", 0);
        region.new_function("__memcpy", 0);
        region.new_function("memset", 0x200);
        region.new_function("__memset", 0x200);
        region.sort_functions();

        let functions = region.functions();
        assert_eq!(functions.len(), 2);
        assert_eq!(functions[0].name, "memcpy");
        assert_eq!(functions[0].start_offset, 0);
        assert_eq!(functions[0].end_offset, 0x1FF);
        assert_eq!(functions[1].name, "memset");
        assert_eq!(functions[1].end_offset, region.size());

        assert_eq!(region.get_function(0x100).map(|f| f.name.as_str()), Some("memcpy"));
        assert_eq!(region.get_function(0x200).map(|f| f.name.as_str()), Some("memset"));
    }

    #[test]
    fn test_inverted_range_has_zero_size() {
        let region =
            MappedRegion::new(RegionId(9), "bad.so", 0, Address(0x2000), Address(0x1000));
        assert_eq!(region.size(), 0);
    }

    #[test]
    fn test_get_function_boundaries_and_gap() {
        let mut region = region_with(&[0x100, 0x200]);
        region.sort_functions();

        // exact start and end of each range
        assert_eq!(region.get_function(0x100).map(|f| f.name.as_str()), Some("fn_0"));
        assert_eq!(region.get_function(0x1FF).map(|f| f.name.as_str()), Some("fn_0"));
        assert_eq!(region.get_function(0x200).map(|f| f.name.as_str()), Some("fn_1"));
        assert_eq!(region.get_function(region.size()).map(|f| f.name.as_str()), Some("fn_1"));

        // below the first function is a gap
        assert!(region.get_function(0x50).is_none());
        assert!(region.get_function(0xFF).is_none());
    }

    #[test]
    fn test_get_function_single_element() {
        let mut region = region_with(&[0x40]);
        region.sort_functions();

        assert!(region.get_function(0x3F).is_none());
        assert!(region.get_function(0x40).is_some());
        assert!(region.get_function(region.size()).is_some());
        assert!(region.get_function(region.size() + 1).is_none());
    }

    #[test]
    fn test_get_function_empty_region() {
        let region = region_with(&[]);
        assert!(region.get_function(0).is_none());
        assert!(region.get_function(0x100).is_none());
    }

    #[test]
    fn test_provisional_range_is_single_point() {
        let mut region = region_with(&[]);
        let function = region.new_function("only", 0x80);
        assert_eq!(function.start_offset, 0x80);
        assert_eq!(function.end_offset, 0x80);
    }

    proptest! {
        #[test]
        fn prop_sorted_partition(offsets in proptest::collection::btree_set(0u32..0x4000, 1..40)) {
            let offsets: Vec<u32> = offsets.into_iter().collect();
            let mut region = region_with(&offsets);
            region.sort_functions();

            let functions = region.functions();
            // sorted, contiguous: each end is the next start minus one
            for pair in functions.windows(2) {
                prop_assert!(pair[0].start_offset < pair[1].start_offset);
                prop_assert_eq!(pair[0].end_offset, pair[1].start_offset - 1);
            }
            prop_assert_eq!(functions[functions.len() - 1].end_offset, region.size());

            // every in-partition offset resolves to exactly its range
            for f in functions {
                prop_assert_eq!(region.get_function(f.start_offset).map(|x| x.start_offset), Some(f.start_offset));
                prop_assert_eq!(region.get_function(f.end_offset).map(|x| x.start_offset), Some(f.start_offset));
            }
        }
    }
}
